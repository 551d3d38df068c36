pub mod client;
pub mod headers;
pub mod interface;
pub mod method;
pub mod params;
pub mod template;

pub use client::parse_client_config;
pub use interface::build_interface_descriptor;
pub use method::analyze_method;
pub use template::extract_placeholders;
