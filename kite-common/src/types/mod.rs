pub mod args;
pub mod descriptor;
pub mod http;
pub mod marker;

pub use args::ClientConfig;
pub use descriptor::{
    CallbackDescriptor, ComponentModel, InterfaceDescriptor, LiteralHeader, MethodDescriptor,
    ParameterDescriptor, ReturnShape, UrlSource, ValueShape,
};
pub use http::{Encoding, HttpMethod};
pub use marker::{Marker, ParameterRole, RoleKind};
