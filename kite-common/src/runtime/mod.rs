//! 生成代码依赖的运行时契约
//!
//! 传输层、转换器、回调和流都以 trait 描述，并各自带一个默认实现。

pub mod builder;
pub mod callback;
pub mod client;
pub mod converter;
pub mod error;
pub mod http;
pub mod stream;

pub use builder::{RequestBuilder, resolve_url};
pub use callback::{FnCallback, ResponseCallback, callback_fn, spawn};
pub use client::{HttpClient, ReqwestClient};
pub use converter::{
    ConverterFactory, JsonConverterFactory, RequestBodyConverter, ResponseBodyConverter, StringConverter,
};
pub use error::{BoxError, ConverterKind, Error, Result};
pub use http::{HttpInfo, Part, Request, RequestBody, RequestPayload, Response, ResponseBody};
pub use stream::ResponseStream;
