//! 运行时错误
//!
//! 生成的代码统一用 `?` 传播这里的错误，所以用户的返回类型既可以是
//! `kite_common::Result<T>`，也可以是错误类型实现了 `From<kite_common::Error>` 的
//! 任意 `Result<T, E>`（例如 `anyhow::Result<T>`）。

use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 转换器的种类，用于缺失转换器时的报错
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverterKind {
    String,
    RequestBody,
    ResponseBody,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConverterKind::String => "string",
            ConverterKind::RequestBody => "request body",
            ConverterKind::ResponseBody => "response body",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("converter factory has no {kind} converter for `{type_name}`")]
    MissingConverter {
        kind: ConverterKind,
        type_name: &'static str,
    },

    #[error("conversion failed: {0}")]
    Conversion(#[source] BoxError),

    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    #[error("unexpected http status {status}")]
    Status { status: u16, body: Vec<u8> },

    #[error("{0}")]
    Runtime(String),
}

impl Error {
    pub fn conversion<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Conversion(error.into())
    }

    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(error.into())
    }

    pub fn missing_converter<T: ?Sized>(kind: ConverterKind) -> Self {
        Error::MissingConverter {
            kind,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn status(status: u16, body: Vec<u8>) -> Self {
        Error::Status { status, body }
    }

    /// 非 2xx 响应的状态码
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::conversion(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::transport(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::missing_converter::<Vec<u32>>(ConverterKind::ResponseBody);
        let message = err.to_string();
        assert!(message.starts_with("converter factory has no response body converter for `"));
        assert!(message.contains("Vec<u32>"));

        let err = Error::status(404, b"not found".to_vec());
        assert_eq!(err.to_string(), "unexpected http status 404");
        assert_eq!(err.status_code(), Some(404));

        let err = Error::conversion("bad number");
        assert_eq!(err.to_string(), "conversion failed: bad number");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_invalid_url_keeps_source() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = Error::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid request url `not a url`"));
    }

    #[test]
    fn test_into_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err(Error::Runtime("boom".to_string()))?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().to_string(), "boom");
    }
}
