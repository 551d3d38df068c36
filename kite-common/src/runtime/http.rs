use crate::runtime::error::{Error, Result};
use crate::types::HttpMethod;

/// 交给传输层执行的请求，URL 已经是绝对地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub payload: RequestPayload,
}

impl Request {
    /// 按名称（不区分大小写）查找第一个请求头
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestPayload {
    #[default]
    Empty,
    Body(RequestBody),
    Multipart(Vec<Part>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RequestBody {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            bytes: bytes.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text/plain; charset=UTF-8", text.into())
    }

    pub fn octet_stream(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new("application/octet-stream", bytes)
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// multipart 请求中的一个部件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, bytes: impl Into<Vec<u8>>) -> Self {
        let content_type = find_header(&headers, "content-type").map(str::to_string);
        Self {
            status,
            headers,
            body: ResponseBody::new(bytes, content_type),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// 2xx 时返回响应体，否则返回带原始响应体的 `Error::Status`
    pub fn into_success_body(self) -> Result<ResponseBody> {
        if self.is_success() {
            Ok(self.body)
        } else {
            log::warn!("http request failed with status {}", self.status);
            Err(Error::status(self.status, self.body.into_bytes()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseBody {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 按 UTF-8 解码
    pub fn text(self) -> Result<String> {
        String::from_utf8(self.bytes).map_err(Error::conversion)
    }
}

/// 带状态码和响应头的结果
///
/// 2xx 时 `body` 为转换后的值；否则 `body` 为空，原始响应体放在 `error_body`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpInfo<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<T>,
    pub error_body: Option<Vec<u8>>,
}

impl<T> HttpInfo<T> {
    pub fn from_response<F>(response: Response, convert: F) -> Result<Self>
    where
        F: FnOnce(ResponseBody) -> Result<T>,
    {
        let Response {
            status,
            headers,
            body,
        } = response;
        if (200..300).contains(&status) {
            Ok(Self {
                status,
                headers,
                body: Some(convert(body)?),
                error_body: None,
            })
        } else {
            Ok(Self {
                status,
                headers,
                body: None,
                error_body: Some(body.into_bytes()),
            })
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    pub fn map<U, F>(self, f: F) -> HttpInfo<U>
    where
        F: FnOnce(T) -> U,
    {
        HttpInfo {
            status: self.status,
            headers: self.headers,
            body: self.body.map(f),
            error_body: self.error_body,
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        Response::new(
            status,
            vec![("Content-Type".to_string(), "text/plain".to_string())],
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn test_success_body() {
        let body = response(200, "pong").into_success_body().unwrap();
        assert_eq!(body.content_type(), Some("text/plain"));
        assert_eq!(body.text().unwrap(), "pong");
    }

    #[test]
    fn test_error_status_keeps_body() {
        let err = response(503, "busy").into_success_body().unwrap_err();
        match err {
            Error::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, b"busy");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_http_info_from_response() {
        let info = HttpInfo::from_response(response(201, "7"), |body| {
            body.text()?.parse::<i32>().map_err(Error::conversion)
        })
        .unwrap();
        assert!(info.is_success());
        assert_eq!(info.body, Some(7));
        assert_eq!(info.header("content-type"), Some("text/plain"));

        let info: HttpInfo<i32> =
            HttpInfo::from_response(response(404, "missing"), |_| panic!("not converted")).unwrap();
        assert!(!info.is_success());
        assert_eq!(info.body, None);
        assert_eq!(info.error_body.as_deref(), Some(&b"missing"[..]));
        assert_eq!(info.map(|n| n * 2).status, 404);
    }

    #[test]
    fn test_invalid_utf8_text() {
        let body = ResponseBody::new(vec![0xff, 0xfe], None);
        assert!(matches!(body.text(), Err(Error::Conversion(_))));
    }

    #[test]
    fn test_request_header_lookup() {
        let request = Request {
            method: HttpMethod::Get,
            url: "http://localhost/".to_string(),
            headers: vec![("X-Token".to_string(), "abc".to_string())],
            payload: RequestPayload::Empty,
        };
        assert_eq!(request.header("x-token"), Some("abc"));
        assert_eq!(request.header("accept"), None);
    }
}
