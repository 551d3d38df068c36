//! 请求构建
//!
//! 生成的方法体按参数声明顺序调用 `RequestBuilder`，最后 `build()` 得到交给传输层的 `Request`。

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::runtime::error::{Error, Result};
use crate::runtime::http::{Part, Request, RequestBody, RequestPayload};
use crate::types::{Encoding, HttpMethod};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 路径段中需要转义的字符
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    base_url: String,
    relative_url: String,
    paths: Vec<(String, String)>,
    encoding: Encoding,
    query: Vec<String>,
    headers: Vec<(String, String)>,
    fields: Vec<String>,
    parts: Vec<Part>,
    body: Option<RequestBody>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, base_url: &str, relative_url: &str, encoding: Encoding) -> Self {
        Self {
            method,
            base_url: base_url.to_string(),
            relative_url: relative_url.to_string(),
            paths: Vec::new(),
            encoding,
            query: Vec::new(),
            headers: Vec::new(),
            fields: Vec::new(),
            parts: Vec::new(),
            body: None,
        }
    }

    /// `#[url]` 参数提供的地址，绝对地址会忽略 base_url
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.relative_url = url.to_string();
        self
    }

    /// 记录 URL 模板中 `{name}` 的取值，`build()` 时一次性替换
    pub fn path(&mut self, name: &str, value: &str, encoded: bool) -> Result<&mut Self> {
        if !encoded && (value == "." || value == "..") {
            return Err(Error::Runtime(format!(
                "@Path parameters shouldn't perform path traversal ('.' or '..'): {name} is {value}"
            )));
        }
        let replacement = if encoded {
            value.to_string()
        } else {
            utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
        };
        self.paths.push((name.to_string(), replacement));
        Ok(self)
    }

    pub fn query(&mut self, name: &str, value: &str, encoded: bool) -> &mut Self {
        self.query.push(encode_pair(name, value, encoded));
        self
    }

    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn field(&mut self, name: &str, value: &str, encoded: bool) -> &mut Self {
        self.fields.push(encode_pair(name, value, encoded));
        self
    }

    pub fn part(&mut self, name: &str, body: RequestBody) -> &mut Self {
        self.parts.push(Part {
            name: name.to_string(),
            body,
        });
        self
    }

    pub fn body(&mut self, body: RequestBody) -> &mut Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Result<Request> {
        let relative_url = substitute_paths(&self.relative_url, &self.paths);
        let mut url = resolve_url(&self.base_url, &relative_url);
        if !self.query.is_empty() {
            let fragment = url.find('#').map(|at| url.split_off(at));
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&self.query.join("&"));
            if let Some(fragment) = fragment {
                url.push_str(&fragment);
            }
        }
        if let Err(source) = url::Url::parse(&url) {
            return Err(Error::InvalidUrl { url, source });
        }

        let payload = match self.encoding {
            Encoding::FormUrlEncoded => {
                RequestPayload::Body(RequestBody::new(FORM_CONTENT_TYPE, self.fields.join("&")))
            }
            Encoding::Multipart => RequestPayload::Multipart(self.parts),
            Encoding::None => self.body.map(RequestPayload::Body).unwrap_or_default(),
        };

        Ok(Request {
            method: self.method,
            url,
            headers: self.headers,
            payload,
        })
    }
}

/// 单次扫描模板，替换值中的 `{..}` 不会再被当作占位符
fn substitute_paths(template: &str, paths: &[(String, String)]) -> String {
    if paths.is_empty() {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let name = &after[..close];
        match paths.iter().find(|(candidate, _)| candidate == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn encode_pair(name: &str, value: &str, encoded: bool) -> String {
    if encoded {
        format!("{name}={value}")
    } else {
        let name: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        let value: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        format!("{name}={value}")
    }
}

/// 拼接基础地址和相对地址
///
/// 相对地址本身是 http/https 绝对地址时直接使用；否则两者之间恰好保留一个 `/`。
pub fn resolve_url(base: &str, relative: &str) -> String {
    let lower = relative.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || base.is_empty() {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches('/'))
}
