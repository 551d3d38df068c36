use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::runtime::error::{Error, Result};
use crate::runtime::http::{Part, Request, RequestPayload, Response};
use crate::types::HttpMethod;

/// 传输层接口
///
/// 生成的客户端把构建好的 `Request` 交给它执行。自定义实现通过
/// `#[rest_client(client = ...)]` 指定类型，或在运行时通过 builder 传入实例。
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// 基于 reqwest 的默认传输层
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用调用方配置好的 reqwest 客户端（超时、代理、TLS 等）
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        let Request {
            method,
            url,
            headers,
            payload,
        } = request;
        log::debug!("--> {} {}", method, url);

        let mut builder = self.client.request(to_reqwest_method(method), url.as_str());
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match payload {
            RequestPayload::Empty => builder,
            RequestPayload::Body(body) => {
                // 显式声明的 Content-Type 优先
                if let Some(content_type) = body.content_type.filter(|_| !has_content_type) {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                builder.body(body.bytes)
            }
            RequestPayload::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = response.bytes().await?;
        log::debug!("<-- {} {} ({} bytes)", status, url, bytes.len());

        Ok(Response::new(status, headers, bytes.to_vec()))
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn build_form(parts: Vec<Part>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut field = reqwest::multipart::Part::bytes(part.body.bytes);
        if let Some(content_type) = &part.body.content_type {
            field = field.mime_str(content_type).map_err(Error::transport)?;
        }
        form = form.part(part.name, field);
    }
    Ok(form)
}
