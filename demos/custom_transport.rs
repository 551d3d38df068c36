use std::time::Instant;

use async_trait::async_trait;
use kite_common::{HttpClient, JsonConverterFactory, ReqwestClient, Request, Response, Result};
use kite_macro::rest_client;
use serde::Deserialize;

/// 给每个请求加上认证头并记录耗时的传输层
///
/// 传输层是生成代码与网络之间唯一的接缝，认证、重试、埋点都放在这里。
#[derive(Default)]
struct AuthTransport {
    inner: ReqwestClient,
    token: String,
}

impl AuthTransport {
    fn new(token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("kite-demo/0.1")
            .build()
            .unwrap_or_default();
        Self {
            inner: ReqwestClient::with_client(client),
            token: token.into(),
        }
    }
}

#[async_trait]
impl HttpClient for AuthTransport {
    async fn execute(&self, mut request: Request) -> Result<Response> {
        request
            .headers
            .push(("Authorization".to_string(), format!("Bearer {}", self.token)));

        let started = Instant::now();
        let method = request.method;
        let url = request.url.clone();
        let response = self.inner.execute(request).await;
        match &response {
            Ok(response) => log::info!("{} {} -> {} in {:?}", method, url, response.status, started.elapsed()),
            Err(e) => log::warn!("{} {} failed: {}", method, url, e),
        }
        response
    }
}

#[derive(Debug, Deserialize)]
struct Comment {
    id: u32,
    email: String,
}

#[rest_client(
    base_url = "https://jsonplaceholder.typicode.com",
    client = AuthTransport,
    converter = JsonConverterFactory,
    suffix = "Client"
)]
trait Comments {
    #[get("posts/{post}/comments")]
    async fn comments(&self, #[path] post: u32) -> Result<Vec<Comment>>;

    #[get]
    async fn raw(&self, #[url] url: &str) -> Result<String>;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = CommentsClient::builder()
        .http_client(AuthTransport::new("demo-token"))
        .build()?;

    for comment in client.comments(1).await?.iter().take(3) {
        println!("#{} {}", comment.id, comment.email);
    }

    let text = client.raw("https://jsonplaceholder.typicode.com/todos/1").await?;
    println!("{text}");
    Ok(())
}
