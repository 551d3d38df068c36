use futures::StreamExt;
use futures::stream::BoxStream;
use kite_common::{Error, HttpInfo, JsonConverterFactory, ResponseCallback, ResponseStream, Result};
use kite_macro::rest_client;
use log::{info, warn};
use serde::Deserialize;
use tokio::sync::oneshot;

#[derive(Debug, Deserialize)]
struct Todo {
    id: u32,
    title: String,
    completed: bool,
}

#[rest_client(base_url = "https://jsonplaceholder.typicode.com", converter = JsonConverterFactory)]
trait Todos {
    #[get("todos/{id}")]
    fn todo(&self, #[path] id: u32, callback: impl ResponseCallback<Todo>);

    #[get("todos")]
    fn todos(&self, #[query("_limit")] limit: u32) -> ResponseStream<Vec<Todo>>;

    #[get("todos/{id}")]
    fn todo_info(&self, #[path] id: u32) -> BoxStream<'static, Result<HttpInfo<Todo>>>;
}

/// 把回调结果转发到 oneshot 通道
struct Forward(std::sync::Mutex<Option<oneshot::Sender<String>>>);

impl Forward {
    fn send(&self, message: String) {
        if let Some(sender) = self.0.lock().ok().and_then(|mut slot| slot.take()) {
            let _ = sender.send(message);
        }
    }
}

impl ResponseCallback<Todo> for Forward {
    fn on_success(&self, info: HttpInfo<Todo>) {
        match info.body {
            Some(todo) => self.send(format!("#{} {} (completed: {})", todo.id, todo.title, todo.completed)),
            None => self.send(format!("http status {}", info.status)),
        }
    }

    fn on_failure(&self, error: Error) {
        self.send(format!("failed: {error}"));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let client = TodosImpl::builder().build()?;

    // 回调：调用立即返回，结果在后台送达
    let (tx, rx) = oneshot::channel();
    client.todo(1, Forward(std::sync::Mutex::new(Some(tx))));
    info!("callback: {}", rx.await?);

    // 流：在被轮询之前不会发出请求
    let stream = client.todos(3);
    info!("stream created, nothing sent yet");
    match stream.single().await {
        Ok(todos) => info!("stream yielded {} todos", todos.len()),
        Err(e) => warn!("stream failed: {e}"),
    }

    let mut infos = client.todo_info(99999);
    while let Some(item) = infos.next().await {
        match item {
            Ok(info) => info!("status {} with body present: {}", info.status, info.body.is_some()),
            Err(e) => warn!("request failed: {e}"),
        }
    }

    Ok(())
}
