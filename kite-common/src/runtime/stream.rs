use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::runtime::error::{Error, Result};

/// 响应式调用约定的返回值
///
/// 惰性：请求在第一次轮询时才发出。一次调用产出一个元素。
pub struct ResponseStream<T> {
    inner: BoxStream<'static, Result<T>>,
}

impl<T: Send + 'static> ResponseStream<T> {
    pub fn once<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: stream::once(future).boxed(),
        }
    }

    /// 请求还没发出就失败了（例如 URL 不合法）
    pub fn failed(error: Error) -> Self {
        Self {
            inner: stream::once(future::ready(Err(error))).boxed(),
        }
    }

    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    pub fn into_inner(self) -> BoxStream<'static, Result<T>> {
        self.inner
    }

    /// 等待第一个元素
    pub async fn single(mut self) -> Result<T> {
        match self.inner.next().await {
            Some(item) => item,
            None => Err(Error::Runtime("response stream completed without a value".to_string())),
        }
    }
}

impl<T> Stream for ResponseStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let stream = ResponseStream::once(async move {
            flag.store(true, Ordering::SeqCst);
            Ok(5)
        });
        assert!(!started.load(Ordering::SeqCst));

        let items: Vec<Result<i32>> = stream.collect().await;
        assert!(started.load(Ordering::SeqCst));
        assert_eq!(items.len(), 1);
        assert_eq!(*items[0].as_ref().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_failed_stream() {
        let err = ResponseStream::<String>::failed(Error::Runtime("bad url".to_string()))
            .single()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "bad url");
    }

    #[tokio::test]
    async fn test_empty_stream_single() {
        let stream = ResponseStream::<u8>::from_stream(stream::empty());
        assert!(stream.single().await.is_err());
    }
}
