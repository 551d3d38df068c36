use std::future::Future;

use crate::runtime::error::Error;
use crate::runtime::http::HttpInfo;

/// 回调调用约定的接收者
///
/// 收到任何 HTTP 响应（包括非 2xx）都调用 `on_success`，状态码和错误体在
/// `HttpInfo` 中；传输失败或转换失败调用 `on_failure`。两者恰好调用其一。
pub trait ResponseCallback<T>: Send + 'static {
    fn on_success(&self, info: HttpInfo<T>);

    fn on_failure(&self, error: Error);
}

impl<T, C> ResponseCallback<T> for Box<C>
where
    C: ResponseCallback<T> + ?Sized,
{
    fn on_success(&self, info: HttpInfo<T>) {
        (**self).on_success(info)
    }

    fn on_failure(&self, error: Error) {
        (**self).on_failure(error)
    }
}

/// 用一个闭包处理结果的回调
pub struct FnCallback<F> {
    f: F,
}

impl<T, F> ResponseCallback<T> for FnCallback<F>
where
    F: Fn(Result<HttpInfo<T>, Error>) + Send + 'static,
{
    fn on_success(&self, info: HttpInfo<T>) {
        (self.f)(Ok(info))
    }

    fn on_failure(&self, error: Error) {
        (self.f)(Err(error))
    }
}

/// 把闭包包装成 `ResponseCallback`
pub fn callback_fn<T, F>(f: F) -> FnCallback<F>
where
    F: Fn(Result<HttpInfo<T>, Error>) + Send + 'static,
{
    FnCallback { f }
}

/// 在后台执行回调调用
///
/// 处于 tokio 运行时内时直接 spawn；否则起一个线程，在单线程运行时里执行。
pub fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(_) => {
            std::thread::spawn(move || {
                match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime.block_on(future),
                    Err(err) => log::error!("failed to start runtime for callback: {err}"),
                }
            });
        }
    }
}
