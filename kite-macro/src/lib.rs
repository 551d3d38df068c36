//! 声明式 REST 客户端的属性宏
//!
//! 在一个 trait 上标注 `#[rest_client(...)]`，方法上用 `#[get("...")]` 等标记描述请求，
//! 宏在编译期生成实现类型 `{Trait}Impl` 和它的构建器。
//!
//! ```ignore
//! use kite_common::{JsonConverterFactory, Result};
//! use kite_macro::rest_client;
//!
//! #[rest_client(base_url = "https://api.github.com", converter = JsonConverterFactory)]
//! pub trait GitHub {
//!     #[get("users/{user}/repos")]
//!     async fn repos(&self, #[path] user: &str) -> Result<Vec<Repo>>;
//! }
//!
//! let github = GitHubImpl::builder().build()?;
//! let repos = github.repos("octocat").await?;
//! ```

mod generator;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use kite_common::Diagnostic;
use proc_macro::TokenStream;

/// 为 trait 生成 HTTP 客户端实现
///
/// 参数：`base_url`、`suffix`、`client`、`converter`（必填）、`component`。
/// 方法和参数上的标记见 `kite_common::types::Marker`。
#[proc_macro_attribute]
pub fn rest_client(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(args);
    let item = proc_macro2::TokenStream::from(item);

    match catch_unwind(AssertUnwindSafe(|| generator::expand_rest_client(args, item))) {
        Ok(tokens) => tokens.into(),
        Err(payload) => {
            let message = format!("expansion panicked: {}", panic_message(payload.as_ref()));
            Diagnostic::internal(message).to_syn_error().to_compile_error().into()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
