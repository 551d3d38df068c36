//! kite 的公共部分
//!
//! - 编译期：标记模型、类型查询、方法分析、接口描述和诊断，供 `kite-macro` 使用；
//! - 运行期：生成的客户端依赖的传输层、转换器、请求/响应、回调和流。

pub mod context;
pub mod diagnostics;
pub mod introspect;
pub mod naming;
pub mod parsing;
pub mod runtime;
pub mod types;

pub use context::AnalysisContext;
pub use diagnostics::{Diagnostic, DiagnosticAnchor, DiagnosticKind, Diagnostics};
pub use introspect::{TypeClass, TypeIntrospector};
pub use naming::NameAllocator;
pub use parsing::{analyze_method, build_interface_descriptor, parse_client_config};
pub use runtime::*;
pub use types::{ClientConfig, Encoding, HttpMethod, InterfaceDescriptor, MethodDescriptor};

// 生成代码通过这些路径访问依赖，用户无需自行引入
#[doc(hidden)]
pub use futures;
#[doc(hidden)]
pub use log;
