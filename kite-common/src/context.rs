use crate::introspect::TypeIntrospector;
use crate::naming::NameAllocator;

/// 单次宏调用的分析上下文
///
/// 类型查询表和随机名分配器都挂在这里，每个 trait 构造一个，
/// 不存在跨调用共享的可变状态。
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub types: TypeIntrospector,
    pub names: NameAllocator,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            types: TypeIntrospector::new(),
            names: NameAllocator::with_seed(seed),
        }
    }
}
