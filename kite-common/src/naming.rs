/// 生成代码内部标识符的分配器
///
/// 首选名未被占用时原样返回；冲突时追加 `_` 和随机小写后缀，
/// 后缀长度为 `冲突数 / 26 + 2`，直到不再冲突。
/// 随机数发生器按调用固定种子初始化，所以同一输入的输出逐字节一致。
#[derive(Debug, Clone)]
pub struct NameAllocator {
    rng: fastrand::Rng,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameAllocator {
    pub const DEFAULT_SEED: u64 = 0x6b69_7465;

    pub fn new() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn allocate<S: AsRef<str>>(&mut self, preferred: &str, taken: &[S]) -> String {
        let is_taken = |candidate: &str| taken.iter().any(|name| name.as_ref() == candidate);
        if !is_taken(preferred) {
            return preferred.to_string();
        }

        let conflicts = taken
            .iter()
            .filter(|name| name.as_ref().starts_with(preferred))
            .count();
        let suffix_len = conflicts / 26 + 2;
        loop {
            let suffix: String = (0..suffix_len).map(|_| self.rng.lowercase()).collect();
            let candidate = format!("{preferred}_{suffix}");
            if !is_taken(&candidate) {
                return candidate;
            }
        }
    }

    /// 分配后把结果加入 `taken`，便于连续分配
    pub fn allocate_into(&mut self, preferred: &str, taken: &mut Vec<String>) -> String {
        let name = self.allocate(preferred, taken.as_slice());
        taken.push(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_name_is_returned_unchanged() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("request", &["builder", "response"]), "request");
    }

    #[test]
    fn test_collision_appends_two_letter_suffix() {
        let mut names = NameAllocator::new();
        let name = names.allocate("request", &["request"]);
        let suffix = name.strip_prefix("request_").unwrap();
        assert_eq!(suffix.len(), 2);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_suffix_grows_with_conflicts() {
        let mut names = NameAllocator::new();
        let mut taken: Vec<String> = vec!["value".to_string()];
        taken.extend((0..26).map(|i| format!("value{i}")));
        let name = names.allocate("value", &taken);
        assert_eq!(name.strip_prefix("value_").unwrap().len(), 3);
        assert!(!taken.contains(&name));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let taken = ["converter"];
        let first = NameAllocator::new().allocate("converter", &taken);
        let second = NameAllocator::new().allocate("converter", &taken);
        assert_eq!(first, second);
    }

    #[test]
    fn test_allocate_into_never_repeats() {
        let mut names = NameAllocator::new();
        let mut taken = Vec::new();
        let first = names.allocate_into("field", &mut taken);
        let second = names.allocate_into("field", &mut taken);
        let third = names.allocate_into("field", &mut taken);
        assert_eq!(first, "field");
        assert_ne!(second, first);
        assert_ne!(third, second);
        assert_eq!(taken.len(), 3);
    }
}
