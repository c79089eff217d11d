//! 通用工具函数

use uuid::Uuid;

/// 生成实体唯一标识
pub fn generate_entity_id() -> Uuid {
    Uuid::new_v4()
}

/// 规范化用于关键词匹配的文本
pub fn normalize_for_matching(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_entity_id_is_unique() {
        let a = generate_entity_id();
        let b = generate_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalize_for_matching() {
        assert_eq!(normalize_for_matching("SEVERE Swelling"), "severe swelling");
    }
}
