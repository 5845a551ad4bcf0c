//! Novel Context - Value Objects

/// 计算正文字数
///
/// 采用非空白字符计数（与历史数据格式保持一致，不做分词统计）。
/// 持久化或缓存中的章节字数必须等于对其当前正文调用本函数的结果。
pub fn word_count(content: &str) -> usize {
    content.chars().filter(|c| !c.is_whitespace()).count()
}

/// 生成新的章节 ID
///
/// ULID 字符串：不透明、按创建时间字典序有序
pub fn new_chapter_id() -> String {
    ulid::Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_whitespace() {
        assert_eq!(word_count("Hello world"), 10);
        assert_eq!(word_count("  a\tb\nc  "), 3);
    }

    #[test]
    fn test_word_count_empty() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t"), 0);
    }

    #[test]
    fn test_word_count_cjk() {
        assert_eq!(word_count("第一章 风起"), 5);
    }

    #[test]
    fn test_chapter_ids_are_time_ordered() {
        let first = new_chapter_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_chapter_id();
        assert!(first < second);
    }

    #[test]
    fn test_chapter_ids_are_unique() {
        let a = new_chapter_id();
        let b = new_chapter_id();
        assert_ne!(a, b);
    }
}
