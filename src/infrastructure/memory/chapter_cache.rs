//! Chapter Cache - 有界 LRU 章节缓存
//!
//! 以 (novel_id, chapter_id) 为键缓存已解码的章节记录。纯优化层：
//! 文件系统才是事实来源，容量为 0（禁用、总是未命中）时所有
//! 路径仍然正确。无基于时间的过期，过期完全由写/删路径上的
//! 显式失效控制。

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::domain::Chapter;

type CacheKey = (String, String);

/// 有界章节缓存
///
/// 所有变更（get/put/invalidate）通过单把锁串行化，彼此原子
pub struct ChapterCache {
    /// None 表示缓存禁用
    inner: Option<Mutex<LruCache<CacheKey, Chapter>>>,
}

impl ChapterCache {
    /// 创建容量为 `capacity` 的缓存；0 表示禁用
    pub fn new(capacity: usize) -> Self {
        let inner = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { inner }
    }

    /// 命中时返回章节副本并标记为最近使用
    pub fn get(&self, novel_id: &str, chapter_id: &str) -> Option<Chapter> {
        let inner = self.inner.as_ref()?;
        let mut cache = inner.lock().expect("chapter cache mutex poisoned");
        cache
            .get(&(novel_id.to_string(), chapter_id.to_string()))
            .cloned()
    }

    /// 插入/更新并标记为最近使用，超出容量时淘汰最久未使用的条目
    pub fn put(&self, novel_id: &str, chapter_id: &str, chapter: Chapter) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let mut cache = inner.lock().expect("chapter cache mutex poisoned");
        cache.put((novel_id.to_string(), chapter_id.to_string()), chapter);
    }

    /// 失效单个条目，或在 chapter_id 为 None 时失效该小说的全部条目
    pub fn invalidate(&self, novel_id: &str, chapter_id: Option<&str>) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let mut cache = inner.lock().expect("chapter cache mutex poisoned");

        match chapter_id {
            Some(chapter_id) => {
                cache.pop(&(novel_id.to_string(), chapter_id.to_string()));
            }
            None => {
                let keys: Vec<CacheKey> = cache
                    .iter()
                    .filter(|(key, _)| key.0 == novel_id)
                    .map(|(key, _)| key.clone())
                    .collect();
                for key in keys {
                    cache.pop(&key);
                }
            }
        }
    }

    /// 当前缓存条目数
    pub fn len(&self) -> usize {
        match self.inner.as_ref() {
            Some(inner) => inner.lock().expect("chapter cache mutex poisoned").len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chapter(id: &str) -> Chapter {
        let now = Utc::now();
        Chapter {
            id: id.to_string(),
            title: format!("章节 {}", id),
            content: "正文".to_string(),
            word_count: 2,
            tags: Vec::new(),
            references: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_put_get_round_trip() {
        let cache = ChapterCache::new(10);
        cache.put("n1", "c1", chapter("c1"));

        let got = cache.get("n1", "c1").unwrap();
        assert_eq!(got.id, "c1");
        assert!(cache.get("n1", "c2").is_none());
    }

    #[test]
    fn test_lru_eviction_beyond_capacity() {
        let cache = ChapterCache::new(3);
        for i in 0..4 {
            let id = format!("c{}", i);
            cache.put("n1", &id, chapter(&id));
        }

        // 第一个插入的条目被淘汰，其余保留
        assert!(cache.get("n1", "c0").is_none());
        assert!(cache.get("n1", "c1").is_some());
        assert!(cache.get("n1", "c3").is_some());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = ChapterCache::new(2);
        cache.put("n1", "c1", chapter("c1"));
        cache.put("n1", "c2", chapter("c2"));

        // 触摸 c1 后插入 c3，被淘汰的应是 c2
        cache.get("n1", "c1");
        cache.put("n1", "c3", chapter("c3"));

        assert!(cache.get("n1", "c1").is_some());
        assert!(cache.get("n1", "c2").is_none());
    }

    #[test]
    fn test_invalidate_single_entry() {
        let cache = ChapterCache::new(10);
        cache.put("n1", "c1", chapter("c1"));
        cache.put("n1", "c2", chapter("c2"));

        cache.invalidate("n1", Some("c1"));
        assert!(cache.get("n1", "c1").is_none());
        assert!(cache.get("n1", "c2").is_some());
    }

    #[test]
    fn test_invalidate_whole_novel() {
        let cache = ChapterCache::new(10);
        cache.put("n1", "c1", chapter("c1"));
        cache.put("n1", "c2", chapter("c2"));
        cache.put("n2", "c1", chapter("c1"));

        cache.invalidate("n1", None);
        assert!(cache.get("n1", "c1").is_none());
        assert!(cache.get("n1", "c2").is_none());
        assert!(cache.get("n2", "c1").is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = ChapterCache::new(0);
        cache.put("n1", "c1", chapter("c1"));

        assert!(cache.get("n1", "c1").is_none());
        assert_eq!(cache.len(), 0);
        // 禁用状态下失效操作也必须安全
        cache.invalidate("n1", None);
    }
}
