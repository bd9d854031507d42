//! 记忆化缓存
//!
//! 以输入参数的 SHA-256 摘要为键的 LRU 缓存，容量满时淘汰最久未使用的条目。
//! 仓库抓取和文本生成各持有一份实例。

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;

/// 线程安全的记忆化缓存
pub struct MemoCache<V> {
    inner: Mutex<LruCache<String, V>>,
}

impl<V: Clone> MemoCache<V> {
    /// 创建指定容量的缓存（容量至少为 1）
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// 由若干输入片段计算确定性的缓存键
    ///
    /// 每个片段前写入其字节长度，避免 ("ab", "c") 与 ("a", "bc") 碰撞
    pub fn key_for(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, value: V) {
        self.inner.lock().put(key, value);
    }

    /// 清空所有条目，返回被清除的数量
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.len();
        inner.clear();
        count
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic_and_length_prefixed() {
        let a = MemoCache::<String>::key_for(&["key", "prompt", "system"]);
        let b = MemoCache::<String>::key_for(&["key", "prompt", "system"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let shifted = MemoCache::<String>::key_for(&["keyp", "rompt", "system"]);
        assert_ne!(a, shifted);
    }

    #[test]
    fn test_insert_get_clear() {
        let cache = MemoCache::new(4);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = MemoCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        // 访问 a 使 b 成为最久未使用
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = MemoCache::new(0);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(1));
    }
}
