use crate::application::ports::cache::{CachedValue, FeedCache};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// メモリキャッシュサービス
///
/// TTL も容量制限も持たず、明示的な削除かプレフィックス無効化でのみ消える。
pub struct MemoryCacheService<T: Clone> {
    cache: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> MemoryCacheService<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// キャッシュにデータを保存
    pub async fn set(&self, key: String, value: T) {
        let mut cache = self.cache.write().await;
        cache.insert(key, value);
    }

    /// キャッシュからデータを取得
    pub async fn get(&self, key: &str) -> Option<T> {
        let cache = self.cache.read().await;
        cache.get(key).cloned()
    }

    /// キャッシュから削除
    pub async fn delete(&self, key: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(key);
    }

    /// プレフィックスに一致するキーを削除
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|key, _| !key.starts_with(prefix));
        before - cache.len()
    }

    /// キャッシュをクリア
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
    }

    /// キャッシュサイズを取得
    pub async fn size(&self) -> usize {
        let cache = self.cache.read().await;
        cache.len()
    }
}

impl<T> Default for MemoryCacheService<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedCache for MemoryCacheService<CachedValue> {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        MemoryCacheService::get(self, key).await
    }

    async fn set(&self, key: String, value: CachedValue) {
        MemoryCacheService::set(self, key, value).await;
    }

    async fn delete(&self, key: &str) {
        MemoryCacheService::delete(self, key).await;
    }

    async fn delete_prefix(&self, prefix: &str) {
        MemoryCacheService::delete_prefix(self, prefix).await;
    }
}
