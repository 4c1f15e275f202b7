use crate::domain::entities::{FeedPage, Post};
use async_trait::async_trait;

/// キャッシュに載せる値。取得時に種類を取り違えないよう列挙型で保持する
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// 予約済みの `post:{id}:engagement` キー用。現状これを書き込む経路はない
    Post(Post),
    Feed(FeedPage),
}

/// フィード・投稿用のキャッシュポート
///
/// キャッシュは最適化であって正ではない。実装側の障害は呼び出し元へ
/// エラーとして返さず、ミスとして扱うこと。
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// キーで検索。存在しなければ None
    async fn get(&self, key: &str) -> Option<CachedValue>;

    async fn set(&self, key: String, value: CachedValue);

    async fn delete(&self, key: &str);

    /// プレフィックスに一致するキーをすべて無効化
    async fn delete_prefix(&self, prefix: &str);
}
