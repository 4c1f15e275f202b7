use crate::domain::entities::Post;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 投稿コレクション全体を一つの単位として保持するストア
#[async_trait]
pub trait PostStore: Send + Sync {
    /// 現在のコレクション全体を返す。書き込みとは直列化されない
    async fn read_all(&self) -> Result<Vec<Post>, AppError>;

    /// コレクション全体を置き換える。書き込み同士は到着順に直列化される
    async fn write_all(&self, posts: Vec<Post>) -> Result<(), AppError>;
}
