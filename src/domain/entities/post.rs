use super::comment::Comment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    pub created_at: i64,
    #[serde(default)]
    pub likes: BTreeSet<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub shares: u64,
}

impl Post {
    pub fn new(user_id: String, content: String, media: Option<Vec<String>>, created_at: i64) -> Self {
        Self::new_with_id(
            uuid::Uuid::now_v7().to_string(),
            user_id,
            content,
            media,
            created_at,
        )
    }

    pub fn new_with_id(
        id: String,
        user_id: String,
        content: String,
        media: Option<Vec<String>>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            content,
            media,
            created_at,
            likes: BTreeSet::new(),
            comments: Vec::new(),
            shares: 0,
        }
    }

    /// フィードの並び順キー（新しい順に並べる際は降順で比較する）
    pub fn sort_key(&self) -> (i64, &str) {
        (self.created_at, self.id.as_str())
    }

    /// いいねを追加。既に含まれていれば何もせず false を返す
    pub fn add_like(&mut self, user_id: &str) -> bool {
        self.likes.insert(user_id.to_string())
    }

    /// いいねを取り消す。含まれていなければ何もせず false を返す
    pub fn remove_like(&mut self, user_id: &str) -> bool {
        self.likes.remove(user_id)
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn increment_shares(&mut self) {
        self.shares += 1;
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
