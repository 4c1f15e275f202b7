use crate::domain::entities::Post;
use crate::shared::AppError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::fmt;

/// フィード上の位置。直前ページ最後の投稿の `(created_at, id)` を指す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: i64,
    pub id: String,
}

impl FeedCursor {
    pub fn new(created_at: i64, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self::new(post.created_at, post.id.clone())
    }

    fn parse(raw: &str) -> Option<Self> {
        let (created_at, id) = raw.split_once(':')?;
        let created_at = created_at.parse().ok()?;
        if id.is_empty() {
            return None;
        }
        Some(Self::new(created_at, id))
    }

    /// URL セーフな不透明トークンへ変換
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_string())
    }

    pub fn decode(token: &str) -> Result<Self, AppError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| AppError::MalformedCursor(format!("invalid encoding: {err}")))?;
        let raw = String::from_utf8(bytes)
            .map_err(|err| AppError::MalformedCursor(format!("invalid utf-8: {err}")))?;
        Self::parse(&raw)
            .ok_or_else(|| AppError::MalformedCursor("expected `<created_at>:<id>`".to_string()))
    }

    /// 降順フィードでこのカーソルより後ろに来る投稿か
    pub fn precedes(&self, post: &Post) -> bool {
        post.created_at < self.created_at
            || (post.created_at == self.created_at && post.id.as_str() < self.id.as_str())
    }
}

impl fmt::Display for FeedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.created_at, self.id)
    }
}
