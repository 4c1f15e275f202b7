use super::post::Post;
use crate::domain::value_objects::FeedCursor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<Post>,
    pub next_cursor: Option<String>,
}

impl FeedPage {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
        }
    }

    /// 全件から1ページ分を切り出す。
    ///
    /// `(created_at, id)` の降順に並べ、カーソルがあればその位置より厳密に後ろの
    /// 投稿だけを残して先頭 `limit` 件を返す。ページがちょうど `limit` 件なら
    /// 最後の投稿から次のカーソルを作る（残りが `limit` 件ちょうどの場合も
    /// 1回余分にカーソルが返る）。
    pub fn paginate(mut posts: Vec<Post>, limit: usize, cursor: Option<&FeedCursor>) -> Self {
        if limit == 0 {
            return Self::empty();
        }

        posts.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        let data: Vec<Post> = posts
            .into_iter()
            .filter(|post| cursor.is_none_or(|cursor| cursor.precedes(post)))
            .take(limit)
            .collect();

        let next_cursor = if data.len() == limit {
            data.last().map(|last| FeedCursor::from_post(last).encode())
        } else {
            None
        };

        Self { data, next_cursor }
    }
}
