use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: i64,
}

impl Comment {
    pub fn new(user_id: String, content: String, created_at: i64) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            user_id,
            content,
            created_at,
        }
    }
}
