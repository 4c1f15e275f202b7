use serde::{Deserialize, Deserializer, Serialize};

// リクエストDTO
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub media: Option<Vec<String>>,
}

/// `?limit=` や `?cursor=` のような空値は未指定として扱う
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    #[serde(default, deserialize_with = "blank_as_none_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub cursor: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

fn blank_as_none_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer)?
        .map(|value| {
            value.trim().parse::<i64>().map_err(|_| {
                serde::de::Error::custom(format!("limit must be an integer, got `{value}`"))
            })
        })
        .transpose()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPostRequest {
    pub user_id: String,
    pub content: String,
}

// レスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
