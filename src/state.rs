use crate::application::ports::{CachedValue, FeedCache, PostStore};
use crate::application::services::{FeedSettings, PostService};
use crate::infrastructure::cache::MemoryCacheService;
use crate::infrastructure::storage::JsonFilePostStore;
use crate::shared::{AppConfig, AppError};
use std::sync::Arc;
use tracing::info;

/// アプリケーション全体の状態を管理する構造体
///
/// 起動時に一度だけ組み立て、ルーターへ渡す。
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub post_service: Arc<PostService>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn PostStore> =
            Arc::new(JsonFilePostStore::open(&config.storage.data_path).await?);
        let cache: Arc<dyn FeedCache> = Arc::new(MemoryCacheService::<CachedValue>::new());

        info!(
            data_path = %config.storage.data_path.display(),
            serialize_mutations = config.feed.serialize_mutations,
            "post store opened"
        );

        Ok(Self::from_parts(store, cache, config))
    }

    pub fn from_parts(
        store: Arc<dyn PostStore>,
        cache: Arc<dyn FeedCache>,
        config: &AppConfig,
    ) -> Self {
        let mut post_service = PostService::new(
            Arc::clone(&store),
            cache,
            FeedSettings::from(&config.feed),
        );
        if config.feed.serialize_mutations {
            post_service = post_service.with_serialized_mutations();
        }

        Self {
            store,
            post_service: Arc::new(post_service),
        }
    }
}
