use crate::application::ports::cache::{CachedValue, FeedCache};
use crate::application::ports::post_store::PostStore;
use crate::domain::entities::{Comment, FeedPage, Post};
use crate::domain::value_objects::FeedCursor;
use crate::shared::config::FeedConfig;
use crate::shared::{AppError, ExclusiveSection};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const FEED_CACHE_PREFIX: &str = "feed:";

pub fn feed_cache_key(limit: usize, cursor: Option<&str>) -> String {
    format!("{FEED_CACHE_PREFIX}{limit}:{}", cursor.unwrap_or("start"))
}

/// 投稿単位の無効化用に予約されたキー（現状これを書き込む経路はない）
pub fn engagement_cache_key(post_id: &str) -> String {
    format!("post:{post_id}:engagement")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FeedSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }
}

pub struct PostService {
    store: Arc<dyn PostStore>,
    cache: Arc<dyn FeedCache>,
    settings: FeedSettings,
    mutation_guard: Option<ExclusiveSection>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, cache: Arc<dyn FeedCache>, settings: FeedSettings) -> Self {
        Self {
            store,
            cache,
            settings,
            mutation_guard: None,
        }
    }

    /// 読み込みから書き込みまでを1つの排他区間にまとめる。
    ///
    /// 既定では書き込みだけが直列化されるため、並行する更新の片方が失われうる。
    pub fn with_serialized_mutations(mut self) -> Self {
        self.mutation_guard = Some(ExclusiveSection::new());
        self
    }

    pub fn serializes_mutations(&self) -> bool {
        self.mutation_guard.is_some()
    }

    pub async fn create_post(
        &self,
        user_id: String,
        content: String,
        media: Option<Vec<String>>,
    ) -> Result<Post, AppError> {
        let post = Post::new(user_id, content, media, Utc::now().timestamp_millis());

        let created = post.clone();
        // 新しい投稿はどのページにも現れうるため、フィード全体を無効化する
        self.modify_collection(None, move |posts| {
            posts.push(created);
            Ok(())
        })
        .await?;

        info!(post_id = %post.id, user_id = %post.user_id, "post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, AppError> {
        self.store
            .read_all()
            .await?
            .into_iter()
            .find(|post| post.id == post_id)
            .ok_or_else(|| AppError::not_found_post(post_id))
    }

    pub async fn like_post(&self, post_id: &str, user_id: &str) -> Result<(), AppError> {
        let user_id = user_id.to_string();
        self.mutate_post(post_id, move |post| {
            post.add_like(&user_id);
        })
        .await
    }

    pub async fn unlike_post(&self, post_id: &str, user_id: &str) -> Result<(), AppError> {
        let user_id = user_id.to_string();
        self.mutate_post(post_id, move |post| {
            post.remove_like(&user_id);
        })
        .await
    }

    pub async fn comment_post(
        &self,
        post_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<(), AppError> {
        let comment = Comment::new(
            user_id.to_string(),
            content.to_string(),
            Utc::now().timestamp_millis(),
        );
        self.mutate_post(post_id, move |post| post.add_comment(comment))
            .await
    }

    pub async fn share_post(&self, post_id: &str) -> Result<(), AppError> {
        self.mutate_post(post_id, Post::increment_shares).await
    }

    pub async fn get_feed(
        &self,
        limit: Option<i64>,
        cursor: Option<&str>,
    ) -> Result<FeedPage, AppError> {
        let limit = self.resolve_limit(limit)?;
        let cache_key = feed_cache_key(limit, cursor);

        match self.cache.get(&cache_key).await {
            Some(CachedValue::Feed(page)) => {
                debug!(%cache_key, "feed cache hit");
                return Ok(page);
            }
            Some(CachedValue::Post(_)) => {
                warn!(%cache_key, "unexpected payload under feed key, treating as miss");
            }
            None => debug!(%cache_key, "feed cache miss"),
        }

        let cursor = cursor.map(FeedCursor::decode).transpose()?;
        let posts = self.store.read_all().await?;
        let page = FeedPage::paginate(posts, limit, cursor.as_ref());

        self.cache
            .set(cache_key, CachedValue::Feed(page.clone()))
            .await;
        Ok(page)
    }

    fn resolve_limit(&self, limit: Option<i64>) -> Result<usize, AppError> {
        match limit {
            None => Ok(self.settings.default_limit),
            Some(value) if value <= 0 => Err(AppError::InvalidInput(format!(
                "limit must be positive, got {value}"
            ))),
            Some(value) => Ok(usize::try_from(value)
                .unwrap_or(usize::MAX)
                .min(self.settings.max_limit)),
        }
    }

    async fn mutate_post<F>(&self, post_id: &str, mutation: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Post) + Send + 'static,
    {
        let target = post_id.to_string();
        self.modify_collection(Some(post_id.to_string()), move |posts| {
            let post = posts
                .iter_mut()
                .find(|post| post.id == target)
                .ok_or_else(|| AppError::not_found_post(&target))?;
            mutation(post);
            Ok(())
        })
        .await
    }

    /// 読み込み・変更・書き込み・キャッシュ無効化を1つのタスクで実行する。
    ///
    /// タスクは呼び出し側から切り離されているため、返り値の future が drop
    /// されても、書き込みが確定した変更の無効化は必ず行われる。
    async fn modify_collection<F, T>(
        &self,
        touched_post: Option<String>,
        modify: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(&mut Vec<Post>) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let unit = async move {
            let mut posts = store.read_all().await?;
            let output = modify(&mut posts)?;
            store.write_all(posts).await?;
            invalidate(cache.as_ref(), touched_post.as_deref()).await;
            Ok::<T, AppError>(output)
        };

        match &self.mutation_guard {
            Some(guard) => guard.run(unit).await?,
            None => tokio::spawn(unit)
                .await
                .map_err(|err| AppError::Internal(format!("mutation task aborted: {err}")))?,
        }
    }
}

async fn invalidate(cache: &dyn FeedCache, touched_post: Option<&str>) {
    cache.delete_prefix(FEED_CACHE_PREFIX).await;
    if let Some(post_id) = touched_post {
        cache.delete(&engagement_cache_key(post_id)).await;
    }
    debug!(post_id = touched_post.unwrap_or("-"), "feed cache invalidated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::MemoryCacheService;
    use crate::infrastructure::storage::JsonFilePostStore;
    use std::collections::HashSet;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::sleep;

    struct Fixture {
        _dir: TempDir,
        store: Arc<JsonFilePostStore>,
        cache: Arc<MemoryCacheService<CachedValue>>,
        service: PostService,
    }

    async fn fixture_with(settings: FeedSettings, serialized: bool) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            JsonFilePostStore::open(dir.path().join("posts.json"))
                .await
                .unwrap(),
        );
        let cache = Arc::new(MemoryCacheService::<CachedValue>::new());
        let mut service = PostService::new(store.clone(), cache.clone(), settings);
        if serialized {
            service = service.with_serialized_mutations();
        }
        Fixture {
            _dir: dir,
            store,
            cache,
            service,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(FeedSettings::default(), false).await
    }

    async fn create(fx: &Fixture, content: &str) -> Post {
        let post = fx
            .service
            .create_post("alice".into(), content.into(), None)
            .await
            .unwrap();
        // 作成時刻が確実にずれるようにする
        sleep(Duration::from_millis(2)).await;
        post
    }

    fn ids(page: &FeedPage) -> Vec<String> {
        page.data.iter().map(|p| p.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_create_post_grows_collection_with_unique_ids() {
        let fx = fixture().await;
        for i in 0..5 {
            create(&fx, &format!("post {i}")).await;
            assert_eq!(fx.store.read_all().await.unwrap().len(), i + 1);
        }

        let stored = fx.store.read_all().await.unwrap();
        let unique: HashSet<&str> = stored.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique.len(), 5);
    }

    #[tokio::test]
    async fn test_create_post_keeps_media_and_starts_without_engagement() {
        let fx = fixture().await;
        let post = fx
            .service
            .create_post(
                "alice".into(),
                "look".into(),
                Some(vec!["https://img/1.png".into(), "https://img/2.png".into()]),
            )
            .await
            .unwrap();

        let stored = fx.service.get_post(&post.id).await.unwrap();
        assert_eq!(stored, post);
        assert_eq!(stored.media.as_ref().map(Vec::len), Some(2));
        assert!(stored.likes.is_empty());
        assert!(stored.comments.is_empty());
        assert_eq!(stored.shares, 0);
    }

    #[tokio::test]
    async fn test_feed_scenario_two_pages() {
        let fx = fixture().await;
        let a = create(&fx, "A").await;
        let b = create(&fx, "B").await;
        let c = create(&fx, "C").await;

        let first = fx.service.get_feed(Some(2), None).await.unwrap();
        assert_eq!(ids(&first), vec![c.id.clone(), b.id.clone()]);
        let cursor = first.next_cursor.clone().expect("first page should continue");

        let second = fx.service.get_feed(Some(2), Some(&cursor)).await.unwrap();
        assert_eq!(ids(&second), vec![a.id]);
        assert_eq!(second.next_cursor, None);
    }

    #[tokio::test]
    async fn test_get_feed_on_empty_store() {
        let fx = fixture().await;
        let page = fx.service.get_feed(None, None).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_like_is_idempotent() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;

        fx.service.like_post(&post.id, "bob").await.unwrap();
        fx.service.like_post(&post.id, "bob").await.unwrap();

        let stored = fx.service.get_post(&post.id).await.unwrap();
        assert_eq!(stored.likes.iter().collect::<Vec<_>>(), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_unlike_of_non_liker_is_noop() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;
        fx.service.like_post(&post.id, "bob").await.unwrap();

        fx.service.unlike_post(&post.id, "carol").await.unwrap();
        assert_eq!(fx.service.get_post(&post.id).await.unwrap().like_count(), 1);

        fx.service.unlike_post(&post.id, "bob").await.unwrap();
        assert_eq!(fx.service.get_post(&post.id).await.unwrap().like_count(), 0);
    }

    #[tokio::test]
    async fn test_comment_always_appends() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;

        fx.service.comment_post(&post.id, "bob", "nice").await.unwrap();
        fx.service.comment_post(&post.id, "bob", "nice").await.unwrap();
        fx.service.comment_post(&post.id, "carol", "agreed").await.unwrap();

        let stored = fx.service.get_post(&post.id).await.unwrap();
        let authors: Vec<&str> = stored.comments.iter().map(|c| c.user_id.as_str()).collect();
        assert_eq!(authors, vec!["bob", "bob", "carol"]);
        assert_ne!(stored.comments[0].id, stored.comments[1].id);
    }

    #[tokio::test]
    async fn test_share_always_increments() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;

        fx.service.share_post(&post.id).await.unwrap();
        fx.service.share_post(&post.id).await.unwrap();

        assert_eq!(fx.service.get_post(&post.id).await.unwrap().shares, 2);
    }

    #[tokio::test]
    async fn test_mutations_on_unknown_post_fail_and_leave_store_unchanged() {
        let fx = fixture().await;
        create(&fx, "hello").await;
        let before = fx.store.read_all().await.unwrap();

        let results = vec![
            fx.service.like_post("missing", "bob").await,
            fx.service.unlike_post("missing", "bob").await,
            fx.service.comment_post("missing", "bob", "hi").await,
            fx.service.share_post("missing").await,
        ];
        for result in results {
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }
        assert!(matches!(
            fx.service.get_post("missing").await,
            Err(AppError::NotFound(_))
        ));

        assert_eq!(fx.store.read_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_feed_is_served_from_cache_until_invalidated() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;

        let first = fx.service.get_feed(Some(5), None).await.unwrap();
        assert_eq!(first.data.len(), 1);

        // キャッシュを経由せずストアだけを書き換える
        let mut posts = fx.store.read_all().await.unwrap();
        posts.push(Post::new_with_id(
            "zzz-direct".into(),
            "bob".into(),
            "direct".into(),
            None,
            post.created_at + 10,
        ));
        fx.store.write_all(posts).await.unwrap();

        let cached = fx.service.get_feed(Some(5), None).await.unwrap();
        assert_eq!(cached, first);

        fx.service.share_post(&post.id).await.unwrap();
        let fresh = fx.service.get_feed(Some(5), None).await.unwrap();
        assert_eq!(fresh.data.len(), 2);
        assert_eq!(fresh.data[0].id, "zzz-direct");
        assert_eq!(fresh.data[1].shares, 1);
    }

    #[tokio::test]
    async fn test_feed_reflects_each_mutation() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;
        fx.service.get_feed(None, None).await.unwrap();

        fx.service.like_post(&post.id, "bob").await.unwrap();
        let page = fx.service.get_feed(None, None).await.unwrap();
        assert!(page.data[0].likes.contains("bob"));

        fx.service.comment_post(&post.id, "bob", "hi").await.unwrap();
        let page = fx.service.get_feed(None, None).await.unwrap();
        assert_eq!(page.data[0].comments.len(), 1);

        fx.service.unlike_post(&post.id, "bob").await.unwrap();
        let page = fx.service.get_feed(None, None).await.unwrap();
        assert!(page.data[0].likes.is_empty());

        create(&fx, "second").await;
        let page = fx.service.get_feed(None, None).await.unwrap();
        assert_eq!(page.data.len(), 2);
    }

    #[tokio::test]
    async fn test_mutation_clears_feed_prefix_and_engagement_key_only() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;
        let other = create(&fx, "other").await;

        fx.cache
            .set(feed_cache_key(3, None), CachedValue::Feed(FeedPage::empty()))
            .await;
        fx.cache
            .set(
                feed_cache_key(3, Some("abc")),
                CachedValue::Feed(FeedPage::empty()),
            )
            .await;
        fx.cache
            .set(engagement_cache_key(&post.id), CachedValue::Post(post.clone()))
            .await;
        fx.cache
            .set(engagement_cache_key(&other.id), CachedValue::Post(other.clone()))
            .await;

        fx.service.like_post(&post.id, "bob").await.unwrap();

        assert_eq!(fx.cache.size().await, 1);
        assert!(
            fx.cache
                .get(&engagement_cache_key(&other.id))
                .await
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let fx = fixture().await;
        create(&fx, "hello").await;
        fx.service.get_feed(None, None).await.unwrap();
        assert_eq!(fx.cache.size().await, 1);

        let _ = fx.service.like_post("missing", "bob").await;
        assert_eq!(fx.cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_unexpected_cache_payload_is_treated_as_miss() {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;

        fx.cache
            .set(feed_cache_key(10, None), CachedValue::Post(post.clone()))
            .await;

        let page = fx.service.get_feed(None, None).await.unwrap();
        assert_eq!(ids(&page), vec![post.id]);
        assert!(matches!(
            fx.cache.get(&feed_cache_key(10, None)).await,
            Some(CachedValue::Feed(_))
        ));
    }

    #[tokio::test]
    async fn test_limit_resolution() {
        let settings = FeedSettings {
            default_limit: 2,
            max_limit: 3,
        };
        let fx = fixture_with(settings, false).await;
        for i in 0..5 {
            create(&fx, &format!("p{i}")).await;
        }

        assert_eq!(fx.service.get_feed(None, None).await.unwrap().data.len(), 2);
        assert_eq!(
            fx.service.get_feed(Some(1000), None).await.unwrap().data.len(),
            3
        );
        assert!(fx.cache.get(&feed_cache_key(3, None)).await.is_some());

        for bad in [0, -1, i64::MIN] {
            let err = fx.service.get_feed(Some(bad), None).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_rejected_and_not_cached() {
        let fx = fixture().await;
        create(&fx, "hello").await;

        let err = fx
            .service
            .get_feed(Some(2), Some("%%not-a-cursor%%"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedCursor(_)));
        assert_eq!(fx.cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let fx = fixture().await;
        tokio::fs::remove_file(fx.store.path()).await.unwrap();
        tokio::fs::create_dir(fx.store.path()).await.unwrap();

        let err = fx.service.get_feed(None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        let err = fx
            .service
            .create_post("alice".into(), "x".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_corrupt_store_propagates() {
        let fx = fixture().await;
        tokio::fs::write(fx.store.path(), b"[{\"broken\"")
            .await
            .unwrap();

        let err = fx.service.share_post("any").await.unwrap_err();
        assert!(matches!(err, AppError::CorruptData(_)));
    }

    #[tokio::test]
    async fn test_serialized_mutations_keep_every_concurrent_like() {
        let fx = fixture_with(FeedSettings::default(), true).await;
        assert!(fx.service.serializes_mutations());
        let post = create(&fx, "popular").await;

        let users: Vec<String> = (0..20).map(|i| format!("user-{i}")).collect();
        let likes = users.iter().map(|user| fx.service.like_post(&post.id, user));
        for result in futures::future::join_all(likes).await {
            result.unwrap();
        }

        let stored = fx.service.get_post(&post.id).await.unwrap();
        assert_eq!(stored.like_count(), 20);
    }

    #[tokio::test]
    async fn test_serialized_mutations_keep_every_concurrent_create() {
        let fx = fixture_with(FeedSettings::default(), true).await;

        let creates = (0..10).map(|i| {
            fx.service
                .create_post(format!("user-{i}"), format!("post {i}"), None)
        });
        for result in futures::future::join_all(creates).await {
            result.unwrap();
        }

        assert_eq!(fx.store.read_all().await.unwrap().len(), 10);
    }

    /// 書き込みに時間がかかるストア
    struct SlowWriteStore {
        inner: Arc<JsonFilePostStore>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl PostStore for SlowWriteStore {
        async fn read_all(&self) -> Result<Vec<Post>, AppError> {
            self.inner.read_all().await
        }

        async fn write_all(&self, posts: Vec<Post>) -> Result<(), AppError> {
            sleep(self.delay).await;
            self.inner.write_all(posts).await
        }
    }

    async fn abandoned_like_still_invalidates_feed(serialized: bool) {
        let fx = fixture().await;
        let post = create(&fx, "hello").await;
        let slow: Arc<dyn PostStore> = Arc::new(SlowWriteStore {
            inner: Arc::clone(&fx.store),
            delay: Duration::from_millis(50),
        });
        let mut service = PostService::new(slow, fx.cache.clone(), FeedSettings::default());
        if serialized {
            service = service.with_serialized_mutations();
        }

        let cached = service.get_feed(None, None).await.unwrap();
        assert!(cached.data[0].likes.is_empty());

        // 書き込み途中で呼び出し側が諦める
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), service.like_post(&post.id, "bob"))
                .await;
        assert!(abandoned.is_err());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stored = fx.store.read_all().await.unwrap();
            if stored[0].likes.contains("bob") {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "like never committed");
            sleep(Duration::from_millis(10)).await;
        }
        // 書き込み確定後の無効化を待つ
        sleep(Duration::from_millis(50)).await;

        let page = service.get_feed(None, None).await.unwrap();
        assert!(page.data[0].likes.contains("bob"));
    }

    #[tokio::test]
    async fn test_abandoned_mutation_still_invalidates_feed() {
        abandoned_like_still_invalidates_feed(false).await;
    }

    #[tokio::test]
    async fn test_abandoned_serialized_mutation_still_invalidates_feed() {
        abandoned_like_still_invalidates_feed(true).await;
    }
}
