#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use post_feed::presentation::build_router;
use post_feed::shared::AppConfig;
use post_feed::state::AppState;
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with<F>(configure: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let dir = TempDir::new().expect("tempdir");
        let mut config = AppConfig::default();
        config.storage.data_path = dir.path().join("data").join("posts.json");
        configure(&mut config);
        config.validate().expect("valid test config");

        let state = AppState::new(&config).await.expect("app state");
        let router = build_router(state, Duration::from_secs(5));
        Self {
            dir,
            router,
            config,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn create_post(&self, user_id: &str, content: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/posts",
                Some(serde_json::json!({ "userId": user_id, "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        // 作成時刻をずらしてフィード順を確定させる
        tokio::time::sleep(Duration::from_millis(2)).await;
        body
    }

    pub async fn feed(&self, query: &str) -> (StatusCode, Value) {
        self.send(Method::GET, &format!("/v1/posts{query}"), None).await
    }
}

pub fn ids(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
