use crate::domain::entities::{FeedPage, Post};
use crate::presentation::dto::post_dto::{
    CommentPostRequest, CreatePostRequest, EngagementRequest, FeedQuery,
};
use crate::presentation::error::ApiResult;
use crate::presentation::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state
        .post_service
        .create_post(request.user_id, request.content, request.media)
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> ApiResult<Json<FeedPage>> {
    let page = state
        .post_service
        .get_feed(query.limit, query.cursor.as_deref())
        .await?;
    Ok(Json(page))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Post>> {
    let post = state.post_service.get_post(&post_id).await?;
    Ok(Json(post))
}

pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(request): ApiJson<EngagementRequest>,
) -> ApiResult<StatusCode> {
    state
        .post_service
        .like_post(&post_id, &request.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(request): ApiJson<EngagementRequest>,
) -> ApiResult<StatusCode> {
    state
        .post_service
        .unlike_post(&post_id, &request.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn comment_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(request): ApiJson<CommentPostRequest>,
) -> ApiResult<StatusCode> {
    state
        .post_service
        .comment_post(&post_id, &request.user_id, &request.content)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.post_service.share_post(&post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
