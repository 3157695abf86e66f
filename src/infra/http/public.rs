use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    application::{
        error::{AppError, HttpError},
        posts::{PostPreview, PostService, RenderedPost},
    },
    domain::{
        entities::{CategoryCount, NewPost, Post},
        types::FilterKind,
    },
    infra::db::PostgresPostStore,
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
    /// Present when posts live in Postgres.
    pub db: Option<Arc<PostgresPostStore>>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/posts", post(create_post))
        .route("/posts/{id}", get(post_detail))
        .route("/latest", get(latest))
        .route("/categories", get(category_counts))
        .route("/categories/{category}", get(category_index))
        .route("/tags", get(tag_counts))
        .route("/tags/{tag}", get(tag_index))
        .route("/authors/{email}", get(author_index))
        .route("/_health", get(health))
        .route("/_health/db", get(db_health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Serialize)]
struct IndexView {
    posts: Vec<PostPreview>,
    categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
struct FilteredView {
    filter: FilterKind,
    value: String,
    posts: Vec<PostPreview>,
}

async fn index(State(state): State<HttpState>) -> Result<Json<IndexView>, AppError> {
    let limit = state.posts.listing().preview_size;
    let posts = state.posts.get_listing(limit).await?;
    let categories = state.posts.get_category_counts().await?;
    Ok(Json(IndexView { posts, categories }))
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<Json<RenderedPost>, AppError> {
    Ok(Json(state.posts.get_post(&id).await?))
}

async fn latest(State(state): State<HttpState>) -> Result<Redirect, AppError> {
    let post = state.posts.get_latest().await?;
    Ok(Redirect::temporary(&format!("/posts/{}", post.id)))
}

async fn category_index(
    State(state): State<HttpState>,
    Path(category): Path<String>,
) -> Result<Json<FilteredView>, AppError> {
    filtered(&state, FilterKind::Category, category).await
}

async fn tag_index(
    State(state): State<HttpState>,
    Path(tag): Path<String>,
) -> Result<Json<FilteredView>, AppError> {
    filtered(&state, FilterKind::Tag, tag).await
}

async fn filtered(
    state: &HttpState,
    kind: FilterKind,
    value: String,
) -> Result<Json<FilteredView>, AppError> {
    let limit = state.posts.listing().filtered_preview_size;
    let posts = state.posts.get_filtered(kind, &value, limit).await?;
    Ok(Json(FilteredView {
        filter: kind,
        value,
        posts,
    }))
}

async fn category_counts(
    State(state): State<HttpState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    Ok(Json(state.posts.get_category_counts().await?))
}

async fn tag_counts(State(state): State<HttpState>) -> Result<Json<Vec<CategoryCount>>, AppError> {
    Ok(Json(state.posts.get_tag_counts().await?))
}

async fn author_index(
    State(state): State<HttpState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<PostPreview>>, AppError> {
    Ok(Json(state.posts.get_posts_by_author(&email).await?))
}

async fn create_post(
    State(state): State<HttpState>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), Response> {
    let Json(new_post) = payload.map_err(|rejection| {
        HttpError::from_error(
            "infra::http::public::create_post",
            rejection.status(),
            "Invalid post payload",
            &rejection,
        )
        .into_response()
    })?;

    let post = state
        .posts
        .create_post(new_post)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn db_health(State(state): State<HttpState>) -> Response {
    match state.db.as_ref() {
        Some(db) => db_health_response(db.health_check().await),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn fallback() -> AppError {
    AppError::NotFound
}
