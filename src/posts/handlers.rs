use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::AuthUser, repo::User},
    error::{ApiError, FieldError},
    posts::{
        dto::CreatePostRequest,
        repo::{self, Like, Post},
    },
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post).get(list_posts))
        .route("/posts/:id", get(get_post).delete(delete_post))
}

pub fn like_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/like/:id", put(like_post))
        .route("/posts/unlike/:id", put(unlike_post))
}

/// Looks up a post, folding a malformed id into the absent case.
async fn find_post(state: &AppState, id: &str) -> Result<Post, ApiError> {
    let Ok(id) = id.parse::<Uuid>() else {
        return Err(ApiError::NotFound("Post not found"));
    };
    Post::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::Validation(vec![FieldError::field(
            "text",
            "Text is required",
        )]));
    }

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Auth("User not found".into()))?;

    let post = Post::create(&state.db, user_id, &payload.text, &user.name, &user.avatar).await?;
    info!(user_id = %user_id, post_id = %post.id, "post created");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = Post::list(&state.db).await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = find_post(&state, &id).await?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post = find_post(&state, &id).await?;

    if post.user_id != user_id {
        warn!(user_id = %user_id, post_id = %post.id, "delete attempt by non-author");
        return Err(ApiError::Forbidden("User not authorized"));
    }

    Post::delete(&state.db, post.id).await?;
    info!(user_id = %user_id, post_id = %post.id, "post deleted");
    Ok(Json(json!({ "msg": "Post removed" })))
}

#[instrument(skip(state))]
pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post = find_post(&state, &id).await?;

    let mut likes = post.likes.0;
    if repo::has_liked(&likes, user_id) {
        return Err(ApiError::BadRequest("Post already liked"));
    }

    repo::add_like(&mut likes, user_id);
    Post::save_likes(&state.db, post.id, &likes).await?;
    Ok(Json(likes))
}

#[instrument(skip(state))]
pub async fn unlike_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post = find_post(&state, &id).await?;

    let mut likes = post.likes.0;
    if !repo::has_liked(&likes, user_id) {
        return Err(ApiError::BadRequest("Post has not been liked"));
    }

    repo::remove_like(&mut likes, user_id);
    Post::save_likes(&state.db, post.id, &likes).await?;
    Ok(Json(likes))
}
