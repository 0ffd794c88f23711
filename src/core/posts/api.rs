//! Post API endpoints
//!
//! Provides REST API endpoints for the post surface:
//! - GET /api/posts - List all posts
//! - PATCH /api/posts - Like a post, or edit it as admin (auth required)
//! - DELETE /api/posts - Delete a post (admin only)
//!
//! PATCH carries either `"like": true` or a `"fields"` object, never
//! both. The request is classified into exactly one action up front;
//! shapes that fit neither are rejected with a 400.

use axum::{
    Json, Router,
    http::StatusCode,
    extract::State,
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::service::RequestIdentity;
use crate::core::db::models::{Post, UpdatePost};
use crate::core::posts::service::{PostError, PostService};

/// Post API state containing the post service
#[derive(Clone)]
pub struct PostsApiState {
    pub post_service: PostService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            PostError::NotFound => (StatusCode::NOT_FOUND, "POST_NOT_FOUND"),
            PostError::AdminRequired => (StatusCode::FORBIDDEN, "ADMIN_REQUIRED"),
            PostError::SlugAlreadyExists => (StatusCode::CONFLICT, "SLUG_EXISTS"),
            PostError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            PostError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request for the PATCH endpoint
#[derive(Debug, Deserialize)]
pub struct PatchPostRequest {
    pub id: Uuid,
    #[serde(default)]
    pub like: Option<bool>,
    #[serde(default)]
    pub fields: Option<UpdatePost>,
}

/// Request for deleting a post
#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    pub id: Uuid,
}

/// Response for delete operation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// The single action a PATCH request resolves to
#[derive(Debug)]
enum PatchAction {
    Like(Uuid),
    Edit(Uuid, UpdatePost),
}

fn classify_patch(request: PatchPostRequest) -> Result<PatchAction, PostError> {
    match (request.like, request.fields) {
        (Some(true), None) => Ok(PatchAction::Like(request.id)),
        (None, Some(fields)) => Ok(PatchAction::Edit(request.id, fields)),
        _ => Err(PostError::InvalidRequest(
            "send either \"like\": true or a \"fields\" object".to_string(),
        )),
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the post API router
pub fn posts_api_router(state: PostsApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/posts", get(list_posts_handler))
        .route("/api/posts", patch(patch_post_handler))
        .route("/api/posts", delete(delete_post_handler))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/posts
/// List all posts (no auth required)
async fn list_posts_handler(
    State(state): State<Arc<PostsApiState>>,
) -> Result<Json<Vec<Post>>, PostError> {
    tracing::debug!("Listing posts");

    let posts = state.post_service.list_posts().await?;

    Ok(Json(posts))
}

/// PATCH /api/posts
/// Like a post, or edit its fields as admin
async fn patch_post_handler(
    State(state): State<Arc<PostsApiState>>,
    identity: RequestIdentity,
    Json(request): Json<PatchPostRequest>,
) -> Result<Response, PostError> {
    match classify_patch(request)? {
        PatchAction::Like(post_id) => {
            tracing::info!("Like on post {} by user {}", post_id, identity.user.id);

            let outcome = state.post_service.like_post(&identity, post_id).await?;

            Ok(Json(outcome).into_response())
        }
        PatchAction::Edit(post_id, fields) => {
            tracing::info!("Admin edit of post {} by user {}", post_id, identity.user.id);

            let post = state
                .post_service
                .admin_update_post(&identity, post_id, &fields)
                .await?;

            Ok(Json(post).into_response())
        }
    }
}

/// DELETE /api/posts
/// Delete a post (admin only)
async fn delete_post_handler(
    State(state): State<Arc<PostsApiState>>,
    identity: RequestIdentity,
    Json(request): Json<DeletePostRequest>,
) -> Result<Json<DeleteResponse>, PostError> {
    tracing::info!("Deleting post {} by user {}", request.id, identity.user.id);

    state
        .post_service
        .admin_delete_post(&identity, request.id)
        .await?;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: request.id,
    }))
}

// ============================================================================
// Tests
// ============================================================================
