//! Comment API endpoints
//!
//! Provides REST API endpoints for comments and comment votes:
//! - GET /api/comments?post_id=... - List a post's comments
//! - POST /api/comments - Create or replace own comment (auth required)
//! - PATCH /api/comments - Cast or switch a vote (auth required)
//! - DELETE /api/comments - Delete own comment (auth required)

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::service::RequestIdentity;
use crate::core::comments::service::{CommentError, CommentService, CommentUpsert};
use crate::core::db::models::{Comment, VoteDirection, VoteTally};

/// Comment API state containing the comment service
#[derive(Clone)]
pub struct CommentsApiState {
    pub comment_service: CommentService,
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

impl IntoResponse for CommentError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            CommentError::NotFound => (StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND"),
            CommentError::PostNotFound => (StatusCode::NOT_FOUND, "POST_NOT_FOUND"),
            CommentError::NotOwner => (StatusCode::FORBIDDEN, "NOT_OWNER"),
            CommentError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CommentError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Query parameters for listing comments
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub post_id: Uuid,
}

/// Request for creating or replacing the caller's comment
#[derive(Debug, Deserialize)]
pub struct UpsertCommentRequest {
    pub post_id: Uuid,
    pub content: String,
}

/// Request for casting a vote on a comment
///
/// `vote` only deserializes from "up" or "down"; anything else is
/// rejected before the handler runs.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub id: Uuid,
    pub vote: VoteDirection,
}

/// Request for deleting the caller's comment
#[derive(Debug, Deserialize)]
pub struct DeleteCommentRequest {
    pub id: Uuid,
}

/// Response for delete operation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Router
// ============================================================================

/// Create the comment API router
pub fn comments_api_router(state: CommentsApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/comments", get(list_comments_handler))
        .route("/api/comments", post(upsert_comment_handler))
        .route("/api/comments", patch(cast_vote_handler))
        .route("/api/comments", delete(delete_comment_handler))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/comments?post_id=...
/// List a post's comments, best score first (no auth required)
async fn list_comments_handler(
    State(state): State<Arc<CommentsApiState>>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<Vec<Comment>>, CommentError> {
    tracing::debug!("Listing comments for post {}", query.post_id);

    let comments = state.comment_service.list_for_post(query.post_id).await?;

    Ok(Json(comments))
}

/// POST /api/comments
/// Create the caller's comment on a post, or replace it if one exists
async fn upsert_comment_handler(
    State(state): State<Arc<CommentsApiState>>,
    identity: RequestIdentity,
    Json(request): Json<UpsertCommentRequest>,
) -> Result<(StatusCode, Json<CommentUpsert>), CommentError> {
    tracing::info!(
        "Upserting comment on post {} by user {}",
        request.post_id,
        identity.user.id
    );

    let upsert = state
        .comment_service
        .upsert_comment(&identity, request.post_id, &request.content)
        .await?;

    let status = if upsert.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(upsert)))
}

/// PATCH /api/comments
/// Cast, switch, or re-affirm the caller's vote on a comment
async fn cast_vote_handler(
    State(state): State<Arc<CommentsApiState>>,
    identity: RequestIdentity,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<VoteTally>, CommentError> {
    tracing::info!(
        "Vote {:?} on comment {} by user {}",
        request.vote,
        request.id,
        identity.user.id
    );

    let tally = state
        .comment_service
        .cast_vote(&identity, request.id, request.vote)
        .await?;

    Ok(Json(tally))
}

/// DELETE /api/comments
/// Delete the caller's own comment
async fn delete_comment_handler(
    State(state): State<Arc<CommentsApiState>>,
    identity: RequestIdentity,
    Json(request): Json<DeleteCommentRequest>,
) -> Result<Json<DeleteResponse>, CommentError> {
    tracing::info!("Deleting comment {} by user {}", request.id, identity.user.id);

    state
        .comment_service
        .delete_comment(&identity, request.id)
        .await?;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: request.id,
    }))
}

// ============================================================================
// Tests
// ============================================================================
