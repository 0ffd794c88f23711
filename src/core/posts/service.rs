//! Post service
//!
//! Business logic for the post surface this server exposes: the public
//! listing, the one-shot per-user like, and admin-only editing and
//! deletion. There is no unlike; a like row is permanent.

use uuid::Uuid;

use crate::core::auth::service::RequestIdentity;
use crate::core::db::models::{Post, UpdatePost};
use crate::core::db::repositories::{
    PostLikeRepository, PostLikeRepositoryError, PostRepository, PostRepositoryError,
};

/// Post service error types
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Administrator access required")]
    AdminRequired,

    #[error("Slug already exists")]
    SlugAlreadyExists,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<PostRepositoryError> for PostError {
    fn from(err: PostRepositoryError) -> Self {
        match err {
            PostRepositoryError::NotFound => PostError::NotFound,
            PostRepositoryError::SlugAlreadyExists => PostError::SlugAlreadyExists,
            PostRepositoryError::DatabaseError(e) => PostError::InternalError(e.to_string()),
        }
    }
}

impl From<PostLikeRepositoryError> for PostError {
    fn from(err: PostLikeRepositoryError) -> Self {
        match err {
            PostLikeRepositoryError::PostNotFound => PostError::NotFound,
            // AlreadyLiked is absorbed by like_post; reaching here is a bug
            err => PostError::InternalError(err.to_string()),
        }
    }
}

/// Outcome of a like attempt
///
/// `liked: false` means the like already existed. That is a routine
/// answer, not an error.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LikeOutcome {
    pub liked: bool,
}

/// Post service
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    like_repo: PostLikeRepository,
}

impl PostService {
    /// Create a new post service
    pub fn new(post_repo: PostRepository, like_repo: PostLikeRepository) -> Self {
        Self {
            post_repo,
            like_repo,
        }
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>, PostError> {
        Ok(self.post_repo.list().await?)
    }

    /// Record the caller's like of a post, at most once ever
    ///
    /// The counter is incremented only after the like row is confirmed
    /// inserted. When two requests race, the unique index lets exactly
    /// one insert through, so the counter moves by exactly one no matter
    /// how the calls interleave.
    pub async fn like_post(
        &self,
        identity: &RequestIdentity,
        post_id: Uuid,
    ) -> Result<LikeOutcome, PostError> {
        if self.like_repo.exists(post_id, identity.user.id).await? {
            return Ok(LikeOutcome { liked: false });
        }

        match self.like_repo.insert(post_id, identity.user.id).await {
            Ok(_) => {}
            // Lost a same-instant race; the winner incremented the counter
            Err(PostLikeRepositoryError::AlreadyLiked) => {
                return Ok(LikeOutcome { liked: false });
            }
            Err(e) => return Err(e.into()),
        }

        self.post_repo.increment_likes(post_id).await?;

        Ok(LikeOutcome { liked: true })
    }

    /// Apply an admin edit to a post
    pub async fn admin_update_post(
        &self,
        identity: &RequestIdentity,
        post_id: Uuid,
        updates: &UpdatePost,
    ) -> Result<Post, PostError> {
        if !identity.user.is_admin() {
            return Err(PostError::AdminRequired);
        }

        Ok(self.post_repo.update(post_id, updates).await?)
    }

    /// Delete a post, admin only
    pub async fn admin_delete_post(
        &self,
        identity: &RequestIdentity,
        post_id: Uuid,
    ) -> Result<(), PostError> {
        if !identity.user.is_admin() {
            return Err(PostError::AdminRequired);
        }

        let deleted = self.post_repo.delete(post_id).await?;
        if !deleted {
            return Err(PostError::NotFound);
        }

        Ok(())
    }
}
