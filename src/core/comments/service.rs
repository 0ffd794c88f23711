//! Comment service
//!
//! Business logic for comments and comment votes: the one comment per
//! user per post upsert, owner-scoped deletion, and the vote ledger
//! with recomputed tallies.

use uuid::Uuid;

use crate::core::auth::service::RequestIdentity;
use crate::core::db::models::{Comment, VoteDirection, VoteTally};
use crate::core::db::repositories::{
    CommentRepository, CommentRepositoryError, CommentVoteRepository, CommentVoteRepositoryError,
};
use crate::core::validation::{self, ValidationError};

/// Comment service error types
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Comment not found")]
    NotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("You do not have permission to modify this comment")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<CommentRepositoryError> for CommentError {
    fn from(err: CommentRepositoryError) -> Self {
        match err {
            CommentRepositoryError::NotFound => CommentError::NotFound,
            CommentRepositoryError::PostNotFound => CommentError::PostNotFound,
            _ => CommentError::InternalError(err.to_string()),
        }
    }
}

impl From<CommentVoteRepositoryError> for CommentError {
    fn from(err: CommentVoteRepositoryError) -> Self {
        match err {
            CommentVoteRepositoryError::NotFound
            | CommentVoteRepositoryError::CommentNotFound => CommentError::NotFound,
            err => CommentError::InternalError(err.to_string()),
        }
    }
}

/// Result of upserting a comment
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommentUpsert {
    pub comment: Comment,
    pub created: bool,
}

/// Comment service
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    vote_repo: CommentVoteRepository,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(comment_repo: CommentRepository, vote_repo: CommentVoteRepository) -> Self {
        Self {
            comment_repo,
            vote_repo,
        }
    }

    /// List a post's comments ordered by net score, best first
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, CommentError> {
        Ok(self.comment_repo.list_for_post(post_id).await?)
    }

    /// Create or replace the caller's comment on a post
    ///
    /// Each user holds at most one comment per post. An existing comment
    /// gets its content overwritten and its timestamp refreshed; votes
    /// already cast on it survive the edit.
    pub async fn upsert_comment(
        &self,
        identity: &RequestIdentity,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentUpsert, CommentError> {
        validation::validate_comment_content(content)?;

        let existing = self
            .comment_repo
            .find_by_post_and_user(post_id, identity.user.id)
            .await?;

        match existing {
            Some(comment) => {
                let comment = self
                    .comment_repo
                    .update_content(comment.id, content)
                    .await?;
                Ok(CommentUpsert {
                    comment,
                    created: false,
                })
            }
            None => {
                let comment = self
                    .comment_repo
                    .insert(post_id, identity.user.id, content)
                    .await?;
                Ok(CommentUpsert {
                    comment,
                    created: true,
                })
            }
        }
    }

    /// Delete the caller's own comment
    ///
    /// The ownership check is the `user_id` predicate of the delete
    /// itself. A missing comment and someone else's comment both come
    /// back as `NotOwner`, so the response reveals nothing about which
    /// it was.
    pub async fn delete_comment(
        &self,
        identity: &RequestIdentity,
        comment_id: Uuid,
    ) -> Result<(), CommentError> {
        let deleted = self
            .comment_repo
            .delete_owned(comment_id, identity.user.id)
            .await?;

        if !deleted {
            return Err(CommentError::NotOwner);
        }

        Ok(())
    }

    /// Cast, flip, or re-affirm the caller's vote on a comment
    ///
    /// One ledger row per (comment, user): a first vote inserts it, a
    /// different direction flips it in place, the same direction is a
    /// no-op. Every branch ends by recomputing the cached tallies from
    /// the full ledger, so a repeated vote can never double-count and a
    /// previously stale counter heals itself.
    pub async fn cast_vote(
        &self,
        identity: &RequestIdentity,
        comment_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteTally, CommentError> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or(CommentError::NotFound)?;

        let existing = self
            .vote_repo
            .find_by_comment_and_user(comment_id, identity.user.id)
            .await?;

        match existing {
            None => {
                match self
                    .vote_repo
                    .insert(comment_id, identity.user.id, direction)
                    .await
                {
                    Ok(_) => {}
                    // Lost a same-instant race; fall through to the
                    // existing-row handling against the winner's row
                    Err(CommentVoteRepositoryError::DuplicateVote) => {
                        let vote = self
                            .vote_repo
                            .find_by_comment_and_user(comment_id, identity.user.id)
                            .await?;
                        if let Some(vote) = vote
                            && vote.direction != direction
                        {
                            self.vote_repo.set_direction(vote.id, direction).await?;
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Some(vote) if vote.direction != direction => {
                self.vote_repo.set_direction(vote.id, direction).await?;
            }
            // Same direction again: idempotent no-op
            Some(_) => {}
        }

        self.recompute_tally(comment.id).await
    }

    /// Overwrite a comment's cached counters with the ledger tally
    async fn recompute_tally(&self, comment_id: Uuid) -> Result<VoteTally, CommentError> {
        let tally = self.vote_repo.tally(comment_id).await?;
        self.comment_repo
            .set_vote_counts(comment_id, tally.upvotes, tally.downvotes)
            .await?;

        Ok(tally)
    }
}
