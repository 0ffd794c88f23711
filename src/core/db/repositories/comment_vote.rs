//! Comment vote ledger for database operations
//!
//! One row per (comment, user) pair, enforced by a unique constraint.
//! The cached tallies on comments are always recomputed from this
//! ledger, never adjusted incrementally.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CommentVote, VoteDirection, VoteTally};

/// Comment vote repository error types
#[derive(Debug, thiserror::Error)]
pub enum CommentVoteRepositoryError {
    #[error("Vote already recorded for this comment")]
    DuplicateVote,

    #[error("Vote not found")]
    NotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Comment vote repository for database operations
#[derive(Clone)]
pub struct CommentVoteRepository {
    pool: PgPool,
}

impl CommentVoteRepository {
    /// Create a new comment vote repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's vote on a comment, if any
    pub async fn find_by_comment_and_user(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CommentVote>, CommentVoteRepositoryError> {
        let vote = sqlx::query_as::<_, CommentVote>(
            r#"
            SELECT id, comment_id, user_id, direction
            FROM comment_votes
            WHERE comment_id = $1 AND user_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote)
    }

    /// Record a first vote on a comment
    ///
    /// A concurrent duplicate trips the unique constraint and comes back
    /// as `DuplicateVote`; callers re-read the ledger and continue as if
    /// the existing vote had been found in the first place.
    pub async fn insert(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        direction: VoteDirection,
    ) -> Result<CommentVote, CommentVoteRepositoryError> {
        let vote = sqlx::query_as::<_, CommentVote>(
            r#"
            INSERT INTO comment_votes (id, comment_id, user_id, direction)
            VALUES ($1, $2, $3, $4)
            RETURNING id, comment_id, user_id, direction
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(comment_id)
        .bind(user_id)
        .bind(direction)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CommentVoteRepositoryError::DuplicateVote
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                CommentVoteRepositoryError::CommentNotFound
            }
            _ => CommentVoteRepositoryError::DatabaseError(e),
        })?;

        Ok(vote)
    }

    /// Flip an existing vote to the given direction
    pub async fn set_direction(
        &self,
        vote_id: Uuid,
        direction: VoteDirection,
    ) -> Result<CommentVote, CommentVoteRepositoryError> {
        let vote = sqlx::query_as::<_, CommentVote>(
            r#"
            UPDATE comment_votes
            SET direction = $2
            WHERE id = $1
            RETURNING id, comment_id, user_id, direction
            "#,
        )
        .bind(vote_id)
        .bind(direction)
        .fetch_optional(&self.pool)
        .await?;

        vote.ok_or(CommentVoteRepositoryError::NotFound)
    }

    /// Count a comment's votes straight from the ledger
    pub async fn tally(&self, comment_id: Uuid) -> Result<VoteTally, CommentVoteRepositoryError> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE direction = 'up') AS upvotes,
                COUNT(*) FILTER (WHERE direction = 'down') AS downvotes
            FROM comment_votes
            WHERE comment_id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(tally)
    }
}
