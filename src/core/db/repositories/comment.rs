//! Comment repository for database operations
//!
//! Each user has at most one comment per post; the write path is an
//! upsert keyed on (post_id, user_id). Deletion is scoped to the owner
//! in the SQL itself so ownership never depends on a separate read.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::Comment;

/// Comment repository error types
#[derive(Debug, thiserror::Error)]
pub enum CommentRepositoryError {
    #[error("Comment not found")]
    NotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Comment repository for database operations
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a comment by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, CommentRepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, date_created, upvotes, downvotes
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Find the comment a user left on a post, if any
    pub async fn find_by_post_and_user(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, date_created, upvotes, downvotes
            FROM comments
            WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// List a post's comments ordered by net score, best first
    pub async fn list_for_post(
        &self,
        post_id: Uuid,
    ) -> Result<Vec<Comment>, CommentRepositoryError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, date_created, upvotes, downvotes
            FROM comments
            WHERE post_id = $1
            ORDER BY (upvotes - downvotes) DESC, date_created DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Insert a fresh comment with zero tallies
    pub async fn insert(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, CommentRepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, content, date_created, upvotes, downvotes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                CommentRepositoryError::PostNotFound
            }
            _ => CommentRepositoryError::DatabaseError(e),
        })?;

        Ok(comment)
    }

    /// Replace a comment's content and refresh its timestamp
    pub async fn update_content(
        &self,
        id: Uuid,
        content: &str,
    ) -> Result<Comment, CommentRepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, date_created = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, content, date_created, upvotes, downvotes
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        comment.ok_or(CommentRepositoryError::NotFound)
    }

    /// Overwrite the cached tallies with counts derived from the ledger
    pub async fn set_vote_counts(
        &self,
        id: Uuid,
        upvotes: i64,
        downvotes: i64,
    ) -> Result<(), CommentRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE comments
            SET upvotes = $2, downvotes = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(upvotes)
        .bind(downvotes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CommentRepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a comment only if the given user owns it
    ///
    /// Returns false both for a missing comment and for someone else's
    /// comment; callers treat either as an authorization failure.
    pub async fn delete_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, CommentRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
