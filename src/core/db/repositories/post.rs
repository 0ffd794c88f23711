//! Post repository for database operations
//!
//! Posts are written by admins; the only mutation regular users can cause
//! is the like counter increment, which has its own dedicated method here
//! so the general update path can never touch it.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{Post, UpdatePost};

/// Post repository error types
#[derive(Debug, thiserror::Error)]
pub enum PostRepositoryError {
    #[error("Post not found")]
    NotFound,

    #[error("Slug already exists")]
    SlugAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

const POST_COLUMNS: &str = "id, title, subtitle, author_id, content_html, date_published, \
     last_modified, likes, slug, view_state, cover_image_url, summary, tags, view_count";

/// Post repository for database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a post by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PostRepositoryError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// List all posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>, PostRepositoryError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY date_published DESC NULLS LAST"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Apply an admin edit and refresh last_modified
    ///
    /// The update statement has no likes or view_count assignment; those
    /// counters are not reachable from this path.
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdatePost,
    ) -> Result<Post, PostRepositoryError> {
        let has_changes = updates.title.is_some()
            || updates.subtitle.is_some()
            || updates.content_html.is_some()
            || updates.date_published.is_some()
            || updates.slug.is_some()
            || updates.view_state.is_some()
            || updates.cover_image_url.is_some()
            || updates.summary.is_some()
            || updates.tags.is_some();

        if !has_changes {
            // Nothing to write, don't bump last_modified
            return self
                .find_by_id(id)
                .await?
                .ok_or(PostRepositoryError::NotFound);
        }

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                subtitle = CASE WHEN $3::boolean THEN $4 ELSE subtitle END,
                content_html = COALESCE($5, content_html),
                date_published = CASE WHEN $6::boolean THEN $7 ELSE date_published END,
                slug = CASE WHEN $8::boolean THEN $9 ELSE slug END,
                view_state = COALESCE($10, view_state),
                cover_image_url = CASE WHEN $11::boolean THEN $12 ELSE cover_image_url END,
                summary = CASE WHEN $13::boolean THEN $14 ELSE summary END,
                tags = CASE WHEN $15::boolean THEN $16 ELSE tags END,
                last_modified = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&updates.title)
        .bind(updates.subtitle.is_some())
        .bind(updates.subtitle.as_ref().and_then(|s| s.as_ref()))
        .bind(&updates.content_html)
        .bind(updates.date_published.is_some())
        .bind(updates.date_published.flatten())
        .bind(updates.slug.is_some())
        .bind(updates.slug.as_ref().and_then(|s| s.as_ref()))
        .bind(&updates.view_state)
        .bind(updates.cover_image_url.is_some())
        .bind(updates.cover_image_url.as_ref().and_then(|s| s.as_ref()))
        .bind(updates.summary.is_some())
        .bind(updates.summary.as_ref().and_then(|s| s.as_ref()))
        .bind(updates.tags.is_some())
        .bind(updates.tags.as_ref().and_then(|s| s.as_ref()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PostRepositoryError::SlugAlreadyExists
            }
            _ => PostRepositoryError::DatabaseError(e),
        })?
        .ok_or(PostRepositoryError::NotFound)?;

        Ok(post)
    }

    /// Increment the cached like counter by exactly one
    pub async fn increment_likes(&self, id: Uuid) -> Result<(), PostRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET likes = likes + 1
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PostRepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a post by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool, PostRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
