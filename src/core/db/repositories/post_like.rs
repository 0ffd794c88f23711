//! Post like ledger for database operations
//!
//! Append-only: a like is recorded once per (post, user) pair and never
//! removed. The counter on posts is only bumped after a row lands here.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::PostLike;

/// Post like repository error types
#[derive(Debug, thiserror::Error)]
pub enum PostLikeRepositoryError {
    #[error("Post already liked by this user")]
    AlreadyLiked,

    #[error("Post not found")]
    PostNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Post like repository for database operations
#[derive(Clone)]
pub struct PostLikeRepository {
    pool: PgPool,
}

impl PostLikeRepository {
    /// Create a new post like repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a user has already liked a post
    pub async fn exists(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PostLikeRepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM post_likes
                WHERE post_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Record a like
    ///
    /// A concurrent duplicate trips the unique constraint and comes back
    /// as `AlreadyLiked`, so exactly one caller ever wins the insert.
    pub async fn insert(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<PostLike, PostLikeRepositoryError> {
        let like = sqlx::query_as::<_, PostLike>(
            r#"
            INSERT INTO post_likes (id, post_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PostLikeRepositoryError::AlreadyLiked
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                PostLikeRepositoryError::PostNotFound
            }
            _ => PostLikeRepositoryError::DatabaseError(e),
        })?;

        Ok(like)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::repositories::user::UserRepository;

    #[test]
    fn test_post_like_repository_error_display() {
        assert_eq!(
            format!("{}", PostLikeRepositoryError::AlreadyLiked),
            "Post already liked by this user"
        );
        assert_eq!(
            format!("{}", PostLikeRepositoryError::PostNotFound),
            "Post not found"
        );
    }

    // ========================================================================
    // Integration Tests (require database)
    // ========================================================================

    async fn create_test_pool() -> PgPool {
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_env().expect("DATABASE_URL must be set for tests");
        create_pool(&config)
            .await
            .expect("Failed to create test pool")
    }

    async fn setup_test_user(pool: &PgPool) -> Uuid {
        let repo = UserRepository::new(pool.clone());
        let username = format!("like_{}", &Uuid::new_v4().simple().to_string()[..8]);
        repo.create(&username, "Abc123!@").await.unwrap().id
    }

    async fn setup_test_post(pool: &PgPool, author_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO posts (id, title, author_id, content_html) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind("Liked post")
        .bind(author_id)
        .bind("<p>body</p>")
        .execute(pool)
        .await
        .unwrap();
        id
    }

    async fn cleanup(pool: &PgPool, post_id: Uuid, user_ids: &[Uuid]) {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(pool)
            .await
            .unwrap();
        let users = UserRepository::new(pool.clone());
        for &id in user_ids {
            users.delete(id).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_insert_and_exists() {
        let pool = create_test_pool().await;
        let repo = PostLikeRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;
        let post_id = setup_test_post(&pool, user_id).await;

        assert!(!repo.exists(post_id, user_id).await.unwrap());

        let like = repo.insert(post_id, user_id).await.unwrap();
        assert_eq!(like.post_id, post_id);
        assert_eq!(like.user_id, user_id);

        assert!(repo.exists(post_id, user_id).await.unwrap());

        cleanup(&pool, post_id, &[user_id]).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_second_insert_is_already_liked() {
        let pool = create_test_pool().await;
        let repo = PostLikeRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;
        let post_id = setup_test_post(&pool, user_id).await;

        repo.insert(post_id, user_id).await.unwrap();
        let result = repo.insert(post_id, user_id).await;
        assert!(matches!(result, Err(PostLikeRepositoryError::AlreadyLiked)));

        cleanup(&pool, post_id, &[user_id]).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_insert_on_missing_post() {
        let pool = create_test_pool().await;
        let repo = PostLikeRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let result = repo.insert(Uuid::new_v4(), user_id).await;
        assert!(matches!(result, Err(PostLikeRepositoryError::PostNotFound)));

        UserRepository::new(pool.clone())
            .delete(user_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_distinct_users_like_independently() {
        let pool = create_test_pool().await;
        let repo = PostLikeRepository::new(pool.clone());
        let alice = setup_test_user(&pool).await;
        let bob = setup_test_user(&pool).await;
        let post_id = setup_test_post(&pool, alice).await;

        repo.insert(post_id, alice).await.unwrap();
        repo.insert(post_id, bob).await.unwrap();

        assert!(repo.exists(post_id, alice).await.unwrap());
        assert!(repo.exists(post_id, bob).await.unwrap());

        cleanup(&pool, post_id, &[alice, bob]).await;
    }
}
