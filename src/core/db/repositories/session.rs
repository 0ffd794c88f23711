//! Session repository for database operations
//!
//! Stores sessions keyed by the SHA-256 hash of the client token, so the
//! table never contains anything that can be replayed as a credential.
//! Expiry checks and the renewal decision live in the auth service; this
//! layer only does keyed reads and writes.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::auth::token::session_id_from_token;
use crate::core::db::models::Session;

/// Fixed session lifetime
pub const SESSION_LIFETIME_DAYS: i64 = 30;

/// Remaining lifetime below which validation renews the session
pub const RENEWAL_THRESHOLD_DAYS: i64 = SESSION_LIFETIME_DAYS / 2;

/// Session repository error types
#[derive(Debug, thiserror::Error)]
pub enum SessionRepositoryError {
    #[error("Session not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a session for a user from a freshly generated raw token
    ///
    /// The row id is derived from the token; the raw token itself is
    /// never stored.
    pub async fn create(
        &self,
        user_id: Uuid,
        raw_token: &str,
    ) -> Result<Session, SessionRepositoryError> {
        let id = session_id_from_token(raw_token);
        let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find a session by its derived identifier
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>, SessionRepositoryError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find a session by raw token (the identifier is derived for lookup)
    pub async fn find_by_token(
        &self,
        raw_token: &str,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        let id = session_id_from_token(raw_token);
        self.find_by_id(&id).await
    }

    /// Reset a session's expiry to a full lifetime from now
    pub async fn renew(&self, id: &str) -> Result<Session, SessionRepositoryError> {
        let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET expires_at = $2
            WHERE id = $1
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(id)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await?;

        session.ok_or(SessionRepositoryError::NotFound)
    }

    /// Delete a session by its derived identifier
    ///
    /// Idempotent; the return value reports whether a row was actually
    /// removed, and deleting an absent session is not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user (used when their password changes)
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clean up expired sessions (should be run periodically)
    pub async fn cleanup_expired(&self) -> Result<u64, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::token::generate_session_token;
    use crate::core::db::repositories::user::UserRepository;

    // ========================================================================
    // Constant Tests
    // ========================================================================

    #[test]
    fn test_renewal_threshold_is_half_the_lifetime() {
        assert_eq!(RENEWAL_THRESHOLD_DAYS * 2, SESSION_LIFETIME_DAYS);
    }

    #[test]
    fn test_session_repository_error_display() {
        let err = SessionRepositoryError::NotFound;
        assert_eq!(format!("{}", err), "Session not found");
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
        let username = format!("sess_{}", &Uuid::new_v4().simple().to_string()[..8]);
        repo.create(&username, "Abc123!@").await.unwrap().id
    }

    async fn cleanup_test_user(pool: &PgPool, user_id: Uuid) {
        // Cascades to this user's sessions
        UserRepository::new(pool.clone())
            .delete(user_id)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_create_session_derives_id_and_full_lifetime() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let token = generate_session_token();
        let session = repo.create(user_id, &token).await.unwrap();

        assert_eq!(session.id, session_id_from_token(&token));
        assert_eq!(session.user_id, user_id);

        let remaining = session.expires_at - Utc::now();
        assert!(remaining > Duration::days(SESSION_LIFETIME_DAYS - 1));
        assert!(remaining <= Duration::days(SESSION_LIFETIME_DAYS));

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_by_token() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let token = generate_session_token();
        let created = repo.create(user_id, &token).await.unwrap();

        let found = repo.find_by_token(&token).await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(created.id));

        let missing = repo.find_by_token(&generate_session_token()).await.unwrap();
        assert!(missing.is_none());

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_renew_resets_expiry_to_full_lifetime() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let token = generate_session_token();
        let session = repo.create(user_id, &token).await.unwrap();

        // Age the session down to two days of remaining lifetime
        sqlx::query("UPDATE sessions SET expires_at = NOW() + INTERVAL '2 days' WHERE id = $1")
            .bind(&session.id)
            .execute(&pool)
            .await
            .unwrap();

        let renewed = repo.renew(&session.id).await.unwrap();
        let remaining = renewed.expires_at - Utc::now();
        assert!(remaining > Duration::days(SESSION_LIFETIME_DAYS - 1));

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_renew_missing_session() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());

        let result = repo.renew(&session_id_from_token("no_such_token")).await;
        assert!(matches!(result, Err(SessionRepositoryError::NotFound)));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_delete_is_idempotent() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let token = generate_session_token();
        let session = repo.create(user_id, &token).await.unwrap();

        assert!(repo.delete(&session.id).await.unwrap());
        // Second delete finds nothing and still succeeds
        assert!(!repo.delete(&session.id).await.unwrap());

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_delete_all_for_user() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        repo.create(user_id, &generate_session_token())
            .await
            .unwrap();
        repo.create(user_id, &generate_session_token())
            .await
            .unwrap();

        let deleted = repo.delete_all_for_user(user_id).await.unwrap();
        assert_eq!(deleted, 2);

        cleanup_test_user(&pool, user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_cleanup_expired() {
        let pool = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());
        let user_id = setup_test_user(&pool).await;

        let token = generate_session_token();
        let session = repo.create(user_id, &token).await.unwrap();

        sqlx::query("UPDATE sessions SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
            .bind(&session.id)
            .execute(&pool)
            .await
            .unwrap();

        let removed = repo.cleanup_expired().await.unwrap();
        assert!(removed >= 1);

        let found = repo.find_by_id(&session.id).await.unwrap();
        assert!(found.is_none());

        cleanup_test_user(&pool, user_id).await;
    }
}
