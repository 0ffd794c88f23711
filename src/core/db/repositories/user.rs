//! User repository for database operations
//!
//! Provides account storage with secure password hashing using bcrypt.
//! Accounts created through an external identity provider carry no
//! password hash at all.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{Role, User};

/// Cost factor for bcrypt hashing (12 is recommended for production)
const BCRYPT_COST: u32 = 12;

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("User not found")]
    NotFound,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a password using bcrypt with automatic salt generation
    pub fn hash_password(password: &str) -> Result<String, UserRepositoryError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Hash a password with a caller-supplied salt
    ///
    /// Deterministic for a fixed (password, salt) pair, which is what makes
    /// it usable in tests; production paths use [`Self::hash_password`].
    pub fn hash_password_with_salt(
        password: &str,
        salt: [u8; 16],
    ) -> Result<String, UserRepositoryError> {
        bcrypt::hash_with_salt(password, BCRYPT_COST, salt)
            .map(|parts| parts.format_for_version(bcrypt::Version::TwoB))
            .map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Verify a password against a stored bcrypt hash
    ///
    /// Fails closed: a malformed stored hash rejects the login instead of
    /// surfacing an error.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Create a new user with a plain text password (will be hashed)
    ///
    /// The unique index on username backstops the pre-check; a concurrent
    /// duplicate insert surfaces as `UsernameAlreadyExists` either way.
    pub async fn create(&self, username: &str, password: &str) -> Result<User, UserRepositoryError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(UserRepositoryError::UsernameAlreadyExists);
        }

        let password_hash = Self::hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, external_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(&password_hash)
        .bind(Role::User)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                UserRepositoryError::UsernameAlreadyExists
            }
            _ => UserRepositoryError::DatabaseError(e),
        })?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, external_id, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, external_id, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user's password (takes plain text, hashes it)
    pub async fn update_password(
        &self,
        id: Uuid,
        new_password: &str,
    ) -> Result<(), UserRepositoryError> {
        let password_hash = Self::hash_password(new_password)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserRepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool, UserRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Password Hashing Tests (don't require database)
    // ========================================================================

    #[test]
    fn test_hash_password_produces_valid_bcrypt_hash() {
        let password = "Abc123!@";
        let hash = UserRepository::hash_password(password).unwrap();

        // Bcrypt hashes start with $2b$ (or $2a$, $2y$)
        assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$") || hash.starts_with("$2y$"));

        // Bcrypt hash should be 60 characters
        assert_eq!(hash.len(), 60);
    }

    #[test]
    fn test_hash_password_produces_different_hashes_for_same_password() {
        let password = "same_password";
        let hash1 = UserRepository::hash_password(password).unwrap();
        let hash2 = UserRepository::hash_password(password).unwrap();

        // Due to random salt, hashes should be different
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_password_with_salt_is_deterministic() {
        let salt = *b"0123456789abcdef";

        let hash1 = UserRepository::hash_password_with_salt("Abc123!@", salt).unwrap();
        let hash2 = UserRepository::hash_password_with_salt("Abc123!@", salt).unwrap();

        assert_eq!(hash1, hash2);

        // A different password under the same salt must not collide
        let other = UserRepository::hash_password_with_salt("Xyz789!@", salt).unwrap();
        assert_ne!(hash1, other);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = UserRepository::hash_password(password).unwrap();

        assert!(UserRepository::verify_password(password, &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = "correct_password";
        let hash = UserRepository::hash_password(password).unwrap();

        assert!(!UserRepository::verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_malformed_hash_fails_closed() {
        // A corrupted or non-bcrypt stored value must reject, not error
        assert!(!UserRepository::verify_password("password", "not_a_valid_hash"));
        assert!(!UserRepository::verify_password("password", ""));
        assert!(!UserRepository::verify_password(
            "password",
            "$2b$12$truncated"
        ));
    }

    #[test]
    fn test_verify_password_unicode() {
        let password = "пароль_密码_🔐";
        let hash = UserRepository::hash_password(password).unwrap();

        assert!(UserRepository::verify_password(password, &hash));
    }

    #[test]
    fn test_verify_password_long_password() {
        // Bcrypt has a max input length of 72 bytes
        let password = "a".repeat(72);
        let hash = UserRepository::hash_password(&password).unwrap();

        assert!(UserRepository::verify_password(&password, &hash));
    }

    // ========================================================================
    // Error Type Tests
    // ========================================================================

    #[test]
    fn test_user_repository_error_display() {
        let err = UserRepositoryError::NotFound;
        assert_eq!(format!("{}", err), "User not found");

        let err = UserRepositoryError::UsernameAlreadyExists;
        assert_eq!(format!("{}", err), "Username already exists");

        let err = UserRepositoryError::HashingError("test error".to_string());
        assert!(format!("{}", err).contains("test error"));
    }

    // ========================================================================
    // Integration Tests (require database)
    // ========================================================================

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_create_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let username = format!("create_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let user = repo.create(&username, "Abc123!@").await.unwrap();

        assert_eq!(user.username.as_deref(), Some(username.as_str()));
        assert_eq!(user.role, Role::User);
        assert!(user.external_id.is_none());
        // Password should be hashed, not plain text
        let hash = user.password_hash.clone().unwrap();
        assert_ne!(hash, "Abc123!@");
        assert!(hash.starts_with("$2"));

        // Cleanup
        repo.delete(user.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_create_user_duplicate_username() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let username = format!("dup_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let user = repo.create(&username, "Abc123!@").await.unwrap();

        let result = repo.create(&username, "Other456!@").await;
        assert!(matches!(
            result,
            Err(UserRepositoryError::UsernameAlreadyExists)
        ));

        // Cleanup
        repo.delete(user.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_by_id_and_username() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let username = format!("find_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let created = repo.create(&username, "Abc123!@").await.unwrap();

        let by_id = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.id), Some(created.id));

        let by_name = repo.find_by_username(&username).await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(created.id));

        // Cleanup
        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_by_id_not_found() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let found = repo.find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_update_password() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let username = format!("pass_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let created = repo.create(&username, "OldPass1!").await.unwrap();

        repo.update_password(created.id, "NewPass2!").await.unwrap();

        let user = repo.find_by_id(created.id).await.unwrap().unwrap();
        let hash = user.password_hash.unwrap();
        assert!(!UserRepository::verify_password("OldPass1!", &hash));
        assert!(UserRepository::verify_password("NewPass2!", &hash));

        // Cleanup
        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_update_password_nonexistent_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let result = repo.update_password(Uuid::new_v4(), "NewPass2!").await;
        assert!(matches!(result, Err(UserRepositoryError::NotFound)));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_delete_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let username = format!("del_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let created = repo.create(&username, "Abc123!@").await.unwrap();

        let deleted = repo.delete(created.id).await.unwrap();
        assert!(deleted);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_delete_nonexistent_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let deleted = repo.delete(Uuid::new_v4()).await.unwrap();
        assert!(!deleted);
    }

    // Helper function to create test pool
    async fn create_test_pool() -> PgPool {
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_env().expect("DATABASE_URL must be set for tests");
        create_pool(&config)
            .await
            .expect("Failed to create test pool")
    }
}
