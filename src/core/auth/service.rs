//! Authentication service
//!
//! Provides business logic for user registration, login, logout, and
//! session validation. Coordinates the user repository, the session
//! repository, and the token generator.

use chrono::{DateTime, Duration, Utc};

use crate::core::auth::token::generate_session_token;
use crate::core::db::models::{Session, User, UserResponse};
use crate::core::db::repositories::session::RENEWAL_THRESHOLD_DAYS;
use crate::core::db::repositories::{
    SessionRepository, SessionRepositoryError, UserRepository, UserRepositoryError,
};
use crate::core::validation::{self, ValidationError};

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already taken")]
    UsernameAlreadyExists,

    #[error("This account signs in through an external provider")]
    ExternalLoginOnly,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => AuthError::UserNotFound,
            UserRepositoryError::UsernameAlreadyExists => AuthError::UsernameAlreadyExists,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<SessionRepositoryError> for AuthError {
    fn from(err: SessionRepositoryError) -> Self {
        match err {
            SessionRepositoryError::NotFound => AuthError::SessionNotFound,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Password change request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// A freshly issued session together with the raw token for the client
///
/// The raw token exists only here and in the cookie built from it;
/// storage holds the derived identifier.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub session: Session,
    pub token: String,
}

/// The authenticated caller of a single request
///
/// Built once by the session middleware and threaded explicitly into
/// service calls; nothing reads identity from ambient state.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user: User,
    pub session: Session,
}

/// A session is renewed once less than half its lifetime remains
fn should_renew(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> bool {
    expires_at - now < Duration::days(RENEWAL_THRESHOLD_DAYS)
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: UserRepository, session_repo: SessionRepository) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Issue a brand new session for a user
    async fn issue_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = generate_session_token();
        let session = self.session_repo.create(user.id, &token).await?;

        Ok(AuthSession {
            user,
            session,
            token,
        })
    }

    /// Register a new user and sign them in
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        validation::validate_username(&request.username)?;
        validation::validate_password(&request.password)?;

        let user = self
            .user_repo
            .create(&request.username, &request.password)
            .await?;

        self.issue_session(user).await
    }

    /// Login an existing user
    ///
    /// Unknown username and wrong password produce the same generic
    /// error so responses never reveal which accounts exist.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let user = self
            .user_repo
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::ExternalLoginOnly);
        };

        if !UserRepository::verify_password(&request.password, hash) {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(user).await
    }

    /// Invalidate a session by its derived identifier
    ///
    /// Idempotent: invalidating an already-deleted session succeeds.
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        self.session_repo.delete(session_id).await?;
        Ok(())
    }

    /// Validate a raw session token into a request identity
    ///
    /// Returns `Ok(None)` for anything that should read as "not signed
    /// in": unknown token, expired session (the row is deleted on the
    /// spot), session whose user no longer exists (also deleted). A
    /// session past the midpoint of its lifetime is renewed to a full
    /// lifetime as a side effect, so the caller must re-issue the cookie
    /// from the returned session's expiry.
    pub async fn validate_session_token(
        &self,
        raw_token: &str,
    ) -> Result<Option<RequestIdentity>, AuthError> {
        let Some(session) = self.session_repo.find_by_token(raw_token).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.expires_at <= now {
            self.session_repo.delete(&session.id).await?;
            return Ok(None);
        }

        let Some(user) = self.user_repo.find_by_id(session.user_id).await? else {
            // Session outliving its account is treated as revoked
            self.session_repo.delete(&session.id).await?;
            return Ok(None);
        };

        let session = if should_renew(now, session.expires_at) {
            self.session_repo.renew(&session.id).await?
        } else {
            session
        };

        Ok(Some(RequestIdentity { user, session }))
    }

    /// Change a user's password and revoke every session they hold
    pub async fn change_password(
        &self,
        identity: &RequestIdentity,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let Some(hash) = identity.user.password_hash.as_deref() else {
            return Err(AuthError::ExternalLoginOnly);
        };

        if !UserRepository::verify_password(&request.current_password, hash) {
            return Err(AuthError::InvalidCredentials);
        }

        validation::validate_password(&request.new_password)?;

        self.user_repo
            .update_password(identity.user.id, &request.new_password)
            .await?;

        // Force re-login everywhere, including the current session
        self.session_repo
            .delete_all_for_user(identity.user.id)
            .await?;

        Ok(())
    }

    /// Identity echo for the `/me` endpoint
    pub fn current_user(&self, identity: &RequestIdentity) -> UserResponse {
        identity.user.clone().into()
    }
}
