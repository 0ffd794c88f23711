//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/auth/register - Register a new user and sign them in
//! - POST /api/auth/login - Login with username and password
//! - POST /api/auth/logout - Logout (invalidate the current session)
//! - POST /api/auth/password - Change password (revokes all sessions)
//! - GET /api/auth/me - Get current user info
//!
//! The session travels in an HttpOnly cookie; login and register set it,
//! logout and password changes clear it.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::middleware::{clear_session_cookie, session_cookie};
use crate::core::auth::service::{
    AuthError, AuthService, AuthSession, ChangePasswordRequest, LoginRequest, RegisterRequest,
    RequestIdentity,
};
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
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

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::ExternalLoginOnly => (StatusCode::UNAUTHORIZED, "EXTERNAL_LOGIN_ONLY"),
            AuthError::SessionNotFound => (StatusCode::UNAUTHORIZED, "SESSION_NOT_FOUND"),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AuthError::UsernameAlreadyExists => (StatusCode::CONFLICT, "USERNAME_EXISTS"),
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AuthError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

/// Response wrapper for successful auth operations
///
/// The raw token is deliberately absent from the body; it only ever
/// travels in the session cookie.
#[derive(Debug, Serialize)]
pub struct AuthApiResponse {
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthSession> for AuthApiResponse {
    fn from(auth: AuthSession) -> Self {
        Self {
            user: auth.user.into(),
            expires_at: auth.session.expires_at,
        }
    }
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/password", post(change_password_handler))
        .route("/api/auth/me", get(me_handler))
        .with_state(state)
}

/// POST /api/auth/register
/// Register a new user and sign them in
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthApiResponse>), AuthError> {
    tracing::info!("Registration attempt for username: {}", request.username);

    let auth = state.auth_service.register(request).await?;

    tracing::info!("User registered successfully: {}", auth.user.id);

    let jar = jar.add(session_cookie(&auth.token, auth.session.expires_at));
    Ok((jar, Json(auth.into())))
}

/// POST /api/auth/login
/// Login with username and password
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthApiResponse>), AuthError> {
    tracing::info!("Login attempt for username: {}", request.username);

    let auth = state.auth_service.login(request).await?;

    tracing::info!("User logged in successfully: {}", auth.user.id);

    let jar = jar.add(session_cookie(&auth.token, auth.session.expires_at));
    Ok((jar, Json(auth.into())))
}

/// POST /api/auth/logout
/// Invalidate the current session and clear its cookie
async fn logout_handler(
    State(state): State<Arc<AuthApiState>>,
    identity: RequestIdentity,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>), AuthError> {
    tracing::info!("Logout request for user: {}", identity.user.id);

    state.auth_service.logout(&identity.session.id).await?;

    let jar = jar.remove(clear_session_cookie());
    Ok((
        jar,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// POST /api/auth/password
/// Change password (requires current password, revokes all sessions)
async fn change_password_handler(
    State(state): State<Arc<AuthApiState>>,
    identity: RequestIdentity,
    jar: CookieJar,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), AuthError> {
    state.auth_service.change_password(&identity, request).await?;

    tracing::info!("Password changed for user: {}", identity.user.id);

    let jar = jar.remove(clear_session_cookie());
    Ok((
        jar,
        Json(SuccessResponse {
            success: true,
            message: "Password changed successfully. Please login again.".to_string(),
        }),
    ))
}

/// GET /api/auth/me
/// Get current user info from the session cookie
async fn me_handler(
    State(state): State<Arc<AuthApiState>>,
    identity: RequestIdentity,
) -> Result<Json<UserResponse>, AuthError> {
    Ok(Json(state.auth_service.current_user(&identity)))
}
