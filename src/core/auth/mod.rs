//! Authentication module for Inkpress
//!
//! This module provides authentication functionality including:
//! - Session token generation and hashed storage identifiers
//! - User registration and login
//! - Cookie-based session validation with sliding renewal
//! - REST API endpoints for auth operations

pub mod api;
pub mod middleware;
pub mod service;
pub mod token;

pub use api::{ApiError, AuthApiState, auth_api_router};
pub use middleware::{SESSION_COOKIE_NAME, session_middleware};
pub use service::{
    AuthError, AuthService, AuthSession, ChangePasswordRequest, LoginRequest, RegisterRequest,
    RequestIdentity,
};
pub use token::{generate_session_token, session_id_from_token};
