//! Database models for Inkpress
//!
//! This module defines the database entity structs that map to PostgreSQL tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Helper module for deserializing Option<Option<T>> where:
/// - Missing field -> None (don't update)
/// - Field with null -> Some(None) (set to null)
/// - Field with value -> Some(Some(value)) (set to value)
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        // This will be called only when the field is present
        // So we wrap the result in Some()
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

// ============================================================================
// Role
// ============================================================================

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// ============================================================================
// Vote Direction
// ============================================================================

/// Direction of a comment vote
///
/// Request payloads deserialize straight into this enum, so a malformed
/// direction is rejected before any storage access happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteDirection::Up => write!(f, "up"),
            VoteDirection::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            _ => Err(format!("Invalid vote direction: {}", s)),
        }
    }
}

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered account
///
/// `password_hash` is NULL for accounts that only ever signed in through an
/// external provider; password login is refused for those.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Session Model
// ============================================================================

/// Session entity
///
/// `id` is the hex SHA-256 of the client-held token; the raw token exists
/// only in the client cookie and is never persisted.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Post Model
// ============================================================================

/// Post entity
///
/// `likes` is a cached counter owned by the like path; nothing else writes
/// it, and the admin update payload cannot name it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub author_id: Uuid,
    pub content_html: String,
    pub date_published: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub likes: i64,
    pub slug: Option<String>,
    pub view_state: String,
    pub cover_image_url: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<String>,
    pub view_count: i64,
}

/// Post fields an admin may change
///
/// The cached `likes` counter and `view_count` are deliberately absent;
/// `last_modified` is set by the update itself.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub subtitle: Option<Option<String>>,
    pub content_html: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub date_published: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub slug: Option<Option<String>>,
    pub view_state: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub cover_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub tags: Option<Option<String>>,
}

// ============================================================================
// Comment Model
// ============================================================================

/// Comment entity
///
/// `upvotes`/`downvotes` are cached tallies; comment_votes is the source
/// of truth and the vote path rewrites them after every ledger change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub date_created: DateTime<Utc>,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl Comment {
    /// Net score used for ordering comment lists
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

// ============================================================================
// Comment Vote Model
// ============================================================================

/// One user's vote on one comment; at most one row per (comment_id, user_id)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentVote {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub direction: VoteDirection,
}

/// Up/down counts derived from the vote ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

// ============================================================================
// Post Like Model
// ============================================================================

/// One user's like of one post; at most one row per (post_id, user_id).
/// Presence is the whole record, there is no unlike.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostLike {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
}

// ============================================================================
// Tests
// ============================================================================
