//! Comments module for Inkpress
//!
//! This module provides comment functionality:
//! - One comment per user per post, created or replaced in place
//! - Per-user up/down votes with recomputed tallies
//! - Owner-scoped comment deletion

pub mod api;
pub mod service;

pub use api::{CommentsApiState, comments_api_router};
pub use service::{CommentError, CommentService, CommentUpsert};
