//! Posts module for Inkpress
//!
//! This module provides the post surface:
//! - Public post listing
//! - One-shot per-user likes backed by a unique index
//! - Admin-only editing and deletion

pub mod api;
pub mod service;

pub use api::{PostsApiState, posts_api_router};
pub use service::{LikeOutcome, PostError, PostService};
