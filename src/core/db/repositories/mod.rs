//! Database repositories for Inkpress
//!
//! This module provides repository implementations for database operations.
//! Repositories encapsulate data access logic and provide a clean API for
//! business logic to interact with the database.

pub mod comment;
pub mod comment_vote;
pub mod post;
pub mod post_like;
pub mod session;
pub mod user;

pub use comment::{CommentRepository, CommentRepositoryError};
pub use comment_vote::{CommentVoteRepository, CommentVoteRepositoryError};
pub use post::{PostRepository, PostRepositoryError};
pub use post_like::{PostLikeRepository, PostLikeRepositoryError};
pub use session::{SessionRepository, SessionRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
