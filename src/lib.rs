//! Inkpress - Blogging platform backend
//!
//! Session-authenticated REST backend for a multi-user blog: cookie
//! sessions with rolling renewal, per-user comment votes with recomputed
//! tallies, and one-shot post likes.

pub mod core;
