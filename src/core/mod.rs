//! Core domain models and business logic for the blogging backend

pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod posts;
pub mod validation;
