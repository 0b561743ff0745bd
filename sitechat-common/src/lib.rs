//! Common types and utilities shared across sitechat crates.
//!
//! This crate holds the shared error type and the observability helpers used
//! by every other member of the workspace. It stays dependency-light so the
//! library crates can depend on it without pulling in the web stack.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SitechatError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use sitechat_common::SitechatError;
//!
//! let err = SitechatError::Provider("quota exhausted".into());
//! assert_eq!(err.to_string(), "Provider error: quota exhausted");
//! ```

pub mod observability;

/// Error types used across the sitechat system.
#[derive(thiserror::Error, Debug)]
pub enum SitechatError {
    /// The completion provider rejected or failed a request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`SitechatError`].
pub type Result<T> = std::result::Result<T, SitechatError>;
