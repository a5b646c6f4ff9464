//! Shared utilities and types for feature modules

pub mod auth;
pub mod types;

pub use auth::AuthUser;
pub use types::UserResponse;
