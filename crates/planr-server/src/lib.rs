//! planr server library
//!
//! HTTP service for todos and their managers, with an audit trail for
//! selected state-changing operations.
//!
//! # Architecture
//!
//! - **features**: vertical slices of commands, queries and routes
//! - **audit**: the interceptor that records one entry per audited call,
//!   committed independently of the business transaction
//! - **db**: pool setup and the independent unit-of-work primitive
//!
//! # Example
//!
//! ```no_run
//! use planr_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::AppError;
