//! Planr Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging bootstrap for the Planr workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`PlanrError`] and the [`Result`] alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`], the one
//!   place where the `tracing` subscriber is installed
//!
//! # Example
//!
//! ```no_run
//! use planr_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> planr_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PlanrError, Result};
