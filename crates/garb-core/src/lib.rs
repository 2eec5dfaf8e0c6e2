//! garb-core library.
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::Error`] at the public API, `anyhow::Result`
//!   with context on internal plumbing.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod rules;
pub mod stats;
pub mod sync;

pub use error::{Error, ErrorCode, Result};
