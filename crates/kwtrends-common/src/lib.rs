//! # kwtrends common
//!
//! Shared types, errors, and logging setup for the kwtrends workspace.
//!
//! This crate provides the domain vocabulary (keywords, batches, trend rows,
//! query parameters) used by every other crate in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{FetchError, Result, TrendsError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
