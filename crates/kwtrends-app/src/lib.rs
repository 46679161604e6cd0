//! # kwtrends app
//!
//! The session object behind the user actions (upload a keyword file, run the
//! analysis, download CSV/PNG, clear the cache) and the `kwtrends` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod session;

pub use error::{AppError, AppResult};
pub use session::Session;
