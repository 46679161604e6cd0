//! # kwtrends config
//!
//! Type-safe configuration for kwtrends: provider query parameters, batching,
//! chart styling, export formats, and logging.
//!
//! Configuration is read from YAML, overridden from `KWTRENDS_*` environment
//! variables, and validated before use.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
