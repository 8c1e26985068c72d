//! Configuration module for varprep
//!
//! Provides the CLI argument surface, the workflow option defaults table,
//! the validation pipeline, and the installation layout lookup.

mod layout;
mod settings;
mod validate;

pub use layout::*;
pub use settings::*;
pub use validate::*;
