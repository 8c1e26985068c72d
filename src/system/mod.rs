//! Host capability probing module
//!
//! Reports the physical compute capacity (cores, memory) of the current
//! host so the workflow can pick safe parallelism and memory defaults.

mod capability;

pub use capability::*;
