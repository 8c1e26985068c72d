//! # varprep - Run Preparation for Variant-Calling Pipelines
//!
//! varprep establishes the capacity facts and the validated plan a genomic
//! variant-calling pipeline needs before launching compute tasks: it probes
//! the host's physical compute capability and turns raw, possibly-malformed
//! run options into a single internally consistent configuration.
//!
//! ## Features
//!
//! - **Host Capability Probing**: physical cores, logical cores, and total
//!   memory from OS-native sources, with hard errors instead of guessed
//!   defaults
//! - **Workflow Validation**: reference/allele-file existence and companion
//!   index checks, genome-region parsing, absolute-path normalization
//! - **Explicit Defaults Table**: every option's default declared once
//! - **Provenance**: the exact invocation argument vector is retained in
//!   the validated configuration
//!
//! ## Probing the Host
//!
//! ```no_run
//! use varprep::system::HostCapability;
//!
//! let capability = HostCapability::detect().unwrap();
//! println!(
//!     "{} physical / {} logical cores, {} MB",
//!     capability.physical_cores, capability.logical_cores, capability.total_memory_mb
//! );
//! ```
//!
//! ## Validating a Run Configuration
//!
//! ```no_run
//! use varprep::config::WorkflowOptions;
//! use std::path::PathBuf;
//!
//! let mut options = WorkflowOptions::defaults();
//! options.reference_fasta = Some(PathBuf::from("/data/genome.fa"));
//! options.region_strings = vec!["chr20".to_string()];
//!
//! let config = options.validate().unwrap();
//! assert!(config.reference_fasta.is_absolute());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod region;
pub mod system;

// Re-export commonly used types
pub use config::{ExecutionMode, WorkflowConfig, WorkflowOptions};
pub use error::{ConfigurationError, EstimationError, Result, VarPrepError};
pub use region::{GenomeRegion, RegionSet};
pub use system::HostCapability;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use varprep::prelude::*;
    //! ```

    pub use crate::config::{
        ExecutionMode, InstallLayout, WorkflowConfig, WorkflowOptions,
    };
    pub use crate::error::{ConfigurationError, EstimationError, Result, VarPrepError};
    pub use crate::region::{GenomeRegion, RegionSet};
    pub use crate::system::{CapabilityProbe, HostCapability};
}
