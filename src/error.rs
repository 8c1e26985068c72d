//! Error types for varprep
//!
//! Two error families exist, both fatal by design: estimation errors for
//! unavailable or malformed OS capability data, and configuration errors
//! for bad or missing user input. Neither is ever retried; a failure here
//! reflects an environment or input problem that must be fixed before a
//! run is meaningful.

use std::path::PathBuf;
use thiserror::Error;

/// Host capability metric being probed.
///
/// Carried inside every [`EstimationError`] so diagnostics always name the
/// metric that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Physical CPU core count
    PhysicalCores,
    /// Logical (hyperthreaded) CPU core count
    LogicalCores,
    /// Total installed memory
    TotalMemory,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Metric::PhysicalCores => "physical core count",
            Metric::LogicalCores => "logical core count",
            Metric::TotalMemory => "total memory",
        };
        f.write_str(name)
    }
}

/// Error probing host compute capability
///
/// Every variant names the metric and the source (file or command) that
/// failed, so callers can report an actionable diagnostic instead of
/// guessing a core count.
#[derive(Error, Debug)]
pub enum EstimationError {
    /// Capability source file missing or unreadable
    #[error("can't read {metric} information from '{path}': {source}")]
    SourceUnreadable {
        /// Metric being probed when the read failed
        metric: Metric,
        /// Source file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Capability source file readable but not in the expected format
    #[error("unexpected format in '{path}' while probing {metric}: {reason}")]
    MalformedSource {
        /// Metric being probed when parsing failed
        metric: Metric,
        /// Source file with the unexpected content
        path: PathBuf,
        /// What was wrong with the content
        reason: String,
    },

    /// External capability query failed to run or produced unusable output
    #[error("capability query `{command}` failed for {metric}: {reason}")]
    QueryFailed {
        /// Metric being probed when the query failed
        metric: Metric,
        /// Command line that was invoked
        command: String,
        /// What went wrong
        reason: String,
    },

    /// No capability probe exists for this OS family
    #[error("can't probe host capability on unsupported platform '{os}'")]
    UnsupportedPlatform {
        /// OS name reported by the toolchain
        os: String,
    },
}

impl EstimationError {
    /// Create a malformed-source error
    pub fn malformed(
        metric: Metric,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedSource {
            metric,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a failed-query error
    pub fn query(metric: Metric, command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::QueryFailed {
            metric,
            command: command.into(),
            reason: reason.into(),
        }
    }
}

/// Error validating workflow configuration
///
/// Always carries the logical field name and the specific reason, surfaced
/// before any compute resources are committed.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A mandatory option was never supplied
    #[error("no {field} specified")]
    MissingRequired {
        /// Human-readable name of the missing field
        field: &'static str,
    },

    /// A referenced input file does not exist
    #[error("can't find {role} file: '{path}'")]
    FileMissing {
        /// Logical role of the file ("reference", "candidate indel vcf", ...)
        role: &'static str,
        /// Path that was checked
        path: PathBuf,
    },

    /// A referenced directory does not exist
    #[error("can't find {role}: '{path}'")]
    DirectoryMissing {
        /// Logical role of the directory
        role: &'static str,
        /// Path that was checked
        path: PathBuf,
    },

    /// A companion index file (.fai / tabix) is absent
    #[error("can't find expected index file for {role}: '{path}'")]
    IndexMissing {
        /// Logical role of the indexed file
        role: &'static str,
        /// Expected index path
        path: PathBuf,
    },

    /// A genome region string could not be parsed
    #[error("unexpected format in genome region string '{token}': {reason}")]
    MalformedRegion {
        /// The offending token
        token: String,
        /// What was wrong with it
        reason: String,
    },

    /// A path could not be resolved to an absolute form
    #[error("can't resolve path '{path}': {source}")]
    PathResolution {
        /// Path being resolved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigurationError {
    /// Create a missing-file error with its logical role
    pub fn file_missing(role: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::FileMissing {
            role,
            path: path.into(),
        }
    }

    /// Create a malformed-region error
    pub fn malformed_region(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRegion {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for varprep operations
#[derive(Error, Debug)]
pub enum VarPrepError {
    /// Host capability estimation failed
    #[error(transparent)]
    Estimation(#[from] EstimationError),

    /// Workflow configuration was rejected
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type alias for varprep operations
pub type Result<T> = std::result::Result<T, VarPrepError>;
