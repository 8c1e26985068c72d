//! Workflow option validation pipeline
//!
//! Turns raw, possibly-missing user options into a validated
//! [`WorkflowConfig`], or rejects them with a precise reason before any
//! compute resources are committed. The pipeline is linear: sanitize
//! paths, check companion indices, parse regions, assert required fields.
//! No step branches back to an earlier one, and nothing here mutates the
//! filesystem.

use crate::config::settings::{WorkflowConfig, WorkflowOptions};
use crate::error::ConfigurationError;
use crate::region::RegionSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

impl WorkflowOptions {
    /// Run the validation pipeline, consuming the raw options.
    pub fn validate(self) -> Result<WorkflowConfig, ConfigurationError> {
        validate(self)
    }
}

/// Validate raw workflow options into an immutable configuration.
///
/// Fails with the first [`ConfigurationError`] encountered; a partially
/// valid configuration is never produced.
pub fn validate(options: WorkflowOptions) -> Result<WorkflowConfig, ConfigurationError> {
    // sanitize: run dir becomes absolute without an existence check, it
    // may be created later
    let run_dir = options.run_dir.map(absolute_path).transpose()?;

    let reference_fasta = options
        .reference_fasta
        .map(|path| existing_file(path, "reference"))
        .transpose()?;
    if let Some(reference) = &reference_fasta {
        require_index(reference, "fai", "reference")?;
    }

    let indel_candidates = tabix_indexed_files(options.indel_candidates, "candidate indel vcf")?;
    let forced_genotypes = tabix_indexed_files(options.forced_genotypes, "forced genotype vcf")?;

    let regions = RegionSet::parse(&options.region_strings)?;

    // required-field assertions run last so the message reflects the
    // final resolved state
    let run_dir = run_dir.ok_or(ConfigurationError::MissingRequired {
        field: "run directory",
    })?;
    let reference_fasta = reference_fasta.ok_or(ConfigurationError::MissingRequired {
        field: "reference fasta file",
    })?;

    Ok(WorkflowConfig {
        run_dir,
        reference_fasta,
        indel_candidates,
        forced_genotypes,
        regions,
        scan_size_mb: options.scan_size_mb,
        call_mem_mb_override: options.call_mem_mb_override,
        is_exome: options.is_exome,
        is_retain_temp_files: options.is_retain_temp_files,
        is_empirical_scoring: options.is_empirical_scoring,
        is_report_scoring_features: options.is_report_scoring_features,
        command_line: options.command_line,
    })
}

/// Resolve a path against the current directory without requiring it to
/// exist.
fn absolute_path(path: PathBuf) -> Result<PathBuf, ConfigurationError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().map_err(|source| ConfigurationError::PathResolution {
        path: path.clone(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Check that a path names an existing file and canonicalize it.
fn existing_file(path: PathBuf, role: &'static str) -> Result<PathBuf, ConfigurationError> {
    if !path.is_file() {
        return Err(ConfigurationError::FileMissing { role, path });
    }
    fs::canonicalize(&path).map_err(|source| ConfigurationError::PathResolution { path, source })
}

/// Require the companion index `<file>.<extension>` to exist.
fn require_index(
    file: &Path,
    extension: &str,
    role: &'static str,
) -> Result<(), ConfigurationError> {
    let mut index = file.as_os_str().to_os_string();
    index.push(".");
    index.push(extension);
    let index = PathBuf::from(index);

    if index.is_file() {
        Ok(())
    } else {
        Err(ConfigurationError::IndexMissing { role, path: index })
    }
}

/// Sanitize a list of tabix-indexed VCF paths: each must exist, each gets
/// canonicalized, each needs its `.tbi` sidecar.
fn tabix_indexed_files(
    paths: Vec<PathBuf>,
    role: &'static str,
) -> Result<Vec<PathBuf>, ConfigurationError> {
    paths
        .into_iter()
        .map(|path| {
            let path = existing_file(path, role)?;
            require_index(&path, "tbi", role)?;
            Ok(path)
        })
        .collect()
}
