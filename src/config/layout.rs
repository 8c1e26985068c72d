//! Installation layout for sibling helper executables
//!
//! A run configuration records where the htslib helper tools shipped
//! alongside the pipeline live, so downstream task scripts can invoke
//! them by absolute path. This module only resolves paths; nothing is
//! executed here.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved locations of the helper executables inside a libexec
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallLayout {
    /// Directory the helpers were resolved against
    pub libexec_dir: PathBuf,
    /// bgzip block-compression tool
    pub bgzip: PathBuf,
    /// htsfile format probe
    pub htsfile: PathBuf,
    /// samtools
    pub samtools: PathBuf,
    /// tabix indexer
    pub tabix: PathBuf,
}

impl InstallLayout {
    /// Resolve the helper paths inside `libexec_dir`.
    ///
    /// The directory itself must exist; the individual helpers are not
    /// checked here since a run may legitimately use only some of them.
    pub fn discover(libexec_dir: impl Into<PathBuf>) -> Result<Self, ConfigurationError> {
        let libexec_dir = libexec_dir.into();
        if !libexec_dir.is_dir() {
            return Err(ConfigurationError::DirectoryMissing {
                role: "libexec directory",
                path: libexec_dir,
            });
        }

        Ok(Self {
            bgzip: libexec_dir.join(exe_file("bgzip")),
            htsfile: libexec_dir.join(exe_file("htsfile")),
            samtools: libexec_dir.join(exe_file("samtools")),
            tabix: libexec_dir.join(exe_file("tabix")),
            libexec_dir,
        })
    }
}

/// Platform executable name: `.exe` suffix on Windows, bare elsewhere.
pub fn exe_file(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_resolves_helper_paths() {
        let dir = TempDir::new().unwrap();
        let layout = InstallLayout::discover(dir.path()).unwrap();
        assert_eq!(layout.libexec_dir, dir.path());
        assert!(layout.tabix.starts_with(dir.path()));
        assert!(layout
            .tabix
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("tabix"));
    }

    #[test]
    fn test_discover_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-libexec");
        let err = InstallLayout::discover(&missing).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DirectoryMissing {
                role: "libexec directory",
                ..
            }
        ));
    }

    #[test]
    fn test_exe_file_suffix() {
        let name = exe_file("bgzip");
        if cfg!(windows) {
            assert_eq!(name, "bgzip.exe");
        } else {
            assert_eq!(name, "bgzip");
        }
    }
}
