//! Host capability estimation
//!
//! Detects physical cores, logical cores, and total memory using only
//! unprivileged OS-native facilities: procfs pseudo-files on Linux, a
//! sysctl query subprocess on other Unix systems. Every metric either
//! resolves fully or fails with an [`EstimationError`]; there is no
//! guessed default, since resource planning on bad data would under- or
//! over-subscribe a shared compute node.

use crate::error::{EstimationError, Metric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default Linux processor topology source
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Default Linux memory information source
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Provider of the three host capability metrics.
///
/// One implementation exists per platform family; [`platform_probe`]
/// selects the right one once at startup. Tests substitute their own
/// implementation instead of touching the real host.
pub trait CapabilityProbe {
    /// Number of physical CPU cores on this host.
    fn physical_core_count(&self) -> Result<u32, EstimationError>;

    /// Number of logical (hyperthreaded) CPU cores on this host.
    fn logical_core_count(&self) -> Result<u32, EstimationError>;

    /// Total installed memory in megabytes.
    fn total_memory_mb(&self) -> Result<u64, EstimationError>;
}

/// Physical compute capacity of the current host.
///
/// Constructed atomically: if any metric fails, no value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapability {
    /// Physical CPU cores
    pub physical_cores: u32,
    /// Logical cores; at least `physical_cores` under hyperthreading
    pub logical_cores: u32,
    /// Total installed memory in MB
    pub total_memory_mb: u64,
}

impl HostCapability {
    /// Probe the current host with the platform's native probe.
    pub fn detect() -> Result<Self, EstimationError> {
        let probe = platform_probe()?;
        Self::from_probe(probe.as_ref())
    }

    /// Collect all three metrics from one probe.
    ///
    /// The first failing metric aborts the probe; a partial capability
    /// value is never returned.
    pub fn from_probe(probe: &dyn CapabilityProbe) -> Result<Self, EstimationError> {
        let capability = Self {
            physical_cores: probe.physical_core_count()?,
            logical_cores: probe.logical_core_count()?,
            total_memory_mb: probe.total_memory_mb()?,
        };
        debug!(
            physical = capability.physical_cores,
            logical = capability.logical_cores,
            memory_mb = capability.total_memory_mb,
            "host capability probe complete"
        );
        Ok(capability)
    }

    /// Print a human-readable capability summary to stdout.
    pub fn print_summary(&self) {
        println!("=== Host Capability ===");
        println!("  Physical cores: {}", self.physical_cores);
        println!("  Logical cores:  {}", self.logical_cores);
        println!(
            "  Total memory:   {}",
            humansize::format_size(self.total_memory_mb * 1024 * 1024, humansize::BINARY)
        );
    }
}

/// Select the capability probe for the current platform family.
#[cfg(target_os = "linux")]
pub fn platform_probe() -> Result<Box<dyn CapabilityProbe>, EstimationError> {
    Ok(Box::new(ProcfsProbe::default()))
}

/// Select the capability probe for the current platform family.
#[cfg(all(unix, not(target_os = "linux")))]
pub fn platform_probe() -> Result<Box<dyn CapabilityProbe>, EstimationError> {
    Ok(Box::new(SysctlProbe::new()))
}

/// Select the capability probe for the current platform family.
#[cfg(not(unix))]
pub fn platform_probe() -> Result<Box<dyn CapabilityProbe>, EstimationError> {
    Err(EstimationError::UnsupportedPlatform {
        os: std::env::consts::OS.to_string(),
    })
}

/// Linux probe reading procfs pseudo-files.
///
/// The source paths are fields so tests can point the probe at fixture
/// files instead of the live host.
#[derive(Debug, Clone)]
pub struct ProcfsProbe {
    cpuinfo: PathBuf,
    meminfo: PathBuf,
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self {
            cpuinfo: PathBuf::from(CPUINFO_PATH),
            meminfo: PathBuf::from(MEMINFO_PATH),
        }
    }
}

impl ProcfsProbe {
    /// Create a probe reading the given topology and memory sources.
    pub fn with_paths(cpuinfo: impl Into<PathBuf>, meminfo: impl Into<PathBuf>) -> Self {
        Self {
            cpuinfo: cpuinfo.into(),
            meminfo: meminfo.into(),
        }
    }

    fn read_source(&self, metric: Metric, path: &Path) -> Result<String, EstimationError> {
        fs::read_to_string(path).map_err(|source| EstimationError::SourceUnreadable {
            metric,
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CapabilityProbe for ProcfsProbe {
    fn physical_core_count(&self) -> Result<u32, EstimationError> {
        let text = self.read_source(Metric::PhysicalCores, &self.cpuinfo)?;
        parse_physical_core_count(&text, &self.cpuinfo)
    }

    fn logical_core_count(&self) -> Result<u32, EstimationError> {
        let text = self.read_source(Metric::LogicalCores, &self.cpuinfo)?;
        parse_logical_core_count(&text, &self.cpuinfo)
    }

    fn total_memory_mb(&self) -> Result<u64, EstimationError> {
        let text = self.read_source(Metric::TotalMemory, &self.meminfo)?;
        parse_total_memory_mb(&text, &self.meminfo)
    }
}

/// Count physical cores from processor topology records.
///
/// Each record is a `key : value` line. The result is the number of
/// distinct `physical id` values times the `cpu cores` value. Absence of
/// either signal is a hard format error, never a default.
fn parse_physical_core_count(text: &str, path: &Path) -> Result<u32, EstimationError> {
    let mut package_ids: BTreeSet<&str> = BTreeSet::new();
    let mut cores_per_package: Option<u32> = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "physical id" => {
                package_ids.insert(value);
            }
            "cpu cores" => {
                // first observed value wins; packages are assumed uniform
                if cores_per_package.is_none() {
                    let cores = value.parse().map_err(|_| {
                        EstimationError::malformed(
                            Metric::PhysicalCores,
                            path,
                            format!("'cpu cores' value '{value}' is not a number"),
                        )
                    })?;
                    cores_per_package = Some(cores);
                }
            }
            _ => {}
        }
    }

    if package_ids.is_empty() {
        return Err(EstimationError::malformed(
            Metric::PhysicalCores,
            path,
            "no 'physical id' entries found",
        ));
    }
    let Some(cores) = cores_per_package else {
        return Err(EstimationError::malformed(
            Metric::PhysicalCores,
            path,
            "no 'cpu cores' entry found",
        ));
    };

    Ok(package_ids.len() as u32 * cores)
}

/// Count logical cores: one `processor` record per logical core.
fn parse_logical_core_count(text: &str, path: &Path) -> Result<u32, EstimationError> {
    let count = text
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count() as u32;

    if count == 0 {
        return Err(EstimationError::malformed(
            Metric::LogicalCores,
            path,
            "no 'processor' entries found",
        ));
    }
    Ok(count)
}

/// Read total memory from the first meminfo line.
///
/// The line must be exactly three whitespace-separated tokens: label,
/// numeric KB value, unit. KB converts to MB by ceiling division so a
/// fractional MB is never lost to truncation.
fn parse_total_memory_mb(text: &str, path: &Path) -> Result<u64, EstimationError> {
    let Some(line) = text.lines().next() else {
        return Err(EstimationError::malformed(
            Metric::TotalMemory,
            path,
            "source is empty",
        ));
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(EstimationError::malformed(
            Metric::TotalMemory,
            path,
            format!("expected 3 fields in first line, found {}", fields.len()),
        ));
    }

    let kb: u64 = fields[1].parse().map_err(|_| {
        EstimationError::malformed(
            Metric::TotalMemory,
            path,
            format!("memory value '{}' is not a number", fields[1]),
        )
    })?;

    Ok(kb.div_ceil(1024))
}

/// Probe for non-Linux Unix systems, shelling out to `sysctl -n`.
///
/// Each metric is a single short-lived subprocess whose first stdout line
/// is parsed as an integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysctlProbe;

impl SysctlProbe {
    /// Create a sysctl-backed probe.
    pub fn new() -> Self {
        Self
    }

    fn query(&self, metric: Metric, key: &str) -> Result<u64, EstimationError> {
        let command = format!("sysctl -n {key}");
        let output = std::process::Command::new("sysctl")
            .args(["-n", key])
            .output()
            .map_err(|e| EstimationError::query(metric, command.as_str(), e.to_string()))?;

        if !output.status.success() {
            return Err(EstimationError::query(
                metric,
                command.as_str(),
                format!("exited with {}", output.status),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_first_line(&stdout)
            .ok_or_else(|| EstimationError::query(metric, command.as_str(), "no numeric output"))
    }
}

impl CapabilityProbe for SysctlProbe {
    fn physical_core_count(&self) -> Result<u32, EstimationError> {
        let count = self.query(Metric::PhysicalCores, "hw.physicalcpu")?;
        to_core_count(count, Metric::PhysicalCores, "hw.physicalcpu")
    }

    fn logical_core_count(&self) -> Result<u32, EstimationError> {
        let count = self.query(Metric::LogicalCores, "hw.logicalcpu")?;
        to_core_count(count, Metric::LogicalCores, "hw.logicalcpu")
    }

    fn total_memory_mb(&self) -> Result<u64, EstimationError> {
        let bytes = self.query(Metric::TotalMemory, "hw.memsize")?;
        Ok(bytes / (1024 * 1024))
    }
}

/// Parse the first line of a capability query's output as an integer.
fn parse_first_line(output: &str) -> Option<u64> {
    output.lines().next()?.trim().parse().ok()
}

fn to_core_count(count: u64, metric: Metric, key: &str) -> Result<u32, EstimationError> {
    u32::try_from(count).map_err(|_| {
        EstimationError::query(
            metric,
            format!("sysctl -n {key}"),
            format!("core count {count} out of range"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    /// A two-package, two-cores-per-package, hyperthreaded topology:
    /// 4 physical cores presenting 8 logical cores.
    const CPUINFO_2X2_HT: &str = "\
processor\t: 0
physical id\t: 0
cpu cores\t: 2

processor\t: 1
physical id\t: 0
cpu cores\t: 2

processor\t: 2
physical id\t: 0
cpu cores\t: 2

processor\t: 3
physical id\t: 0
cpu cores\t: 2

processor\t: 4
physical id\t: 1
cpu cores\t: 2

processor\t: 5
physical id\t: 1
cpu cores\t: 2

processor\t: 6
physical id\t: 1
cpu cores\t: 2

processor\t: 7
physical id\t: 1
cpu cores\t: 2
";

    fn fixture_probe(dir: &TempDir, cpuinfo: &str, meminfo: &str) -> ProcfsProbe {
        let cpuinfo_path = dir.path().join("cpuinfo");
        let meminfo_path = dir.path().join("meminfo");
        fs::write(&cpuinfo_path, cpuinfo).unwrap();
        fs::write(&meminfo_path, meminfo).unwrap();
        ProcfsProbe::with_paths(cpuinfo_path, meminfo_path)
    }

    #[test]
    fn test_physical_cores_packages_times_cores() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, CPUINFO_2X2_HT, "MemTotal: 1024 kB\n");
        assert_eq!(probe.physical_core_count().unwrap(), 4);
    }

    #[test]
    fn test_logical_cores_counts_processor_entries() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, CPUINFO_2X2_HT, "MemTotal: 1024 kB\n");
        assert_eq!(probe.logical_core_count().unwrap(), 8);
    }

    #[test]
    fn test_missing_physical_id_is_an_error() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, "processor\t: 0\ncpu cores\t: 4\n", "");
        let err = probe.physical_core_count().unwrap_err();
        assert!(err.to_string().contains("physical id"));
    }

    #[test]
    fn test_missing_cpu_cores_is_an_error() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, "processor\t: 0\nphysical id\t: 0\n", "");
        let err = probe.physical_core_count().unwrap_err();
        assert!(err.to_string().contains("cpu cores"));
    }

    #[test]
    fn test_no_processor_entries_is_an_error() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, "vendor_id\t: GenuineIntel\n", "");
        assert!(probe.logical_core_count().is_err());
    }

    #[test]
    fn test_unreadable_source_is_an_error() {
        let probe = ProcfsProbe::with_paths("/nonexistent/cpuinfo", "/nonexistent/meminfo");
        assert!(matches!(
            probe.logical_core_count(),
            Err(EstimationError::SourceUnreadable { .. })
        ));
        assert!(matches!(
            probe.total_memory_mb(),
            Err(EstimationError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn test_memory_rounds_up_to_whole_mb() {
        let dir = TempDir::new().unwrap();
        for (kb, mb) in [(1u64, 1u64), (1024, 1), (1025, 2), (2048, 2)] {
            let probe = fixture_probe(&dir, "", &format!("MemTotal: {kb} kB\n"));
            assert_eq!(probe.total_memory_mb().unwrap(), mb, "kb={kb}");
        }
    }

    #[test]
    fn test_memory_rejects_wrong_field_count() {
        let dir = TempDir::new().unwrap();
        for meminfo in ["MemTotal: 1024\n", "MemTotal: 1024 kB extra\n", "\n"] {
            let probe = fixture_probe(&dir, "", meminfo);
            assert!(probe.total_memory_mb().is_err(), "meminfo={meminfo:?}");
        }
    }

    #[test]
    fn test_memory_rejects_non_numeric_value() {
        let dir = TempDir::new().unwrap();
        let probe = fixture_probe(&dir, "", "MemTotal: lots kB\n");
        assert!(probe.total_memory_mb().is_err());
    }

    #[test]
    fn test_parse_first_line() {
        assert_eq!(parse_first_line("8\n"), Some(8));
        assert_eq!(parse_first_line("  16  \nrest\n"), Some(16));
        assert_eq!(parse_first_line(""), None);
        assert_eq!(parse_first_line("eight\n"), None);
    }

    struct FakeProbe {
        physical: u32,
        logical: u32,
        memory_mb: u64,
        fail_memory: bool,
    }

    impl CapabilityProbe for FakeProbe {
        fn physical_core_count(&self) -> Result<u32, EstimationError> {
            Ok(self.physical)
        }
        fn logical_core_count(&self) -> Result<u32, EstimationError> {
            Ok(self.logical)
        }
        fn total_memory_mb(&self) -> Result<u64, EstimationError> {
            if self.fail_memory {
                Err(EstimationError::malformed(
                    Metric::TotalMemory,
                    "/fake/meminfo",
                    "source is empty",
                ))
            } else {
                Ok(self.memory_mb)
            }
        }
    }

    #[test]
    fn test_from_probe_is_atomic() {
        let probe = FakeProbe {
            physical: 8,
            logical: 16,
            memory_mb: 64 * 1024,
            fail_memory: true,
        };
        assert!(HostCapability::from_probe(&probe).is_err());
    }

    #[test]
    fn test_from_probe_is_idempotent() {
        let probe = FakeProbe {
            physical: 8,
            logical: 16,
            memory_mb: 64 * 1024,
            fail_memory: false,
        };
        let first = HostCapability::from_probe(&probe).unwrap();
        let second = HostCapability::from_probe(&probe).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.physical_cores, 8);
        assert_eq!(first.logical_cores, 16);
        assert_eq!(first.total_memory_mb, 64 * 1024);
    }

    proptest! {
        /// The reported MB count is the least M with M * 1024 >= K.
        #[test]
        fn prop_memory_is_least_covering_mb(kb in 1u64..(1u64 << 40)) {
            let dir = TempDir::new().unwrap();
            let probe = fixture_probe(&dir, "", &format!("MemTotal: {kb} kB\n"));
            let mb = probe.total_memory_mb().unwrap();
            prop_assert!(mb * 1024 >= kb);
            prop_assert!((mb - 1) * 1024 < kb);
        }
    }
}
