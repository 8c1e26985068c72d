//! Configuration settings for varprep
//!
//! Defines the CLI argument surface, the raw workflow option set with its
//! defaults table, and the validated workflow configuration handed to
//! downstream task-graph generation.

use crate::region::RegionSet;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default run output directory
pub const DEFAULT_RUN_DIR: &str = "variantCallWorkflow";

/// Default maximum genome span (in megabases) scanned per task
pub const DEFAULT_SCAN_SIZE_MB: u32 = 12;

/// Default variant-calling task memory limit for distributed-queue runs.
///
/// Queue limits must sit above the highest memory use ever expected in
/// production; exceeding the limit fails the job.
pub const CALL_MEM_MB_QUEUE: u32 = 4 * 1024;

/// Default variant-calling task memory limit for single-host runs.
///
/// Local limits only need to sit above the highest mean memory use;
/// exceeding the mean costs swap, not the run.
pub const CALL_MEM_MB_LOCAL: u32 = 2 * 1024;

/// varprep - Run preparation for genomic variant-calling pipelines
#[derive(Parser, Debug, Clone)]
#[command(name = "varprep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probe host capability and prepare variant-calling run configurations")]
pub struct CliArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Probe the host's compute capability (cores, memory)
    #[command(name = "probe")]
    Probe {
        /// Emit the capability record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate workflow options and prepare a run directory
    #[command(name = "configure")]
    Configure(ConfigureArgs),
}

/// Options for the `configure` subcommand.
///
/// These mirror the workflow option surface one-for-one; defaults are
/// shared with [`WorkflowOptions::defaults`] through the constants above.
#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// samtools-indexed reference fasta file [required]
    #[arg(long, value_name = "FILE")]
    pub reference_fasta: Option<PathBuf>,

    /// VCF of candidate indel alleles, tabix indexed. These alleles are
    /// always evaluated but only reported when inferred to exist in the
    /// sample. May be given more than once; inputs are merged downstream.
    #[arg(long = "indel-candidates", value_name = "FILE")]
    pub indel_candidates: Vec<PathBuf>,

    /// VCF of forced-genotype alleles, tabix indexed. These alleles are
    /// always evaluated and reported even when unlikely to exist in the
    /// sample. May be given more than once.
    #[arg(long = "forced-gt", value_name = "FILE")]
    pub forced_genotypes: Vec<PathBuf>,

    /// Limit the analysis to a genome region, e.g. 'chr20' or
    /// 'chr2:100-2000'. May be given more than once; all regions must be
    /// non-overlapping for a meaningful result.
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Run script and output directory
    #[arg(long = "run-dir", default_value = DEFAULT_RUN_DIR, value_name = "DIR")]
    pub run_dir: PathBuf,

    /// Maximum sequence region size (in megabases) scanned by each task
    #[arg(long = "scan-size-mb", default_value_t = DEFAULT_SCAN_SIZE_MB, value_name = "INT")]
    pub scan_size_mb: u32,

    /// Override the variant-calling task memory limit (in megabytes).
    /// Rarely needed outside samples of unusual depth.
    #[arg(long = "call-mem-mb", value_name = "INT")]
    pub call_mem_mb: Option<u32>,

    /// Set options for WES input: turn off depth filters
    #[arg(long)]
    pub exome: bool,

    /// Keep all temporary files (for workflow debugging)
    #[arg(long = "retain-temp-files")]
    pub retain_temp_files: bool,

    /// Disable empirical variant scoring
    #[arg(long = "disable-scoring")]
    pub disable_scoring: bool,

    /// Report all empirical scoring features in VCF output
    #[arg(long = "report-scoring-features")]
    pub report_scoring_features: bool,

    /// Execution environment the memory defaults are picked for
    #[arg(long, value_enum, default_value = "local")]
    pub mode: ExecutionMode,

    /// Directory holding the sibling helper executables (bgzip, tabix, ...)
    #[arg(long = "libexec-dir", value_name = "DIR")]
    pub libexec_dir: Option<PathBuf>,

    /// Also print the validated configuration as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execution environment a run is prepared for.
///
/// Selects which built-in memory default applies when no override is set.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single-host execution
    #[default]
    Local,
    /// Distributed-queue (SGE-style) execution
    Queue,
}

/// Raw, possibly-missing workflow options before validation.
///
/// Produced by [`WorkflowOptions::defaults`] (the defaults table) and
/// overridden from user input; consumed by
/// [`validate`](crate::config::validate), which turns it into a
/// [`WorkflowConfig`] or rejects it.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Run output directory; a relative path is resolved later
    pub run_dir: Option<PathBuf>,
    /// Reference genome fasta
    pub reference_fasta: Option<PathBuf>,
    /// Candidate indel allele VCFs
    pub indel_candidates: Vec<PathBuf>,
    /// Forced-genotype allele VCFs
    pub forced_genotypes: Vec<PathBuf>,
    /// Raw region restriction strings, unparsed
    pub region_strings: Vec<String>,
    /// Maximum genome span per task, in megabases
    pub scan_size_mb: u32,
    /// User override of the per-task call memory limit
    pub call_mem_mb_override: Option<u32>,
    /// Whole-exome input: depth filters are turned off downstream
    pub is_exome: bool,
    /// Keep temporary files for workflow debugging
    pub is_retain_temp_files: bool,
    /// Empirical variant scoring enabled
    pub is_empirical_scoring: bool,
    /// Report empirical scoring features in output
    pub is_report_scoring_features: bool,
    /// Exact argument vector of this invocation, kept for provenance
    pub command_line: Vec<String>,
}

impl WorkflowOptions {
    /// The defaults table: every recognized option with its named default.
    ///
    /// This is the single place defaults are declared; the CLI surface
    /// references the same constants.
    pub fn defaults() -> Self {
        Self {
            run_dir: Some(PathBuf::from(DEFAULT_RUN_DIR)),
            reference_fasta: None,
            indel_candidates: Vec::new(),
            forced_genotypes: Vec::new(),
            region_strings: Vec::new(),
            scan_size_mb: DEFAULT_SCAN_SIZE_MB,
            call_mem_mb_override: None,
            is_exome: false,
            is_retain_temp_files: false,
            is_empirical_scoring: true,
            is_report_scoring_features: false,
            command_line: std::env::args().collect(),
        }
    }

    /// Populate options from parsed CLI arguments.
    pub fn from_cli(args: &ConfigureArgs) -> Self {
        Self {
            run_dir: Some(args.run_dir.clone()),
            reference_fasta: args.reference_fasta.clone(),
            indel_candidates: args.indel_candidates.clone(),
            forced_genotypes: args.forced_genotypes.clone(),
            region_strings: args.regions.clone(),
            scan_size_mb: args.scan_size_mb,
            call_mem_mb_override: args.call_mem_mb,
            is_exome: args.exome,
            is_retain_temp_files: args.retain_temp_files,
            is_empirical_scoring: !args.disable_scoring,
            is_report_scoring_features: args.report_scoring_features,
            ..Self::defaults()
        }
    }
}

/// The validated, immutable run plan.
///
/// Every path-valued field is absolute and every referenced file exists
/// with its companion index; downstream task-graph generation consumes
/// this without re-checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Absolute run output directory; may not exist yet
    pub run_dir: PathBuf,
    /// Absolute path to the reference fasta; its `.fai` index exists
    pub reference_fasta: PathBuf,
    /// Absolute candidate indel VCF paths; tabix indices exist
    pub indel_candidates: Vec<PathBuf>,
    /// Absolute forced-genotype VCF paths; tabix indices exist
    pub forced_genotypes: Vec<PathBuf>,
    /// Genome regions the analysis is restricted to
    pub regions: RegionSet,
    /// Maximum genome span per task, in megabases
    pub scan_size_mb: u32,
    /// User override of the per-task call memory limit
    pub call_mem_mb_override: Option<u32>,
    /// Whole-exome input
    pub is_exome: bool,
    /// Keep temporary files
    pub is_retain_temp_files: bool,
    /// Empirical variant scoring enabled
    pub is_empirical_scoring: bool,
    /// Report empirical scoring features
    pub is_report_scoring_features: bool,
    /// Exact argument vector of this invocation
    pub command_line: Vec<String>,
}

impl WorkflowConfig {
    /// Per-task call memory limit: the override if one was given, else
    /// the built-in default for the execution mode.
    pub fn call_mem_mb(&self, mode: ExecutionMode) -> u32 {
        self.call_mem_mb_override.unwrap_or(match mode {
            ExecutionMode::Local => CALL_MEM_MB_LOCAL,
            ExecutionMode::Queue => CALL_MEM_MB_QUEUE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::GenomeRegion;

    #[test]
    fn test_defaults_table() {
        let options = WorkflowOptions::defaults();
        assert_eq!(options.run_dir, Some(PathBuf::from("variantCallWorkflow")));
        assert_eq!(options.reference_fasta, None);
        assert!(options.indel_candidates.is_empty());
        assert!(options.forced_genotypes.is_empty());
        assert!(options.region_strings.is_empty());
        assert_eq!(options.scan_size_mb, 12);
        assert_eq!(options.call_mem_mb_override, None);
        assert!(!options.is_exome);
        assert!(!options.is_retain_temp_files);
        assert!(options.is_empirical_scoring);
        assert!(!options.is_report_scoring_features);
    }

    fn sample_config(call_mem_mb_override: Option<u32>) -> WorkflowConfig {
        WorkflowConfig {
            run_dir: PathBuf::from("/runs/demo"),
            reference_fasta: PathBuf::from("/data/ref.fa"),
            indel_candidates: Vec::new(),
            forced_genotypes: Vec::new(),
            regions: RegionSet::Restricted(vec![GenomeRegion::whole_chrom("chr21")]),
            scan_size_mb: DEFAULT_SCAN_SIZE_MB,
            call_mem_mb_override,
            is_exome: false,
            is_retain_temp_files: false,
            is_empirical_scoring: true,
            is_report_scoring_features: false,
            command_line: vec!["varprep".to_string()],
        }
    }

    #[test]
    fn test_call_mem_mb_mode_defaults() {
        let config = sample_config(None);
        assert_eq!(config.call_mem_mb(ExecutionMode::Local), 2048);
        assert_eq!(config.call_mem_mb(ExecutionMode::Queue), 4096);
    }

    #[test]
    fn test_call_mem_mb_override_wins() {
        let config = sample_config(Some(9000));
        assert_eq!(config.call_mem_mb(ExecutionMode::Local), 9000);
        assert_eq!(config.call_mem_mb(ExecutionMode::Queue), 9000);
    }

    #[test]
    fn test_cli_args_parse() {
        let args = CliArgs::try_parse_from([
            "varprep",
            "configure",
            "--reference-fasta",
            "/data/ref.fa",
            "--indel-candidates",
            "/data/a.vcf.gz",
            "--indel-candidates",
            "/data/b.vcf.gz",
            "--region",
            "chr20",
            "--disable-scoring",
            "--mode",
            "queue",
        ])
        .unwrap();

        let Commands::Configure(configure) = args.command else {
            panic!("expected configure subcommand");
        };
        let options = WorkflowOptions::from_cli(&configure);
        assert_eq!(options.reference_fasta, Some(PathBuf::from("/data/ref.fa")));
        assert_eq!(options.indel_candidates.len(), 2);
        assert_eq!(options.region_strings, vec!["chr20".to_string()]);
        assert!(!options.is_empirical_scoring);
        assert_eq!(options.run_dir, Some(PathBuf::from(DEFAULT_RUN_DIR)));
        assert_eq!(configure.mode, ExecutionMode::Queue);
    }
}
