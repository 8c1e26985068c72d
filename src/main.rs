//! varprep CLI - Variant-Calling Run Preparation
//!
//! Probes host compute capability and validates workflow run
//! configurations for genomic variant-calling pipelines.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::fs;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use varprep::config::{CliArgs, Commands, ConfigureArgs, InstallLayout, WorkflowConfig, WorkflowOptions};
use varprep::system::HostCapability;

/// Provenance wrapper written next to the run scripts so a finished run
/// can always be traced back to the exact configuration that produced it.
#[derive(Serialize)]
struct ProvenanceRecord<'a> {
    version: &'a str,
    created: DateTime<Utc>,
    config: &'a WorkflowConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    match args.command {
        Commands::Probe { json } => cmd_probe(json),
        Commands::Configure(configure) => cmd_configure(configure),
    }
}

fn cmd_probe(json: bool) -> anyhow::Result<()> {
    let capability = HostCapability::detect()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&capability)?);
    } else {
        capability.print_summary();
    }
    Ok(())
}

fn cmd_configure(args: ConfigureArgs) -> anyhow::Result<()> {
    if let Some(libexec_dir) = &args.libexec_dir {
        let layout = InstallLayout::discover(libexec_dir)?;
        debug!(
            samtools = %layout.samtools.display(),
            tabix = %layout.tabix.display(),
            "resolved helper executables"
        );
    }

    let options = WorkflowOptions::from_cli(&args);
    let config = options.validate()?;

    fs::create_dir_all(&config.run_dir).with_context(|| {
        format!("can't create run directory '{}'", config.run_dir.display())
    })?;

    let record = ProvenanceRecord {
        version: varprep::VERSION,
        created: Utc::now(),
        config: &config,
    };
    let record_path = config.run_dir.join("workflow.config.json");
    let payload = serde_json::to_vec_pretty(&record)?;
    fs::write(&record_path, payload).with_context(|| {
        format!("can't write configuration record '{}'", record_path.display())
    })?;
    info!(path = %record_path.display(), "wrote workflow configuration");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print_run_summary(&config, &args);
    }
    Ok(())
}

fn print_run_summary(config: &WorkflowConfig, args: &ConfigureArgs) {
    println!("=== Run Configuration ===");
    println!("  Run directory: {}", config.run_dir.display());
    println!("  Reference:     {}", config.reference_fasta.display());
    if config.regions.is_whole_genome() {
        println!("  Regions:       whole genome");
    } else {
        for region in config.regions.regions() {
            println!("  Region:        {region}");
        }
    }
    println!("  Scan size:     {} Mb", config.scan_size_mb);
    println!(
        "  Call memory:   {} MB ({:?} mode)",
        config.call_mem_mb(args.mode),
        args.mode
    );

    // parallelism/memory guidance from the host probe; advisory only, a
    // cluster submission host need not resemble the compute nodes
    match HostCapability::detect() {
        Ok(capability) => {
            println!();
            println!("Host guidance:");
            println!("  Task slots:    {}", capability.logical_cores);
            println!(
                "  Memory / slot: {} MB",
                capability.total_memory_mb / u64::from(capability.logical_cores.max(1))
            );
        }
        Err(e) => warn!("host capability unavailable, skipping guidance: {e}"),
    }
}
