// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `papiprof profile` command - Run the ciphersuite/payload sweep.

use std::path::{Path, PathBuf};

use clap::Args;

use papiprof_core::process::RunCoordinator;
use papiprof_core::{
    load_cipher_suites, ByteRange, ConfigLoader, HarnessConfig, PayloadSweep, SummaryStore,
    SweepConfig, SweepCounters, SweepDriver, SweepPlan,
};

#[derive(Args)]
pub struct ProfileArgs {
    /// Client program path
    pub client: PathBuf,

    /// Server program path
    pub server: PathBuf,

    /// Number of times to run each configuration
    pub runs: u32,

    /// File listing ciphersuites, one per line: <id> <name> [info...]
    pub ciphers: PathBuf,

    /// Client bytes to send: start value
    pub cli_bytes_start: u64,

    /// Client bytes to send: end value (exclusive)
    pub cli_bytes_end: u64,

    /// Client bytes to send: step
    pub cli_bytes_step: u64,

    /// Server bytes to send: start value
    pub srv_bytes_start: u64,

    /// Server bytes to send: end value (exclusive)
    pub srv_bytes_end: u64,

    /// Server bytes to send: step
    pub srv_bytes_step: u64,

    /// Output directory for the profiled results
    pub out: PathBuf,
}

impl ProfileArgs {
    fn into_plan(self) -> SweepPlan {
        SweepPlan {
            client_path: self.client,
            server_path: self.server,
            runs: self.runs,
            ciphers_path: self.ciphers,
            client_bytes: ByteRange::new(
                self.cli_bytes_start,
                self.cli_bytes_end,
                self.cli_bytes_step,
            ),
            server_bytes: ByteRange::new(
                self.srv_bytes_start,
                self.srv_bytes_end,
                self.srv_bytes_step,
            ),
            out_dir: self.out,
        }
    }
}

pub async fn execute(
    args: ProfileArgs,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let harness = match config_path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => HarnessConfig::default(),
    };

    // Fail fast on an invalid plan, before any process is launched
    let config = SweepConfig::new(args.into_plan(), harness)?;
    let plan = &config.plan;
    let harness = &config.harness;

    print_banner(&config);

    if plan.server_bytes.is_collapsed() {
        println!("\t[!] Setting server send bytes to zero");
    }
    if plan.client_bytes.is_collapsed() {
        println!("\t[!] Setting client send bytes to zero");
    }

    let suites = load_cipher_suites(&plan.ciphers_path)?;
    println!("Parsed {} ciphersuites", suites.len());

    let payloads = PayloadSweep::new(
        plan.client_bytes.values(),
        plan.server_bytes.values(),
        harness.default_payload_bytes,
    );

    let store = SummaryStore::open(&plan.out_dir)?;
    let coordinator = RunCoordinator::new(&plan.server_path, &plan.client_path, harness.warmup)
        .deadline(harness.trial_timeout);
    let driver = SweepDriver::new(coordinator, harness, plan.runs, store)?;

    tracing::info!(
        suites = suites.len(),
        steps = payloads.len(),
        runs = plan.runs,
        "Starting sweep"
    );

    let counters = driver.run(&suites, &payloads).await?;

    print_statistics(&counters, harness.abnormal_exit_code);

    Ok(())
}

fn print_banner(config: &SweepConfig) {
    let plan = &config.plan;
    let harness = &config.harness;

    println!("Running with configurations:");
    println!("\tClient Path: {}", plan.client_path.display());
    println!("\tServer Path: {}", plan.server_path.display());
    println!("\tCiphersuite List Path: {}", plan.ciphers_path.display());
    println!(
        "\tClient bytes to send start, end, step: {} {} {}",
        plan.client_bytes.start, plan.client_bytes.end, plan.client_bytes.step
    );
    println!(
        "\tServer bytes to send start, end, step: {} {} {}",
        plan.server_bytes.start, plan.server_bytes.end, plan.server_bytes.step
    );
    println!("\tOutput directory: {}", plan.out_dir.display());
    println!("\tRuns per configuration: {}", plan.runs);
    println!("\tWarm-up: {}ms", harness.warmup.as_millis());
    match harness.trial_timeout {
        Some(timeout) => println!("\tDeadline per process: {}s", timeout.as_secs()),
        None => println!("\tDeadline per process: none"),
    }
    let metrics: Vec<&str> = harness.metrics.iter().map(|m| m.as_str()).collect();
    println!("\tTracked metrics: {}", metrics.join(", "));
    println!();
}

fn print_statistics(counters: &SweepCounters, abnormal_exit_code: i32) {
    println!();
    println!("--- STATISTICS ---");
    println!("\tTotal ciphersuites:     {}", counters.cipher_suites);
    println!("\tConfigurations:         {}", counters.configurations);
    println!("\tMeasured:               {}", counters.measured_configurations());
    println!("\tEmpty:                  {}", counters.empty_configurations);
    println!("\tTrials:                 {}", counters.trials);
    println!("\tSkipped trials:         {}", counters.skipped_trials);
    println!("\tIncomplete functions:   {}", counters.incomplete_functions);
    println!(
        "\tExit code {} trials:   {}",
        abnormal_exit_code, counters.abnormal_exits
    );

    if counters.abnormal_exits > 0 {
        println!();
        println!(
            "[!!!] Exit code {} detected! Make sure the programs are not compiled or \
             linked with \"-pg\" (gprof): its profiling timer conflicts with the PAPI \
             instrumentation.",
            abnormal_exit_code
        );
    }
}
