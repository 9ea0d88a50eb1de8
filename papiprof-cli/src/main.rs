// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! papiprof CLI
//!
//! Command-line interface for the client/server profiling harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// papiprof - Profile a client/server pair across ciphersuites and payload sizes
#[derive(Parser)]
#[command(name = "papiprof")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Harness configuration file (warm-up, deadline, tracked metrics)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging, including captured program output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile and collect metrics into JSON files named
    /// [client|server].papi.out.<ciphersuite_id>.<bytes_sent>.<bytes_received>
    Profile(commands::profile::ProfileArgs),

    /// Print averaged metrics from a directory of profiling outputs
    Report {
        /// Ciphersuite list used to map ids to display names
        ciphers: PathBuf,

        /// Directory containing the JSON profiling outputs
        path: PathBuf,

        /// Present client metrics
        #[arg(long, conflicts_with = "server", required_unless_present = "server")]
        client: bool,

        /// Present server metrics
        #[arg(long)]
        server: bool,
    },

    /// Validate a harness configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Profile(args) => {
            commands::profile::execute(args, cli.config.as_deref()).await
        }
        Commands::Report {
            ciphers,
            path,
            client,
            server: _,
        } => commands::report::execute(&ciphers, &path, client).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
