// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `papiprof validate` command - Validate a harness configuration file.

use std::path::Path;

use papiprof_core::ConfigLoader;

pub async fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Harness Settings:");
            println!("  Warm-up:             {}ms", config.warmup.as_millis());
            match config.trial_timeout {
                Some(timeout) => println!("  Deadline:            {}s", timeout.as_secs()),
                None => println!("  Deadline:            disabled"),
            }
            println!("  Abnormal exit code:  {}", config.abnormal_exit_code);
            println!("  Default payload:     {} bytes", config.default_payload_bytes);
            println!();
            println!("Tracked metrics ({}):", config.metrics.len());
            for metric in &config.metrics {
                println!("  - {}", metric);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
