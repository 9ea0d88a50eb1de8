// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `papiprof report` command - Print averaged metrics from persisted results.
//!
//! Regroups every output file of one entity by function and ciphersuite
//! display name and prints the rounded averages.

use std::path::Path;

use papiprof_core::ciphersuite::names_by_id;
use papiprof_core::report::collect_by_suite;
use papiprof_core::{load_cipher_suites, Entity, SummaryStore};

pub async fn execute(
    ciphers: &Path,
    path: &Path,
    client: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let entity = if client { Entity::Client } else { Entity::Server };

    if !path.is_dir() {
        return Err(format!("Results directory not found: {}", path.display()).into());
    }

    let names = names_by_id(&load_cipher_suites(ciphers)?);
    let store = SummaryStore::open(path)?;
    let files = store.list(entity)?;

    tracing::info!(entity = %entity, files = files.len(), "Parsing results");

    let summaries = files
        .iter()
        .map(SummaryStore::load)
        .collect::<Result<Vec<_>, _>>()?;

    let view = collect_by_suite(&summaries, &names);

    if view.is_empty() {
        println!("No {} results found in {}", entity, path.display());
        return Ok(());
    }

    for (function, suites) in &view {
        println!("{}", function);
        for (suite_name, metrics) in suites {
            println!("\t{}", suite_name);
            for (metric, summary) in metrics {
                println!("\t\t{}", metric);
                println!("\t\t\tAVG: {}", summary.avg.round());
            }
        }
    }

    Ok(())
}
