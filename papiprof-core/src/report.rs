// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Persistence of summary statistics.
//!
//! One JSON file per entity and configuration, named
//! `<entity>.papi.out.<ciphersuite>.<bytes_sent>.<bytes_received>`.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ProfError, ProfResult};
use crate::stats::{MetricSummary, SummaryStatistics};
use crate::types::{CipherSuiteId, Entity, Metric};

/// Infix shared by every persisted file name.
const FILE_INFIX: &str = "papi.out";

/// Function -> ciphersuite display name -> metric -> summary.
pub type SuiteView = BTreeMap<String, BTreeMap<String, BTreeMap<Metric, MetricSummary>>>;

/// Writes and reads persisted summaries in one output directory.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    out_dir: PathBuf,
}

impl SummaryStore {
    /// Open a store, creating the output directory (and parents) if needed.
    pub fn open(out_dir: impl AsRef<Path>) -> ProfResult<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();

        if !out_dir.exists() {
            tracing::info!(dir = %out_dir.display(), "Creating output directory");
            fs::create_dir_all(&out_dir).map_err(|e| ProfError::Io {
                context: "creating output directory",
                path: out_dir.clone(),
                source: e,
            })?;
        }

        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path of the file for one entity and configuration.
    pub fn path_for(
        &self,
        entity: Entity,
        cipher_suite: &CipherSuiteId,
        bytes_sent: u64,
        bytes_received: u64,
    ) -> PathBuf {
        self.out_dir.join(format!(
            "{}.{}.{}.{}.{}",
            entity, FILE_INFIX, cipher_suite, bytes_sent, bytes_received
        ))
    }

    /// Write a summary, replacing any previous file. Returns the path written.
    pub fn save(
        &self,
        entity: Entity,
        cipher_suite: &CipherSuiteId,
        bytes_sent: u64,
        bytes_received: u64,
        summary: &SummaryStatistics,
    ) -> ProfResult<PathBuf> {
        let path = self.path_for(entity, cipher_suite, bytes_sent, bytes_received);

        let file = File::create(&path).map_err(|e| ProfError::Io {
            context: "creating summary file",
            path: path.clone(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| ProfError::Json {
            path: path.clone(),
            source: e,
        })?;
        writer.flush().map_err(|e| ProfError::Io {
            context: "writing summary file",
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), functions = summary.len(), "Saved summary");

        Ok(path)
    }

    /// Load a persisted summary.
    pub fn load(path: impl AsRef<Path>) -> ProfResult<SummaryStatistics> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| ProfError::Io {
            context: "opening summary file",
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ProfError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// List persisted files of one entity, sorted by name.
    pub fn list(&self, entity: Entity) -> ProfResult<Vec<PathBuf>> {
        let prefix = format!("{}.{}.", entity, FILE_INFIX);
        let io_err = |e| ProfError::Io {
            context: "listing output directory",
            path: self.out_dir.clone(),
            source: e,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.out_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let matches = path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix));
            if matches {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Regroup persisted summaries by function and ciphersuite display name.
///
/// Ids missing from `names` are shown as-is. When several files describe
/// the same function and ciphersuite (different payload sizes), the later
/// one in `summaries` wins.
pub fn collect_by_suite(
    summaries: &[SummaryStatistics],
    names: &HashMap<String, String>,
) -> SuiteView {
    let mut view = SuiteView::new();

    for summary in summaries {
        for (function, configs) in summary {
            let by_suite = view.entry(function.clone()).or_default();
            for (cipher_id, config) in configs {
                let name = names
                    .get(cipher_id)
                    .cloned()
                    .unwrap_or_else(|| cipher_id.clone());
                by_suite.insert(name, config.metrics.clone());
            }
        }
    }

    view
}
