// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep driver.
//!
//! Walks every ciphersuite and, for each, a paired sweep of client/server
//! payload sizes. Every configuration gets `runs` trials; failed trials are
//! discarded and counted, never retried. After the trials the client and
//! server samples are reduced to statistics and persisted.

use std::path::PathBuf;

use crate::accumulator::MetricAccumulator;
use crate::ciphersuite::CipherSuite;
use crate::config::HarnessConfig;
use crate::error::{ProfResult, RunnerError};
use crate::parser::MetricParser;
use crate::process::{RawRunResult, TrialLauncher, TrialOutcome};
use crate::report::SummaryStore;
use crate::stats::{summarize, SummaryStatistics};
use crate::types::{Entity, Metric};

/// One step of the paired payload sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadStep {
    pub client_bytes: u64,
    pub server_bytes: u64,
}

/// Client and server payload lists walked side by side.
///
/// The sweep has as many steps as the longer list; the shorter one is padded
/// with the default payload size.
#[derive(Debug, Clone)]
pub struct PayloadSweep {
    client: Vec<u64>,
    server: Vec<u64>,
    default_bytes: u64,
}

impl PayloadSweep {
    pub fn new(client: Vec<u64>, server: Vec<u64>, default_bytes: u64) -> Self {
        Self {
            client,
            server,
            default_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.client.len().max(self.server.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn steps(&self) -> impl Iterator<Item = PayloadStep> + '_ {
        (0..self.len()).map(move |i| PayloadStep {
            client_bytes: self.client.get(i).copied().unwrap_or(self.default_bytes),
            server_bytes: self.server.get(i).copied().unwrap_or(self.default_bytes),
        })
    }
}

/// One row of the benchmark matrix.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub suite: CipherSuite,
    pub client_bytes: u64,
    pub server_bytes: u64,
}

impl Configuration {
    /// Key under which this configuration's samples are stored.
    pub fn key(&self) -> &str {
        self.suite.id.as_str()
    }
}

/// Counters reported to the operator at the end of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepCounters {
    pub cipher_suites: usize,
    pub configurations: usize,
    pub trials: u64,
    /// Trials discarded because a process failed.
    pub skipped_trials: u64,
    /// Failed trials whose exit code matched the abnormal-termination signature.
    pub abnormal_exits: u64,
    /// Configurations where no trial succeeded.
    pub empty_configurations: usize,
    /// Functions left out of a successful trial for missing a tracked metric.
    pub incomplete_functions: u64,
}

impl SweepCounters {
    /// Configurations with at least one successful trial.
    pub fn measured_configurations(&self) -> usize {
        self.configurations - self.empty_configurations
    }
}

/// Persisted result of one configuration.
#[derive(Debug, Clone)]
pub struct ConfigurationReport {
    pub successful_trials: u32,
    pub client: SummaryStatistics,
    pub server: SummaryStatistics,
    pub client_file: PathBuf,
    pub server_file: PathBuf,
}

/// Progress position inside the whole sweep.
#[derive(Debug, Clone, Copy, Default)]
struct Progress {
    completed: u64,
    total: u64,
}

/// Drives the full sweep through a [`TrialLauncher`].
pub struct SweepDriver<L> {
    launcher: L,
    parser: MetricParser,
    tracked: Vec<Metric>,
    store: SummaryStore,
    runs: u32,
    abnormal_exit_code: i32,
}

impl<L: TrialLauncher> SweepDriver<L> {
    pub fn new(
        launcher: L,
        harness: &HarnessConfig,
        runs: u32,
        store: SummaryStore,
    ) -> ProfResult<Self> {
        Ok(Self {
            launcher,
            parser: MetricParser::new(&harness.metrics)?,
            tracked: harness.metrics.clone(),
            store,
            runs,
            abnormal_exit_code: harness.abnormal_exit_code,
        })
    }

    /// Run every configuration of the matrix.
    ///
    /// Failed trials never abort the sweep; only persistence failures do.
    pub async fn run(
        &self,
        suites: &[CipherSuite],
        payloads: &PayloadSweep,
    ) -> ProfResult<SweepCounters> {
        let mut counters = SweepCounters {
            cipher_suites: suites.len(),
            ..SweepCounters::default()
        };
        let mut progress = Progress {
            completed: 0,
            total: (suites.len() * payloads.len()) as u64 * u64::from(self.runs),
        };

        if payloads.is_empty() {
            tracing::warn!("Payload sweep is empty, nothing to run");
        }

        for suite in suites {
            for step in payloads.steps() {
                let configuration = Configuration {
                    suite: suite.clone(),
                    client_bytes: step.client_bytes,
                    server_bytes: step.server_bytes,
                };
                self.run_configuration(&configuration, &mut counters, &mut progress)
                    .await?;
            }

            tracing::info!(
                suite = %suite.label(),
                name = %suite.name,
                completed = progress.completed,
                total = progress.total,
                "Finished ciphersuite"
            );
        }

        Ok(counters)
    }

    async fn run_configuration(
        &self,
        configuration: &Configuration,
        counters: &mut SweepCounters,
        progress: &mut Progress,
    ) -> ProfResult<ConfigurationReport> {
        let suite = &configuration.suite;
        let mut client_acc = MetricAccumulator::new(&self.tracked);
        let mut server_acc = MetricAccumulator::new(&self.tracked);
        let mut successful_trials = 0;

        counters.configurations += 1;

        for run in 1..=self.runs {
            progress.completed += 1;
            counters.trials += 1;

            tracing::info!(
                suite = %suite.label(),
                name = %suite.name,
                client_bytes = configuration.client_bytes,
                server_bytes = configuration.server_bytes,
                "Trial [{}/{} Run {}/{}]",
                progress.completed,
                progress.total,
                run,
                self.runs
            );

            let outcome = self
                .launcher
                .launch(&suite.id, configuration.client_bytes, configuration.server_bytes)
                .await;

            if self.absorb_trial(
                outcome,
                configuration.key(),
                &mut client_acc,
                &mut server_acc,
                counters,
            ) {
                successful_trials += 1;
            }
        }

        if successful_trials == 0 {
            counters.empty_configurations += 1;
        }

        log_extremes(Entity::Client, &client_acc, configuration.key());
        log_extremes(Entity::Server, &server_acc, configuration.key());

        let client = summarize(&client_acc)?;
        let server = summarize(&server_acc)?;

        let client_file = self.store.save(
            Entity::Client,
            &suite.id,
            configuration.client_bytes,
            configuration.server_bytes,
            &client,
        )?;
        let server_file = self.store.save(
            Entity::Server,
            &suite.id,
            configuration.server_bytes,
            configuration.client_bytes,
            &server,
        )?;

        tracing::info!(
            suite = %suite.label(),
            successful_trials,
            runs = self.runs,
            client_file = %client_file.display(),
            server_file = %server_file.display(),
            "Configuration persisted"
        );

        Ok(ConfigurationReport {
            successful_trials,
            client,
            server,
            client_file,
            server_file,
        })
    }

    /// Fold a trial into both accumulators, or discard it and count why.
    ///
    /// Returns true when the trial was accepted. Either both sides are folded
    /// or neither is.
    fn absorb_trial(
        &self,
        outcome: TrialOutcome,
        config_key: &str,
        client_acc: &mut MetricAccumulator,
        server_acc: &mut MetricAccumulator,
        counters: &mut SweepCounters,
    ) -> bool {
        let (server, client) = match (outcome.server, outcome.client) {
            (Ok(server), Ok(client)) if server.succeeded() && client.succeeded() => {
                (server, client)
            }
            (server, client) => {
                counters.skipped_trials += 1;

                let abnormal = [&server, &client]
                    .into_iter()
                    .any(|r| matches!(r, Ok(run) if run.exit_code == self.abnormal_exit_code));
                if abnormal {
                    counters.abnormal_exits += 1;
                }

                tracing::warn!(
                    config = config_key,
                    server = %describe(&server),
                    client = %describe(&client),
                    abnormal,
                    "Trial failed, discarding"
                );
                return false;
            }
        };

        let client_metrics = self.parser.parse(&client.stdout);
        let server_metrics = self.parser.parse(&server.stdout);

        let client_report = client_acc.fold(&client_metrics, config_key);
        let server_report = server_acc.fold(&server_metrics, config_key);
        counters.incomplete_functions +=
            (client_report.incomplete.len() + server_report.incomplete.len()) as u64;

        true
    }
}

fn describe(result: &Result<RawRunResult, RunnerError>) -> String {
    match result {
        Ok(run) => format!("exit {}", run.exit_code),
        Err(e) => e.to_string(),
    }
}

fn log_extremes(entity: Entity, accumulator: &MetricAccumulator, config_key: &str) {
    for (function, configs) in accumulator.iter() {
        let Some(samples) = configs.get(config_key) else {
            continue;
        };
        for &metric in accumulator.tracked() {
            if let Some((min, max)) = samples.range(metric) {
                tracing::info!(
                    entity = %entity,
                    function,
                    metric = %metric,
                    num_runs = samples.num_runs(),
                    min,
                    max,
                    "Observed range"
                );
            }
        }
    }
}
