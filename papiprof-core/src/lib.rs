// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! papiprof Core Library
//!
//! Profiling harness for instrumented client/server programs. Launches a
//! server and a client per trial, parses the PAPI counters they print,
//! accumulates repeated trials and persists mean/stdev per function for
//! every (ciphersuite, payload size) configuration.

pub mod accumulator;
pub mod ciphersuite;
pub mod config;
pub mod error;
pub mod parser;
pub mod process;
pub mod report;
pub mod stats;
pub mod sweep;
pub mod types;

// Re-export commonly used types
pub use accumulator::{FunctionSamples, MetricAccumulator};
pub use ciphersuite::{load_cipher_suites, CipherSuite};
pub use config::{ByteRange, ConfigLoader, HarnessConfig, SweepConfig, SweepPlan};
pub use error::{ConfigError, ProfError, ProfResult, RunnerError, StatsError};
pub use parser::{MetricParser, TrialMetrics};
pub use process::{RawRunResult, RunCoordinator, TrialLauncher, TrialOutcome};
pub use report::SummaryStore;
pub use stats::{summarize, ConfigurationSummary, MetricSummary, SummaryStatistics};
pub use sweep::{PayloadSweep, SweepCounters, SweepDriver};
pub use types::{CipherSuiteId, Entity, Metric};
