// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML harness configuration and sweep plan validation.
//!
//! The harness tuning file is optional; every field has a default. The sweep
//! plan comes from the command line. Both are validated once at boot and any
//! invalid field prevents the sweep from starting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ProfError, ProfResult};
use crate::types::Metric;

/// Raw harness configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHarnessConfig {
    #[serde(default = "default_warmup_ms")]
    warmup_ms: u64,
    #[serde(default = "default_trial_timeout_secs")]
    trial_timeout_secs: u64,
    #[serde(default = "default_abnormal_exit_code")]
    abnormal_exit_code: i32,
    #[serde(default)]
    default_payload_bytes: u64,
    #[serde(default = "default_metrics")]
    metrics: Vec<String>,
}

fn default_warmup_ms() -> u64 {
    1000 // one second for the server to start listening
}

fn default_trial_timeout_secs() -> u64 {
    300
}

fn default_abnormal_exit_code() -> i32 {
    -27 // killed by SIGPROF: a -pg build fighting the PAPI instrumentation
}

fn default_metrics() -> Vec<String> {
    Metric::DEFAULT_TRACKED
        .iter()
        .map(|m| m.as_str().to_string())
        .collect()
}

impl Default for RawHarnessConfig {
    fn default() -> Self {
        Self {
            warmup_ms: default_warmup_ms(),
            trial_timeout_secs: default_trial_timeout_secs(),
            abnormal_exit_code: default_abnormal_exit_code(),
            default_payload_bytes: 0,
            metrics: default_metrics(),
        }
    }
}

/// Validated harness tuning.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Delay between starting the server and starting the client.
    pub warmup: Duration,
    /// Per-process deadline. `None` lets a hung process block the sweep.
    pub trial_timeout: Option<Duration>,
    /// Exit code tallied separately as an instrumentation conflict.
    pub abnormal_exit_code: i32,
    /// Payload size used once the shorter byte list is exhausted.
    pub default_payload_bytes: u64,
    /// Ordered list of metrics the parser extracts.
    pub metrics: Vec<Metric>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        // The defaults always validate.
        Self {
            warmup: Duration::from_millis(default_warmup_ms()),
            trial_timeout: Some(Duration::from_secs(default_trial_timeout_secs())),
            abnormal_exit_code: default_abnormal_exit_code(),
            default_payload_bytes: 0,
            metrics: Metric::DEFAULT_TRACKED.to_vec(),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate harness configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> ProfResult<HarnessConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ProfError::Io {
            context: "reading config file",
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self::load_string(&content)?)
    }

    /// Load and validate harness configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn load_string(content: &str) -> Result<HarnessConfig, ConfigError> {
        let raw: RawHarnessConfig = if content.trim().is_empty() {
            RawHarnessConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::validate(raw)
    }

    fn validate(raw: RawHarnessConfig) -> Result<HarnessConfig, ConfigError> {
        const MAX_WARMUP_MS: u64 = 60_000;

        if raw.warmup_ms > MAX_WARMUP_MS {
            return Err(ConfigError::InvalidFieldValue {
                field: "warmup_ms",
                value: raw.warmup_ms.to_string(),
                reason: format!("Warm-up must not exceed {}ms", MAX_WARMUP_MS),
            });
        }

        let trial_timeout = match raw.trial_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let warmup = Duration::from_millis(raw.warmup_ms);
        if let Some(timeout) = trial_timeout {
            if timeout <= warmup {
                return Err(ConfigError::InvalidFieldValue {
                    field: "trial_timeout_secs",
                    value: raw.trial_timeout_secs.to_string(),
                    reason: "Deadline must be longer than the warm-up interval".to_string(),
                });
            }
        }

        if raw.metrics.is_empty() {
            return Err(ConfigError::InvalidFieldValue {
                field: "metrics",
                value: "[]".to_string(),
                reason: "At least one metric must be tracked".to_string(),
            });
        }

        let mut metrics = Vec::with_capacity(raw.metrics.len());
        let mut seen = HashSet::new();
        for name in &raw.metrics {
            let metric: Metric = name.parse()?;
            if !seen.insert(metric) {
                return Err(ConfigError::InvalidFieldValue {
                    field: "metrics",
                    value: name.clone(),
                    reason: "Metric listed more than once".to_string(),
                });
            }
            metrics.push(metric);
        }

        Ok(HarnessConfig {
            warmup,
            trial_timeout,
            abnormal_exit_code: raw.abnormal_exit_code,
            default_payload_bytes: raw.default_payload_bytes,
            metrics,
        })
    }
}

/// Half-open payload byte range `start..end` advanced by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64, step: u64) -> Self {
        Self { start, end, step }
    }

    /// A zero step or zero end means "send nothing": the range is a single 0.
    pub fn is_collapsed(&self) -> bool {
        self.step == 0 || self.end == 0
    }

    /// Expand into the list of payload sizes to sweep.
    pub fn values(&self) -> Vec<u64> {
        if self.is_collapsed() {
            return vec![0];
        }

        let step = usize::try_from(self.step).unwrap_or(usize::MAX);
        (self.start..self.end).step_by(step).collect()
    }
}

/// The operator's sweep plan, as given on the command line.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub client_path: PathBuf,
    pub server_path: PathBuf,
    pub runs: u32,
    pub ciphers_path: PathBuf,
    pub client_bytes: ByteRange,
    pub server_bytes: ByteRange,
    pub out_dir: PathBuf,
}

impl SweepPlan {
    /// Validate the plan: at least one run and two runnable programs.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "runs",
                value: "0".to_string(),
                reason: "At least one run per configuration is required".to_string(),
            });
        }

        validate_program(&self.client_path)?;
        validate_program(&self.server_path)?;

        Ok(self)
    }
}

/// Complete validated configuration for one sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub plan: SweepPlan,
    pub harness: HarnessConfig,
}

impl SweepConfig {
    pub fn new(plan: SweepPlan, harness: HarnessConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            plan: plan.validate()?,
            harness,
        })
    }
}

fn validate_program(path: &Path) -> Result<(), ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|_| ConfigError::ProgramNotFound {
        path: path.to_path_buf(),
    })?;

    if !metadata.is_file() {
        return Err(ConfigError::ProgramNotFound {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ConfigError::ProgramNotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}
