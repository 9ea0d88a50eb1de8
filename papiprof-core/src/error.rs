//! Custom error types for papiprof.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`
//! in the library; every failure the harness can hit has its own variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Metric;

/// Top-level error type for the profiling harness.
#[derive(Debug, Error)]
pub enum ProfError {
    // =========================================================================
    // Configuration Errors - Fail-Fast Before Any Process Is Launched
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Process Errors - Recovered Per Trial by the Sweep Driver
    // =========================================================================
    #[error("Process runner error: {0}")]
    Runner(#[from] RunnerError),

    // =========================================================================
    // Statistics Errors
    // =========================================================================
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("IO error: {context} ({path}) - {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors. Any of these aborts the run at boot.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Program does not exist: {path}")]
    ProgramNotFound { path: PathBuf },

    #[error("Program is not executable: {path}")]
    ProgramNotExecutable { path: PathBuf },

    #[error("Ciphersuite list {path} contains no usable entries")]
    EmptyCipherSuiteList { path: PathBuf },
}

/// Failures to run a child process to completion.
///
/// A nonzero exit code is *not* an error; it is returned as data in
/// [`crate::process::RawRunResult`].
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture output of {program}: {source}")]
    CaptureFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not exit within {limit_ms}ms and was killed")]
    Timeout { program: PathBuf, limit_ms: u128 },

    #[error("Trial task failed to join: {reason}")]
    Join { reason: String },
}

/// Statistics engine errors.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("No samples recorded for {function}/{metric}")]
    EmptySamples { function: String, metric: Metric },
}

/// Result type alias using ProfError.
pub type ProfResult<T> = Result<T, ProfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_display() {
        let err = ConfigError::InvalidFieldValue {
            field: "runs",
            value: "0".to_string(),
            reason: "At least one run is required".to_string(),
        };
        assert!(err.to_string().contains("runs"));
        assert!(err.to_string().contains("At least one run"));
    }

    #[test]
    fn test_error_chain() {
        let runner_err = RunnerError::Join {
            reason: "panicked".to_string(),
        };
        let err: ProfError = runner_err.into();
        assert!(matches!(err, ProfError::Runner(_)));
    }

    #[test]
    fn test_unsupported_display() {
        let err = ProfError::Unsupported {
            operation: "cycle extraction",
        };
        assert_eq!(err.to_string(), "Operation not supported: cycle extraction");
    }
}
