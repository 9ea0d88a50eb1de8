// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers and small vocabulary types.
//!
//! All types validate their invariants at creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Validated ciphersuite identifier.
/// Passed verbatim as the first argument to both programs, so it must be
/// non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CipherSuiteId(String);

impl CipherSuiteId {
    /// Create a new CipherSuiteId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();

        if id.is_empty() {
            return Err(ConfigError::InvalidFieldValue {
                field: "ciphersuite_id",
                value: id,
                reason: "Ciphersuite ID cannot be empty".to_string(),
            });
        }

        if id.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidFieldValue {
                field: "ciphersuite_id",
                value: id,
                reason: "Ciphersuite ID cannot contain whitespace".to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CipherSuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CipherSuiteId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CipherSuiteId> for String {
    fn from(id: CipherSuiteId) -> Self {
        id.0
    }
}

/// Counter vocabulary emitted by the instrumented programs.
///
/// Each appears on stdout as the suffix of `<function>_<metric> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Virtual (process) time in microseconds
    VirtTime,
    /// Virtual (process) cycle count
    VirtCyc,
    /// Wall-clock time in microseconds
    RealTime,
    /// Wall-clock cycle count
    RealCyc,
}

impl Metric {
    /// Metrics tracked when the configuration does not name any.
    pub const DEFAULT_TRACKED: [Metric; 2] = [Metric::VirtTime, Metric::VirtCyc];

    /// Suffix used in the counter text and in persisted summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::VirtTime => "virttime",
            Metric::VirtCyc => "virtcyc",
            Metric::RealTime => "realtime",
            Metric::RealCyc => "realcyc",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "virttime" => Ok(Metric::VirtTime),
            "virtcyc" => Ok(Metric::VirtCyc),
            "realtime" => Ok(Metric::RealTime),
            "realcyc" => Ok(Metric::RealCyc),
            other => Err(ConfigError::InvalidFieldValue {
                field: "metrics",
                value: other.to_string(),
                reason: "Expected one of virttime, virtcyc, realtime, realcyc".to_string(),
            }),
        }
    }
}

/// Which side of the client/server pair a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Client,
    Server,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Client => "client",
            Entity::Server => "server",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
