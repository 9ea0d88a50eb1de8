// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ciphersuite list reader.
//!
//! Line format: `<id> <name> [free-text flags...]`. Lines with fewer than
//! two tokens are ignored; everything after the name is kept as flags,
//! rejoined with single spaces.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{ConfigError, ProfError, ProfResult};
use crate::types::CipherSuiteId;

/// One ciphersuite entry of the sweep's outer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSuite {
    pub id: CipherSuiteId,
    pub name: String,
    pub flags: String,
}

impl CipherSuite {
    /// Label used in progress output, e.g. `[TLS1.2 only] 49187`.
    pub fn label(&self) -> String {
        if self.flags.is_empty() || self.flags.eq_ignore_ascii_case("none") {
            self.id.to_string()
        } else {
            format!("[{}] {}", self.flags, self.id)
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {}", self.id, self.name, self.flags)
    }
}

/// Parse ciphersuite entries from the text of a list file.
pub fn parse_cipher_suites(content: &str) -> Result<Vec<CipherSuite>, ConfigError> {
    let mut suites = Vec::new();

    for line in content.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }

        suites.push(CipherSuite {
            id: CipherSuiteId::new(tokens[0])?,
            name: tokens[1].to_string(),
            flags: tokens[2..].join(" "),
        });
    }

    Ok(suites)
}

/// Read a ciphersuite list file. An empty list is a configuration error.
pub fn load_cipher_suites(path: impl AsRef<Path>) -> ProfResult<Vec<CipherSuite>> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| ProfError::Io {
        context: "reading ciphersuite list",
        path: path.to_path_buf(),
        source: e,
    })?;

    let suites = parse_cipher_suites(&content)?;
    if suites.is_empty() {
        return Err(ConfigError::EmptyCipherSuiteList {
            path: path.to_path_buf(),
        }
        .into());
    }

    tracing::debug!(path = %path.display(), count = suites.len(), "Loaded ciphersuite list");

    Ok(suites)
}

/// Map ciphersuite id to display name, for presenting persisted results.
pub fn names_by_id(suites: &[CipherSuite]) -> HashMap<String, String> {
    suites
        .iter()
        .map(|s| (s.id.to_string(), s.name.clone()))
        .collect()
}
