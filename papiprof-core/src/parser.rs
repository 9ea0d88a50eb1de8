// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Counter text parser.
//!
//! Instrumented programs print one counter per line:
//!
//! ```text
//! ssl_handshake_virttime 1834
//! ssl_handshake_virtcyc 5120034
//! ```
//!
//! The function name is everything before the *first* `_<metric> ` that is
//! followed by an integer running to the end of the line. Metrics are
//! scanned one at a time in the tracked order. When the same
//! function/metric pair occurs more than once, the last occurrence in the
//! text wins. Lines that match nothing are ignored.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{ConfigError, ProfError, ProfResult};
use crate::types::Metric;

/// Parsed counters of one process: function name -> metric -> value.
pub type TrialMetrics = BTreeMap<String, BTreeMap<Metric, f64>>;

/// Extracts tracked metrics from captured stdout.
#[derive(Debug, Clone)]
pub struct MetricParser {
    patterns: Vec<(Metric, Regex)>,
}

impl MetricParser {
    /// Build a parser for the given metrics, scanned in this order.
    pub fn new(metrics: &[Metric]) -> Result<Self, ConfigError> {
        let patterns = metrics
            .iter()
            .map(|&metric| {
                let pattern = format!(
                    r"(?m)^(?P<function>.+?)_{}[ \t]+(?P<value>\d+)[ \t]*\r?$",
                    regex::escape(metric.as_str())
                );
                let regex = Regex::new(&pattern).map_err(|e| ConfigError::InvalidFieldValue {
                    field: "metrics",
                    value: metric.to_string(),
                    reason: e.to_string(),
                })?;
                Ok((metric, regex))
            })
            .collect::<Result<_, ConfigError>>()?;

        Ok(Self { patterns })
    }

    /// Parser for [`Metric::DEFAULT_TRACKED`].
    pub fn default_tracked() -> Result<Self, ConfigError> {
        Self::new(&Metric::DEFAULT_TRACKED)
    }

    /// Metrics this parser extracts, in scan order.
    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.patterns.iter().map(|(metric, _)| *metric)
    }

    /// Parse every tracked counter out of `text`.
    pub fn parse(&self, text: &str) -> TrialMetrics {
        let mut metrics = TrialMetrics::new();

        for (metric, regex) in &self.patterns {
            for captures in regex.captures_iter(text) {
                let function = &captures["function"];
                let raw = &captures["value"];

                // Overlong digit strings parse to infinity, which JSON cannot carry.
                let value = match raw.parse::<f64>() {
                    Ok(value) if value.is_finite() => value,
                    _ => {
                        tracing::warn!(function, metric = %metric, raw, "Unparseable counter value");
                        continue;
                    }
                };

                tracing::debug!(function, metric = %metric, value, "Parsed counter");

                metrics
                    .entry(function.to_string())
                    .or_default()
                    .insert(*metric, value);
            }
        }

        metrics
    }
}

/// Extract a function's cycle count from callgrind-format profiler output.
///
/// Not supported: the harness only understands the PAPI counter lines on
/// stdout. Callers get [`ProfError::Unsupported`] instead of partial data.
pub fn cycles_from_callgrind_output(_content: &str, _function: &str) -> ProfResult<f64> {
    Err(ProfError::Unsupported {
        operation: "cycle count extraction from callgrind output",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_parser() -> MetricParser {
        MetricParser::default_tracked().unwrap()
    }

    #[test]
    fn test_parse_single_function() {
        let parser = default_parser();
        let metrics = parser.parse("foo_virttime 10\nfoo_virtcyc 20\n");

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics["foo"][&Metric::VirtTime], 10.0);
        assert_eq!(metrics["foo"][&Metric::VirtCyc], 20.0);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let metrics = default_parser().parse("foo_virttime 10\nfoo_virtcyc 20");
        assert_eq!(metrics["foo"][&Metric::VirtCyc], 20.0);
    }

    #[test]
    fn test_function_names_with_underscores() {
        let text = "mbedtls_ssl_handshake_virttime 1834\nmbedtls_ssl_handshake_virtcyc 5120034\n";
        let metrics = default_parser().parse(text);

        let handshake = &metrics["mbedtls_ssl_handshake"];
        assert_eq!(handshake[&Metric::VirtTime], 1834.0);
        assert_eq!(handshake[&Metric::VirtCyc], 5_120_034.0);
    }

    #[test]
    fn test_noise_is_ignored() {
        let text = "Connecting to 127.0.0.1:4433\n\
                    handshake ok\n\
                    foo_virttime 7\n\
                    foo_virttime abc\n\
                    bar_realtime 99\n";
        let metrics = default_parser().parse(text);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics["foo"].len(), 1);
        assert_eq!(metrics["foo"][&Metric::VirtTime], 7.0);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let metrics = default_parser().parse("foo_virttime 1\nfoo_virttime 2\n");
        assert_eq!(metrics["foo"][&Metric::VirtTime], 2.0);
    }

    #[test]
    fn test_crlf_lines() {
        let metrics = default_parser().parse("foo_virttime 3\r\nfoo_virtcyc 4\r\n");
        assert_eq!(metrics["foo"][&Metric::VirtTime], 3.0);
        assert_eq!(metrics["foo"][&Metric::VirtCyc], 4.0);
    }

    #[test]
    fn test_untracked_metrics_skipped() {
        let parser = MetricParser::new(&[Metric::RealTime]).unwrap();
        let metrics = parser.parse("foo_virttime 1\nfoo_realtime 2\n");

        assert_eq!(metrics["foo"].len(), 1);
        assert_eq!(metrics["foo"][&Metric::RealTime], 2.0);
    }

    #[test]
    fn test_every_metric_builds() {
        let all = [Metric::VirtTime, Metric::VirtCyc, Metric::RealTime, Metric::RealCyc];
        let parser = MetricParser::new(&all).unwrap();
        assert_eq!(parser.metrics().count(), 4);
    }

    #[test]
    fn test_metric_order_preserved() {
        let parser = MetricParser::new(&[Metric::VirtCyc, Metric::VirtTime]).unwrap();
        let order: Vec<Metric> = parser.metrics().collect();
        assert_eq!(order, vec![Metric::VirtCyc, Metric::VirtTime]);
    }

    #[test]
    fn test_overflowing_counter_skipped() {
        let text = format!("foo_virttime 1{}\nfoo_virtcyc 20\n", "0".repeat(400));
        let metrics = default_parser().parse(&text);

        assert_eq!(metrics["foo"].len(), 1);
        assert!(!metrics["foo"].contains_key(&Metric::VirtTime));
        assert_eq!(metrics["foo"][&Metric::VirtCyc], 20.0);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parsed_values_logged_at_debug() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            default_parser().parse("foo_virttime 10\n");
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Parsed counter"));
        assert!(output.contains("DEBUG"));
    }

    #[test]
    fn test_empty_text() {
        assert!(default_parser().parse("").is_empty());
    }

    #[test]
    fn test_callgrind_extraction_unsupported() {
        let result = cycles_from_callgrind_output("fn=foo\n1 200\n", "foo");
        assert!(matches!(result, Err(ProfError::Unsupported { .. })));
    }
}
