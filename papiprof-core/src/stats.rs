// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Statistics engine: mean and sample standard deviation per metric.
//!
//! Sample standard deviation uses the `n - 1` denominator and is undefined
//! below two samples. A single-trial configuration reports `stdev = 0.0`;
//! an empty sample list is an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::accumulator::MetricAccumulator;
use crate::error::StatsError;
use crate::types::Metric;

/// Average and spread of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub avg: f64,
    pub stdev: f64,
}

/// Summary of one function under one configuration.
///
/// Serializes as `{"num_runs": 5, "virttime": {"avg": .., "stdev": ..}, ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub num_runs: u64,
    #[serde(flatten)]
    pub metrics: BTreeMap<Metric, MetricSummary>,
}

/// Function name -> configuration key -> summary. This is what gets persisted.
pub type SummaryStatistics = BTreeMap<String, BTreeMap<String, ConfigurationSummary>>;

/// Arithmetic mean, `None` for no samples.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator), `None` below two samples.
pub fn sample_stdev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }

    let avg = mean(samples)?;
    let variance = samples
        .iter()
        .map(|&x| {
            let diff = x - avg;
            diff * diff
        })
        .sum::<f64>()
        / (samples.len() - 1) as f64;

    Some(variance.sqrt())
}

impl MetricSummary {
    /// Summarize a sample list. One sample gives a zero spread.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let avg = mean(samples)?;
        let stdev = sample_stdev(samples).unwrap_or(0.0);
        Some(Self { avg, stdev })
    }
}

/// Reduce accumulated samples into summary statistics.
pub fn summarize(accumulator: &MetricAccumulator) -> Result<SummaryStatistics, StatsError> {
    let mut result = SummaryStatistics::new();

    for (function, configs) in accumulator.iter() {
        let function_summary = result.entry(function.to_string()).or_default();

        for (config_key, samples) in configs {
            let mut metrics = BTreeMap::new();

            for (metric, values) in samples.iter() {
                let summary =
                    MetricSummary::from_samples(values).ok_or_else(|| StatsError::EmptySamples {
                        function: function.to_string(),
                        metric,
                    })?;
                metrics.insert(metric, summary);
            }

            function_summary.insert(
                config_key.clone(),
                ConfigurationSummary {
                    num_runs: samples.num_runs(),
                    metrics,
                },
            );
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TrialMetrics;

    fn fold_values(acc: &mut MetricAccumulator, function: &str, values: &[f64]) {
        for &v in values {
            let mut trial = TrialMetrics::new();
            trial
                .entry(function.to_string())
                .or_default()
                .insert(Metric::VirtTime, v);
            acc.fold(&trial, "60");
        }
    }

    #[test]
    fn test_mean_and_stdev() {
        let samples = [10.0, 20.0, 30.0];
        assert!((mean(&samples).unwrap() - 20.0).abs() < 1e-9);
        assert!((sample_stdev(&samples).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_stdev_undefined_below_two_samples() {
        assert_eq!(sample_stdev(&[]), None);
        assert_eq!(sample_stdev(&[5.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_single_sample_summary_has_zero_spread() {
        let summary = MetricSummary::from_samples(&[42.0]).unwrap();
        assert_eq!(summary, MetricSummary { avg: 42.0, stdev: 0.0 });
        assert!(MetricSummary::from_samples(&[]).is_none());
    }

    #[test]
    fn test_summarize_passes_num_runs_through() {
        let mut acc = MetricAccumulator::new(&[Metric::VirtTime]);
        fold_values(&mut acc, "foo", &[10.0, 20.0, 30.0]);

        let stats = summarize(&acc).unwrap();
        let foo = &stats["foo"]["60"];

        assert_eq!(foo.num_runs, 3);
        assert!((foo.metrics[&Metric::VirtTime].avg - 20.0).abs() < 1e-9);
        assert!((foo.metrics[&Metric::VirtTime].stdev - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_accumulator() {
        let acc = MetricAccumulator::new(&[Metric::VirtTime]);
        assert!(summarize(&acc).unwrap().is_empty());
    }

    #[test]
    fn test_summary_json_shape() {
        let mut acc = MetricAccumulator::new(&[Metric::VirtTime]);
        fold_values(&mut acc, "foo", &[1.0, 3.0]);

        let json = serde_json::to_value(summarize(&acc).unwrap()).unwrap();

        assert_eq!(json["foo"]["60"]["num_runs"], 2);
        assert_eq!(json["foo"]["60"]["virttime"]["avg"], 2.0);
    }
}
