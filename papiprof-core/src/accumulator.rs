// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Per-configuration accumulation of repeated-trial samples.
//!
//! Run counts are tracked per function: a function only counts the trials
//! in which it reported. A function that reported some tracked metrics but
//! not all of them is left out of that trial entirely, so every sample list
//! of a function always has exactly `num_runs` entries.

use std::collections::BTreeMap;

use crate::parser::TrialMetrics;
use crate::types::Metric;

/// Samples of one function under one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSamples {
    num_runs: u64,
    samples: BTreeMap<Metric, Vec<f64>>,
}

impl FunctionSamples {
    fn new(tracked: &[Metric]) -> Self {
        Self {
            num_runs: 0,
            samples: tracked.iter().map(|&m| (m, Vec::new())).collect(),
        }
    }

    /// Number of trials this function contributed samples to.
    pub fn num_runs(&self) -> u64 {
        self.num_runs
    }

    /// Samples of one metric, in trial order.
    pub fn samples(&self, metric: Metric) -> Option<&[f64]> {
        self.samples.get(&metric).map(Vec::as_slice)
    }

    /// All metrics with their samples.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &[f64])> {
        self.samples.iter().map(|(m, v)| (*m, v.as_slice()))
    }

    /// Smallest and largest sample of a metric.
    pub fn range(&self, metric: Metric) -> Option<(f64, f64)> {
        let samples = self.samples.get(&metric)?;
        let first = *samples.first()?;
        Some(
            samples
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

/// Outcome of folding one trial into the accumulator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FoldReport {
    /// Functions whose samples were appended.
    pub folded: usize,
    /// Functions skipped because they missed a tracked metric.
    pub incomplete: Vec<String>,
}

/// Accumulated samples: function -> configuration key -> samples.
#[derive(Debug, Clone)]
pub struct MetricAccumulator {
    tracked: Vec<Metric>,
    functions: BTreeMap<String, BTreeMap<String, FunctionSamples>>,
}

impl MetricAccumulator {
    pub fn new(tracked: &[Metric]) -> Self {
        Self {
            tracked: tracked.to_vec(),
            functions: BTreeMap::new(),
        }
    }

    /// Fold one successful trial's parsed metrics under `config_key`.
    pub fn fold(&mut self, trial: &TrialMetrics, config_key: &str) -> FoldReport {
        let mut report = FoldReport::default();

        for (function, values) in trial {
            if !self.tracked.iter().all(|m| values.contains_key(m)) {
                tracing::warn!(
                    function = %function,
                    config = config_key,
                    reported = values.len(),
                    tracked = self.tracked.len(),
                    "Function reported only some tracked metrics, leaving it out of this trial"
                );
                report.incomplete.push(function.clone());
                continue;
            }

            let entry = self
                .functions
                .entry(function.clone())
                .or_default()
                .entry(config_key.to_string())
                .or_insert_with(|| FunctionSamples::new(&self.tracked));

            entry.num_runs += 1;
            for metric in &self.tracked {
                if let Some(&value) = values.get(metric) {
                    entry.samples.entry(*metric).or_default().push(value);
                }
            }
            report.folded += 1;
        }

        report
    }

    /// Samples of one function under one configuration.
    pub fn get(&self, function: &str, config_key: &str) -> Option<&FunctionSamples> {
        self.functions.get(function)?.get(config_key)
    }

    /// Iterate function -> configuration -> samples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, FunctionSamples>)> {
        self.functions.iter().map(|(f, c)| (f.as_str(), c))
    }

    pub fn tracked(&self) -> &[Metric] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(entries: &[(&str, &[(Metric, f64)])]) -> TrialMetrics {
        entries
            .iter()
            .map(|(f, values)| (f.to_string(), values.iter().copied().collect()))
            .collect()
    }

    fn assert_lengths_match(acc: &MetricAccumulator) {
        for (_, configs) in acc.iter() {
            for samples in configs.values() {
                for (_, list) in samples.iter() {
                    assert_eq!(list.len() as u64, samples.num_runs());
                }
            }
        }
    }

    #[test]
    fn test_fold_counts_runs_and_appends() {
        let mut acc = MetricAccumulator::new(&Metric::DEFAULT_TRACKED);
        let t1 = trial(&[("foo", &[(Metric::VirtTime, 10.0), (Metric::VirtCyc, 100.0)])]);
        let t2 = trial(&[("foo", &[(Metric::VirtTime, 20.0), (Metric::VirtCyc, 200.0)])]);

        acc.fold(&t1, "49187");
        acc.fold(&t2, "49187");

        let foo = acc.get("foo", "49187").unwrap();
        assert_eq!(foo.num_runs(), 2);
        assert_eq!(foo.samples(Metric::VirtTime).unwrap(), &[10.0, 20.0]);
        assert_eq!(foo.samples(Metric::VirtCyc).unwrap(), &[100.0, 200.0]);
        assert_lengths_match(&acc);
    }

    #[test]
    fn test_function_absent_on_some_trials() {
        let mut acc = MetricAccumulator::new(&Metric::DEFAULT_TRACKED);
        let both = trial(&[
            ("foo", &[(Metric::VirtTime, 1.0), (Metric::VirtCyc, 2.0)]),
            ("bar", &[(Metric::VirtTime, 3.0), (Metric::VirtCyc, 4.0)]),
        ]);
        let only_foo = trial(&[("foo", &[(Metric::VirtTime, 5.0), (Metric::VirtCyc, 6.0)])]);

        acc.fold(&both, "60");
        acc.fold(&only_foo, "60");

        assert_eq!(acc.get("foo", "60").unwrap().num_runs(), 2);
        assert_eq!(acc.get("bar", "60").unwrap().num_runs(), 1);
        assert_lengths_match(&acc);
    }

    #[test]
    fn test_incomplete_function_left_out() {
        let mut acc = MetricAccumulator::new(&Metric::DEFAULT_TRACKED);
        let partial = trial(&[
            ("foo", &[(Metric::VirtTime, 1.0)]),
            ("bar", &[(Metric::VirtTime, 3.0), (Metric::VirtCyc, 4.0)]),
        ]);

        let report = acc.fold(&partial, "60");

        assert_eq!(report.folded, 1);
        assert_eq!(report.incomplete, vec!["foo".to_string()]);
        assert!(acc.get("foo", "60").is_none());
        assert_lengths_match(&acc);
    }

    #[test]
    fn test_configurations_kept_apart() {
        let mut acc = MetricAccumulator::new(&[Metric::VirtTime]);
        acc.fold(&trial(&[("foo", &[(Metric::VirtTime, 1.0)])]), "60");
        acc.fold(&trial(&[("foo", &[(Metric::VirtTime, 2.0)])]), "103");

        assert_eq!(acc.get("foo", "60").unwrap().samples(Metric::VirtTime).unwrap(), &[1.0]);
        assert_eq!(acc.get("foo", "103").unwrap().samples(Metric::VirtTime).unwrap(), &[2.0]);
    }

    #[test]
    fn test_range() {
        let mut acc = MetricAccumulator::new(&[Metric::VirtTime]);
        for v in [30.0, 10.0, 20.0] {
            acc.fold(&trial(&[("foo", &[(Metric::VirtTime, v)])]), "60");
        }

        let foo = acc.get("foo", "60").unwrap();
        assert_eq!(foo.range(Metric::VirtTime), Some((10.0, 30.0)));
        assert_eq!(foo.range(Metric::RealCyc), None);
    }

    #[test]
    fn test_empty_trial() {
        let mut acc = MetricAccumulator::new(&Metric::DEFAULT_TRACKED);
        let report = acc.fold(&TrialMetrics::new(), "60");
        assert_eq!(report.folded, 0);
        assert!(acc.is_empty());
    }
}
