// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Counter parser throughput.
//!
//! Measures how fast captured stdout is turned into per-function metrics
//! for outputs of increasing size, with some non-counter noise mixed in.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use papiprof_core::{Metric, MetricParser};

/// Number of instrumented functions in the synthetic output.
const FUNCTION_COUNTS: &[usize] = &[8, 64, 512];

fn synthetic_output(functions: usize) -> String {
    let mut text = String::from("Loading certificates... ok\nHandshake completed\n");
    for i in 0..functions {
        text.push_str(&format!("mbedtls_fn_{}_virttime {}\n", i, 1000 + i));
        text.push_str(&format!("mbedtls_fn_{}_virtcyc {}\n", i, 250_000 + i * 7));
        text.push_str(&format!("mbedtls_fn_{}_realtime {}\n", i, 1200 + i));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_counters");

    for &functions in FUNCTION_COUNTS {
        let text = synthetic_output(functions);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("default_metrics", functions), &text, |b, text| {
            let parser = MetricParser::default_tracked().unwrap();
            b.iter(|| black_box(parser.parse(black_box(text))));
        });

        group.bench_with_input(BenchmarkId::new("all_metrics", functions), &text, |b, text| {
            let parser = MetricParser::new(&[
                Metric::VirtTime,
                Metric::VirtCyc,
                Metric::RealTime,
                Metric::RealCyc,
            ])
            .unwrap();
            b.iter(|| black_box(parser.parse(black_box(text))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
