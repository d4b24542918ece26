//! Benchmarks for the second-order IIR filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sideband_dsp::dsp::biquad::Biquad;

use crate::BLOCK_SIZES;

pub fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/biquad");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = Biquad::lowpass();
        filter.setup(48_000.0, 1_000.0);
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &x in &input {
                    acc += filter.process(black_box(x));
                }
                black_box(acc)
            })
        });

        let mut filter = Biquad::highpass();
        filter.setup(48_000.0, 1_000.0);
        group.bench_with_input(BenchmarkId::new("highpass", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &x in &input {
                    acc += filter.process(black_box(x));
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
