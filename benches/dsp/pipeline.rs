//! Benchmarks for the full stereo modulation pipeline.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sideband_dsp::dsp::oscillator::Waveform;
use sideband_dsp::pipeline::Modulator;

use crate::BLOCK_SIZES;

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|n| (std::f32::consts::TAU * 440.0 * n as f32 / 48_000.0).sin())
            .collect();
        let mut out_l = vec![0.0f32; size];
        let mut out_r = vec![0.0f32; size];

        let mut modulator = Modulator::new(48_000.0);
        modulator.set_carrier(-150.0, Waveform::Sine);
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                modulator.process_block(
                    [black_box(&input), black_box(&input)],
                    [&mut out_l, &mut out_r],
                    false,
                    false,
                );
                black_box(out_l[0])
            })
        });

        let mut modulator = Modulator::new(48_000.0);
        group.bench_with_input(BenchmarkId::new("bypass", size), &size, |b, _| {
            b.iter(|| {
                modulator.process_block(
                    [black_box(&input), black_box(&input)],
                    [&mut out_l, &mut out_r],
                    false,
                    true,
                );
                black_box(out_l[0])
            })
        });
    }

    group.finish();
}
