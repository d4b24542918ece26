//! Benchmarks for the quadrature wavetable oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sideband_dsp::dsp::oscillator::{QuadratureOscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        for waveform in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Sawtooth,
        ] {
            let mut osc = QuadratureOscillator::new();
            osc.setup(48_000.0, 220.5);
            group.bench_with_input(
                BenchmarkId::new(waveform.label(), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        let mut acc = 0.0f32;
                        for _ in 0..size {
                            let pair = osc.process(black_box(waveform));
                            acc += pair.in_phase + pair.quadrature;
                        }
                        black_box(acc)
                    })
                },
            );
        }
    }

    group.finish();
}
