//! Benchmarks for the FIR Hilbert transformer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sideband_dsp::dsp::hilbert::HilbertTransformer;

use crate::BLOCK_SIZES;

pub fn bench_hilbert(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/hilbert");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for len in [259, 771] {
            let mut ht = HilbertTransformer::new(len);
            group.bench_with_input(
                BenchmarkId::new(format!("{len}-tap"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut acc = 0.0f32;
                        for &x in &input {
                            let pair = ht.process(black_box(x));
                            acc += pair.quadrature;
                        }
                        black_box(acc)
                    })
                },
            );
        }
    }

    group.finish();
}
