use std::f64::consts::PI;

use crate::dsp::delay::DelayLine;
use crate::dsp::QuadraturePair;

/*
FIR Hilbert Transformer
=======================

Converts a real signal into an analytic pair: the in-phase output is the
input delayed by the kernel's center tap (pure delay, no gain change), the
quadrature output lags it by 90° at every frequency of interest.

The ideal half-band Hilbert kernel h[k] = 2 / (π (k - center)) vanishes at
odd offsets from the center, so only the even offsets are stored and
evaluated. Together with the kernel's antisymmetry this reduces the
convolution to (len + 1) / 4 multiplies per sample.

(len - 1) / 2 must be odd so that the nonzero taps land on the stored
parity. That is a construction invariant, not a runtime condition.
*/

pub struct HilbertTransformer {
    taps: Vec<f32>, // even offsets below the center, (len + 1) / 4 entries
    delay: DelayLine,
    len: usize,
    center: usize,
}

impl HilbertTransformer {
    pub fn new(len: usize) -> Self {
        let center = (len - 1) / 2;
        debug_assert!(len % 2 == 1 && center % 2 == 1);

        let mut taps = vec![0.0f32; (len + 1) / 4];
        let mut i = 0;
        while i < center {
            let ideal = 2.0 / (PI * (i as f64 - center as f64));
            // Blackman window
            let window = 0.42 - 0.5 * (PI * i as f64 / center as f64).cos()
                + 0.08 * (2.0 * PI * i as f64 / center as f64).cos();
            taps[i / 2] = (ideal * window) as f32;
            i += 2;
        }

        Self {
            taps,
            delay: DelayLine::new(len),
            len,
            center,
        }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> QuadraturePair {
        self.delay.enqueue(x);

        let mut quadrature = 0.0;
        let (mut i, mut j) = (0, self.len - 1);
        while i < self.center {
            quadrature += self.taps[i / 2] * (self.delay.read(j) - self.delay.read(i));
            i += 2;
            j -= 2;
        }

        QuadraturePair {
            in_phase: self.delay.read(self.center),
            quadrature,
        }
    }

    pub fn reset(&mut self) {
        self.delay.reset();
    }

    /// Latency of the in-phase path in samples.
    pub fn group_delay(&self) -> usize {
        self.center
    }
}
