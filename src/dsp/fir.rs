use std::f64::consts::PI;

use crate::dsp::delay::DelayLine;

/// Low-pass cutoff at or above this short-circuits to a pure delay.
pub const PASS_THROUGH_HZ: f32 = 20_000.0;

const DEFAULT_LEN: usize = 67;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SincKind {
    Lowpass,
    Highpass,
}

/// Linear-phase windowed-sinc FIR filter.
///
/// The kernel is an ideal sinc truncated to an odd length, tapered by a
/// Hamming window and normalized to unity gain at DC; high-pass is obtained
/// by spectral inversion of the center tap. Kernel symmetry lets `process`
/// compute half the products and reuse them for the mirrored taps. The
/// group delay is `(len - 1) / 2` samples in both filtering and pass-through
/// modes, so swapping modes never shifts the signal in time.
pub struct SincFilter {
    kind: SincKind,
    taps: Vec<f32>, // center + 1 entries, index 0 is the oldest tap
    delay: DelayLine,
    len: usize,
    center: usize,
    pass_through: bool,
    sample_rate: f32,
    cutoff_hz: f32,
}

impl SincFilter {
    pub fn lowpass() -> Self {
        Self::with_length(SincKind::Lowpass, DEFAULT_LEN)
    }

    pub fn highpass() -> Self {
        Self::with_length(SincKind::Highpass, DEFAULT_LEN)
    }

    /// `len` must be odd.
    pub fn with_length(kind: SincKind, len: usize) -> Self {
        debug_assert!(len % 2 == 1);
        let center = (len - 1) / 2;
        Self {
            kind,
            taps: vec![0.0; center + 1],
            delay: DelayLine::new(len),
            len,
            center,
            pass_through: true,
            sample_rate: 0.0,
            cutoff_hz: 0.0,
        }
    }

    /// Rebuild the kernel for the given sample rate and cutoff.
    pub fn setup(&mut self, sample_rate: f32, cutoff_hz: f32) {
        if sample_rate == self.sample_rate && cutoff_hz == self.cutoff_hz {
            return;
        }
        self.sample_rate = sample_rate;
        self.cutoff_hz = cutoff_hz;

        if self.kind == SincKind::Lowpass && cutoff_hz >= PASS_THROUGH_HZ {
            self.pass_through = true;
            return;
        }
        self.pass_through = false;

        let center = self.center;
        let mut taps = vec![0.0f64; center + 1];

        taps[center] = 2.0 * f64::from(cutoff_hz) / f64::from(sample_rate);
        let omega_ct = taps[center] * PI;
        for i in 0..center {
            let j = i as f64 - center as f64;
            taps[i] = (j * omega_ct).sin() / (j * PI);
        }

        // Hamming window
        for (i, tap) in taps.iter_mut().enumerate() {
            *tap *= 0.54 - 0.46 * (PI * i as f64 / center as f64).cos();
        }

        // normalize to unity DC gain
        let sum: f64 = taps[..center].iter().sum::<f64>() * 2.0 + taps[center];
        for tap in taps.iter_mut() {
            *tap /= sum;
        }

        if self.kind == SincKind::Highpass {
            taps[center] = 1.0 - taps[center];
        }

        for (dst, src) in self.taps.iter_mut().zip(taps.iter()) {
            *dst = *src as f32;
        }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.delay.enqueue(x);
        if self.pass_through {
            return self.delay.read(self.center);
        }

        let mut acc = 0.0;
        for i in 0..self.center {
            acc += self.taps[i] * (self.delay.read(i) + self.delay.read(self.len - 1 - i));
        }
        let center_term = self.taps[self.center] * self.delay.read(self.center);
        match self.kind {
            SincKind::Lowpass => acc + center_term,
            SincKind::Highpass => -acc + center_term,
        }
    }

    pub fn reset(&mut self) {
        self.delay.reset();
    }

    pub fn group_delay(&self) -> usize {
        self.center
    }

    pub fn is_pass_through(&self) -> bool {
        self.pass_through
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn lowpass_has_unity_dc_gain() {
        let mut filter = SincFilter::lowpass();
        filter.setup(48_000.0, 2_000.0);

        let mut last = 0.0;
        for _ in 0..256 {
            last = filter.process(1.0);
        }
        assert!((last - 1.0).abs() < 1e-4, "DC gain should be unity, got {last}");
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut filter = SincFilter::highpass();
        filter.setup(48_000.0, 2_000.0);

        let mut last = 1.0;
        for _ in 0..256 {
            last = filter.process(1.0);
        }
        assert!(last.abs() < 1e-4, "DC should be rejected, got {last}");
    }

    #[test]
    fn pass_through_is_a_pure_delay() {
        let mut filter = SincFilter::lowpass();
        filter.setup(48_000.0, PASS_THROUGH_HZ);
        assert!(filter.is_pass_through());

        let input: Vec<f32> = (0..200).map(|n| (n as f32 * 0.37).sin()).collect();
        let output: Vec<f32> = input.iter().map(|&x| filter.process(x)).collect();

        let d = filter.group_delay();
        for n in d..input.len() {
            assert_eq!(output[n], input[n - d]);
        }
    }

    #[test]
    fn impulse_response_is_symmetric() {
        let mut filter = SincFilter::lowpass();
        filter.setup(48_000.0, 4_000.0);

        let mut response = Vec::with_capacity(67);
        response.push(filter.process(1.0));
        for _ in 1..67 {
            response.push(filter.process(0.0));
        }
        for i in 0..33 {
            let (a, b) = (response[i], response[66 - i]);
            assert!(
                (a - b).abs() < 1e-6,
                "taps {i} and {} differ: {a} vs {b}",
                66 - i
            );
        }
    }

    #[test]
    fn lowpass_attenuates_stopband_tone() {
        let sample_rate = 48_000.0;
        let mut filter = SincFilter::lowpass();
        filter.setup(sample_rate, 1_000.0);

        let output: Vec<f32> = (0..2048)
            .map(|n| (TAU * 8_000.0 * n as f32 / sample_rate).sin())
            .map(|x| filter.process(x))
            .collect();

        let peak = output[256..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak < 0.01, "stopband leak: {peak}");
    }

    #[test]
    fn highpass_never_short_circuits() {
        let mut filter = SincFilter::highpass();
        filter.setup(48_000.0, PASS_THROUGH_HZ);
        assert!(!filter.is_pass_through());
    }
}
