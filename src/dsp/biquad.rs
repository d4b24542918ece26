use std::f64::consts::{FRAC_1_SQRT_2, TAU};

/*
| type      | passes          | rejects         | role in the pipeline          |
| --------- | --------------- | --------------- | ----------------------------- |
| high-pass | above cutoff    | below cutoff    | strips DC / rumble before and |
|           |                 |                 | after modulation              |
| low-pass  | below cutoff    | above cutoff    | bounds bandwidth so the shift |
|           |                 |                 | cannot fold past Nyquist      |
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadKind {
    Lowpass,
    Highpass,
}

/// Second-order Butterworth IIR filter (Q = 1/√2), transposed direct form II.
///
/// `setup` is cheap and idempotent; calling it every block with unchanged
/// values does no coefficient work.
pub struct Biquad {
    kind: BiquadKind,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
    sample_rate: f32,
    cutoff_hz: f32,
}

impl Biquad {
    pub fn lowpass() -> Self {
        Self::new(BiquadKind::Lowpass)
    }

    pub fn highpass() -> Self {
        Self::new(BiquadKind::Highpass)
    }

    fn new(kind: BiquadKind) -> Self {
        Self {
            kind,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate: 0.0,
            cutoff_hz: 0.0,
        }
    }

    /// Recompute coefficients for the given sample rate and cutoff.
    pub fn setup(&mut self, sample_rate: f32, cutoff_hz: f32) {
        if sample_rate == self.sample_rate && cutoff_hz == self.cutoff_hz {
            return;
        }
        self.sample_rate = sample_rate;
        self.cutoff_hz = cutoff_hz;

        let q = FRAC_1_SQRT_2;
        let omega = TAU * f64::from(cutoff_hz) / f64::from(sample_rate);
        let (sin_omega, cos_omega) = omega.sin_cos();
        let alpha = sin_omega / (2.0 * q);

        let (b0, b1, b2) = match self.kind {
            BiquadKind::Lowpass => {
                let b1 = 1.0 - cos_omega;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            BiquadKind::Highpass => {
                let b1 = -(1.0 + cos_omega);
                (-b1 / 2.0, b1, -b1 / 2.0)
            }
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.b0 = (b0 / a0) as f32;
        self.b1 = (b1 / a0) as f32;
        self.b2 = (b2 / a0) as f32;
        self.a1 = (a1 / a0) as f32;
        self.a2 = (a2 / a0) as f32;
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    /// Zero the state registers, keeping the coefficients.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }
}
