use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::QuadraturePair;

/*
Quadrature Wavetable DDS
========================

A direct digital synthesizer that returns the carrier together with its
90°-lagged counterpart in a single call. Both come from tables built once at
first use and immutable afterwards.

Fractional stepping
-------------------

The per-sample phase step for frequency f at sample rate SR is
f·WT_LEN / SR, which is almost never an integer. Truncating it detunes the
carrier; accumulating it in floating point drifts. Instead the remainder is
distributed with an exact error-feedback rule (the same scheme Bresenham
line drawing uses): keep a doubled error term, step by T when the error is
negative and by T + 1 otherwise, feeding the matching increment back into
the error. Over any SR consecutive samples the average step is exactly
f·WT_LEN / SR, and the instantaneous phase never sits more than one table
step from the ideal line.

A frequency change only swaps the stepping parameters, never the phase, so
live tuning cannot cause a phase discontinuity. A sample-rate change resets
the phase and re-seeds the error term.

Table storage
-------------

Quarter-wave symmetry stores one quadrant for sine and for the
Hilbert-transformed triangle and square; the Hilbert-transformed sawtooth
needs a half period. Direct triangle/square/sawtooth values come from closed
forms on the phase. Sine is scaled to peak at √2 and triangle at √3 (unit
RMS for both); square and sawtooth peak at 0.5.

The Hilbert transforms of square and sawtooth involve a logarithmic kernel
that diverges at the waveform discontinuity. The boundary table entry is
clamped to its in-bounds neighbor; the approximation is part of the
contract, not a shortcut.
*/

/// Logical length of a full wavetable period.
pub const WT_LEN: usize = 18_000;
const Q_WT_LEN: usize = WT_LEN / 4;
const S_WT_LEN: usize = WT_LEN / 2;
const D_WT_LEN: usize = WT_LEN * 3 / 4;

const SQRT_2: f32 = std::f32::consts::SQRT_2;
const SQRT_3: f32 = 1.732_050_8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Decode a persisted waveform index. Unknown indices are dropped at
    /// this boundary; the oscillator itself only ever sees a valid variant.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Sine),
            1 => Some(Self::Triangle),
            2 => Some(Self::Square),
            3 => Some(Self::Sawtooth),
            _ => None,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Self::Sine => 0,
            Self::Triangle => 1,
            Self::Square => 2,
            Self::Sawtooth => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Sawtooth => "sawtooth",
        }
    }
}

struct Wavetables {
    sine: Box<[f32]>,     // quarter wave, Q_WT_LEN + 1 entries
    triangle: Box<[f32]>, // Hilbert-transformed quarter wave
    square: Box<[f32]>,   // Hilbert-transformed quarter wave
    sawtooth: Box<[f32]>, // Hilbert-transformed half wave, S_WT_LEN + 1 entries
}

static TABLES: LazyLock<Wavetables> = LazyLock::new(build_wavetables);

fn build_wavetables() -> Wavetables {
    use std::f64::consts::PI;

    let mut sine = vec![0.0f64; Q_WT_LEN + 1];
    for (i, v) in sine.iter_mut().enumerate() {
        *v = (PI * i as f64 / S_WT_LEN as f64).sin() * f64::from(SQRT_2);
    }

    // Hilbert-transformed square, before amplitude scaling: the running sum
    // below needs the raw kernel values.
    let mut square = vec![0.0f64; Q_WT_LEN + 1];
    for i in 1..=Q_WT_LEN {
        square[i] = -2.0 / PI * (PI * i as f64 / WT_LEN as f64).tan().recip().abs().ln();
    }
    square[0] = square[1];

    // Hilbert-transformed triangle: integral of the square kernel
    let mut triangle = vec![0.0f64; Q_WT_LEN + 1];
    for i in 1..=Q_WT_LEN {
        triangle[i] = triangle[i - 1] - square[i - 1] / Q_WT_LEN as f64;
    }
    for v in triangle.iter_mut() {
        *v *= f64::from(SQRT_3);
    }

    for v in square.iter_mut() {
        *v *= 0.5;
    }

    let mut sawtooth = vec![0.0f64; S_WT_LEN + 1];
    for i in 0..S_WT_LEN {
        sawtooth[i] = -2.0 / PI * (2.0 * (PI * i as f64 / WT_LEN as f64).cos()).ln();
    }
    sawtooth[S_WT_LEN] = sawtooth[S_WT_LEN - 1];
    for v in sawtooth.iter_mut() {
        *v *= 0.5;
    }

    let narrow = |v: Vec<f64>| v.into_iter().map(|x| x as f32).collect();
    Wavetables {
        sine: narrow(sine),
        triangle: narrow(triangle),
        square: narrow(square),
        sawtooth: narrow(sawtooth),
    }
}

/// Fractional-frequency oscillator returning the carrier and its 90°-lagged
/// companion per sample.
pub struct QuadratureOscillator {
    phase: usize,
    sample_rate: i64, // rounded; 0 until the first setup
    step: usize,
    phase_error: i64,
    err_slow: i64,
    err_fast: i64,
}

impl QuadratureOscillator {
    pub fn new() -> Self {
        Self {
            phase: 0,
            sample_rate: 0,
            step: 0,
            phase_error: 0,
            err_slow: 0,
            err_fast: 0,
        }
    }

    /// Recompute the stepping parameters for the given rate and frequency
    /// magnitude. Only a sample-rate change disturbs the phase.
    pub fn setup(&mut self, sample_rate: f32, frequency: f32) {
        let n = (f64::from(frequency.abs()) * WT_LEN as f64 + 0.5) as i64;
        let m = (f64::from(sample_rate) + 0.5) as i64;
        self.step = (n / m) as usize;
        self.err_slow = 2 * (n - m * (n / m));
        self.err_fast = self.err_slow - 2 * m;
        if m != self.sample_rate {
            self.sample_rate = m;
            self.phase = 0;
            self.phase_error = self.err_slow - m;
        }
    }

    /// Return the quadrature pair at the current phase, then advance.
    #[inline]
    pub fn process(&mut self, waveform: Waveform) -> QuadraturePair {
        let pair = QuadraturePair {
            in_phase: self.wave(waveform),
            quadrature: self.lagged_wave(waveform),
        };

        if self.phase_error < 0 {
            self.phase_error += self.err_slow;
            self.phase += self.step;
        } else {
            self.phase_error += self.err_fast;
            self.phase += self.step + 1;
        }
        if self.phase >= WT_LEN {
            self.phase -= WT_LEN;
        }

        pair
    }

    /// Zero the phase and forget the cached sample rate so the next `setup`
    /// re-seeds the error term.
    pub fn reset(&mut self) {
        self.sample_rate = 0;
        self.phase = 0;
    }

    fn wave(&self, waveform: Waveform) -> f32 {
        let t = &*TABLES;
        let p = self.phase;
        match waveform {
            Waveform::Sine => {
                if p < Q_WT_LEN {
                    t.sine[p]
                } else if p < S_WT_LEN {
                    t.sine[S_WT_LEN - p]
                } else if p < D_WT_LEN {
                    -t.sine[p - S_WT_LEN]
                } else {
                    -t.sine[WT_LEN - p]
                }
            }
            Waveform::Triangle => {
                if p < Q_WT_LEN {
                    SQRT_3 * p as f32 / Q_WT_LEN as f32
                } else if p < D_WT_LEN {
                    SQRT_3 * (S_WT_LEN as f32 - p as f32) / Q_WT_LEN as f32
                } else {
                    SQRT_3 * (p as f32 - WT_LEN as f32) / Q_WT_LEN as f32
                }
            }
            Waveform::Square => {
                if p < S_WT_LEN {
                    0.5
                } else {
                    -0.5
                }
            }
            Waveform::Sawtooth => {
                if p == S_WT_LEN {
                    0.0
                } else if p < S_WT_LEN {
                    0.5 * p as f32 / S_WT_LEN as f32
                } else {
                    0.5 * (p as f32 - WT_LEN as f32) / S_WT_LEN as f32
                }
            }
        }
    }

    fn lagged_wave(&self, waveform: Waveform) -> f32 {
        let t = &*TABLES;
        let p = self.phase;
        match waveform {
            Waveform::Sine => {
                if p < Q_WT_LEN {
                    -t.sine[Q_WT_LEN - p]
                } else if p < S_WT_LEN {
                    t.sine[p - Q_WT_LEN]
                } else if p < D_WT_LEN {
                    t.sine[D_WT_LEN - p]
                } else {
                    -t.sine[p - D_WT_LEN]
                }
            }
            Waveform::Triangle => {
                if p < Q_WT_LEN {
                    -t.triangle[Q_WT_LEN - p]
                } else if p < S_WT_LEN {
                    t.triangle[p - Q_WT_LEN]
                } else if p < D_WT_LEN {
                    t.triangle[D_WT_LEN - p]
                } else {
                    -t.triangle[p - D_WT_LEN]
                }
            }
            Waveform::Square => {
                if p < Q_WT_LEN {
                    t.square[p]
                } else if p < S_WT_LEN {
                    -t.square[S_WT_LEN - p]
                } else if p < D_WT_LEN {
                    -t.square[p - S_WT_LEN]
                } else {
                    t.square[WT_LEN - p]
                }
            }
            Waveform::Sawtooth => {
                if p < S_WT_LEN {
                    t.sawtooth[p]
                } else {
                    t.sawtooth[WT_LEN - p]
                }
            }
        }
    }
}

impl Default for QuadratureOscillator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn sine_matches_closed_form() {
        let sample_rate = 48_000.0;
        let freq = 440.0;
        let mut osc = QuadratureOscillator::new();
        osc.setup(sample_rate, freq);

        for n in 0..2048 {
            let pair = osc.process(Waveform::Sine);
            let theta = TAU * freq * n as f32 / sample_rate;
            assert!(
                (pair.in_phase - SQRT_2 * theta.sin()).abs() < 2e-3,
                "sample {n}: got {}, expected {}",
                pair.in_phase,
                SQRT_2 * theta.sin()
            );
            assert!(
                (pair.quadrature + SQRT_2 * theta.cos()).abs() < 2e-3,
                "sample {n}: quadrature should lag by 90°"
            );
        }
    }

    #[test]
    fn phase_returns_to_start_every_sample_rate_samples() {
        // 440.5 Hz at 48 kHz: N = 7 929 000 is not a multiple of the table
        // length, so fractional stepping must still close the cycle exactly.
        let mut osc = QuadratureOscillator::new();
        osc.setup(48_000.0, 440.5);

        let start = osc.phase;
        for _ in 0..48_000 {
            osc.process(Waveform::Sine);
        }
        let n = (440.5 * WT_LEN as f64 + 0.5) as usize;
        assert_eq!(osc.phase, (start + n) % WT_LEN);
    }

    #[test]
    fn phase_never_drifts_from_the_ideal_line() {
        let mut osc = QuadratureOscillator::new();
        osc.setup(44_100.0, 313.7);

        let ideal_step = 313.7 * WT_LEN as f64 / 44_100.0;
        let mut unwrapped = 0u64;
        let mut prev = osc.phase;
        for n in 1..=50_000u64 {
            osc.process(Waveform::Sine);
            let delta = (osc.phase + WT_LEN - prev) % WT_LEN;
            unwrapped += delta as u64;
            prev = osc.phase;
            let drift = unwrapped as f64 - ideal_step * n as f64;
            assert!(drift.abs() <= 1.0, "drift {drift} at sample {n}");
        }
    }

    #[test]
    fn frequency_change_does_not_disturb_the_phase() {
        let mut osc = QuadratureOscillator::new();
        osc.setup(48_000.0, 440.0);
        for _ in 0..100 {
            osc.process(Waveform::Sine);
        }
        let phase = osc.phase;
        osc.setup(48_000.0, 1234.5);
        assert_eq!(osc.phase, phase);
    }

    #[test]
    fn sample_rate_change_resets_the_phase() {
        let mut osc = QuadratureOscillator::new();
        osc.setup(48_000.0, 440.0);
        for _ in 0..100 {
            osc.process(Waveform::Sine);
        }
        osc.setup(44_100.0, 440.0);
        assert_eq!(osc.phase, 0);
    }

    #[test]
    fn singular_table_entries_are_clamped_to_their_neighbors() {
        let t = &*TABLES;
        assert_eq!(t.square[0], t.square[1]);
        assert_eq!(t.sawtooth[S_WT_LEN], t.sawtooth[S_WT_LEN - 1]);
        for table in [&t.sine, &t.triangle, &t.square, &t.sawtooth] {
            assert!(table.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn triangle_hits_its_quadrant_extremes() {
        let mut osc = QuadratureOscillator::new();
        osc.setup(WT_LEN as f32, 1.0); // one table step per sample

        let mut values = Vec::with_capacity(WT_LEN);
        for _ in 0..WT_LEN {
            values.push(osc.process(Waveform::Triangle).in_phase);
        }
        assert_eq!(values[0], 0.0);
        assert!((values[Q_WT_LEN] - SQRT_3).abs() < 1e-6);
        assert!((values[S_WT_LEN]).abs() < 1e-3);
        assert!((values[D_WT_LEN] + SQRT_3).abs() < 1e-6);
    }

    #[test]
    fn waveform_indices_round_trip_and_reject_unknown_values() {
        for wf in [
            Waveform::Sine,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Sawtooth,
        ] {
            assert_eq!(Waveform::from_index(wf.index()), Some(wf));
        }
        assert_eq!(Waveform::from_index(4), None);
    }
}
