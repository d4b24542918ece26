use crate::dsp::QuadraturePair;

/// Carrier-quadrature magnitude below which a pending sideband reselection
/// is allowed to complete.
const SETTLE_THRESHOLD: f32 = 0.01;

/*
Phasing-method sideband selection:

    lower sideband:  out = z·x + zH·xH
    upper sideband:  out = z·x - zH·xH

where (x, xH) is the carrier pair and (z, zH) the signal's analytic pair.
A negative carrier frequency selects the lower sideband.

Flipping the formula the instant the carrier frequency crosses zero clicks:
near zero both quadrature terms carry significant energy, so the sign swap
on zH·xH is a step in the output. The switching state holds the previous
selection until |xH| decays below SETTLE_THRESHOLD, where the term being
negated no longer contributes audibly.
*/

pub struct SidebandMixer {
    switching: bool,
}

impl SidebandMixer {
    pub fn new() -> Self {
        Self { switching: false }
    }

    /// Arm the switching state when the carrier frequency parameter crosses
    /// or lands on zero from the other side. Called at parameter-update
    /// time, not per sample.
    pub fn on_carrier_change(&mut self, previous_hz: f32, next_hz: f32) {
        let product = previous_hz * next_hz;
        if product < 0.0 || (product == 0.0 && (previous_hz < 0.0 || next_hz < 0.0)) {
            self.switching = true;
        }
    }

    /// Per-frame: complete a pending reselection once the carrier
    /// quadrature has decayed far enough. Call once per sample, before
    /// mixing the channels.
    #[inline]
    pub fn settle(&mut self, carrier: QuadraturePair) {
        if self.switching && carrier.quadrature.abs() < SETTLE_THRESHOLD {
            self.switching = false;
        }
    }

    /// Combine the carrier pair with one channel's analytic pair.
    #[inline]
    pub fn mix(&self, carrier: QuadraturePair, signal: QuadraturePair, carrier_hz: f32) -> f32 {
        let lower = (!self.switching && carrier_hz < 0.0) || (self.switching && carrier_hz >= 0.0);
        if lower {
            signal.in_phase * carrier.in_phase + signal.quadrature * carrier.quadrature
        } else {
            signal.in_phase * carrier.in_phase - signal.quadrature * carrier.quadrature
        }
    }

    pub fn is_switching(&self) -> bool {
        self.switching
    }

    pub fn reset(&mut self) {
        self.switching = false;
    }
}

impl Default for SidebandMixer {
    fn default() -> Self {
        Self::new()
    }
}
