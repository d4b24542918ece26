//! Out-of-band parameter plumbing.
//!
//! Parameter edits originate on a control thread (UI, host automation, a
//! restored preset) and reach the audio thread through a realtime-safe
//! channel, to be applied strictly at block boundaries. This module defines
//! the message vocabulary, the slider-to-frequency mapping used by carrier
//! controls, and the persisted-value snapshot.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::pipeline::{FilterStage, Modulator};

#[derive(Debug, Clone, Copy)]
pub enum ControlMessage {
    Carrier { hz: f32, waveform: Waveform },
    Cutoff { stage: FilterStage, hz: f32 },
    Mix { wet: f32 },
}

pub trait ControlReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Full-scale frequency of the bidirectional carrier slider.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierRange {
    R50,
    R100,
    R200,
    R400,
    R800,
    R1600,
    R3200,
}

impl CarrierRange {
    pub fn hz(self) -> f32 {
        match self {
            Self::R50 => 50.0,
            Self::R100 => 100.0,
            Self::R200 => 200.0,
            Self::R400 => 400.0,
            Self::R800 => 800.0,
            Self::R1600 => 1_600.0,
            Self::R3200 => 3_200.0,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        [
            Self::R50,
            Self::R100,
            Self::R200,
            Self::R400,
            Self::R800,
            Self::R1600,
            Self::R3200,
        ]
        .get(index as usize)
        .copied()
    }

    pub fn index(self) -> u32 {
        match self {
            Self::R50 => 0,
            Self::R100 => 1,
            Self::R200 => 2,
            Self::R400 => 3,
            Self::R800 => 4,
            Self::R1600 => 5,
            Self::R3200 => 6,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierScale {
    Linear,
    Log,
}

impl CarrierScale {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Linear),
            1 => Some(Self::Log),
            _ => None,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Self::Linear => 0,
            Self::Log => 1,
        }
    }
}

// Log taper anchored at the endpoints: slide 0 -> 0 Hz, |slide| 1 -> full
// range, one decade-and-change of resolution gain near the center.
const LOG_TAPER_BASE: f32 = 20.0;

/// Map a bidirectional slider position in `[-1, 1]` to a signed carrier
/// frequency. The slider's side carries the sideband sign.
pub fn slide_to_hz(slide: f32, range: CarrierRange, scale: CarrierScale) -> f32 {
    let slide = slide.clamp(-1.0, 1.0);
    let magnitude = match scale {
        CarrierScale::Linear => slide.abs() * range.hz(),
        CarrierScale::Log => {
            range.hz() * (LOG_TAPER_BASE.powf(slide.abs()) - 1.0) / (LOG_TAPER_BASE - 1.0)
        }
    };
    magnitude.copysign(slide)
}

/// Inverse of [`slide_to_hz`]; frequencies beyond the range pin the slider
/// to the matching end stop.
pub fn hz_to_slide(hz: f32, range: CarrierRange, scale: CarrierScale) -> f32 {
    if hz >= range.hz() {
        return 1.0;
    }
    if hz <= -range.hz() {
        return -1.0;
    }
    let magnitude = match scale {
        CarrierScale::Linear => hz.abs() / range.hz(),
        CarrierScale::Log => {
            (hz.abs() / range.hz() * (LOG_TAPER_BASE - 1.0) + 1.0).log(LOG_TAPER_BASE)
        }
    };
    magnitude.copysign(hz)
}

/// The parameter values worth persisting across sessions. Only the values
/// matter here; their byte encoding belongs to the host layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub carrier_hz: f32,
    pub waveform: u32,
    pub slide: f32,
    pub range: u32,
    pub scale: u32,
    pub input_hpf_hz: f32,
    pub input_lpf_hz: f32,
    pub output_hpf_hz: f32,
    pub output_lpf_hz: f32,
    pub wet: f32,
    pub bypass: bool,
}

impl ParamSnapshot {
    pub fn capture(
        modulator: &Modulator,
        range: CarrierRange,
        scale: CarrierScale,
        bypass: bool,
    ) -> Self {
        Self {
            carrier_hz: modulator.carrier_hz(),
            waveform: modulator.waveform().index(),
            slide: hz_to_slide(modulator.carrier_hz(), range, scale),
            range: range.index(),
            scale: scale.index(),
            input_hpf_hz: modulator.filter_cutoff(FilterStage::InputHighpass),
            input_lpf_hz: modulator.filter_cutoff(FilterStage::InputLowpass),
            output_hpf_hz: modulator.filter_cutoff(FilterStage::OutputHighpass),
            output_lpf_hz: modulator.filter_cutoff(FilterStage::OutputLowpass),
            wet: modulator.wet(),
            bypass,
        }
    }

    /// Route the stored values back through the public setters. An unknown
    /// waveform index keeps the modulator's current waveform; the bypass
    /// value is left for the caller, which owns that flag.
    pub fn apply(&self, modulator: &mut Modulator) {
        let waveform = Waveform::from_index(self.waveform).unwrap_or(modulator.waveform());
        modulator.set_carrier(self.carrier_hz, waveform);
        modulator.set_filter_cutoff(FilterStage::InputHighpass, self.input_hpf_hz);
        modulator.set_filter_cutoff(FilterStage::InputLowpass, self.input_lpf_hz);
        modulator.set_filter_cutoff(FilterStage::OutputHighpass, self.output_hpf_hz);
        modulator.set_filter_cutoff(FilterStage::OutputLowpass, self.output_lpf_hz);
        modulator.set_mix(self.wet);
    }
}
