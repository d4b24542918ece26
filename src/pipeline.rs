//! Per-block orchestration of the modulation chain.
//!
//! Wires the DSP primitives into the stereo signal path and owns every
//! runtime parameter. Parameter setters only latch values; they take effect
//! at the top of the next `process_block` call, so coefficients can never
//! tear mid-block.

use crate::control::{ControlMessage, ControlReceiver};
use crate::dsp::biquad::Biquad;
use crate::dsp::delay::DelayLine;
use crate::dsp::hilbert::HilbertTransformer;
use crate::dsp::mixer::SidebandMixer;
use crate::dsp::oscillator::{QuadratureOscillator, Waveform};
use crate::dsp::QuadraturePair;

/// Impulse response length of the Hilbert transformer.
const HILBERT_LEN: usize = 771;
/// Dry-path delay matching the Hilbert transformer's group delay, so dry
/// and wet sum in phase.
const DRY_DELAY: usize = (HILBERT_LEN - 1) / 2;

/// The four band-limiting stages around the modulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    InputHighpass,
    InputLowpass,
    OutputHighpass,
    OutputLowpass,
}

impl FilterStage {
    pub const ALL: [FilterStage; 4] = [
        FilterStage::InputHighpass,
        FilterStage::InputLowpass,
        FilterStage::OutputHighpass,
        FilterStage::OutputLowpass,
    ];

    fn index(self) -> usize {
        match self {
            FilterStage::InputHighpass => 0,
            FilterStage::InputLowpass => 1,
            FilterStage::OutputHighpass => 2,
            FilterStage::OutputLowpass => 3,
        }
    }
}

/// One channel's worth of signal-path state.
struct ChannelChain {
    dry_delay: DelayLine,
    input_hpf: Biquad,
    input_lpf: Biquad,
    hilbert: HilbertTransformer,
    output_hpf: Biquad,
    output_lpf: Biquad,
}

impl ChannelChain {
    fn new() -> Self {
        Self {
            dry_delay: DelayLine::new(DRY_DELAY + 1),
            input_hpf: Biquad::highpass(),
            input_lpf: Biquad::lowpass(),
            hilbert: HilbertTransformer::new(HILBERT_LEN),
            output_hpf: Biquad::highpass(),
            output_lpf: Biquad::lowpass(),
        }
    }

    fn filter_mut(&mut self, stage: FilterStage) -> &mut Biquad {
        match stage {
            FilterStage::InputHighpass => &mut self.input_hpf,
            FilterStage::InputLowpass => &mut self.input_lpf,
            FilterStage::OutputHighpass => &mut self.output_hpf,
            FilterStage::OutputLowpass => &mut self.output_lpf,
        }
    }

    #[inline]
    fn tick(
        &mut self,
        mixer: &SidebandMixer,
        carrier: QuadraturePair,
        carrier_hz: f32,
        wet: f32,
        dry: f32,
        x: f32,
    ) -> f32 {
        self.dry_delay.enqueue(x);
        let band_limited = self.input_lpf.process(self.input_hpf.process(x));
        let signal = self.hilbert.process(band_limited);
        let mixed = mixer.mix(carrier, signal, carrier_hz);
        let shaped = self.output_lpf.process(self.output_hpf.process(mixed));
        wet * shaped + dry * self.dry_delay.read(DRY_DELAY)
    }

    fn reset(&mut self) {
        self.dry_delay.reset();
        self.input_hpf.reset();
        self.input_lpf.reset();
        self.hilbert.reset();
        self.output_hpf.reset();
        self.output_lpf.reset();
    }
}

/// Stereo single-sideband modulator.
pub struct Modulator {
    sample_rate: f32,
    carrier_hz: f32,
    waveform: Waveform,
    cutoffs: [f32; 4],
    wet: f32,
    dry: f32,

    carrier_dirty: bool,
    cutoff_dirty: [bool; 4],
    full_setup: bool,
    was_bypassed: bool,

    dds: QuadratureOscillator,
    mixer: SidebandMixer,
    channels: [ChannelChain; 2],
}

impl Modulator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            carrier_hz: 0.0,
            waveform: Waveform::Sine,
            cutoffs: [200.0, 20_000.0, 20.0, 20_000.0],
            wet: 1.0,
            dry: 0.0,
            carrier_dirty: false,
            cutoff_dirty: [false; 4],
            full_setup: true,
            was_bypassed: false,
            dds: QuadratureOscillator::new(),
            mixer: SidebandMixer::new(),
            channels: [ChannelChain::new(), ChannelChain::new()],
        }
    }

    /// Propagate a sample-rate change to every stage. Call before `reset`
    /// when the rate changes.
    pub fn configure(&mut self, sample_rate: f32) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.full_setup = true;
        }
    }

    /// Set the signed carrier frequency and waveform. A sign change arms
    /// the mixer's switching state so the sideband reselection waits for a
    /// quiet point in the carrier quadrature.
    pub fn set_carrier(&mut self, hz: f32, waveform: Waveform) {
        if hz != self.carrier_hz {
            self.mixer.on_carrier_change(self.carrier_hz, hz);
            self.carrier_hz = hz;
            self.carrier_dirty = true;
        }
        self.waveform = waveform;
    }

    pub fn set_filter_cutoff(&mut self, stage: FilterStage, hz: f32) {
        let i = stage.index();
        if self.cutoffs[i] != hz {
            self.cutoffs[i] = hz;
            self.cutoff_dirty[i] = true;
        }
    }

    /// Wet fraction in `[0, 1]`; dry is the complement.
    pub fn set_mix(&mut self, wet: f32) {
        let wet = wet.clamp(0.0, 1.0);
        self.wet = wet;
        self.dry = 1.0 - wet;
    }

    /// Zero all internal DSP state. Idempotent; safe to call mid-stream.
    pub fn reset(&mut self) {
        self.dds.reset();
        self.mixer.reset();
        for chain in &mut self.channels {
            chain.reset();
        }
        self.full_setup = true;
    }

    /// Process one stereo block. The only per-block entry point; does not
    /// allocate. Returns true when the output block is silent.
    ///
    /// Mismatched channel lengths leave the outputs untouched (a no-op pass
    /// for the block). In bypass the input is copied verbatim, with a
    /// silent input propagated as a silence flag instead of copied zeros.
    pub fn process_block(
        &mut self,
        input: [&[f32]; 2],
        output: [&mut [f32]; 2],
        input_silent: bool,
        bypass: bool,
    ) -> bool {
        if self.was_bypassed && !bypass {
            self.reset();
        }
        self.was_bypassed = bypass;

        self.apply_pending();

        let [in_l, in_r] = input;
        let [out_l, out_r] = output;
        let frames = in_l.len();
        if in_r.len() != frames || out_l.len() != frames || out_r.len() != frames {
            return false;
        }

        if bypass {
            if input_silent {
                out_l.fill(0.0);
                out_r.fill(0.0);
                return true;
            }
            out_l.copy_from_slice(in_l);
            out_r.copy_from_slice(in_r);
            return false;
        }

        let [chain_l, chain_r] = &mut self.channels;
        for n in 0..frames {
            let carrier = self.dds.process(self.waveform);
            self.mixer.settle(carrier);

            out_l[n] = chain_l.tick(
                &self.mixer,
                carrier,
                self.carrier_hz,
                self.wet,
                self.dry,
                in_l[n],
            );
            out_r[n] = chain_r.tick(
                &self.mixer,
                carrier,
                self.carrier_hz,
                self.wet,
                self.dry,
                in_r[n],
            );
        }
        false
    }

    /// Apply latched parameter changes. Runs at block boundaries only.
    fn apply_pending(&mut self) {
        if self.full_setup || self.carrier_dirty {
            self.dds.setup(self.sample_rate, self.carrier_hz.abs());
            self.carrier_dirty = false;
        }
        for stage in FilterStage::ALL {
            let i = stage.index();
            if self.full_setup || self.cutoff_dirty[i] {
                let hz = self.cutoffs[i];
                for chain in &mut self.channels {
                    chain.filter_mut(stage).setup(self.sample_rate, hz);
                }
                self.cutoff_dirty[i] = false;
            }
        }
        self.full_setup = false;
    }

    /// Apply queued control-rate messages. Call at a block boundary.
    pub fn drain_control(&mut self, rx: &mut impl ControlReceiver) {
        while let Some(msg) = rx.pop() {
            match msg {
                ControlMessage::Carrier { hz, waveform } => self.set_carrier(hz, waveform),
                ControlMessage::Cutoff { stage, hz } => self.set_filter_cutoff(stage, hz),
                ControlMessage::Mix { wet } => self.set_mix(wet),
            }
        }
    }

    /// Latency of the wet path relative to the input, in samples. The dry
    /// path is delayed by the same amount so the two stay in phase.
    pub fn latency(&self) -> usize {
        DRY_DELAY
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn carrier_hz(&self) -> f32 {
        self.carrier_hz
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn filter_cutoff(&self, stage: FilterStage) -> f32 {
        self.cutoffs[stage.index()]
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }

    /// True while a carrier sign change is waiting for a quiet point to
    /// complete the sideband reselection.
    pub fn is_switching(&self) -> bool {
        self.mixer.is_switching()
    }
}
