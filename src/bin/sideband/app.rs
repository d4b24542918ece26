//! Audio-side wiring: test source, modulator, cpal output stream.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use sideband_dsp::dsp::oscillator::Waveform;
use sideband_dsp::pipeline::Modulator;
use sideband_dsp::MAX_BLOCK_SIZE;

use super::ui::UiApp;

/// Carrier the demo starts on: a 150 Hz downward shift.
const INITIAL_CARRIER_HZ: f32 = -150.0;

/// Capacity of the audio taps feeding the spectrum display.
const TAP_CAPACITY: usize = 1 << 14;

/// Two-tone test source. Dual sines make both sidebands easy to see on the
/// spectrum display: each partial moves by the carrier frequency, not
/// proportionally to its own.
struct TestTone {
    phases: [f32; 2],
    steps: [f32; 2],
}

impl TestTone {
    fn new(sample_rate: f32) -> Self {
        let freqs = [440.0, 660.0];
        Self {
            phases: [0.0; 2],
            steps: freqs.map(|f| TAU * f / sample_rate),
        }
    }

    fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sample = 0.35 * self.phases[0].sin() + 0.25 * self.phases[1].sin();
            *l = sample;
            *r = sample;
            for (phase, step) in self.phases.iter_mut().zip(self.steps.iter()) {
                *phase += step;
                if *phase >= TAU {
                    *phase -= TAU;
                }
            }
        }
    }
}

pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (control_tx, mut control_rx) = RingBuffer::new(64);
    let (mut tap_in_tx, tap_in_rx) = RingBuffer::<f32>::new(TAP_CAPACITY);
    let (mut tap_out_tx, tap_out_rx) = RingBuffer::<f32>::new(TAP_CAPACITY);
    let bypass = Arc::new(AtomicBool::new(false));
    let bypass_audio = bypass.clone();

    let mut modulator = Modulator::new(sample_rate);
    modulator.set_carrier(INITIAL_CARRIER_HZ, Waveform::Sine);

    let mut source = TestTone::new(sample_rate);
    let mut in_l = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut in_r = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut out_l = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut out_r = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut written = 0;

            while written < total_frames {
                let frames = (total_frames - written).min(MAX_BLOCK_SIZE);

                modulator.drain_control(&mut control_rx);
                source.fill(&mut in_l[..frames], &mut in_r[..frames]);

                let bypassed = bypass_audio.load(Ordering::Relaxed);
                modulator.process_block(
                    [&in_l[..frames], &in_r[..frames]],
                    [&mut out_l[..frames], &mut out_r[..frames]],
                    false,
                    bypassed,
                );

                for n in 0..frames {
                    let base = (written + n) * channels;
                    data[base] = out_l[n];
                    if channels > 1 {
                        data[base + 1] = out_r[n];
                    }
                    for ch in 2..channels {
                        data[base + ch] = 0.0;
                    }
                    // Taps may overflow while the UI is busy; dropped
                    // samples only cost display frames.
                    let _ = tap_in_tx.push(in_l[n]);
                    let _ = tap_out_tx.push(out_l[n]);
                }
                written += frames;
            }
        },
        |err| eprintln!("audio error: {err}"),
        None,
    )?;
    stream.play()?;

    let mut ui = UiApp::new(
        control_tx,
        tap_in_rx,
        tap_out_rx,
        bypass,
        sample_rate,
        INITIAL_CARRIER_HZ,
    );
    let mut terminal = ratatui::init();
    let result = ui.run(&mut terminal);
    ratatui::restore();
    result
}
