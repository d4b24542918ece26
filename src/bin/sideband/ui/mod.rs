//! TUI for the sideband demo.
//!
//! Shows the live parameters and overlays the input and output spectra, so
//! the frequency shift and sideband selection are visible while tuning.

mod spectrum;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use sideband_dsp::control::ControlMessage;
use sideband_dsp::dsp::oscillator::Waveform;
use sideband_dsp::pipeline::FilterStage;

use spectrum::{render_spectra, SpectrumView};

/// FFT window for the spectrum display.
const FFT_LEN: usize = 2048;
/// Highest frequency shown.
const DISPLAY_MAX_HZ: f32 = 4_000.0;

const CARRIER_FINE_HZ: f32 = 10.0;
const CARRIER_COARSE_HZ: f32 = 100.0;
const CARRIER_LIMIT_HZ: f32 = 3_200.0;
const WET_STEP: f32 = 0.05;
const LPF_STEP_HZ: f32 = 500.0;

pub struct UiApp {
    control_tx: Producer<ControlMessage>,
    tap_in: Consumer<f32>,
    tap_out: Consumer<f32>,
    bypass: Arc<AtomicBool>,

    // UI-side copy of the parameters it has sent
    carrier_hz: f32,
    waveform: Waveform,
    wet: f32,
    output_lpf_hz: f32,

    in_window: Vec<f32>,
    out_window: Vec<f32>,
    in_spectrum: SpectrumView,
    out_spectrum: SpectrumView,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<ControlMessage>,
        tap_in: Consumer<f32>,
        tap_out: Consumer<f32>,
        bypass: Arc<AtomicBool>,
        sample_rate: f32,
        carrier_hz: f32,
    ) -> Self {
        Self {
            control_tx,
            tap_in,
            tap_out,
            bypass,
            carrier_hz,
            waveform: Waveform::Sine,
            wet: 1.0,
            output_lpf_hz: 20_000.0,
            in_window: vec![0.0; FFT_LEN],
            out_window: vec![0.0; FFT_LEN],
            in_spectrum: SpectrumView::new(FFT_LEN, sample_rate, DISPLAY_MAX_HZ),
            out_spectrum: SpectrumView::new(FFT_LEN, sample_rate, DISPLAY_MAX_HZ),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.drain_taps();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn drain_taps(&mut self) {
        let mut fresh = 0;
        while let Ok(x) = self.tap_in.pop() {
            self.in_window.push(x);
            fresh += 1;
        }
        while let Ok(x) = self.tap_out.pop() {
            self.out_window.push(x);
        }
        for window in [&mut self.in_window, &mut self.out_window] {
            if window.len() > FFT_LEN {
                let excess = window.len() - FFT_LEN;
                window.drain(..excess);
            }
        }
        if fresh > 0 {
            self.in_spectrum.update(&self.in_window);
            self.out_spectrum.update(&self.out_window);
        }
    }

    fn handle_input(&mut self) -> EyreResult<()> {
        if !event::poll(Duration::from_millis(16))? {
            return Ok(());
        }
        let Event::Key(key) = event::read()? else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.nudge_carrier(-CARRIER_FINE_HZ),
            KeyCode::Right => self.nudge_carrier(CARRIER_FINE_HZ),
            KeyCode::Down => self.nudge_carrier(-CARRIER_COARSE_HZ),
            KeyCode::Up => self.nudge_carrier(CARRIER_COARSE_HZ),
            KeyCode::Char('w') => {
                let next = (self.waveform.index() + 1) % 4;
                self.waveform = Waveform::from_index(next).unwrap_or(Waveform::Sine);
                self.send(ControlMessage::Carrier {
                    hz: self.carrier_hz,
                    waveform: self.waveform,
                });
            }
            KeyCode::Char('[') => self.set_wet(self.wet - WET_STEP),
            KeyCode::Char(']') => self.set_wet(self.wet + WET_STEP),
            KeyCode::Char('-') => self.set_output_lpf(self.output_lpf_hz - LPF_STEP_HZ),
            KeyCode::Char('=') => self.set_output_lpf(self.output_lpf_hz + LPF_STEP_HZ),
            KeyCode::Char('b') => {
                let was = self.bypass.load(Ordering::Relaxed);
                self.bypass.store(!was, Ordering::Relaxed);
            }
            _ => {}
        }
        Ok(())
    }

    fn nudge_carrier(&mut self, delta_hz: f32) {
        self.carrier_hz = (self.carrier_hz + delta_hz).clamp(-CARRIER_LIMIT_HZ, CARRIER_LIMIT_HZ);
        self.send(ControlMessage::Carrier {
            hz: self.carrier_hz,
            waveform: self.waveform,
        });
    }

    fn set_wet(&mut self, wet: f32) {
        self.wet = wet.clamp(0.0, 1.0);
        self.send(ControlMessage::Mix { wet: self.wet });
    }

    fn set_output_lpf(&mut self, hz: f32) {
        self.output_lpf_hz = hz.clamp(500.0, 20_000.0);
        self.send(ControlMessage::Cutoff {
            stage: FilterStage::OutputLowpass,
            hz: self.output_lpf_hz,
        });
    }

    fn send(&mut self, msg: ControlMessage) {
        // A full queue means the audio thread is behind on draining; the
        // next keypress will resend the latest value anyway.
        let _ = self.control_tx.push(msg);
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(8)])
            .split(frame.area());

        let sideband = if self.carrier_hz < 0.0 { "lower" } else { "upper" };
        let bypassed = self.bypass.load(Ordering::Relaxed);
        let status = vec![
            Line::from(format!(
                "carrier {:+7.1} Hz ({sideband} sideband)   waveform {}   wet {:3.0}%   output LPF {:5.0} Hz{}",
                self.carrier_hz,
                self.waveform.label(),
                self.wet * 100.0,
                self.output_lpf_hz,
                if bypassed { "   [BYPASS]" } else { "" },
            )),
            Line::from(
                "←/→ ±10 Hz  ↑/↓ ±100 Hz  w waveform  [ ] wet  - = LPF  b bypass  q quit",
            )
            .style(Style::default().fg(Color::DarkGray)),
        ];
        let header = Paragraph::new(status)
            .block(Block::default().title(" sideband ").borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        render_spectra(
            frame,
            chunks[1],
            self.in_spectrum.data(),
            self.out_spectrum.data(),
            f64::from(DISPLAY_MAX_HZ),
        );
    }
}
