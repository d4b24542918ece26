//! Linear-frequency spectrum view for the demo.
//!
//! Two overlaid traces: the test signal going into the modulator and the
//! shifted signal coming out. Linear bins (not the usual log spacing)
//! because a frequency shift moves every partial by the same number of Hz,
//! which only reads as a rigid translation on a linear axis.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

const FLOOR_DB: f64 = -90.0;

pub struct SpectrumView {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    data: Vec<(f64, f64)>,
}

impl SpectrumView {
    pub fn new(fft_len: usize, sample_rate: f32, max_hz: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);

        // Hann window against spectral leakage
        let window: Vec<f32> = (0..fft_len)
            .map(|i| {
                let t = i as f32 / (fft_len - 1) as f32;
                0.5 * (1.0 - (std::f32::consts::TAU * t).cos())
            })
            .collect();

        let bin_hz = f64::from(sample_rate) / fft_len as f64;
        let max_bin = ((f64::from(max_hz) / bin_hz) as usize).min(fft_len / 2);
        let data = (0..max_bin).map(|i| (i as f64 * bin_hz, FLOOR_DB)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            data,
        }
    }

    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }
        for ((slot, &x), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            slot.re = x * w;
            slot.im = 0.0;
        }
        self.fft.process(&mut self.scratch);

        for (i, (_, db)) in self.data.iter_mut().enumerate() {
            let bin = self.scratch[i];
            let power = f64::from(bin.re * bin.re + bin.im * bin.im);
            *db = (10.0 * power.log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.data
    }
}

pub fn render_spectra(
    frame: &mut Frame,
    area: Rect,
    input: &[(f64, f64)],
    output: &[(f64, f64)],
    max_hz: f64,
) {
    let datasets = vec![
        Dataset::default()
            .name("in")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(input),
        Dataset::default()
            .name("out")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(output),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" spectrum (in / out) ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, max_hz])
                .labels(vec!["0", "1k", "2k", "3k", "4k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 40.0])
                .labels(vec!["-90", "-50", "-10", "+30"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
