//! sideband - terminal demo and monitor for the single-sideband modulator
//!
//! Plays a two-tone test signal through the modulation pipeline and shows
//! the input and output spectra side by side while the carrier is tuned
//! live from the keyboard. Run with: cargo run

mod app;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
