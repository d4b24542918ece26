pub mod control; // Control-rate parameter feed and persisted values
pub mod dsp;
pub mod pipeline; // Per-block orchestration of the modulation chain

pub const MAX_BLOCK_SIZE: usize = 2048;
