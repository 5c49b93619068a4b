//! Wren Player - Audio
//!
//! WAV container parsing and the DSP used by the playback engine.
//!
//! This crate provides:
//! - Chunk-level RIFF/WAVE parsing for linear PCM files (8/16-bit, mono/stereo)
//! - Adaptive speaker-protection high-pass filter (4th-order Linkwitz-Riley)
//! - Spectrum band extraction for the UI visualizer
//!
//! Everything here is platform-free: parsing works over any `Read + Seek`
//! stream and the DSP operates on plain sample slices. Threading, volume
//! policy and hardware output live in `wren-playback`.
//!
//! # Example: Parsing a WAV header
//!
//! ```rust,no_run
//! use std::fs::File;
//!
//! # fn example() -> wren_audio::Result<()> {
//! let mut file = File::open("/music/track.wav")?;
//! let format = wren_audio::wav::parse(&mut file)?;
//!
//! println!(
//!     "{} Hz, {} ch, {} bit, {} s",
//!     format.sample_rate_hz,
//!     format.channels,
//!     format.bits_per_sample,
//!     format.duration_s()
//! );
//! // `file` is now positioned at the first PCM data byte.
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filter;
pub mod visualizer;
pub mod wav;

pub use error::{AudioError, Result};
pub use filter::AdaptiveHighpass;
pub use visualizer::{VisualizerFrame, BAND_COUNT};
pub use wav::WavFormat;
