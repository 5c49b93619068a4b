//! Wren Player - Playback Engine
//!
//! Streams a PCM WAV file from storage to a hardware audio sink in real
//! time, while adjusting loudness, applying the adaptive speaker-protection
//! filter and publishing live spectrum frames for the UI visualizer.
//!
//! This crate provides:
//! - The playback state machine (`Stopped`/`Playing`/`Paused`/`Error`)
//! - A per-session streaming worker thread paced by sink backpressure
//! - Volume control on a safety-capped physical scale (0-100 display steps)
//! - A single-slot overwrite channel carrying visualizer frames
//! - A thin controller facade for the GUI's button layer
//!
//! # Architecture
//!
//! `wren-playback` is platform-agnostic: the hardware output is reached only
//! through the [`AudioSink`] trait, and storage through `std::fs`. A cpal
//! sink for development machines is available behind the `desktop` feature;
//! embedded targets provide their own sink implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wren_playback::{NullSink, PlaybackConfig, PlaybackController, PlaybackEngine};
//!
//! let engine = Arc::new(PlaybackEngine::new(
//!     PlaybackConfig::default(),
//!     Arc::new(NullSink::default()),
//! ));
//! let controller = PlaybackController::new(Arc::clone(&engine));
//!
//! if controller.play("/music/track.wav") {
//!     println!("duration: {} s", controller.get_duration_s());
//! }
//! while let Some(frame) = controller.visualizer().try_receive() {
//!     // feed the UI bars
//!     let _ = frame;
//! }
//! controller.stop();
//! ```

mod controller;
#[cfg(feature = "desktop")]
pub mod desktop;
mod engine;
mod error;
mod frames;
mod sink;
pub mod types;
mod volume;

// Public exports
pub use controller::PlaybackController;
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use frames::FrameSlot;
pub use sink::{AudioSink, NullSink};
pub use types::{PlaybackConfig, PlayerState};
pub use volume::VolumeController;
