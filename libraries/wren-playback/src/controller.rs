//! Controller facade for the GUI button layer
//!
//! Thin wrapper around [`PlaybackEngine`] exposing the transport and volume
//! surface the physical-button dispatcher and the GUI views call. Errors are
//! folded into boolean results here; the reason class stays observable
//! through `get_state()` reporting [`PlayerState::Error`].

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::engine::PlaybackEngine;
use crate::frames::FrameSlot;
use crate::types::PlayerState;

/// Transport and volume commands, as consumed by the GUI
pub struct PlaybackController {
    engine: Arc<PlaybackEngine>,
}

impl PlaybackController {
    /// Wrap an engine
    pub fn new(engine: Arc<PlaybackEngine>) -> Self {
        Self { engine }
    }

    /// Start playing a file. Returns `false` on failure; `get_state()` then
    /// reports `Error` so the UI can show a distinct failure indication.
    pub fn play(&self, path: impl AsRef<Path>) -> bool {
        match self.engine.play(path.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, path = %path.as_ref().display(), "play failed");
                false
            }
        }
    }

    /// Pause the active session
    pub fn pause(&self) {
        self.engine.pause();
    }

    /// Resume a paused session
    pub fn resume(&self) {
        self.engine.resume();
    }

    /// Stop playback; logs if the worker missed its teardown bound
    pub fn stop(&self) {
        if let Err(e) = self.engine.stop() {
            warn!(error = %e, "stop did not complete cleanly");
        }
    }

    /// Raise the volume by one display step
    pub fn volume_up(&self) {
        self.engine.volume().step_up();
    }

    /// Lower the volume by one display step
    pub fn volume_down(&self) {
        self.engine.volume().step_down();
    }

    /// Set the physical volume directly (safety cap applied)
    pub fn set_volume_physical(&self, percent: u8) {
        self.engine.volume().set_physical(percent, true);
    }

    /// Current transport state
    pub fn get_state(&self) -> PlayerState {
        self.engine.state()
    }

    /// Track duration in whole seconds (0 when stopped)
    pub fn get_duration_s(&self) -> u32 {
        self.engine.duration_s()
    }

    /// Playback position in whole seconds
    pub fn get_progress_s(&self) -> u32 {
        self.engine.progress_s()
    }

    /// Volume position on the 0-100 display scale
    pub fn get_volume(&self) -> u8 {
        self.engine.volume().display()
    }

    /// Consumer handle for visualizer frames
    pub fn visualizer(&self) -> Arc<FrameSlot> {
        self.engine.frames()
    }
}
