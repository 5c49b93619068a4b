//! Core types for the playback engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport state, the single source of truth for playback status
///
/// Read by the GUI and controller, stored in one atomic. `Error` is distinct
/// from `Stopped` so a failed playback never silently looks idle; it is left
/// only by an explicit `stop()` or a new `play()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No session active
    Stopped,

    /// Worker is streaming to the sink
    Playing,

    /// Session alive, sink disabled, worker idling
    Paused,

    /// Session died on a parse or I/O failure
    Error,
}

impl PlayerState {
    /// Atomic representation
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Error => 3,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8); unknown values decode as `Stopped`
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Playing,
            2 => Self::Paused,
            3 => Self::Error,
            _ => Self::Stopped,
        }
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Hardware-safe volume ceiling, in percent of the physical range.
    /// The display scale always spans 0-100 regardless of this cap.
    pub max_physical_volume: u8,

    /// Display-scale step applied by `volume_up`/`volume_down`
    pub volume_step: u8,

    /// Physical volume applied at startup (safety-capped)
    pub initial_volume: u8,

    /// Bytes read from storage per worker loop iteration
    pub block_size: usize,

    /// Bound on waiting for a previous worker to terminate
    pub stop_timeout: Duration,

    /// Idle poll interval while paused
    pub pause_poll: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_physical_volume: 40,
            volume_step: 5,
            initial_volume: 20,
            block_size: 4096,
            stop_timeout: Duration::from_secs(2),
            pause_poll: Duration::from_millis(10),
        }
    }
}
