//! Error types for the playback engine

use thiserror::Error;

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Container parsing or format failure
    #[error("audio format error: {0}")]
    Audio(#[from] wren_audio::AudioError),

    /// Storage I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A previous playback worker failed to terminate in time
    #[error("previous playback worker did not terminate within {0:?}")]
    WorkerTimeout(std::time::Duration),

    /// Hardware sink failure
    #[error("audio sink error: {0}")]
    Sink(String),
}
