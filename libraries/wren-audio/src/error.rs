//! Error types for audio parsing and DSP

use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// RIFF/WAVE container structure is invalid
    #[error("malformed WAV header: {0}")]
    MalformedHeader(&'static str),

    /// File parses but describes audio this engine cannot play
    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    /// Stream ended before the required chunks were seen
    #[error("truncated WAV file: {0}")]
    TruncatedFile(&'static str),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
