//! Hardware audio sink abstraction
//!
//! Abstracts the physical output (I2S codec, desktop audio stack, ...) the
//! playback worker streams into. Implementations are expected to apply
//! backpressure in `write` - blocking until the device has buffer room is
//! what paces the whole playback loop to real time.

use wren_audio::WavFormat;

use crate::error::Result;

/// Platform audio output consumed by the playback worker.
///
/// Methods take `&self` (implementations use interior mutability) because
/// the sink is shared: the worker writes while the controller flips
/// enable/disable for pause and resume.
pub trait AudioSink: Send + Sync {
    /// Prepare the output for the given PCM format
    fn open(&self, format: &WavFormat) -> Result<()>;

    /// Write raw PCM bytes; returns the number of bytes accepted.
    ///
    /// May block for device backpressure. A short count is not an error -
    /// the engine logs it and keeps streaming.
    fn write(&self, bytes: &[u8]) -> Result<usize>;

    /// Resume consumption after `disable` (the resume primitive)
    fn enable(&self);

    /// Stop consuming without releasing the device (the pause primitive)
    fn disable(&self);

    /// Release the output device
    fn close(&self);
}

/// Sink that accepts and discards all audio
///
/// Useful for headless operation and tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn open(&self, _format: &WavFormat) -> Result<()> {
        Ok(())
    }

    fn write(&self, bytes: &[u8]) -> Result<usize> {
        Ok(bytes.len())
    }

    fn enable(&self) {}

    fn disable(&self) {}

    fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_swallows_everything() {
        let sink = NullSink;
        let format = WavFormat {
            channels: 1,
            sample_rate_hz: 16000,
            bits_per_sample: 16,
            byte_rate: 32000,
            data_size_bytes: 0,
        };

        sink.open(&format).unwrap();
        sink.enable();
        assert_eq!(sink.write(&[0u8; 128]).unwrap(), 128);
        sink.disable();
        sink.close();
    }
}
