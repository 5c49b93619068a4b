//! Desktop audio sink backed by cpal
//!
//! Development-machine implementation of [`AudioSink`]. The worker's blocking
//! `write` feeds a shared sample queue; the cpal output callback drains it
//! and signals for more, which is the backpressure that paces the playback
//! loop. `enable`/`disable` map to stream play/pause.
//!
//! cpal's `Stream` is not `Send`, so it lives on a dedicated thread that
//! owns it for the whole session and reacts to control commands - no unsafe
//! `Send` impls needed.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use tracing::warn;

use wren_audio::WavFormat;

use crate::error::{PlaybackError, Result};
use crate::sink::AudioSink;

/// Samples buffered ahead of the device before `write` blocks
const QUEUE_CAPACITY: usize = 16384;

/// Upper bound on waiting for queue room; a paused stream stops draining, so
/// a blocked writer must eventually give up and let the worker re-check state
const WRITE_WAIT: Duration = Duration::from_millis(200);

enum StreamCommand {
    Enable,
    Disable,
    Shutdown,
}

/// Queue shared between `write` and the output callback
struct SampleQueue {
    samples: Mutex<VecDeque<f32>>,
    space: Condvar,
}

/// cpal-backed [`AudioSink`] for desktop builds
pub struct CpalSink {
    queue: Arc<SampleQueue>,
    control: Mutex<Option<Sender<StreamCommand>>>,
    format: Mutex<Option<WavFormat>>,
}

impl CpalSink {
    /// Create an unopened sink; the device is acquired on `open`
    pub fn new() -> Self {
        Self {
            queue: Arc::new(SampleQueue {
                samples: Mutex::new(VecDeque::new()),
                space: Condvar::new(),
            }),
            control: Mutex::new(None),
            format: Mutex::new(None),
        }
    }
}

impl Default for CpalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for CpalSink {
    fn open(&self, format: &WavFormat) -> Result<()> {
        self.close();

        let (command_tx, command_rx) = bounded::<StreamCommand>(4);
        let (ready_tx, ready_rx) = bounded::<std::result::Result<(), String>>(1);
        let queue = Arc::clone(&self.queue);
        let stream_format = *format;

        std::thread::Builder::new()
            .name("wren-cpal".to_string())
            .spawn(move || {
                let stream = match build_stream(&stream_format, queue) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StreamCommand::Enable => {
                            if let Err(e) = stream.play() {
                                warn!(error = %e, "failed to resume audio stream");
                            }
                        }
                        StreamCommand::Disable => {
                            if let Err(e) = stream.pause() {
                                warn!(error = %e, "failed to pause audio stream");
                            }
                        }
                        StreamCommand::Shutdown => break,
                    }
                }
                // Stream drops here, releasing the device
            })?;

        ready_rx
            .recv()
            .map_err(|_| PlaybackError::Sink("audio thread died during startup".to_string()))?
            .map_err(PlaybackError::Sink)?;

        *self.control.lock().unwrap() = Some(command_tx);
        *self.format.lock().unwrap() = Some(stream_format);
        Ok(())
    }

    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let Some(format) = *self.format.lock().unwrap() else {
            return Err(PlaybackError::Sink("sink not open".to_string()));
        };

        let mut samples = self.queue.samples.lock().unwrap();
        if samples.len() > QUEUE_CAPACITY {
            // Backpressure: block until the callback has drained some room.
            // The timeout covers a stream paused mid-write - the block is
            // accepted anyway (bounded growth) and the worker re-checks
            // transport state before the next write.
            let (guard, _timeout) = self
                .queue
                .space
                .wait_timeout_while(samples, WRITE_WAIT, |queue| queue.len() > QUEUE_CAPACITY)
                .unwrap();
            samples = guard;
        }

        if format.bits_per_sample == 16 {
            for pair in bytes.chunks_exact(2) {
                let sample = i16::from_le_bytes([pair[0], pair[1]]);
                samples.push_back(f32::from(sample) / 32768.0);
            }
        } else {
            for byte in bytes {
                samples.push_back((f32::from(*byte) - 128.0) / 128.0);
            }
        }
        Ok(bytes.len())
    }

    fn enable(&self) {
        if let Some(tx) = self.control.lock().unwrap().as_ref() {
            let _ = tx.send(StreamCommand::Enable);
        }
    }

    fn disable(&self) {
        if let Some(tx) = self.control.lock().unwrap().as_ref() {
            let _ = tx.send(StreamCommand::Disable);
        }
    }

    fn close(&self) {
        if let Some(tx) = self.control.lock().unwrap().take() {
            let _ = tx.send(StreamCommand::Shutdown);
        }
        self.format.lock().unwrap().take();
        self.queue.samples.lock().unwrap().clear();
    }
}

fn build_stream(
    format: &WavFormat,
    queue: Arc<SampleQueue>,
) -> std::result::Result<cpal::Stream, String> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| "no default output device".to_string())?;

    let config = cpal::StreamConfig {
        channels: format.channels,
        sample_rate: cpal::SampleRate(format.sample_rate_hz),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut samples = queue.samples.lock().unwrap();
                for slot in data.iter_mut() {
                    *slot = samples.pop_front().unwrap_or(0.0);
                }
                drop(samples);
                queue.space.notify_all();
            },
            |err| warn!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| e.to_string())?;

    stream.play().map_err(|e| e.to_string())?;
    Ok(stream)
}
