//! Playback engine - state machine and streaming worker
//!
//! One worker thread per active session streams blocks from storage to the
//! hardware sink: read, filter (volume-gated), publish a visualizer frame,
//! scale, write. The sink's write backpressure paces the loop to real time;
//! no artificial delay is needed.
//!
//! Concurrency contract: at most one worker exists at any time. Spawning is
//! gated on the previous worker's completion signal (a one-shot channel
//! released unconditionally on worker exit), and `stop()` blocks the caller
//! - bounded by `stop_timeout` - until teardown has finished, so an
//! immediate re-`play()` is always safe.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use wren_audio::filter::AdaptiveHighpass;
use wren_audio::{visualizer, wav, WavFormat};

use crate::error::{PlaybackError, Result};
use crate::frames::FrameSlot;
use crate::sink::AudioSink;
use crate::types::{PlaybackConfig, PlayerState};
use crate::volume::VolumeController;

/// Gains above this are treated as unity and skip the scaling pass
const GAIN_UNITY_SKIP: f32 = 0.999;

/// State shared between the controller-facing API and the worker
#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    bytes_played: AtomicU32,
    byte_rate: AtomicU32,
    duration_s: AtomicU32,
}

impl Shared {
    fn state(&self) -> PlayerState {
        PlayerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: PlayerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// One `play()` call: owns the open file, format and filter state.
/// Dropped (file closed) before the completion signal fires.
struct Session {
    file: File,
    format: WavFormat,
    filter: AdaptiveHighpass,
    /// Raw block read from storage
    block: Vec<u8>,
    /// Decoded samples; sized for the worst case (8-bit: one per byte)
    scratch: Vec<i16>,
}

/// The playback engine context object
///
/// Owned by the application (typically behind an `Arc`) and shared between
/// the controller call sites and the worker it spawns.
pub struct PlaybackEngine {
    config: PlaybackConfig,
    shared: Arc<Shared>,
    volume: Arc<VolumeController>,
    frames: Arc<FrameSlot>,
    sink: Arc<dyn AudioSink>,
    /// Completion signal of the most recently spawned worker
    worker_done: Mutex<Option<Receiver<()>>>,
}

impl PlaybackEngine {
    /// Create an engine streaming into the given sink
    pub fn new(config: PlaybackConfig, sink: Arc<dyn AudioSink>) -> Self {
        let volume = VolumeController::new(
            config.max_physical_volume,
            config.volume_step,
            config.initial_volume,
        );
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(PlayerState::Stopped.as_u8()),
                bytes_played: AtomicU32::new(0),
                byte_rate: AtomicU32::new(0),
                duration_s: AtomicU32::new(0),
            }),
            volume: Arc::new(volume),
            frames: Arc::new(FrameSlot::new()),
            sink,
            worker_done: Mutex::new(None),
            config,
        }
    }

    /// Start playing a WAV file, replacing any active session.
    ///
    /// Blocks until the previous worker (if any) has fully terminated,
    /// bounded by `stop_timeout` - two workers never run concurrently. On a
    /// parse or open failure the state transitions to [`PlayerState::Error`]
    /// and the error is returned.
    pub fn play(&self, path: &Path) -> Result<()> {
        // Implicit stop; also reaps a worker that already finished naturally
        self.stop()?;

        let session = match self.open_session(path) {
            Ok(session) => session,
            Err(e) => {
                self.shared.set_state(PlayerState::Error);
                return Err(e);
            }
        };

        self.shared.bytes_played.store(0, Ordering::Relaxed);
        self.shared
            .byte_rate
            .store(session.format.byte_rate, Ordering::Relaxed);
        self.shared
            .duration_s
            .store(session.format.duration_s(), Ordering::Relaxed);
        self.shared.set_state(PlayerState::Playing);

        let (done_tx, done_rx) = bounded::<()>(1);
        let shared = Arc::clone(&self.shared);
        let volume = Arc::clone(&self.volume);
        let frames = Arc::clone(&self.frames);
        let sink = Arc::clone(&self.sink);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name("wren-playback".to_string())
            .spawn(move || {
                run_worker(&shared, sink.as_ref(), &volume, &frames, session, &config);
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(_handle) => {
                *self.worker_done.lock().unwrap() = Some(done_rx);
                debug!(path = %path.display(), "playback started");
                Ok(())
            }
            Err(e) => {
                self.shared.set_state(PlayerState::Error);
                Err(e.into())
            }
        }
    }

    /// Pause playback; valid only while `Playing`, otherwise a no-op.
    ///
    /// Disables the sink (the hardware stops draining its buffer) and leaves
    /// the worker idling so `resume()` is instantaneous.
    pub fn pause(&self) {
        if self.shared.state() == PlayerState::Playing {
            self.shared.set_state(PlayerState::Paused);
            self.sink.disable();
            debug!("paused");
        }
    }

    /// Resume playback; valid only while `Paused`, otherwise a no-op
    pub fn resume(&self) {
        if self.shared.state() == PlayerState::Paused {
            self.sink.enable();
            self.shared.set_state(PlayerState::Playing);
            debug!("resumed");
        }
    }

    /// Stop playback and wait (bounded) for the worker to tear down.
    ///
    /// After this returns `Ok`, the file is closed and the sink released; an
    /// immediate `play()` is safe. Progress and duration are reset to 0.
    pub fn stop(&self) -> Result<()> {
        let state = self.shared.state();
        if state != PlayerState::Stopped {
            // The worker checks state at the top of every iteration
            self.shared.set_state(PlayerState::Stopped);
            if state == PlayerState::Paused {
                // Wake the output so the worker observes the stop instead of
                // idling against a disabled sink
                self.sink.enable();
            }
        }

        let result = self.await_worker_exit();

        self.shared.bytes_played.store(0, Ordering::Relaxed);
        self.shared.byte_rate.store(0, Ordering::Relaxed);
        self.shared.duration_s.store(0, Ordering::Relaxed);
        result
    }

    /// Current transport state
    pub fn state(&self) -> PlayerState {
        self.shared.state()
    }

    /// Duration of the active session in whole seconds (0 when stopped)
    pub fn duration_s(&self) -> u32 {
        self.shared.duration_s.load(Ordering::Relaxed)
    }

    /// Playback position in whole seconds
    pub fn progress_s(&self) -> u32 {
        let byte_rate = self.shared.byte_rate.load(Ordering::Relaxed);
        if byte_rate == 0 {
            0
        } else {
            self.shared.bytes_played.load(Ordering::Relaxed) / byte_rate
        }
    }

    /// Bytes streamed so far in the active session
    pub fn bytes_played(&self) -> u32 {
        self.shared.bytes_played.load(Ordering::Relaxed)
    }

    /// Shared volume state
    pub fn volume(&self) -> &VolumeController {
        &self.volume
    }

    /// Handle to the visualizer frame slot
    pub fn frames(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.frames)
    }

    fn open_session(&self, path: &Path) -> Result<Session> {
        let mut file = File::open(path)?;
        let format = wav::parse(&mut file)?;
        Ok(Session {
            filter: AdaptiveHighpass::new(
                format.sample_rate_hz,
                format.channels,
                format.bits_per_sample,
            ),
            block: vec![0; self.config.block_size],
            scratch: vec![0; self.config.block_size],
            file,
            format,
        })
    }

    /// Wait for the last spawned worker to signal completion
    fn await_worker_exit(&self) -> Result<()> {
        let receiver = self.worker_done.lock().unwrap().take();
        let Some(receiver) = receiver else {
            return Ok(());
        };

        match receiver.recv_timeout(self.config.stop_timeout) {
            // Signalled, or the worker died and dropped its sender - either
            // way it no longer runs
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Ok(()),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout = ?self.config.stop_timeout,
                    "playback worker did not terminate in time"
                );
                // Keep the receiver so a later stop/play can reap it
                *self.worker_done.lock().unwrap() = Some(receiver);
                Err(PlaybackError::WorkerTimeout(self.config.stop_timeout))
            }
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Worker body: open the sink, stream, tear down, publish terminal state
fn run_worker(
    shared: &Shared,
    sink: &dyn AudioSink,
    volume: &VolumeController,
    frames: &FrameSlot,
    mut session: Session,
    config: &PlaybackConfig,
) {
    match sink.open(&session.format) {
        Ok(()) => {
            sink.enable();
            stream_blocks(shared, sink, volume, frames, &mut session, config);
            sink.disable();
            sink.close();
        }
        Err(e) => {
            warn!(error = %e, "failed to open audio sink");
            shared.set_state(PlayerState::Error);
        }
    }

    if shared.state() != PlayerState::Error {
        shared.set_state(PlayerState::Stopped);
    }
    debug!("playback worker terminated");
    // Session drops here: file handle closed before the completion signal
}

/// The streaming loop; returns when the track ends, the state flips to
/// `Stopped`, or an unrecoverable I/O error occurs
fn stream_blocks(
    shared: &Shared,
    sink: &dyn AudioSink,
    volume: &VolumeController,
    frames: &FrameSlot,
    session: &mut Session,
    config: &PlaybackConfig,
) {
    let total = session.format.data_size_bytes;

    loop {
        match shared.state() {
            PlayerState::Stopped | PlayerState::Error => return,
            PlayerState::Paused => {
                thread::sleep(config.pause_poll);
                continue;
            }
            PlayerState::Playing => {}
        }

        let played = shared.bytes_played.load(Ordering::Relaxed);
        if played >= total {
            return;
        }

        let want = session.block.len().min((total - played) as usize);
        let read = match session.file.read(&mut session.block[..want]) {
            // Zero-byte read without an error: the stream ended early;
            // treat it as a natural stop, not a failure
            Ok(0) => return,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "read failed mid-stream");
                shared.set_state(PlayerState::Error);
                return;
            }
        };

        let physical = volume.physical();
        session
            .filter
            .update(physical, config.max_physical_volume);

        let block = &mut session.block[..read];
        process_block(
            block,
            &mut session.scratch,
            &session.format,
            &mut session.filter,
            volume.gain(),
            frames,
        );

        match sink.write(block) {
            Ok(written) if written < read => {
                // Tolerated: the device dropped part of a block, the next
                // iteration keeps streaming
                warn!(written, expected = read, "partial write to audio sink");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "sink write failed");
                shared.set_state(PlayerState::Error);
                return;
            }
        }

        shared
            .bytes_played
            .store(played + read as u32, Ordering::Relaxed);
    }
}

/// Per-block effects pass: filter (16-bit only), visualizer snapshot, then
/// volume scaling. Extraction happens post-filter, pre-scale, so the bars
/// track programme content rather than the volume knob.
fn process_block(
    bytes: &mut [u8],
    scratch: &mut [i16],
    format: &WavFormat,
    filter: &mut AdaptiveHighpass,
    gain: f32,
    frames: &FrameSlot,
) {
    if format.bits_per_sample == 16 {
        let count = bytes.len() / 2;
        let samples = &mut scratch[..count];
        for (sample, pair) in samples.iter_mut().zip(bytes.chunks_exact(2)) {
            *sample = i16::from_le_bytes([pair[0], pair[1]]);
        }

        filter.process_block(samples);
        frames.publish(visualizer::extract_frame(samples));

        if gain <= GAIN_UNITY_SKIP {
            for sample in samples.iter_mut() {
                // Gain is <= 1.0, so the product cannot leave the i16 range
                *sample = (f32::from(*sample) * gain) as i16;
            }
        }

        for (pair, sample) in bytes.chunks_exact_mut(2).zip(samples.iter()) {
            pair.copy_from_slice(&sample.to_le_bytes());
        }
    } else {
        // 8-bit PCM is unsigned, centred on 128; widen to centred i16 so
        // visualizer bars are comparable across bit depths
        let samples = &mut scratch[..bytes.len()];
        for (sample, byte) in samples.iter_mut().zip(bytes.iter()) {
            *sample = (i16::from(*byte) - 128) << 8;
        }
        frames.publish(visualizer::extract_frame(samples));

        if gain <= GAIN_UNITY_SKIP {
            for byte in bytes.iter_mut() {
                let centred = f32::from(i16::from(*byte) - 128);
                *byte = (centred * gain + 128.0).clamp(0.0, 255.0) as u8;
            }
        }
    }
}
