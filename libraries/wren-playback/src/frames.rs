//! Single-slot visualizer frame handoff
//!
//! The worker publishes one frame per decoded block; the GUI polls at its
//! own pace. Only the latest frame matters, so the slot overwrites instead
//! of queueing - there is no backlog and no unbounded growth.

use std::sync::Mutex;

use wren_audio::VisualizerFrame;

/// Capacity-1 overwrite channel for visualizer frames
#[derive(Debug, Default)]
pub struct FrameSlot {
    slot: Mutex<Option<VisualizerFrame>>,
}

impl FrameSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the latest frame, replacing any unread one.
    ///
    /// Never blocks the audio thread: if the consumer holds the lock right
    /// now the frame is simply dropped - the next block publishes a fresher
    /// one anyway.
    pub fn publish(&self, frame: VisualizerFrame) {
        if let Ok(mut slot) = self.slot.try_lock() {
            *slot = Some(frame);
        }
    }

    /// Consume the pending frame, if any arrived since the last call
    pub fn try_receive(&self) -> Option<VisualizerFrame> {
        self.slot.try_lock().ok().and_then(|mut slot| slot.take())
    }
}
