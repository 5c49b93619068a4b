//! Volume control with a hardware safety cap
//!
//! The UI works on a 0-100 display scale; the hardware is driven on a
//! physical scale capped well below 100 so the speaker cannot be damaged.
//! Stepping converts through the display scale so UI steps feel uniform
//! regardless of the physical ceiling.
//!
//! Writers (user input) serialize on a mutex. Readers (the decode loop, once
//! per block) go through atomic caches and never block - volume is a soft
//! real-time control and a momentarily stale value is fine.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

/// Thread-safe volume state shared between controller and worker
#[derive(Debug)]
pub struct VolumeController {
    /// Serializes writers; readers use the atomic caches below
    write_lock: Mutex<()>,

    /// Physical percent currently applied (0-100)
    physical: AtomicU8,

    /// Bit pattern of the linear gain factor in [0.0, 1.0]
    gain_bits: AtomicU32,

    /// Safety ceiling for UI-driven changes
    max_physical: u8,

    /// Display-scale step size
    step: u8,
}

impl VolumeController {
    /// Create a controller with the given ceiling, step and starting volume
    pub fn new(max_physical: u8, step: u8, initial_physical: u8) -> Self {
        let controller = Self {
            write_lock: Mutex::new(()),
            physical: AtomicU8::new(0),
            gain_bits: AtomicU32::new(0.0f32.to_bits()),
            max_physical: max_physical.clamp(1, 100),
            step: step.clamp(1, 100),
        };
        controller.set_physical(initial_physical, true);
        controller
    }

    /// Set the physical volume directly.
    ///
    /// With `apply_safety_cap` the value is clamped to the ceiling (the UI
    /// path); without it only to 0-100 (programmatic direct sets, e.g. a
    /// test harness driving the hardware range).
    pub fn set_physical(&self, percent: u8, apply_safety_cap: bool) {
        let _guard = self.write_lock.lock().unwrap();
        let ceiling = if apply_safety_cap { self.max_physical } else { 100 };
        self.store(percent.min(ceiling));
    }

    /// Raise the volume by one display step
    pub fn step_up(&self) {
        let _guard = self.write_lock.lock().unwrap();
        let display = self.display_from_physical(self.physical.load(Ordering::Relaxed));
        let raised = display.saturating_add(self.step).min(100);
        self.store(self.physical_from_display(raised).min(self.max_physical));
    }

    /// Lower the volume by one display step
    pub fn step_down(&self) {
        let _guard = self.write_lock.lock().unwrap();
        let display = self.display_from_physical(self.physical.load(Ordering::Relaxed));
        let lowered = display.saturating_sub(self.step);
        self.store(self.physical_from_display(lowered).min(self.max_physical));
    }

    /// Current physical percent; lock-free, safe for the audio thread
    pub fn physical(&self) -> u8 {
        self.physical.load(Ordering::Relaxed)
    }

    /// Current position on the 0-100 display scale
    pub fn display(&self) -> u8 {
        self.display_from_physical(self.physical())
    }

    /// Linear gain factor in [0.0, 1.0]; lock-free
    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    /// Configured safety ceiling
    pub fn max_physical(&self) -> u8 {
        self.max_physical
    }

    fn store(&self, physical: u8) {
        self.physical.store(physical, Ordering::Relaxed);
        let gain = f32::from(physical) / 100.0;
        self.gain_bits.store(gain.to_bits(), Ordering::Relaxed);
    }

    /// Physical -> display, snapped to the nearest step so repeated
    /// conversions cannot drift
    fn display_from_physical(&self, physical: u8) -> u8 {
        let max = u32::from(self.max_physical);
        let raw = (u32::from(physical) * 100 + max / 2) / max;
        let step = u32::from(self.step);
        let snapped = ((raw + step / 2) / step) * step;
        snapped.min(100) as u8
    }

    fn physical_from_display(&self, display: u8) -> u8 {
        let max = u32::from(self.max_physical);
        ((u32::from(display) * max + 50) / 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> VolumeController {
        VolumeController::new(40, 5, 0)
    }

    #[test]
    fn stepping_reaches_the_ceiling_exactly() {
        let volume = controller();

        // 100 / step = 20 steps from silence to the cap
        for _ in 0..20 {
            volume.step_up();
        }
        assert_eq!(volume.physical(), 40);
        assert_eq!(volume.display(), 100);
    }

    #[test]
    fn stepping_back_returns_to_zero_without_drift() {
        let volume = controller();

        for _ in 0..20 {
            volume.step_up();
        }
        for _ in 0..20 {
            volume.step_down();
        }
        assert_eq!(volume.physical(), 0);
        assert_eq!(volume.display(), 0);
    }

    #[test]
    fn steps_saturate_at_both_ends() {
        let volume = controller();

        volume.step_down();
        assert_eq!(volume.physical(), 0);

        for _ in 0..30 {
            volume.step_up();
        }
        assert_eq!(volume.physical(), 40);
    }

    #[test]
    fn safety_cap_applies_to_ui_sets() {
        let volume = controller();

        volume.set_physical(100, true);
        assert_eq!(volume.physical(), 40);

        volume.set_physical(100, false);
        assert_eq!(volume.physical(), 100);
        assert!((volume.gain() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn gain_tracks_physical_percent() {
        let volume = controller();

        volume.set_physical(40, true);
        assert!((volume.gain() - 0.4).abs() < 1e-6);

        volume.set_physical(0, true);
        assert_eq!(volume.gain(), 0.0);
    }

    #[test]
    fn display_round_trip_is_stable() {
        let volume = controller();

        for _ in 0..7 {
            volume.step_up();
        }
        let physical = volume.physical();
        let display = volume.display();

        // Converting back and forth must land on the same values
        assert_eq!(volume.physical_from_display(display), physical);
        assert_eq!(volume.display_from_physical(physical), display);
    }

    #[test]
    fn initial_volume_is_capped() {
        let volume = VolumeController::new(40, 5, 90);
        assert_eq!(volume.physical(), 40);
    }
}
