//! Spectrum band extraction for the UI visualizer
//!
//! Reduces one decoded block into per-band peak magnitudes on a perceptual
//! 0-255 scale. The block's sample count is split evenly into `BAND_COUNT`
//! bands; a partial tail band is dropped rather than padded. Peaks are
//! compressed logarithmically so quiet passages remain visible and loud
//! passages don't pin every bar at the top.

/// Number of bars the visualizer displays
pub const BAND_COUNT: usize = 16;

/// log10 of the full i16 magnitude range (+1), the top of the scale
const LOG_SCALE_MAX: f32 = 4.5154499;

/// One snapshot of band heights; only the latest frame matters
pub type VisualizerFrame = [u8; BAND_COUNT];

/// Reduce a decoded i16 block into band heights
///
/// Blocks shorter than `BAND_COUNT` samples yield an all-zero frame.
pub fn extract_frame(samples: &[i16]) -> VisualizerFrame {
    let mut frame = [0u8; BAND_COUNT];
    let band_len = samples.len() / BAND_COUNT;
    if band_len == 0 {
        return frame;
    }

    for (band, height) in frame.iter_mut().enumerate() {
        let start = band * band_len;
        let peak = samples[start..start + band_len]
            .iter()
            .map(|s| i32::from(*s).unsigned_abs())
            .max()
            .unwrap_or(0);
        *height = scale_peak(peak);
    }

    frame
}

/// Map a peak magnitude to a 0-255 bar height with log compression
fn scale_peak(peak: u32) -> u8 {
    let height = ((peak as f32 + 1.0).log10() / LOG_SCALE_MAX) * 255.0;
    height.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_yields_zero_bars() {
        let frame = extract_frame(&[0i16; 1024]);
        assert_eq!(frame, [0u8; BAND_COUNT]);
    }

    #[test]
    fn full_scale_pins_the_bar() {
        let frame = extract_frame(&[i16::MIN; BAND_COUNT]);
        assert_eq!(frame, [255u8; BAND_COUNT]);
    }

    #[test]
    fn peak_is_taken_per_band() {
        let band_len = 8;
        let mut samples = vec![0i16; BAND_COUNT * band_len];

        // One loud sample in band 3, a quieter one in band 10
        samples[3 * band_len + 2] = 20000;
        samples[10 * band_len + 5] = -500;

        let frame = extract_frame(&samples);

        assert!(frame[3] > frame[10]);
        assert!(frame[10] > 0);
        for (band, height) in frame.iter().enumerate() {
            if band != 3 && band != 10 {
                assert_eq!(*height, 0, "band {band} should be silent");
            }
        }
    }

    #[test]
    fn partial_tail_band_is_dropped() {
        let band_len = 4;
        let mut samples = vec![0i16; BAND_COUNT * band_len + 3];

        // Loud samples only in the dropped tail
        let len = samples.len();
        samples[len - 1] = i16::MAX;
        samples[len - 2] = i16::MAX;

        let frame = extract_frame(&samples);
        assert_eq!(frame, [0u8; BAND_COUNT]);
    }

    #[test]
    fn short_blocks_yield_empty_frame() {
        let frame = extract_frame(&[i16::MAX; BAND_COUNT - 1]);
        assert_eq!(frame, [0u8; BAND_COUNT]);
    }

    #[test]
    fn scale_is_monotonic_in_peak() {
        let quiet = extract_frame(&[100i16; BAND_COUNT]);
        let mid = extract_frame(&[1000i16; BAND_COUNT]);
        let loud = extract_frame(&[10000i16; BAND_COUNT]);

        assert!(quiet[0] < mid[0]);
        assert!(mid[0] < loud[0]);
    }

    #[test]
    fn log_compression_keeps_quiet_content_visible() {
        // 1% of full scale still registers well above 1% of the bar range
        let frame = extract_frame(&[327i16; BAND_COUNT]);
        assert!(frame[0] > 100);
    }
}
