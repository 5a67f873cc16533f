use super::TelemetryBuffer;
use crate::sensors::MotionSample;

/// Rounding bias added before the low bits are masked off.
pub const ACCEL_QUANT_BIAS: i16 = 0x0020;

/// Keeps the upper ten bits, i.e. a 64-count grid.
pub const ACCEL_QUANT_MASK: i16 = 0xFFC0_u16 as i16;

/// Round an acceleration axis to the nearest multiple of 64 counts.
///
/// The bias saturates at `i16::MAX`, so the largest readings round down to
/// the top grid point instead of wrapping negative. The result is always a
/// grid point, which makes the function idempotent.
pub const fn quantize_axis(raw: i16) -> i16 {
    raw.saturating_add(ACCEL_QUANT_BIAS) & ACCEL_QUANT_MASK
}

/// Change detector for the horizontal acceleration axes.
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    previous: Option<(i16, i16)>,
}

impl MotionTracker {
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// Quantize `sample` into bytes `0..4` of `buffer`.
    ///
    /// Returns true when either quantized axis differs from the last sample
    /// applied. The first sample always counts as a change.
    pub fn apply(&mut self, sample: &MotionSample, buffer: &mut TelemetryBuffer) -> bool {
        let x = quantize_axis(sample.accel_x());
        let y = quantize_axis(sample.accel_y());
        buffer.write_acceleration(x, y);

        let changed = self.previous != Some((x, y));
        self.previous = Some((x, y));
        changed
    }

    /// Last quantized `(x, y)` pair, if any sample has been applied.
    pub fn last(&self) -> Option<(i16, i16)> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: i16, y: i16) -> MotionSample {
        MotionSample {
            orientation: [0; 3],
            acceleration: [x, y, 1000],
        }
    }

    #[test]
    fn test_quantize_rounds_to_64_grid() {
        assert_eq!(quantize_axis(0), 0);
        assert_eq!(quantize_axis(31), 0);
        assert_eq!(quantize_axis(32), 64);
        assert_eq!(quantize_axis(-32), 0);
        assert_eq!(quantize_axis(-33), -64);
        assert_eq!(quantize_axis(1000), 1024);
    }

    #[test]
    fn test_quantize_saturates_instead_of_wrapping() {
        assert_eq!(quantize_axis(i16::MAX), 32704);
        assert_eq!(quantize_axis(i16::MIN), i16::MIN);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        for raw in i16::MIN..=i16::MAX {
            let q = quantize_axis(raw);
            assert_eq!(quantize_axis(q), q, "not idempotent at {}", raw);
        }
    }

    #[test]
    fn test_first_sample_is_a_change() {
        let mut tracker = MotionTracker::new();
        let mut buffer = TelemetryBuffer::new();

        assert!(tracker.apply(&sample(0, 0), &mut buffer));
        assert_eq!(tracker.last(), Some((0, 0)));
    }

    #[test]
    fn test_jitter_below_grid_is_not_a_change() {
        let mut tracker = MotionTracker::new();
        let mut buffer = TelemetryBuffer::new();

        tracker.apply(&sample(100, -100), &mut buffer);
        assert!(!tracker.apply(&sample(110, -110), &mut buffer));
        assert!(!tracker.apply(&sample(120, -120), &mut buffer));
    }

    #[test]
    fn test_change_on_either_axis_detected() {
        let mut tracker = MotionTracker::new();
        let mut buffer = TelemetryBuffer::new();

        tracker.apply(&sample(0, 0), &mut buffer);
        assert!(tracker.apply(&sample(64, 0), &mut buffer));
        assert!(tracker.apply(&sample(64, -64), &mut buffer));
        assert!(!tracker.apply(&sample(64, -64), &mut buffer));
    }

    #[test]
    fn test_apply_writes_quantized_axes() {
        let mut tracker = MotionTracker::new();
        let mut buffer = TelemetryBuffer::new();

        tracker.apply(&sample(1000, -33), &mut buffer);
        let frame = buffer.frame();
        assert_eq!(frame.accel_x, 1024);
        assert_eq!(frame.accel_y, -64);
    }
}
