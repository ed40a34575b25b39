//! Spindle position tracking.

use crate::config::Calibration;

// Largest f32 below 1.0.
const PHASE_MAX: f32 = 0.999_999_94;

/// Spindle angular position for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpindleState {
    /// Encoder count as read, before inversion.
    pub raw_ticks: i32,
    /// Whether the count was negated.
    pub invert: bool,
    /// Whole revolutions, floor of count / pulses per revolution.
    pub rotation_count: i64,
    /// Fraction of the current revolution, always in `[0, 1)`.
    pub phase: f32,
}

impl SpindleState {
    /// Signed encoder count after inversion.
    #[inline]
    pub fn count(&self) -> i64 {
        let raw = self.raw_ticks as i64;
        if self.invert {
            -raw
        } else {
            raw
        }
    }
}

/// Turns the raw encoder count into revolutions plus phase.
///
/// Floor division and a non-negative remainder keep `phase` in `[0, 1)` on
/// both sides of zero, so revolution boundaries are continuous through zero.
#[derive(Debug, Clone)]
pub struct SpindleTracker {
    pulses_per_revolution: u32,
    invert: bool,
    state: SpindleState,
}

impl SpindleTracker {
    /// Create a tracker for the given encoder resolution.
    pub fn new(pulses_per_revolution: u32, invert: bool) -> Self {
        Self {
            pulses_per_revolution: pulses_per_revolution.max(1),
            invert,
            state: SpindleState {
                invert,
                ..SpindleState::default()
            },
        }
    }

    /// Create a tracker from a calibration.
    pub fn from_calibration(calibration: &Calibration) -> Self {
        Self::new(
            calibration.pulses_per_revolution,
            calibration.invert_encoder,
        )
    }

    /// Adopt a changed calibration. Takes effect on the next update.
    pub fn set_calibration(&mut self, calibration: &Calibration) {
        self.pulses_per_revolution = calibration.pulses_per_revolution.max(1);
        self.invert = calibration.invert_encoder;
    }

    /// Encoder pulses per revolution.
    #[inline]
    pub fn pulses_per_revolution(&self) -> u32 {
        self.pulses_per_revolution
    }

    /// Recompute the spindle state from a new raw count.
    pub fn update(&mut self, raw_ticks: i32) -> SpindleState {
        let mut state = SpindleState {
            raw_ticks,
            invert: self.invert,
            rotation_count: 0,
            phase: 0.0,
        };
        let ppr = self.pulses_per_revolution as i64;
        let count = state.count();

        state.rotation_count = count.div_euclid(ppr);
        let phase = count.rem_euclid(ppr) as f32 / ppr as f32;
        // (ppr - 1) / ppr can round up to 1.0 for very large ppr
        state.phase = phase.min(PHASE_MAX);

        self.state = state;
        state
    }

    /// Last computed state.
    #[inline]
    pub fn state(&self) -> &SpindleState {
        &self.state
    }
}

/// Low-rate spindle speed estimate from count deltas, kept off the sync path.
#[derive(Debug, Clone)]
pub struct RpmSampler {
    interval_us: u64,
    last: Option<(u64, i64)>,
    rpm: f32,
}

impl RpmSampler {
    /// Sample once per `interval_ms`.
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_us: interval_ms.max(1) as u64 * 1000,
            last: None,
            rpm: 0.0,
        }
    }

    /// Most recent estimate, signed.
    #[inline]
    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Feed the current time and count. Returns a new estimate when the
    /// interval has elapsed.
    pub fn sample(&mut self, now_us: u64, count: i64, pulses_per_revolution: u32) -> Option<f32> {
        let Some((then, last_count)) = self.last else {
            self.last = Some((now_us, count));
            return None;
        };

        let elapsed = now_us.saturating_sub(then);
        if elapsed < self.interval_us {
            return None;
        }

        let revs = (count - last_count) as f32 / pulses_per_revolution.max(1) as f32;
        self.rpm = revs * 60_000_000.0 / elapsed as f32;
        self.last = Some((now_us, count));
        Some(self.rpm)
    }
}
