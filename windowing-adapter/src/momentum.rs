use crate::input::abs;

const MAX_DAMPING: f32 = 0.999;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MomentumOptions {
    /// Factor applied to the residual delta each frame. Clamped into `[0, 0.999]`.
    pub damping: f32,
    /// Momentum stops once the residual delta is at or below this many pixels.
    pub stop_threshold: f32,
}

impl Default for MomentumOptions {
    fn default() -> Self {
        Self {
            damping: 0.93,
            stop_threshold: 0.1,
        }
    }
}

impl MomentumOptions {
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_stop_threshold(mut self, stop_threshold: f32) -> Self {
        self.stop_threshold = stop_threshold;
        self
    }

    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let damping = if self.damping.is_nan() {
            defaults.damping
        } else {
            self.damping.clamp(0.0, MAX_DAMPING)
        };
        let stop_threshold = if self.stop_threshold.is_finite() {
            // A positive floor keeps the decay from stalling on the smallest subnormal.
            self.stop_threshold.max(f32::MIN_POSITIVE)
        } else {
            defaults.stop_threshold
        };
        Self {
            damping,
            stop_threshold,
        }
    }
}

/// Exponential decay of a flick's residual delta.
///
/// Each [`Self::step`] multiplies the residual by `damping` and yields it as the delta for that
/// frame, until the residual drops to `stop_threshold`. With the default options a 100px flick
/// settles after roughly 95 frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Momentum {
    residual: f32,
    options: MomentumOptions,
}

impl Momentum {
    /// Starts from the last per-frame delta of the gesture. Non-finite velocities never start.
    pub fn new(velocity: f32, options: MomentumOptions) -> Self {
        Self {
            residual: if velocity.is_finite() { velocity } else { 0.0 },
            options: options.sanitized(),
        }
    }

    pub fn options(&self) -> MomentumOptions {
        self.options
    }

    pub fn residual(&self) -> f32 {
        self.residual
    }

    pub fn is_active(&self) -> bool {
        abs(self.residual) > self.options.stop_threshold
    }

    pub fn stop(&mut self) {
        self.residual = 0.0;
    }

    /// The delta to apply this frame, or `None` once momentum has settled.
    pub fn step(&mut self) -> Option<f32> {
        if !self.is_active() {
            self.residual = 0.0;
            return None;
        }
        self.residual *= self.options.damping;
        if !self.is_active() {
            self.residual = 0.0;
            return None;
        }
        Some(self.residual)
    }

    /// How many more deltas [`Self::step`] will yield.
    ///
    /// Replays the decay rather than using logarithms, which keeps the count exact under `f32`
    /// rounding and available without `std`.
    pub fn frames_to_settle(&self) -> u32 {
        let mut probe = *self;
        let mut frames = 0u32;
        while probe.step().is_some() {
            frames = frames.saturating_add(1);
        }
        frames
    }
}
