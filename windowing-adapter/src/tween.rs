/// An eased interpolation between two scroll offsets over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from: u64,
    pub to: u64,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    /// A zero duration is treated as one millisecond.
    pub fn new(from: u64, to: u64, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    /// Linear progress in `0.0..=1.0`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.start_ms).min(self.duration_ms);
        elapsed as f64 / self.duration_ms as f64
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        let end = self.start_ms.saturating_add(self.duration_ms);
        end.saturating_sub(now_ms)
    }

    /// Offset at `now_ms`. Lands exactly on `to` once the duration has elapsed.
    pub fn sample(&self, now_ms: u64) -> u64 {
        if self.is_done(now_ms) {
            return self.to;
        }
        // f64 keeps whole pixels exact for offsets far beyond what f32 can represent.
        let span = self.to as f64 - self.from as f64;
        let eased = self.easing.sample(self.progress(now_ms));
        (self.from as f64 + span * eased).max(0.0) as u64
    }

    /// Restarts from the current sample toward `to`, keeping the easing.
    pub fn retarget(&mut self, now_ms: u64, to: u64, duration_ms: u64) {
        let from = self.sample(now_ms);
        *self = Self::new(from, to, now_ms, duration_ms, self.easing);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Maps progress `t` in `[0, 1]` onto eased progress.
    pub fn sample(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
        }
    }
}
