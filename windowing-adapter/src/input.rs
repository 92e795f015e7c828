/// Scroll axis of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }
}

/// A raw scroll delta in host pixels. Positive values move toward the end of the content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollDelta {
    pub x: f32,
    pub y: f32,
}

impl ScrollDelta {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// A delta that only moves along `axis`.
    pub fn along(axis: Axis, delta: f32) -> Self {
        match axis {
            Axis::Vertical => Self { x: 0.0, y: delta },
            Axis::Horizontal => Self { x: delta, y: 0.0 },
        }
    }

    pub fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.y,
            Axis::Horizontal => self.x,
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Replaces NaN and infinite components with zero.
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            x: fix(self.x),
            y: fix(self.y),
        }
    }
}

/// Where the scroll container currently is, along the list axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollBounds {
    pub offset: u64,
    pub max: u64,
}

impl ScrollBounds {
    pub fn at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.max
    }
}

/// Result of feeding one delta through a [`ScrollInputNormalizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollOutcome {
    /// The list takes the delta. `offset` is the clamped candidate offset; `overflow` is the
    /// part of the delta that ran past an edge (negative at the start, positive at the end).
    Consumed { offset: u64, overflow: f32 },
    /// The list cannot use the delta: it is at the matching edge, or the gesture runs along the
    /// cross axis. A parent scroller should take it.
    PassThrough { delta: ScrollDelta },
    /// Zero or malformed input.
    Ignored,
}

impl ScrollOutcome {
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Consumed { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Consumed { .. })
    }

    /// Whether the delta ran into an edge, either entirely or in part.
    pub fn hit_edge(&self) -> bool {
        match self {
            Self::Consumed { overflow, .. } => *overflow != 0.0,
            Self::PassThrough { .. } => true,
            Self::Ignored => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizerOptions {
    /// The axis the list scrolls along.
    pub axis: Axis,
    /// Frames a diagonal gesture stays locked to its dominant axis.
    pub axis_lock_frames: u32,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            axis_lock_frames: 2,
        }
    }
}

impl NormalizerOptions {
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_axis_lock_frames(mut self, frames: u32) -> Self {
        self.axis_lock_frames = frames;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AxisLock {
    axis: Axis,
    frames_left: u32,
}

/// Turns wheel, touch and drag deltas into candidate scroll offsets.
///
/// - At the start with a negative delta, or at the end with a positive one, the delta is passed
///   through instead of being swallowed, so nested scrollers can hand it to their parent.
/// - Diagonal input follows its larger component, and that axis stays locked for
///   `axis_lock_frames` frames. Call [`Self::on_frame`] once per animation frame.
/// - Sub-pixel deltas accumulate until they add up to whole pixels.
#[derive(Clone, Debug, Default)]
pub struct ScrollInputNormalizer {
    options: NormalizerOptions,
    lock: Option<AxisLock>,
    remainder: f32,
}

impl ScrollInputNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self {
            options,
            lock: None,
            remainder: 0.0,
        }
    }

    pub fn options(&self) -> NormalizerOptions {
        self.options
    }

    pub fn set_options(&mut self, options: NormalizerOptions) {
        if self.options.axis != options.axis {
            self.reset();
        }
        self.options = options;
    }

    pub fn axis(&self) -> Axis {
        self.options.axis
    }

    /// The axis diagonal input is currently locked to, if any.
    pub fn locked_axis(&self) -> Option<Axis> {
        self.lock.map(|l| l.axis)
    }

    /// Clears the axis lock and any accumulated sub-pixel remainder.
    pub fn reset(&mut self) {
        self.lock = None;
        self.remainder = 0.0;
    }

    /// Advances the axis-lock cool-down by one frame.
    pub fn on_frame(&mut self) {
        let Some(lock) = &mut self.lock else {
            return;
        };
        lock.frames_left = lock.frames_left.saturating_sub(1);
        if lock.frames_left == 0 {
            atrace!(axis = ?lock.axis, "axis lock released");
            self.lock = None;
        }
    }

    pub fn normalize(&mut self, delta: ScrollDelta, bounds: ScrollBounds) -> ScrollOutcome {
        let delta = delta.sanitized();
        if delta.is_zero() {
            return ScrollOutcome::Ignored;
        }

        let dominant = self.dominant_axis(delta);
        let list_axis = self.options.axis;
        if dominant != list_axis {
            self.remainder = 0.0;
            return ScrollOutcome::PassThrough {
                delta: ScrollDelta::along(dominant, delta.get(dominant)),
            };
        }

        let main = delta.get(list_axis);
        if main == 0.0 {
            return ScrollOutcome::Ignored;
        }
        if (main < 0.0 && bounds.at_start()) || (main > 0.0 && bounds.at_end()) {
            atrace!(main, offset = bounds.offset, max = bounds.max, "edge lock");
            self.remainder = 0.0;
            return ScrollOutcome::PassThrough {
                delta: ScrollDelta::along(list_axis, main),
            };
        }

        let total = main + self.remainder;
        // `as` saturates, so huge deltas clamp instead of wrapping.
        let step = total as i64;
        self.remainder = total - step as f32;

        let max = bounds.max as i128;
        let target = bounds.offset.min(bounds.max) as i128 + step as i128;
        let (offset, overflow) = if target < 0 {
            (0, target as f32)
        } else if target > max {
            (bounds.max, (target - max) as f32)
        } else {
            (target as u64, 0.0)
        };
        if overflow != 0.0 {
            self.remainder = 0.0;
        }
        ScrollOutcome::Consumed { offset, overflow }
    }

    fn dominant_axis(&mut self, delta: ScrollDelta) -> Axis {
        if let Some(lock) = self.lock {
            return lock.axis;
        }
        if delta.x == 0.0 {
            return Axis::Vertical;
        }
        if delta.y == 0.0 {
            return Axis::Horizontal;
        }

        let list_axis = self.options.axis;
        let cross = list_axis.cross();
        let axis = if abs(delta.get(cross)) > abs(delta.get(list_axis)) {
            cross
        } else {
            list_axis
        };
        if self.options.axis_lock_frames > 0 {
            adebug!(axis = ?axis, frames = self.options.axis_lock_frames, "axis lock engaged");
            self.lock = Some(AxisLock {
                axis,
                frames_left: self.options.axis_lock_frames,
            });
        }
        axis
    }
}

// `f32::abs` needs std on older toolchains.
pub(crate) fn abs(v: f32) -> f32 {
    if v < 0.0 { -v } else { v }
}
