//! Conversions from host floating-point pixels into the window's integer units.
//!
//! Hosts often report layout in `f32`/`f64`. These helpers never fail: negative values clamp to
//! zero, infinities saturate, and NaN is either rejected (`Option`) or treated as zero.

/// Converts a measured size. Returns `None` for NaN so callers can keep the previous value.
pub fn size_from_f32(px: f32) -> Option<u32> {
    if px.is_nan() {
        return None;
    }
    Some(round_clamped(px as f64, u32::MAX as f64) as u32)
}

/// Converts a container size. NaN and negative sizes become `0`.
pub fn extent_from_f32(px: f32) -> u32 {
    size_from_f32(px).unwrap_or(0)
}

/// Converts a scroll offset. NaN and negative offsets become `0`.
pub fn offset_from_f64(px: f64) -> u64 {
    if px.is_nan() {
        return 0;
    }
    round_clamped(px, u64::MAX as f64) as u64
}

fn round_clamped(px: f64, max: f64) -> f64 {
    let rounded = round_half_away(px);
    if rounded <= 0.0 {
        0.0
    } else if rounded >= max {
        max
    } else {
        rounded
    }
}

// `f64::round` lives in std; this keeps the module usable without it.
fn round_half_away(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let t = x as i128 as f64;
    let frac = x - t;
    if frac >= 0.5 {
        t + 1.0
    } else if frac <= -0.5 {
        t - 1.0
    } else {
        t
    }
}
