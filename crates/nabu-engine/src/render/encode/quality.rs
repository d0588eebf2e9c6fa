//! Segment counts for curved primitives, derived from on-screen size.
//!
//! `size` is the radius in target pixels (radius × the largest scale factor of
//! the active transform). Results are later clamped to `[MIN_QUALITY, max]`.

use core::f32::consts::TAU;

pub const MIN_QUALITY: u32 = 3;

/// Upper bound on segment counts unless configured lower.
pub const MAX_QUALITY: u32 = 255;

#[inline]
pub fn clamp_quality(quality: u32, max: u32) -> u32 {
    quality.clamp(MIN_QUALITY, max.max(MIN_QUALITY))
}

/// Filled circles.
pub fn circle(size: f32) -> u32 {
    if size <= 5.0 {
        (size.max(0.0) + 3.0) as u32 * 2
    } else {
        (18.0 + (size - 5.0) / 2.2).min(MAX_QUALITY as f32) as u32
    }
}

/// Rings (circle frames).
pub fn ring(size: f32) -> u32 {
    if size <= 1.0 {
        6
    } else if size <= 8.0 {
        ((2.0 * size) as u32).max(8)
    } else {
        (16.0 + (size - 8.0) / 2.2).min(MAX_QUALITY as f32) as u32
    }
}

/// Circle sectors; scales with the swept fraction of a half turn.
pub fn pie(size: f32, angle: f32) -> u32 {
    let rate = (angle.abs() / TAU * 2.0).min(1.0);
    let full = if size <= 1.0 {
        4.0
    } else if size <= 6.0 {
        7.0
    } else if size <= 8.0 {
        11.0
    } else {
        (size * 0.225 + 18.0).min(MAX_QUALITY as f32)
    };
    ((full * rate) as u32).max(MIN_QUALITY)
}

/// Round line caps: half a circle's segments, rounded up to an even count so a
/// vertex lands on the apex of the half-disc.
pub fn round_cap(size: f32) -> u32 {
    let half_turn = (circle(size) / 2).max(MIN_QUALITY);
    half_turn + half_turn % 2
}

/// Corner fans of rounded rectangles.
pub fn corner_fan(size: f32) -> u32 {
    if size <= 1.0 {
        3
    } else if size <= 6.0 {
        5
    } else if size <= 12.0 {
        8
    } else {
        (size * 0.2 + 6.0).min(64.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_circles_use_even_counts() {
        assert_eq!(circle(0.0), 6);
        assert_eq!(circle(5.0), 16);
    }

    #[test]
    fn large_circles_cap_at_max() {
        assert_eq!(circle(100_000.0), MAX_QUALITY);
        assert_eq!(ring(100_000.0), MAX_QUALITY);
    }

    #[test]
    fn ring_has_floor_of_eight_when_mid_sized() {
        assert_eq!(ring(2.0), 8);
        assert_eq!(ring(7.5), 15);
    }

    #[test]
    fn pie_scales_with_angle() {
        assert!(pie(100.0, TAU / 2.0) > pie(100.0, TAU / 8.0));
        assert_eq!(pie(100.0, 0.0), MIN_QUALITY);
    }

    #[test]
    fn round_caps_use_even_counts() {
        assert_eq!(round_cap(2.0), 6);
        assert_eq!(round_cap(0.0), 4);
        assert!((1..400).all(|s| round_cap(s as f32) % 2 == 0));
    }

    #[test]
    fn clamp_respects_configured_max() {
        assert_eq!(clamp_quality(1, 64), 3);
        assert_eq!(clamp_quality(200, 64), 64);
        assert_eq!(clamp_quality(10, 0), 3);
    }
}
