//! Point coloring
//!
//! Red grows with the position of a point in the sorted sequence; green and
//! blue fade as the triplet repeats more often.

use crate::point::BytePoint;

/// Duplicate count at which the fade channel reaches zero
pub const DUPLICATE_FADE_SPAN: f32 = 10.0;

/// Color of the point at `sequence_index` out of `total` points.
///
/// The channels are not clamped; a triplet seen more than eleven times drives
/// green below zero. Renderers clamp with [`clamp_color`].
pub fn point_color(duplicate_count: u64, sequence_index: usize, total: usize) -> [f32; 3] {
    let brightness_fade = duplicate_count as f32 / DUPLICATE_FADE_SPAN;
    let color_fraction = if total == 0 {
        0.0
    } else {
        sequence_index as f32 / total as f32
    };

    [
        color_fraction,
        1.0 - brightness_fade,
        1.0 - brightness_fade * color_fraction,
    ]
}

/// Color of a built point within a cloud of `total` points
pub fn byte_point_color(point: &BytePoint, total: usize) -> [f32; 3] {
    point_color(point.duplicate_count, point.sequence_index, total)
}

/// Clamp every channel into `[0, 1]`
pub fn clamp_color(color: [f32; 3]) -> [f32; 3] {
    color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_unique_point_is_cyan_white() {
        assert_eq!(point_color(0, 0, 4), [0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_color_follows_sequence_and_duplicates() {
        let c = point_color(5, 1, 4);
        assert_relative_eq!(c[0], 0.25);
        assert_relative_eq!(c[1], 0.5);
        assert_relative_eq!(c[2], 1.0 - 0.5 * 0.25);
    }

    #[test]
    fn test_heavy_duplicates_go_negative_until_clamped() {
        let c = point_color(30, 2, 4);
        assert!(c[1] < 0.0);
        let clamped = clamp_color(c);
        assert_eq!(clamped[1], 0.0);
        assert!(clamped.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_clamp_handles_nan() {
        assert_eq!(clamp_color([f32::NAN, 2.0, -1.0]), [0.0, 1.0, 0.0]);
    }
}
