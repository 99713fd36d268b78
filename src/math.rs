//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric inputs, making them straightforward to unit-test.

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
///
/// # Examples
/// ```
/// # use hex_builder::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Clamps a pitch angle so the camera cannot flip past vertical.
///
/// `current` is the existing pitch in radians (from `Quat::to_euler`).
/// `delta` is the desired change. The result is clamped to
/// `(-PI/2 + margin, PI/2 - margin)` and the *effective* delta is returned.
pub fn clamp_pitch(current: f32, delta: f32, margin: f32) -> f32 {
    let limit = std::f32::consts::FRAC_PI_2 - margin;
    let clamped = (current + delta).clamp(-limit, limit);
    clamped - current
}

/// Row spacing of an offset hex grid: `sqrt(size² - (size/2)²)`.
///
/// # Examples
/// ```
/// # use hex_builder::math::hex_gap;
/// assert!((hex_gap(2.0) - 3f32.sqrt()).abs() < 1e-6);
/// ```
pub fn hex_gap(cell_size: f32) -> f32 {
    let half = cell_size / 2.0;
    (cell_size * cell_size - half * half).sqrt()
}

/// Whether the fractional part of `value` reaches `threshold`.
///
/// Used to decide if a terrain height sits on a half level.
pub fn can_be_rounded_up(value: f32, threshold: f32) -> bool {
    value.fract() >= threshold
}

/// Rounds a height level half-up to the nearest whole level.
pub fn round_half_up(level: f32) -> u32 {
    (level + 0.5).max(0.0) as u32
}

/// Truncates a height level to the whole level it stands on.
pub fn round_down(level: f32) -> u32 {
    level.max(0.0) as u32
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_min_maps_to_range_min() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn noise_max_maps_to_range_max() {
        assert_eq!(map_noise_to_range(1.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn noise_works_with_negative_range() {
        let result = map_noise_to_range(0.0, -10.0, 10.0);
        assert!((result - 0.0).abs() < 1e-6);
    }

    // ── clamp_pitch ─────────────────────────────────────────────────

    #[test]
    fn pitch_within_limits_passes_through() {
        let delta = clamp_pitch(0.0, 0.1, 0.05);
        assert!((delta - 0.1).abs() < 1e-6);
    }

    #[test]
    fn pitch_clamped_at_upper_limit() {
        let limit = std::f32::consts::FRAC_PI_2 - 0.05;
        let delta = clamp_pitch(limit - 0.01, 0.5, 0.05);
        assert!((delta - 0.01).abs() < 1e-5, "delta was {delta}");
    }

    // ── hex_gap ─────────────────────────────────────────────────────

    #[test]
    fn unit_gap_is_sqrt_three_quarters() {
        assert!((hex_gap(1.0) - 0.75f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn gap_is_smaller_than_cell_size() {
        for size in [0.5, 1.0, 3.0, 10.0] {
            assert!(hex_gap(size) < size, "gap for {size} not smaller");
        }
    }

    // ── rounding ────────────────────────────────────────────────────

    #[test]
    fn half_levels_round_up() {
        assert_eq!(round_half_up(1.5), 2);
        assert_eq!(round_half_up(1.0), 1);
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_down(2.5), 2);
    }

    #[test]
    fn round_up_threshold_is_inclusive() {
        assert!(can_be_rounded_up(3.5, 0.5));
        assert!(!can_be_rounded_up(3.49, 0.5));
        assert!(!can_be_rounded_up(4.0, 0.5));
    }

    // ── wrap_degrees ────────────────────────────────────────────────

    #[test]
    fn wrap_keeps_angles_in_range() {
        assert_eq!(wrap_degrees(420.0), 60.0);
        assert_eq!(wrap_degrees(-60.0), 300.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }
}
