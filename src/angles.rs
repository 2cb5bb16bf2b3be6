//! Pure angle conversion for raw device-orientation samples
//!
//! Converts noisy sensor angles (compass alpha, front-back beta) into
//! normalized spherical coordinates: horizontal in [0, 360), vertical in
//! [-90, 90]. Everything here is stateless and safe to call from the
//! manager, the display system, or tests directly.

use crate::consts::{DEFAULT_ANGLE_RESOLUTION, FULL_TURN, VERTICAL_LIMIT};

/// A normalized spherical coordinate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAngles {
    /// Horizontal angle in [0, 360)
    pub horizontal: f64,
    /// Vertical angle in [-90, 90]
    pub vertical: f64,
}

/// Reduce any finite angle into [0, 360) by whole-turn adjustment
///
/// Non-finite input reduces to 0.
#[inline]
pub fn wrap_around(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut angle = angle;
    // Pre-fold absurd magnitudes so the adjustment loop stays short
    if angle.abs() >= FULL_TURN * 100_000.0 {
        angle = angle.rem_euclid(FULL_TURN);
    }
    while angle >= FULL_TURN {
        angle -= FULL_TURN;
    }
    while angle < 0.0 {
        angle += FULL_TURN;
    }
    // Adding a turn to a tiny negative can round to exactly 360.0
    if angle >= FULL_TURN {
        angle = 0.0;
    }
    angle
}

/// Signed offset from `reference` to `current`, folded into (-180, 180]
///
/// Resolves wrap-around: current=10, reference=350 gives +20, not -340.
#[inline]
pub fn signed_delta(current: f64, reference: f64) -> f64 {
    let mut delta = current - reference;
    if !delta.is_finite() {
        return 0.0;
    }
    while delta > FULL_TURN / 2.0 {
        delta -= FULL_TURN;
    }
    while delta <= -FULL_TURN / 2.0 {
        delta += FULL_TURN;
    }
    delta
}

/// Stateless converter from raw sensor angles to display coordinates
#[derive(Debug, Clone, Copy)]
pub struct AngleCalculator {
    /// Converted angles snap to multiples of this many degrees
    resolution: f64,
}

impl Default for AngleCalculator {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_ANGLE_RESOLUTION,
        }
    }
}

impl AngleCalculator {
    /// Calculator with a custom rounding resolution (degrees)
    ///
    /// Non-positive or non-finite resolutions fall back to the default.
    pub fn new(resolution: f64) -> Self {
        if resolution.is_finite() && resolution > 0.0 {
            Self { resolution }
        } else {
            Self::default()
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Convert a raw compass heading into [0, 360), rounded to resolution
    ///
    /// An absent heading reads as 0.
    pub fn to_horizontal_angle(&self, alpha: Option<f64>) -> f64 {
        let Some(alpha) = alpha else {
            return 0.0;
        };
        self.snap(wrap_around(alpha))
    }

    /// Convert a raw front-back tilt into [-90, 90], rounded to resolution
    ///
    /// An absent tilt reads as 0.
    pub fn to_vertical_angle(&self, beta: Option<f64>) -> f64 {
        let Some(beta) = beta else {
            return 0.0;
        };
        if !beta.is_finite() {
            return 0.0;
        }
        self.snap(beta.clamp(-VERTICAL_LIMIT, VERTICAL_LIMIT))
    }

    /// Re-wrap a coordinate pair into canonical ranges
    ///
    /// Idempotent; does not round.
    pub fn normalize(&self, horizontal: f64, vertical: f64) -> NormalizedAngles {
        let horizontal = if horizontal.is_finite() {
            ((horizontal % FULL_TURN) + FULL_TURN) % FULL_TURN
        } else {
            0.0
        };
        let vertical = if vertical.is_finite() {
            vertical.clamp(-VERTICAL_LIMIT, VERTICAL_LIMIT)
        } else {
            0.0
        };
        NormalizedAngles {
            horizontal,
            vertical,
        }
    }

    /// Round half away from zero onto the resolution grid
    fn snap(&self, angle: f64) -> f64 {
        (angle / self.resolution).round() * self.resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_around_basic() {
        assert_eq!(wrap_around(0.0), 0.0);
        assert_eq!(wrap_around(359.0), 359.0);
        assert_eq!(wrap_around(360.0), 0.0);
        assert_eq!(wrap_around(-45.0), 315.0);
        assert_eq!(wrap_around(725.0), 5.0);
    }

    #[test]
    fn test_wrap_around_extreme_magnitude() {
        let wrapped = wrap_around(999_999.0);
        assert!((0.0..360.0).contains(&wrapped));
        assert!((wrapped - 279.0).abs() < 1e-6); // 999999 mod 360

        assert!((0.0..360.0).contains(&wrap_around(-999_999.0)));
        assert!((0.0..360.0).contains(&wrap_around(1.0e12)));
    }

    #[test]
    fn test_wrap_around_non_finite() {
        assert_eq!(wrap_around(f64::NAN), 0.0);
        assert_eq!(wrap_around(f64::INFINITY), 0.0);
        assert_eq!(wrap_around(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_to_horizontal_angle() {
        let calc = AngleCalculator::default();
        assert_eq!(calc.to_horizontal_angle(Some(-45.0)), 315.0);
        assert_eq!(calc.to_horizontal_angle(Some(-1.0)), 359.0);
        assert_eq!(calc.to_horizontal_angle(Some(359.0)), 359.0);
        assert_eq!(calc.to_horizontal_angle(None), 0.0);
    }

    #[test]
    fn test_to_horizontal_angle_rounding() {
        let calc = AngleCalculator::default();
        assert_eq!(calc.to_horizontal_angle(Some(45.7)), 46.0);
        assert_eq!(calc.to_horizontal_angle(Some(45.3)), 45.0);

        let coarse = AngleCalculator::new(5.0);
        assert_eq!(coarse.to_horizontal_angle(Some(12.0)), 10.0);
        assert_eq!(coarse.to_horizontal_angle(Some(13.0)), 15.0);
    }

    #[test]
    fn test_to_vertical_angle() {
        let calc = AngleCalculator::default();
        assert_eq!(calc.to_vertical_angle(Some(120.0)), 90.0);
        assert_eq!(calc.to_vertical_angle(Some(-120.0)), -90.0);
        assert_eq!(calc.to_vertical_angle(None), 0.0);
        assert_eq!(calc.to_vertical_angle(Some(-30.6)), -31.0);
        assert_eq!(calc.to_vertical_angle(Some(-999_999.0)), -90.0);
    }

    #[test]
    fn test_normalize() {
        let calc = AngleCalculator::default();
        assert_eq!(calc.normalize(450.0, 0.0).horizontal, 90.0);
        assert_eq!(calc.normalize(0.0, 120.0).vertical, 90.0);
        assert_eq!(calc.normalize(-90.0, -120.0).horizontal, 270.0);
        assert_eq!(calc.normalize(-90.0, -120.0).vertical, -90.0);
    }

    #[test]
    fn test_signed_delta_wrap_cases() {
        assert_eq!(signed_delta(10.0, 350.0), 20.0);
        assert_eq!(signed_delta(270.0, 90.0), 180.0);
        assert_eq!(signed_delta(350.0, 10.0), -20.0);
        assert_eq!(signed_delta(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_invalid_resolution_falls_back() {
        assert_eq!(AngleCalculator::new(0.0).resolution(), 1.0);
        assert_eq!(AngleCalculator::new(-2.0).resolution(), 1.0);
        assert_eq!(AngleCalculator::new(f64::NAN).resolution(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_wrap_around_in_range(angle in -1.0e6..1.0e6f64) {
            let wrapped = wrap_around(angle);
            prop_assert!((0.0..360.0).contains(&wrapped));
        }

        #[test]
        fn prop_wrap_around_periodic(angle in -1.0e5..1.0e5f64, k in -100i32..100) {
            let a = wrap_around(angle);
            let b = wrap_around(angle + 360.0 * k as f64);
            prop_assert!((a - b).abs() < 1e-6 || (a - b).abs() > 360.0 - 1e-6);
        }

        #[test]
        fn prop_normalize_idempotent(h in -2000.0..2000.0f64, v in -300.0..300.0f64) {
            let calc = AngleCalculator::default();
            let once = calc.normalize(h, v);
            let twice = calc.normalize(once.horizontal, once.vertical);
            prop_assert!((twice.horizontal - once.horizontal).abs() < 1e-9);
            prop_assert!((twice.vertical - once.vertical).abs() < 1e-9);
        }

        #[test]
        fn prop_signed_delta_in_half_open_range(c in -720.0..720.0f64, r in -720.0..720.0f64) {
            let delta = signed_delta(c, r);
            prop_assert!(delta > -180.0 && delta <= 180.0);
        }
    }
}
