//! Pure combat math helpers
//!
//! Leaf module: no simulation state, no RNG. Everything above builds on
//! these, so degenerate geometry is short-circuited here instead of letting
//! NaN propagate into entity state.

use glam::Vec2;

/// Squared distance between two points
#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_squared()
}

/// Circle overlap test via squared distances. Touching circles (separation
/// exactly equal to the radius sum) do NOT overlap.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    distance_sq(a, b) < r * r
}

/// Normalized direction from `from` to `to`, or zero when the points
/// coincide.
#[inline]
pub fn direction_or_zero(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Quadratic ease-out: fast start, gentle landing. `t` is clamped to [0, 1].
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Framerate-independent exponential decay toward zero
#[inline]
pub fn decay(value: Vec2, rate: f32, dt: f32) -> Vec2 {
    value * (-rate * dt).exp()
}

/// Scalar variant of [`decay`]
#[inline]
pub fn decay_scalar(value: f32, rate: f32, dt: f32) -> f32 {
    value * (-rate * dt).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_strict_at_radius_sum() {
        // Separation exactly equal to the radius sum is not an overlap
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(!circles_overlap(a, 4.0, b, 6.0));
        assert!(circles_overlap(a, 4.0, b, 6.001));
    }

    #[test]
    fn test_direction_degenerate_is_zero() {
        let p = Vec2::new(3.0, -7.0);
        let dir = direction_or_zero(p, p);
        assert_eq!(dir, Vec2::ZERO);
        assert!(!dir.x.is_nan() && !dir.y.is_nan());
    }

    #[test]
    fn test_ease_out_quad_endpoints() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(2.0), 1.0);
        assert!(ease_out_quad(0.5) > 0.5);
    }

    #[test]
    fn test_decay_shrinks() {
        let v = decay(Vec2::new(100.0, 0.0), 8.0, 0.1);
        assert!(v.x < 100.0 && v.x > 0.0);
    }

    proptest! {
        #[test]
        fn prop_overlap_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            ra in 0.1f32..60.0, rb in 0.1f32..60.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(
                circles_overlap(a, ra, b, rb),
                circles_overlap(b, rb, a, ra)
            );
        }

        #[test]
        fn prop_direction_is_unit_or_zero(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
        ) {
            let dir = direction_or_zero(Vec2::new(ax, ay), Vec2::new(bx, by));
            let len = dir.length();
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-4);
        }
    }
}
