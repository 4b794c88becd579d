use std::f32::consts::{PI, TAU};

use nalgebra::Vector2;

/// 2D vector used for positions and steering contributions.
pub type Vec2 = Vector2<f32>;

/// Distances below this are treated as coincident.
pub const EPSILON: f32 = 1e-6;

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_values_in_range() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-PI), PI);
        assert!((wrap_angle(PI + 0.25) - (0.25 - PI)).abs() < 1e-5);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-TAU - 0.5) + 0.5).abs() < 1e-5);
        for i in -100..100 {
            let a = wrap_angle(i as f32 * 0.37);
            assert!(a > -PI && a <= PI, "{a} out of range");
        }
    }

    #[test]
    fn wrap_maps_non_finite_to_zero() {
        assert_eq!(wrap_angle(f32::NAN), 0.0);
        assert_eq!(wrap_angle(f32::INFINITY), 0.0);
    }

    #[test]
    fn heading_vector_is_unit() {
        let v = heading_vector(1.2);
        assert!((v.norm() - 1.0).abs() < 1e-6);
        assert_eq!(heading_vector(0.0), Vec2::new(1.0, 0.0));
    }
}
