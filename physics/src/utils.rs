use nalgebra::{Point3, Vector2, Vector3};
use num_traits::Float;

use crate::constants::COINCIDENT_DIST_SQ;

/// Small numeric helpers used across the planar math.
pub trait UtilMath {
    fn sq(self) -> Self;
}

impl<T: Float> UtilMath for T {
    #[inline]
    fn sq(self) -> Self {
        self * self
    }
}

/// Drop the vertical axis of a world position.
#[inline]
pub fn to_planar(p: &Point3<f32>) -> Vector2<f32> {
    Vector2::new(p.x, p.z)
}

/// Planar (XZ) distance squared between two world positions (meters^2).
#[inline]
pub fn planar_distance_sq(a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    (b.x - a.x).sq() + (b.z - a.z).sq()
}

/// Planar (XZ) distance between two world positions (meters).
#[inline]
pub fn planar_distance(a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    planar_distance_sq(a, b).sqrt()
}

/// Unit planar direction from `from` to `to`.
///
/// Coincident points (or non-finite deltas) yield +X so callers never divide by zero.
#[inline]
pub fn planar_direction_or_x(from: &Point3<f32>, to: &Point3<f32>) -> Vector2<f32> {
    let delta = to_planar(to) - to_planar(from);
    let len_sq = delta.norm_squared();
    if len_sq <= COINCIDENT_DIST_SQ || !len_sq.is_finite() {
        return Vector2::x();
    }
    delta / len_sq.sqrt()
}

#[inline]
pub fn is_finite_point(p: &Point3<f32>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

#[inline]
pub fn is_finite_vector(v: &Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_ignores_height() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 100.0, 4.0);
        assert!((planar_distance(&a, &b) - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn coincident_points_fall_back_to_positive_x() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(planar_direction_or_x(&p, &p), Vector2::x());
    }

    #[test]
    fn planar_direction_is_unit_length() {
        let dir = planar_direction_or_x(&Point3::origin(), &Point3::new(-2.0, 7.0, 2.0));
        assert!((dir.norm() - 1.0).abs() < 1.0e-6);
        assert!(dir.x < 0.0 && dir.y > 0.0);
    }

    #[test]
    fn sq_works_for_f32_and_f64() {
        assert_eq!(3.0f32.sq(), 9.0);
        assert_eq!((-2.0f64).sq(), 4.0);
    }
}
