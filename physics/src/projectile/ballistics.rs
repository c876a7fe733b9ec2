//! Ballistic launch solve and in-flight integration.
//!
//! The launch solve picks the velocity that carries a projectile from `from` to `to`
//! in exactly `flight_time` seconds under constant gravity:
//!
//! - horizontal: `v_xz = Δxz / t`
//! - vertical:   `v_y = (Δy - 0.5·g·t²) / t`
//!
//! Flight uses semi-implicit Euler (velocity first, then position), which is stable at
//! game tick rates and lands within `0.5·|g|·t·dt` of the analytic target.

use crate::{
    collision::types::{Point, Vec3},
    utils::{UtilMath, is_finite_point, is_finite_vector},
};

/// Initial velocity that reaches `to` from `from` after `flight_time` seconds.
///
/// Returns `None` for a non-positive flight time or non-finite input.
pub fn launch_velocity(from: &Point, to: &Point, flight_time: f32, gravity: f32) -> Option<Vec3> {
    if !(flight_time.is_finite() && flight_time > 0.0) {
        return None;
    }
    let delta = to - from;
    let velocity = Vec3::new(
        delta.x / flight_time,
        (delta.y - 0.5 * gravity * flight_time.sq()) / flight_time,
        delta.z / flight_time,
    );
    is_finite_vector(&velocity).then_some(velocity)
}

/// One flight step: gravity into `v_y`, then velocity into position.
///
/// Returns `None` if the result is not finite; the caller keeps its last good state.
pub fn step_flight(
    position: &Point,
    velocity: &Vec3,
    gravity: f32,
    dt: f32,
) -> Option<(Point, Vec3)> {
    let mut next_velocity = *velocity;
    next_velocity.y += gravity * dt;
    let next_position = position + next_velocity * dt;

    (is_finite_point(&next_position) && is_finite_vector(&next_velocity))
        .then_some((next_position, next_velocity))
}
