//! Ground interaction for projectiles that have touched down.
//!
//! Per grounded tick, in order:
//! 1. clamp to rest height (`terrain + object_radius`)
//! 2. bounce a fast downward impact, or kill vertical speed
//! 3. sample the slope with central differences around the projectile
//! 4. roll downhill on slopes steeper than `min_slope_angle`
//! 5. apply frame-rate independent friction to horizontal speed
//! 6. move in XZ and snap back onto the terrain
//! 7. accumulate rest time; settle once it is long enough
//!
//! Terrain is sampled at most five times: four slope samples plus the post-move sample,
//! which is cached as the next tick's start sample.

use nalgebra::Vector2;

use super::types::{GroundSample, Projectile};
use crate::{
    collision::types::{Point, Vec3},
    settings::ProjectileSettings,
    terrain::TerrainHeight,
};

/// Outcome of one grounded tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundStep {
    /// Still moving (or resting, but not long enough to settle).
    Rolling,
    /// Bounced off the ground; airborne next tick.
    Bounced,
    /// At rest long enough: terminal.
    Settled,
    /// Terrain returned a non-finite height: terminal.
    InvalidTerrain,
}

/// Terrain height at `(x, z)`, or `None` when the terrain has no valid height there.
#[inline]
pub fn sample(terrain: &dyn TerrainHeight, x: f32, z: f32) -> Option<f32> {
    let h = terrain.height(x, z);
    h.is_finite().then_some(h)
}

/// Horizontal terrain gradient `(dh/dx, dh/dz)` by central differences at `±offset`.
pub fn slope_gradient(
    terrain: &dyn TerrainHeight,
    x: f32,
    z: f32,
    offset: f32,
) -> Option<Vector2<f32>> {
    let east = sample(terrain, x + offset, z)?;
    let west = sample(terrain, x - offset, z)?;
    let north = sample(terrain, x, z + offset)?;
    let south = sample(terrain, x, z - offset)?;

    let span = 2.0 * offset;
    Some(Vector2::new((east - west) / span, (north - south) / span))
}

/// Slope angle (radians) for a terrain gradient.
#[inline]
pub fn slope_angle(gradient: &Vector2<f32>) -> f32 {
    gradient.norm().atan()
}

/// Bounce a downward impact faster than `bounce_threshold` while bounces remain.
///
/// On a bounce `v_y` is reflected and damped and the counter advances; otherwise `v_y`
/// is zeroed. Returns whether a bounce happened.
pub fn apply_bounce(
    velocity: &mut Vec3,
    bounce_count: &mut u32,
    settings: &ProjectileSettings,
) -> bool {
    if velocity.y < -settings.bounce_threshold && *bounce_count < settings.max_bounces {
        velocity.y = -velocity.y * settings.bounce_damping;
        *bounce_count += 1;
        true
    } else {
        velocity.y = 0.0;
        false
    }
}

/// Accelerate downhill: `|g| · angle · (1 - rolling_friction) · dt`.
///
/// Slopes at or below `min_slope_angle` leave the velocity untouched.
pub fn apply_rolling(
    velocity: &mut Vec3,
    gradient: &Vector2<f32>,
    settings: &ProjectileSettings,
    dt: f32,
) {
    let steepness = gradient.norm();
    if steepness <= 0.0 || !steepness.is_finite() {
        return;
    }
    let angle = slope_angle(gradient);
    if angle <= settings.min_slope_angle {
        return;
    }

    let downhill = -gradient / steepness;
    let accel = settings.gravity.abs() * angle * (1.0 - settings.rolling_friction);
    velocity.x += downhill.x * accel * dt;
    velocity.z += downhill.y * accel * dt;
}

/// Scale horizontal speed by `friction_per_second^dt`.
///
/// Exponential decay composes across steps, so the result only depends on total time.
pub fn apply_friction(velocity: &mut Vec3, friction_per_second: f32, dt: f32) {
    let factor = friction_per_second.powf(dt);
    velocity.x *= factor;
    velocity.z *= factor;
}

/// Advance the rest timer. Returns true once the projectile should settle.
///
/// Any tick at or above the threshold speed resets the timer.
pub fn update_rest(
    rest_timer: &mut f32,
    speed: f32,
    settings: &ProjectileSettings,
    dt: f32,
) -> bool {
    if speed < settings.rest_velocity_threshold {
        *rest_timer += dt;
        *rest_timer >= settings.rest_time_required
    } else {
        *rest_timer = 0.0;
        false
    }
}

/// Run one grounded tick. `ground` is the terrain height under the projectile.
///
/// On `InvalidTerrain` the projectile keeps its last validated position.
pub(crate) fn step_grounded<V>(
    p: &mut Projectile<V>,
    ground: f32,
    terrain: &dyn TerrainHeight,
    settings: &ProjectileSettings,
    dt: f32,
) -> GroundStep {
    let rest_y = ground + settings.object_radius;
    p.position.y = rest_y;
    if !p.grounded {
        log::trace!("{} touched down at {:?}", p.id, p.position);
    }

    if apply_bounce(&mut p.velocity, &mut p.bounce_count, settings) {
        p.rest_timer = 0.0;
        p.grounded = false;
        // Lift off so the next tick starts airborne.
        p.position.y += p.velocity.y * dt;
        p.last_good = p.position;
        log::trace!("{} bounce {} (v_y {:.3})", p.id, p.bounce_count, p.velocity.y);
        return GroundStep::Bounced;
    }
    p.grounded = true;

    let offset = settings.slope_sample_offset;
    let Some(gradient) = slope_gradient(terrain, p.position.x, p.position.z, offset) else {
        return GroundStep::InvalidTerrain;
    };

    apply_rolling(&mut p.velocity, &gradient, settings, dt);
    apply_friction(&mut p.velocity, settings.friction_per_second, dt);

    let x = p.position.x + p.velocity.x * dt;
    let z = p.position.z + p.velocity.z * dt;
    let Some(height) = sample(terrain, x, z) else {
        return GroundStep::InvalidTerrain;
    };

    let next = Point::new(x, height + settings.object_radius, z);
    if !(next.x.is_finite() && next.z.is_finite()) {
        return GroundStep::InvalidTerrain;
    }
    p.position = next;
    p.last_good = next;
    p.ground_cache = Some(GroundSample { x, z, height });

    if update_rest(&mut p.rest_timer, p.velocity.norm(), settings, dt) {
        p.velocity = Vec3::zeros();
        return GroundStep::Settled;
    }
    GroundStep::Rolling
}
