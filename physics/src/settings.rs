/*!
Engine settings and their validation.

Defaults come from [`crate::constants`]. A host can keep one settings value per
world (e.g. loaded from its own config layer) and hand it to the engines at
construction.

Notes
- Distances are in meters, time in seconds.
- `validate()` is cheap; engines call it once when constructed and fall back to
  defaults (with a warning) if it fails.
*/

use crate::{constants::*, error::SettingsError};

/// Tuning for [`crate::collision::CollisionEngine`] and its registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionSettings {
    /// Proximity radius (XZ) scanned around the mover's start position.
    pub check_radius: f32,
    /// Footprint radius used when the mover has no registered collider.
    pub default_mover_radius: f32,
    /// Capsule height used when the mover has no registered collider.
    pub default_mover_height: f32,
    /// Height given to actors registered without one.
    pub default_actor_height: f32,
    /// Gap kept outside obstacles after a rigid slide.
    pub obstacle_buffer: f32,
    /// Share of combined radii two actors may close to before pushing back.
    pub actor_overlap_ratio: f32,
    /// Resolution passes per call. 1 = stop at the first colliding candidate.
    pub max_passes: u32,
    /// Proximity grid cell size.
    pub cell_size: f32,
    /// Precise contacts with `normal.y` at or above this are treated as floor.
    pub walkable_normal_y: f32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            check_radius: CHECK_RADIUS,
            default_mover_radius: DEFAULT_MOVER_RADIUS,
            default_mover_height: DEFAULT_ACTOR_HEIGHT,
            default_actor_height: DEFAULT_ACTOR_HEIGHT,
            obstacle_buffer: OBSTACLE_BUFFER,
            actor_overlap_ratio: ACTOR_OVERLAP_RATIO,
            max_passes: 1,
            cell_size: CELL_SIZE,
            walkable_normal_y: WALKABLE_NORMAL_Y,
        }
    }
}

impl CollisionSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("check_radius", self.check_radius)?;
        non_negative("default_mover_radius", self.default_mover_radius)?;
        positive("default_mover_height", self.default_mover_height)?;
        positive("default_actor_height", self.default_actor_height)?;
        non_negative("obstacle_buffer", self.obstacle_buffer)?;
        unit_interval("actor_overlap_ratio", self.actor_overlap_ratio)?;
        positive("cell_size", self.cell_size)?;
        unit_interval("walkable_normal_y", self.walkable_normal_y)?;
        if self.max_passes == 0 {
            return Err(SettingsError {
                name: "max_passes",
                value: 0.0,
                expected: ">= 1",
            });
        }
        Ok(())
    }
}

/// Tuning for [`crate::projectile::ProjectileEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSettings {
    /// Vertical acceleration (m/s²); negative is down.
    pub gravity: f32,
    /// Flight time used by `launch` (s).
    pub flight_time: f32,
    /// Object radius; rest height above terrain.
    pub object_radius: f32,
    /// Margin above rest height that still counts as grounded.
    pub ground_epsilon: f32,
    pub hit_radius: f32,
    pub near_miss_radius: f32,
    /// Per-entity near-miss cooldown (s).
    pub near_miss_cooldown: f32,
    pub bounce_threshold: f32,
    pub max_bounces: u32,
    pub bounce_damping: f32,
    pub slope_sample_offset: f32,
    /// Radians.
    pub min_slope_angle: f32,
    pub rolling_friction: f32,
    /// Fraction of horizontal speed kept per second on the ground.
    pub friction_per_second: f32,
    pub rest_velocity_threshold: f32,
    pub rest_time_required: f32,
    pub max_lifetime: f32,
    /// Cosmetic spin (rad/s).
    pub spin_rate: f32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            flight_time: FLIGHT_TIME,
            object_radius: OBJECT_RADIUS,
            ground_epsilon: GROUND_EPSILON,
            hit_radius: HIT_RADIUS,
            near_miss_radius: NEAR_MISS_RADIUS,
            near_miss_cooldown: NEAR_MISS_COOLDOWN,
            bounce_threshold: BOUNCE_THRESHOLD,
            max_bounces: MAX_BOUNCES,
            bounce_damping: BOUNCE_DAMPING,
            slope_sample_offset: SLOPE_SAMPLE_OFFSET,
            min_slope_angle: MIN_SLOPE_ANGLE,
            rolling_friction: ROLLING_FRICTION,
            friction_per_second: FRICTION_PER_SECOND,
            rest_velocity_threshold: REST_VELOCITY_THRESHOLD,
            rest_time_required: REST_TIME_REQUIRED,
            max_lifetime: MAX_LIFETIME,
            spin_rate: SPIN_RATE,
        }
    }
}

impl ProjectileSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.gravity.is_finite() {
            return Err(SettingsError {
                name: "gravity",
                value: self.gravity,
                expected: "finite",
            });
        }
        positive("flight_time", self.flight_time)?;
        non_negative("object_radius", self.object_radius)?;
        non_negative("ground_epsilon", self.ground_epsilon)?;
        non_negative("hit_radius", self.hit_radius)?;
        if !(self.near_miss_radius >= self.hit_radius) {
            return Err(SettingsError {
                name: "near_miss_radius",
                value: self.near_miss_radius,
                expected: ">= hit_radius",
            });
        }
        non_negative("near_miss_cooldown", self.near_miss_cooldown)?;
        non_negative("bounce_threshold", self.bounce_threshold)?;
        if !(0.0..1.0).contains(&self.bounce_damping) {
            return Err(SettingsError {
                name: "bounce_damping",
                value: self.bounce_damping,
                expected: "[0, 1)",
            });
        }
        positive("slope_sample_offset", self.slope_sample_offset)?;
        non_negative("min_slope_angle", self.min_slope_angle)?;
        unit_interval("rolling_friction", self.rolling_friction)?;
        unit_interval("friction_per_second", self.friction_per_second)?;
        non_negative("rest_velocity_threshold", self.rest_velocity_threshold)?;
        non_negative("rest_time_required", self.rest_time_required)?;
        positive("max_lifetime", self.max_lifetime)?;
        if !self.spin_rate.is_finite() {
            return Err(SettingsError {
                name: "spin_rate",
                value: self.spin_rate,
                expected: "finite",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError {
            name,
            value,
            expected: "> 0",
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError {
            name,
            value,
            expected: ">= 0",
        })
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<(), SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError {
            name,
            value,
            expected: "[0, 1]",
        })
    }
}
