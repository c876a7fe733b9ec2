/*!
Projectile data types.

A projectile is owned by the engine from launch until its terminal event. Fields
are crate-visible so the ballistics and ground steps can mutate them in place;
callers read them through the accessors.
*/

use std::fmt;

use nalgebra as na;

use crate::collision::types::{Point, Quat, Vec3};

/// Engine-assigned projectile handle. Never reused within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projectile#{}", self.0)
    }
}

/// How the projectile entered the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOrigin {
    /// Launched by an actor; checked against obstacles while flying.
    Thrown,
    /// Spawned by the world (loot, debris); skips the obstacle check.
    WorldDrop,
}

/// An entity the host reports near the projectiles this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearbyEntity<'a> {
    pub id: &'a str,
    pub position: Point,
    /// Invulnerable entities are never hit (nor near-missed).
    pub invulnerable: bool,
}

impl<'a> NearbyEntity<'a> {
    pub fn new(id: &'a str, position: Point) -> Self {
        Self {
            id,
            position,
            invulnerable: false,
        }
    }

    pub fn invulnerable(mut self) -> Self {
        self.invulnerable = true;
        self
    }
}

/// Terrain height sampled at one XZ location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GroundSample {
    pub x: f32,
    pub z: f32,
    pub height: f32,
}

impl GroundSample {
    #[inline]
    pub fn matches(&self, position: &Point) -> bool {
        self.x == position.x && self.z == position.z
    }
}

pub struct Projectile<V> {
    pub(crate) id: ProjectileId,
    pub(crate) owner_id: String,
    pub(crate) target_id: Option<String>,
    pub(crate) origin: ProjectileOrigin,
    pub(crate) position: Point,
    pub(crate) velocity: Vec3,
    /// Cosmetic orientation of the visual.
    pub(crate) orientation: Quat,
    /// Engine clock at spawn (s).
    pub(crate) spawn_time: f64,
    /// Simulated seconds since spawn.
    pub(crate) age: f32,
    pub(crate) bounce_count: u32,
    /// Seconds spent below the rest threshold.
    pub(crate) rest_timer: f32,
    pub(crate) grounded: bool,
    /// Last terrain sample; reused while the projectile has not moved in XZ.
    pub(crate) ground_cache: Option<GroundSample>,
    /// Last position that passed validation.
    pub(crate) last_good: Point,
    pub(crate) visual: Option<V>,
}

impl<V> Projectile<V> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ProjectileId,
        owner_id: String,
        target_id: Option<String>,
        origin: ProjectileOrigin,
        position: Point,
        velocity: Vec3,
        spawn_time: f64,
        visual: Option<V>,
    ) -> Self {
        Self {
            id,
            owner_id,
            target_id,
            origin,
            position,
            velocity,
            orientation: Quat::identity(),
            spawn_time,
            age: 0.0,
            bounce_count: 0,
            rest_timer: 0.0,
            grounded: false,
            ground_cache: None,
            last_good: position,
            visual,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn origin(&self) -> ProjectileOrigin {
        self.origin
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn spawn_time(&self) -> f64 {
        self.spawn_time
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn bounce_count(&self) -> u32 {
        self.bounce_count
    }

    pub fn rest_timer(&self) -> f32 {
        self.rest_timer
    }

    /// True once the projectile has touched down and is not bouncing.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn visual(&self) -> Option<&V> {
        self.visual.as_ref()
    }

    /// Consume the projectile, handing back its visual handle.
    pub fn into_visual(self) -> Option<V> {
        self.visual
    }

    /// Advance the cosmetic spin by `angle` radians around the local X axis.
    pub(crate) fn spin(&mut self, angle: f32) {
        if angle.is_finite() && angle != 0.0 {
            self.orientation *= na::UnitQuaternion::from_axis_angle(&Vec3::x_axis(), angle);
        }
    }
}

impl<V> fmt::Debug for Projectile<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projectile")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("origin", &self.origin)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("bounce_count", &self.bounce_count)
            .field("rest_timer", &self.rest_timer)
            .field("grounded", &self.grounded)
            .field("has_visual", &self.visual.is_some())
            .finish()
    }
}
