/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data exchanged
between:
- the collider registry (ownership, proximity culling)
- narrow_phase (capsule vs precise geometry penetration)
- the resolution engine (slide / push policies)
- the projectile engine's obstacle check
*/

use std::fmt;

use nalgebra as na;

use super::geometry::PreciseGeometry;
use crate::cell::CellCoord;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// How a collider repels movers. Decided at registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderKind {
    /// Static, rigid: movers slide away at the full sum of radii plus a buffer.
    Obstacle,
    /// Player/NPC footprint: movers may overlap partially before being pushed back.
    Actor,
}

/// One registered footprint.
///
/// `position` is the footprint base; the cylinder (or mover capsule) extends
/// `height` meters upward from it.
#[derive(Clone)]
pub struct Collider {
    pub(crate) id: String,
    pub(crate) position: Point,
    pub(crate) radius: f32,
    pub(crate) height: f32,
    pub(crate) kind: ColliderKind,
    pub(crate) geometry: Option<PreciseGeometry>,
    /// Grid cell holding `position`; kept in sync by the registry.
    pub(crate) cell: CellCoord,
}

impl Collider {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Footprint radius. For precise colliders this is only a culling/debug bound.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn kind(&self) -> ColliderKind {
        self.kind
    }

    pub fn geometry(&self) -> Option<&PreciseGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_precise(&self) -> bool {
        self.geometry.is_some()
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("radius", &self.radius)
            .field("height", &self.height)
            .field("kind", &self.kind)
            .field("precise", &self.geometry.is_some())
            .finish()
    }
}

/// Outcome of a single `resolve` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Where the mover may go. Equal to the requested target when `collided` is false.
    pub position: Point,
    pub collided: bool,
    /// Id of the collider that caused the last adjustment.
    pub blocked_by: Option<String>,
}

impl Resolution {
    #[inline]
    pub fn free(position: Point) -> Self {
        Self {
            position,
            collided: false,
            blocked_by: None,
        }
    }
}

/// Vertical capsule for a mover.
///
/// `half_height` is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is `2*half_height + 2*radius`.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Capsule spanning `height` meters with the given radius. Short or thin movers
    /// collapse to a sphere (`half_height` = 0).
    #[inline]
    pub fn spanning(radius: f32, height: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            radius,
            half_height: (height * 0.5 - radius).max(0.0),
        }
    }

    /// Capsule center for a footprint whose base is at `base`.
    #[inline]
    pub fn center_above(&self, base: &Point) -> Point {
        Point::new(base.x, base.y + self.half_height + self.radius, base.z)
    }
}

/// Penetration between a mover capsule and precise geometry.
#[derive(Clone, Copy, Debug)]
pub struct Penetration {
    /// Unit normal pointing out of the geometry, toward the mover.
    pub normal: Vec3,
    /// Overlap depth along `normal` (meters, > 0).
    pub depth: f32,
}
