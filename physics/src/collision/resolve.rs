//! Collision resolution: adjust a mover's requested position against nearby colliders.
//!
//! Policies
//! - Obstacle (cylinder): rigid. An overlapping mover is placed on the line from the
//!   obstacle center through the target, at the sum of radii plus a small buffer.
//! - Actor: soft. Overlap is tolerated down to `actor_overlap_ratio` of the sum of radii;
//!   closer than that the mover is pushed back to exactly that distance.
//! - Precise obstacle: the mover capsule is tested against the real geometry and pushed
//!   out horizontally. Floor-like contacts are ignored so movers can stand on geometry.
//!
//! Candidates are gathered once around `from` and visited nearest-first. With the default
//! single pass the first colliding candidate decides the outcome; more passes re-test the
//! adjusted position against all candidates.

use super::{
    narrow_phase::capsule_penetration,
    registry::ColliderRegistry,
    types::{CapsuleSpec, Collider, ColliderKind, Point, Resolution},
};
use crate::{
    settings::CollisionSettings,
    utils::{is_finite_point, planar_direction_or_x, planar_distance_sq},
};

/// Minimum horizontal share of a contact normal that still produces a push.
const MIN_HORIZONTAL_NORMAL: f32 = 1.0e-4;

/// Anything that can adjust a straight-line move against the world.
///
/// The projectile engine only needs this seam, so tests can stub the world.
pub trait ObstacleQuery {
    /// Resolve a move of `mover_id` from `from` to `to`.
    fn resolve(&self, mover_id: &str, from: &Point, to: &Point) -> Resolution;
}

/// Mover footprint used during one resolve call.
#[derive(Clone, Copy, Debug)]
struct Mover {
    radius: f32,
    capsule: CapsuleSpec,
}

/// Owns the collider registry and applies the resolution policies.
#[derive(Clone, Debug, Default)]
pub struct CollisionEngine {
    registry: ColliderRegistry,
    settings: CollisionSettings,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine with custom settings. Invalid settings are replaced by the defaults.
    pub fn with_settings(settings: CollisionSettings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                log::warn!("invalid collision settings ({err}); using defaults");
                CollisionSettings::default()
            }
        };
        Self {
            registry: ColliderRegistry::new(settings.cell_size, settings.default_actor_height),
            settings,
        }
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ColliderRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ColliderRegistry {
        &mut self.registry
    }

    /// Adjust a requested move from `from` to `to` for the mover `actor_id`.
    ///
    /// The mover's own collider (if registered) supplies its radius and height and is
    /// never tested against itself. Unregistered movers use the default footprint.
    /// Only the XZ components are ever changed; Y is carried over from `to`.
    pub fn resolve(&self, actor_id: &str, from: &Point, to: &Point) -> Resolution {
        if !is_finite_point(from) || !is_finite_point(to) {
            log::trace!("resolve skipped for `{actor_id}`: non-finite input");
            return Resolution::free(*to);
        }

        let mover = self.mover(actor_id);
        let candidates: Vec<&Collider> = self
            .registry
            .nearby(from, self.settings.check_radius)
            .into_iter()
            .filter(|c| c.id() != actor_id)
            .collect();

        if candidates.is_empty() {
            return Resolution::free(*to);
        }

        let mut position = *to;
        let mut blocked_by = None;

        for _ in 0..self.settings.max_passes {
            let hit = candidates
                .iter()
                .find_map(|c| self.resolve_against(c, &position, mover).map(|p| (p, c.id())));

            let Some((adjusted, id)) = hit else {
                break;
            };
            position = adjusted;
            blocked_by = Some(id.to_string());
        }

        match blocked_by {
            Some(id) => {
                log::trace!("`{actor_id}` blocked by `{id}`: {to:?} -> {position:?}");
                Resolution {
                    position,
                    collided: true,
                    blocked_by: Some(id),
                }
            }
            None => Resolution::free(*to),
        }
    }

    fn mover(&self, actor_id: &str) -> Mover {
        let (radius, height) = self
            .registry
            .get(actor_id)
            .filter(|c| !c.is_precise())
            .map(|c| (c.radius(), c.height()))
            .unwrap_or((
                self.settings.default_mover_radius,
                self.settings.default_mover_height,
            ));
        Mover {
            radius,
            capsule: CapsuleSpec::spanning(radius, height),
        }
    }

    /// Adjusted target if `target` collides with `collider`.
    fn resolve_against(&self, collider: &Collider, target: &Point, mover: Mover) -> Option<Point> {
        if let Some(geometry) = collider.geometry() {
            let hit = capsule_penetration(target, mover.capsule, geometry)?;

            // Floors and ceilings: no horizontal escape.
            if hit.normal.y.abs() >= self.settings.walkable_normal_y {
                return None;
            }
            let horizontal = nalgebra::Vector2::new(hit.normal.x, hit.normal.z);
            let len = horizontal.norm();
            if len <= MIN_HORIZONTAL_NORMAL {
                return None;
            }

            // Moving `s` along the unit horizontal normal separates by `s * len` along the
            // contact normal.
            let push = horizontal / len * (hit.depth / len);
            return Some(Point::new(target.x + push.x, target.y, target.z + push.y));
        }

        let combined = collider.radius() + mover.radius;
        let center = collider.position();

        let keep_out = match collider.kind() {
            ColliderKind::Obstacle => {
                if planar_distance_sq(&center, target) >= combined * combined {
                    return None;
                }
                combined + self.settings.obstacle_buffer
            }
            ColliderKind::Actor => {
                let limit = combined * self.settings.actor_overlap_ratio;
                if planar_distance_sq(&center, target) >= limit * limit {
                    return None;
                }
                limit
            }
        };

        let dir = planar_direction_or_x(&center, target);
        Some(Point::new(
            center.x + dir.x * keep_out,
            target.y,
            center.z + dir.y * keep_out,
        ))
    }
}

impl ObstacleQuery for CollisionEngine {
    fn resolve(&self, mover_id: &str, from: &Point, to: &Point) -> Resolution {
        CollisionEngine::resolve(self, mover_id, from, to)
    }
}
