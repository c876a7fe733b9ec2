//! Hit and near-miss detection against host-supplied entities.
//!
//! Both use 3D distance from the projectile. The owner and invulnerable entities are
//! skipped, as are entities reported at non-finite positions.

use std::collections::HashMap;

use super::types::NearbyEntity;
use crate::{collision::types::Point, utils::is_finite_point};

#[inline]
fn eligible(entity: &NearbyEntity<'_>, owner_id: &str) -> bool {
    entity.id != owner_id && !entity.invulnerable && is_finite_point(&entity.position)
}

/// Nearest eligible entity within `hit_radius` (inclusive). Ties keep input order.
pub fn find_hit<'e, 'a>(
    position: &Point,
    owner_id: &str,
    entities: &'e [NearbyEntity<'a>],
    hit_radius: f32,
) -> Option<&'e NearbyEntity<'a>> {
    let limit = hit_radius * hit_radius;
    entities
        .iter()
        .filter(|e| eligible(e, owner_id))
        .map(|e| (e, nalgebra::distance_squared(position, &e.position)))
        .filter(|(_, d)| *d <= limit)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(e, _)| e)
}

/// Eligible entities in the near-miss shell `(hit_radius, near_miss_radius]`.
pub fn near_miss_candidates<'e, 'a>(
    position: &'e Point,
    owner_id: &'e str,
    entities: &'e [NearbyEntity<'a>],
    hit_radius: f32,
    near_miss_radius: f32,
) -> impl Iterator<Item = &'e NearbyEntity<'a>> + 'e {
    let inner = hit_radius * hit_radius;
    let outer = near_miss_radius * near_miss_radius;
    entities.iter().filter(move |e| {
        if !eligible(e, owner_id) {
            return false;
        }
        let d = nalgebra::distance_squared(position, &e.position);
        d > inner && d <= outer
    })
}

/// Per-entity near-miss cooldowns, counted down by the tick step.
///
/// The cooldown is shared by all projectiles: an entity gets at most one near-miss
/// notification per window no matter how many projectiles pass it.
#[derive(Clone, Debug, Default)]
pub struct NearMissCooldowns {
    /// Entity id -> seconds left on the cooldown.
    remaining: HashMap<String, f32>,
}

impl NearMissCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cooldown for `entity_id` unless one is running. Returns whether it started.
    pub fn try_start(&mut self, entity_id: &str, cooldown: f32) -> bool {
        if self.remaining.contains_key(entity_id) {
            return false;
        }
        self.remaining.insert(entity_id.to_string(), cooldown);
        true
    }

    /// Count every cooldown down by `dt` and forget the ones that ran out.
    pub fn tick(&mut self, dt: f32) {
        self.remaining.retain(|_, left| {
            *left -= dt;
            *left > 0.0
        });
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Point {
        Point::new(x, 1.0, 0.0)
    }

    #[test]
    fn hit_picks_nearest_and_skips_owner_and_invulnerable() {
        let entities = [
            NearbyEntity::new("owner", at(0.0)),
            NearbyEntity::new("shield", at(0.1)).invulnerable(),
            NearbyEntity::new("b", at(0.6)),
            NearbyEntity::new("a", at(0.3)),
            NearbyEntity::new("far", at(1.5)),
        ];
        let hit = find_hit(&at(0.0), "owner", &entities, 0.8).unwrap();
        assert_eq!(hit.id, "a");
    }

    #[test]
    fn hit_radius_is_inclusive() {
        let entities = [NearbyEntity::new("edge", Point::new(0.8, 0.0, 0.0))];
        assert!(find_hit(&Point::origin(), "owner", &entities, 0.8).is_some());
        assert!(find_hit(&Point::origin(), "owner", &entities, 0.79).is_none());
    }

    #[test]
    fn hit_uses_vertical_distance_too() {
        let entities = [NearbyEntity::new("below", Point::new(0.0, -1.0, 0.0))];
        assert!(find_hit(&Point::origin(), "owner", &entities, 0.8).is_none());
    }

    #[test]
    fn non_finite_entities_are_ignored() {
        let entities = [NearbyEntity::new("ghost", Point::new(f32::NAN, 0.0, 0.0))];
        assert!(find_hit(&Point::origin(), "owner", &entities, 0.8).is_none());
        assert_eq!(
            near_miss_candidates(&Point::origin(), "owner", &entities, 0.8, 2.0).count(),
            0
        );
    }

    #[test]
    fn near_miss_shell_excludes_hit_range() {
        let entities = [
            NearbyEntity::new("inside", at(0.5)),
            NearbyEntity::new("shell", at(1.5)),
            NearbyEntity::new("edge", at(2.0)),
            NearbyEntity::new("outside", at(2.5)),
            NearbyEntity::new("owner", at(1.0)),
        ];
        let ids: Vec<&str> = near_miss_candidates(&at(0.0), "owner", &entities, 0.8, 2.0)
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["shell", "edge"]);
    }

    #[test]
    fn cooldown_blocks_until_expiry() {
        let mut cd = NearMissCooldowns::new();
        assert!(cd.try_start("npc", 2.0));
        cd.tick(1.5);
        assert!(!cd.try_start("npc", 2.0));
        assert!(cd.try_start("other", 2.0));

        cd.tick(0.5);
        assert!(cd.try_start("npc", 2.0));
        cd.tick(1.5);
        assert!(!cd.try_start("npc", 2.0));
        cd.tick(0.5);
        assert!(cd.try_start("npc", 2.0));
    }

    #[test]
    fn tick_drops_expired_entries() {
        let mut cd = NearMissCooldowns::new();
        cd.try_start("a", 1.0);
        cd.tick(0.5);
        cd.try_start("b", 1.0);
        cd.tick(0.75);
        assert_eq!(cd.len(), 1);
        assert!(!cd.try_start("b", 1.0));
        cd.clear();
        assert!(cd.is_empty());
    }
}
