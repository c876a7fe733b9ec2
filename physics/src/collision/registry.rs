//! Collider registry: the source of truth for every obstacle and actor footprint.
//!
//! Storage
//! - Colliders live in a dense `Vec` for cache-friendly iteration.
//! - `index` maps the public string id to the dense slot.
//! - `grid` buckets slots by XZ cell so proximity queries only touch nearby cells.
//!
//! Removal uses `swap_remove`; the moved collider's index entry and grid bucket are
//! relabeled so slots stay consistent.
//!
//! Registration never overwrites: re-registering an id requires removing it first, so
//! owners of debug visuals always see a matching remove for every add.

use std::collections::HashMap;

use super::{
    geometry::PreciseGeometry,
    types::{Collider, ColliderKind, Point},
};
use crate::{
    cell::{CellGrid, cell_count, cell_of, cell_range},
    constants::{CELL_SIZE, DEFAULT_ACTOR_HEIGHT},
    error::RegistryError,
    utils::{is_finite_point, planar_distance_sq},
};

#[derive(Clone, Debug)]
pub struct ColliderRegistry {
    colliders: Vec<Collider>,
    index: HashMap<String, usize>,
    grid: CellGrid,
    cell_size: f32,
    default_actor_height: f32,
    /// Largest culling radius among precise colliders; widens proximity queries.
    max_precise_radius: f32,
}

impl Default for ColliderRegistry {
    fn default() -> Self {
        Self::new(CELL_SIZE, DEFAULT_ACTOR_HEIGHT)
    }
}

impl ColliderRegistry {
    /// Create an empty registry. Invalid sizes fall back to the defaults.
    pub fn new(cell_size: f32, default_actor_height: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            CELL_SIZE
        };
        let default_actor_height = if default_actor_height.is_finite() && default_actor_height > 0.0
        {
            default_actor_height
        } else {
            DEFAULT_ACTOR_HEIGHT
        };

        Self {
            colliders: Vec::new(),
            index: HashMap::new(),
            grid: CellGrid::new(),
            cell_size,
            default_actor_height,
            max_precise_radius: 0.0,
        }
    }

    /// Register a cylinder obstacle.
    pub fn try_add_obstacle(
        &mut self,
        id: impl Into<String>,
        position: Point,
        radius: f32,
        height: f32,
    ) -> Result<(), RegistryError> {
        self.insert(id.into(), position, radius, height, ColliderKind::Obstacle, None)
    }

    /// Register an actor footprint with the default actor height.
    pub fn try_add_actor(
        &mut self,
        id: impl Into<String>,
        position: Point,
        radius: f32,
    ) -> Result<(), RegistryError> {
        let height = self.default_actor_height;
        self.insert(id.into(), position, radius, height, ColliderKind::Actor, None)
    }

    /// Register an actor footprint with an explicit height.
    pub fn try_add_actor_with_height(
        &mut self,
        id: impl Into<String>,
        position: Point,
        radius: f32,
        height: f32,
    ) -> Result<(), RegistryError> {
        self.insert(id.into(), position, radius, height, ColliderKind::Actor, None)
    }

    /// Register a static obstacle resolved against its precise geometry.
    ///
    /// Position, radius and height are derived from the geometry bounds and are only used
    /// for culling and debug visualization.
    pub fn try_add_precise_obstacle(
        &mut self,
        id: impl Into<String>,
        geometry: PreciseGeometry,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let Some((base, radius, height)) = geometry.footprint() else {
            return Err(RegistryError::UnboundedGeometry(id));
        };
        self.insert(id, base, radius, height, ColliderKind::Obstacle, Some(geometry))
    }

    /// Register a cylinder obstacle. Duplicates and invalid input are ignored.
    ///
    /// Returns whether the collider was inserted.
    pub fn add_obstacle(
        &mut self,
        id: impl Into<String>,
        position: Point,
        radius: f32,
        height: f32,
    ) -> bool {
        report(self.try_add_obstacle(id, position, radius, height))
    }

    /// Register an actor footprint. Duplicates and invalid input are ignored.
    ///
    /// Returns whether the collider was inserted.
    pub fn add_actor(&mut self, id: impl Into<String>, position: Point, radius: f32) -> bool {
        report(self.try_add_actor(id, position, radius))
    }

    /// Register a precise obstacle. Duplicates and unbounded geometry are ignored.
    pub fn add_precise_obstacle(
        &mut self,
        id: impl Into<String>,
        geometry: PreciseGeometry,
    ) -> bool {
        report(self.try_add_precise_obstacle(id, geometry))
    }

    /// Move a dynamic collider. Unknown ids, precise colliders and non-finite
    /// positions are ignored.
    ///
    /// Returns whether the position changed.
    pub fn update_position(&mut self, id: &str, position: Point) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        if !is_finite_point(&position) {
            log::debug!("ignoring non-finite position for collider `{id}`");
            return false;
        }

        let collider = &mut self.colliders[slot];
        if collider.geometry.is_some() {
            log::debug!("ignoring position update for precise collider `{id}`");
            return false;
        }

        let new_cell = cell_of(position.x, position.z, self.cell_size);
        if new_cell != collider.cell {
            self.grid.remove(collider.cell, slot);
            self.grid.insert(new_cell, slot);
            collider.cell = new_cell;
        }
        collider.position = position;
        true
    }

    /// Remove a collider. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Collider> {
        let slot = self.index.remove(id)?;
        self.grid.remove(self.colliders[slot].cell, slot);

        let last = self.colliders.len() - 1;
        let removed = self.colliders.swap_remove(slot);

        if slot != last {
            let moved = &self.colliders[slot];
            self.grid.relabel(moved.cell, last, slot);
            if let Some(s) = self.index.get_mut(moved.id.as_str()) {
                *s = slot;
            }
        }

        if removed.geometry.is_some() {
            self.max_precise_radius = self
                .colliders
                .iter()
                .filter(|c| c.geometry.is_some())
                .map(|c| c.radius)
                .fold(0.0, f32::max);
        }

        log::debug!("removed collider `{id}`");
        Some(removed)
    }

    /// Colliders whose footprint center lies within `radius` (XZ) of `position`,
    /// nearest first (ties broken by id).
    ///
    /// Precise colliders count as nearby when their bounds come within `radius`.
    /// Only the grid cells overlapping the query are visited, unless the query spans
    /// more cells than there are colliders.
    pub fn nearby(&self, position: &Point, radius: f32) -> Vec<&Collider> {
        if !is_finite_point(position) || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }

        let within = |slot: &usize| {
            let c = &self.colliders[*slot];
            let reach = if c.geometry.is_some() {
                radius + c.radius
            } else {
                radius
            };
            planar_distance_sq(position, &c.position) <= reach * reach
        };

        let reach = radius + self.max_precise_radius;
        let (min, max) = cell_range(position.x, position.z, reach, self.cell_size);

        let mut slots: Vec<usize> = if cell_count(min, max) > self.colliders.len() as u64 {
            (0..self.colliders.len()).filter(within).collect()
        } else {
            self.grid.slots_in_range(min, max).filter(within).collect()
        };

        slots.sort_by(|&a, &b| {
            let ca = &self.colliders[a];
            let cb = &self.colliders[b];
            planar_distance_sq(position, &ca.position)
                .total_cmp(&planar_distance_sq(position, &cb.position))
                .then_with(|| ca.id.cmp(&cb.id))
        });

        slots.into_iter().map(|s| &self.colliders[s]).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Collider> {
        self.index.get(id).map(|&slot| &self.colliders[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
        self.index.clear();
        self.grid.clear();
        self.max_precise_radius = 0.0;
    }

    fn insert(
        &mut self,
        id: String,
        position: Point,
        radius: f32,
        height: f32,
        kind: ColliderKind,
        geometry: Option<PreciseGeometry>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        if !(radius.is_finite() && radius >= 0.0 && height.is_finite() && height > 0.0) {
            return Err(RegistryError::InvalidDimensions { id, radius, height });
        }
        if !is_finite_point(&position) {
            return Err(RegistryError::NonFinitePosition(id));
        }

        let slot = self.colliders.len();
        let cell = cell_of(position.x, position.z, self.cell_size);
        if geometry.is_some() {
            self.max_precise_radius = self.max_precise_radius.max(radius);
        }

        log::debug!("registered {kind:?} collider `{id}` at {position:?} (r={radius}, h={height})");

        self.grid.insert(cell, slot);
        self.index.insert(id.clone(), slot);
        self.colliders.push(Collider {
            id,
            position,
            radius,
            height,
            kind,
            geometry,
            cell,
        });
        Ok(())
    }
}

/// Swallow a registration error after logging it.
fn report(result: Result<(), RegistryError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::debug!("collider registration ignored: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        geometry::ColliderShapeDef,
        types::{Quat, Vec3},
    };

    fn p(x: f32, z: f32) -> Point {
        Point::new(x, 0.0, z)
    }

    fn ids(found: &[&Collider]) -> Vec<String> {
        found.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn duplicate_registration_is_rejected_and_keeps_original() {
        let mut reg = ColliderRegistry::default();
        assert!(reg.add_obstacle("rock", p(1.0, 1.0), 1.0, 2.0));
        assert!(!reg.add_obstacle("rock", p(9.0, 9.0), 3.0, 2.0));
        assert_eq!(
            reg.try_add_actor("rock", p(0.0, 0.0), 0.5),
            Err(RegistryError::DuplicateId("rock".into()))
        );

        let rock = reg.get("rock").unwrap();
        assert_eq!(rock.position(), p(1.0, 1.0));
        assert_eq!(rock.radius(), 1.0);
        assert_eq!(rock.kind(), ColliderKind::Obstacle);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn reregistration_after_remove_is_allowed() {
        let mut reg = ColliderRegistry::default();
        reg.add_actor("p1", p(0.0, 0.0), 0.5);
        assert!(reg.remove("p1").is_some());
        assert!(reg.add_actor("p1", p(2.0, 0.0), 0.4));
        assert_eq!(reg.get("p1").unwrap().radius(), 0.4);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let mut reg = ColliderRegistry::default();
        assert!(matches!(
            reg.try_add_obstacle("a", p(0.0, 0.0), -1.0, 1.0),
            Err(RegistryError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            reg.try_add_obstacle("b", p(0.0, 0.0), 1.0, 0.0),
            Err(RegistryError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            reg.try_add_obstacle("c", Point::new(f32::NAN, 0.0, 0.0), 1.0, 1.0),
            Err(RegistryError::NonFinitePosition(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn actors_get_default_height() {
        let mut reg = ColliderRegistry::default();
        reg.add_actor("npc", p(0.0, 0.0), 0.4);
        assert_eq!(reg.get("npc").unwrap().height(), DEFAULT_ACTOR_HEIGHT);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut reg = ColliderRegistry::default();
        assert!(!reg.update_position("ghost", p(1.0, 1.0)));
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = ColliderRegistry::default();
        reg.add_obstacle("tree", p(0.0, 0.0), 0.5, 3.0);
        assert!(reg.remove("tree").is_some());
        assert!(reg.remove("tree").is_none());
        assert!(reg.remove("never").is_none());
    }

    #[test]
    fn nearby_uses_planar_distance_and_sorts_nearest_first() {
        let mut reg = ColliderRegistry::default();
        reg.add_obstacle("far", p(20.0, 0.0), 1.0, 1.0);
        reg.add_obstacle("near", p(2.0, 0.0), 1.0, 1.0);
        reg.add_obstacle("high", Point::new(0.0, 500.0, 5.0), 1.0, 1.0);
        reg.add_obstacle("out", p(40.0, 0.0), 1.0, 1.0);

        let found = reg.nearby(&p(0.0, 0.0), 30.0);
        assert_eq!(ids(&found), vec!["near", "high", "far"]);
    }

    #[test]
    fn nearby_tracks_moved_colliders_across_cells() {
        let mut reg = ColliderRegistry::default();
        reg.add_actor("p1", p(0.0, 0.0), 0.5);
        assert!(reg.update_position("p1", p(100.0, -100.0)));

        assert!(reg.nearby(&p(0.0, 0.0), 30.0).is_empty());
        assert_eq!(ids(&reg.nearby(&p(100.0, -100.0), 1.0)), vec!["p1"]);
    }

    #[test]
    fn removal_keeps_remaining_slots_consistent() {
        let mut reg = ColliderRegistry::default();
        reg.add_obstacle("a", p(0.0, 0.0), 1.0, 1.0);
        reg.add_obstacle("b", p(50.0, 0.0), 1.0, 1.0);
        reg.add_obstacle("c", p(100.0, 0.0), 1.0, 1.0);

        // "c" moves into slot 0.
        reg.remove("a");
        assert_eq!(ids(&reg.nearby(&p(100.0, 0.0), 1.0)), vec!["c"]);
        assert!(reg.update_position("c", p(-100.0, 0.0)));
        assert_eq!(ids(&reg.nearby(&p(-100.0, 0.0), 1.0)), vec!["c"]);
        assert_eq!(ids(&reg.nearby(&p(50.0, 0.0), 1.0)), vec!["b"]);
        assert_eq!(reg.get("c").unwrap().position(), p(-100.0, 0.0));
    }

    #[test]
    fn huge_query_falls_back_to_full_scan() {
        let mut reg = ColliderRegistry::default();
        reg.add_obstacle("a", p(1.0e4, 0.0), 1.0, 1.0);
        reg.add_obstacle("b", p(-1.0e4, 0.0), 1.0, 1.0);
        assert_eq!(reg.nearby(&p(0.0, 0.0), f32::INFINITY).len(), 2);
        assert!(reg.nearby(&p(0.0, 0.0), f32::NAN).is_empty());
    }

    #[test]
    fn precise_obstacle_is_culled_by_its_bounds() {
        let mut reg = ColliderRegistry::default();
        let wall = PreciseGeometry::from_def(
            Vec3::new(0.0, 2.0, 60.0),
            Quat::identity(),
            &ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(40.0, 2.0, 0.5),
            },
        )
        .unwrap();
        assert!(reg.add_precise_obstacle("wall", wall));

        // Center is 60m away but the wall spans 40m either side of it.
        let found = reg.nearby(&p(0.0, 35.0), 30.0);
        assert_eq!(ids(&found), vec!["wall"]);
        assert!(!reg.update_position("wall", p(0.0, 0.0)));
    }

    #[test]
    fn plane_cannot_be_registered() {
        let mut reg = ColliderRegistry::default();
        let plane = PreciseGeometry::from_def(
            Vec3::zeros(),
            Quat::identity(),
            &ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
        .unwrap();
        assert_eq!(
            reg.try_add_precise_obstacle("floor", plane),
            Err(RegistryError::UnboundedGeometry("floor".into()))
        );
    }
}
