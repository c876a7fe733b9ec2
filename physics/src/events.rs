//! Outbound projectile notifications.
//!
//! The projectile engine publishes through an injected [`EventSink`] instead of a
//! global dispatcher. Events are fire-and-forget: consumers must not call back into
//! the engine while handling them; queue follow-up work for a later phase instead.
//!
//! `V` is the caller's visual handle (mesh id, scene node, ...). Terminal events move
//! it out of the engine, so ownership passes to whoever drains the sink.

use std::collections::VecDeque;

use nalgebra::Point3;

use crate::projectile::ProjectileId;

/// Why a projectile ended without hitting an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissReason {
    /// Came to rest on the ground.
    Settled,
    /// Struck a registered obstacle in flight (impact particles).
    Obstacle,
    /// Exceeded the maximum lifetime.
    Expired,
    /// Terrain under it returned a non-finite height, or integration went non-finite.
    InvalidTerrain,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectileEvent<V> {
    /// `projectile-hit`
    Hit {
        projectile_id: ProjectileId,
        owner_id: String,
        target_id: String,
        position: Point3<f32>,
        visual: Option<V>,
    },
    /// `projectile-miss`
    Miss {
        projectile_id: ProjectileId,
        owner_id: String,
        position: Point3<f32>,
        reason: MissReason,
        visual: Option<V>,
    },
    /// `projectile-near-miss`
    NearMiss {
        projectile_id: ProjectileId,
        owner_id: String,
        entity_id: String,
        position: Point3<f32>,
    },
}

impl<V> ProjectileEvent<V> {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectileEvent::Hit { .. } => "projectile-hit",
            ProjectileEvent::Miss { .. } => "projectile-miss",
            ProjectileEvent::NearMiss { .. } => "projectile-near-miss",
        }
    }

    pub fn projectile_id(&self) -> ProjectileId {
        match self {
            ProjectileEvent::Hit { projectile_id, .. }
            | ProjectileEvent::Miss { projectile_id, .. }
            | ProjectileEvent::NearMiss { projectile_id, .. } => *projectile_id,
        }
    }

    /// True for events that end a projectile (hit or miss).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProjectileEvent::NearMiss { .. })
    }
}

/// Receiver of projectile events.
pub trait EventSink<V> {
    fn emit(&mut self, event: ProjectileEvent<V>);
}

impl<V> EventSink<V> for Vec<ProjectileEvent<V>> {
    fn emit(&mut self, event: ProjectileEvent<V>) {
        self.push(event);
    }
}

/// FIFO event queue the host drains once per tick.
#[derive(Debug)]
pub struct EventQueue<V> {
    events: VecDeque<ProjectileEvent<V>>,
}

impl<V> Default for EventQueue<V> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }
}

impl<V> EventQueue<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pop(&mut self) -> Option<ProjectileEvent<V>> {
        self.events.pop_front()
    }

    /// Take every queued event in emission order.
    pub fn drain(&mut self) -> impl Iterator<Item = ProjectileEvent<V>> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectileEvent<V>> {
        self.events.iter()
    }
}

impl<V> EventSink<V> for EventQueue<V> {
    fn emit(&mut self, event: ProjectileEvent<V>) {
        self.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miss(id: u64) -> ProjectileEvent<u32> {
        ProjectileEvent::Miss {
            projectile_id: ProjectileId(id),
            owner_id: "p1".into(),
            position: Point3::origin(),
            reason: MissReason::Settled,
            visual: Some(9),
        }
    }

    #[test]
    fn queue_preserves_emission_order() {
        let mut queue = EventQueue::new();
        queue.emit(miss(1));
        queue.emit(miss(2));
        let ids: Vec<u64> = queue.drain().map(|e| e.projectile_id().0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn names_match_bus_topics() {
        let near: ProjectileEvent<()> = ProjectileEvent::NearMiss {
            projectile_id: ProjectileId(3),
            owner_id: "p1".into(),
            entity_id: "npc".into(),
            position: Point3::origin(),
        };
        assert_eq!(near.name(), "projectile-near-miss");
        assert!(!near.is_terminal());
        assert_eq!(miss(1).name(), "projectile-miss");
        assert!(miss(1).is_terminal());
    }
}
