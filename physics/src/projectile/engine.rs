//! Projectile engine: owns every live projectile and steps them once per tick.
//!
//! Tick order per projectile:
//! 1. cosmetic spin
//! 2. lifetime cutoff
//! 3. terrain sample under the projectile (cached from the previous tick when possible)
//! 4. flying: hit, near-miss, obstacle check, integrate
//!    grounded: bounce / roll / friction / rest (see [`super::ground`])
//!
//! A projectile ends with exactly one terminal event (hit or miss), emitted in the same
//! tick it is removed from the active set. The visual handle moves into that event.

use std::collections::HashMap;

use super::{
    ballistics,
    detection::{self, NearMissCooldowns},
    ground::{self, GroundStep},
    types::{GroundSample, NearbyEntity, Projectile, ProjectileId, ProjectileOrigin},
};
use crate::{
    collision::{resolve::ObstacleQuery, types::Point},
    error::ProjectileError,
    events::{EventSink, MissReason, ProjectileEvent},
    settings::ProjectileSettings,
    terrain::TerrainHeight,
    utils::is_finite_point,
};

/// Inputs shared by every projectile during one `update`.
struct Tick<'t, 'e> {
    settings: ProjectileSettings,
    dt: f32,
    entities: &'t [NearbyEntity<'e>],
    terrain: &'t dyn TerrainHeight,
    obstacles: Option<&'t dyn ObstacleQuery>,
}

/// Why a projectile leaves the active set.
enum Terminal {
    Hit { target_id: String, position: Point },
    Miss { reason: MissReason, position: Point },
}

pub struct ProjectileEngine<V> {
    settings: ProjectileSettings,
    projectiles: Vec<Projectile<V>>,
    index: HashMap<ProjectileId, usize>,
    next_id: u64,
    /// Simulation clock (s), advanced by `update`. Lifetimes and cooldowns count their
    /// own `dt` instead of reading it.
    clock: f64,
    near_misses: NearMissCooldowns,
}

impl<V> Default for ProjectileEngine<V> {
    fn default() -> Self {
        Self {
            settings: ProjectileSettings::default(),
            projectiles: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
            clock: 0.0,
            near_misses: NearMissCooldowns::new(),
        }
    }
}

impl<V> ProjectileEngine<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine with custom settings. Invalid settings are replaced by the defaults.
    pub fn with_settings(settings: ProjectileSettings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                log::warn!("invalid projectile settings ({err}); using defaults");
                ProjectileSettings::default()
            }
        };
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ProjectileSettings {
        &self.settings
    }

    /// Current simulation time (s).
    pub fn now(&self) -> f64 {
        self.clock
    }

    /// Throw from `from` so the projectile reaches `to` after the configured flight time.
    pub fn launch(
        &mut self,
        from: Point,
        to: Point,
        owner_id: impl Into<String>,
        target_id: Option<String>,
        visual: Option<V>,
    ) -> Result<ProjectileId, ProjectileError> {
        let flight_time = self.settings.flight_time;
        self.launch_with_flight_time(from, to, flight_time, owner_id, target_id, visual)
    }

    /// Throw from `from` so the projectile reaches `to` after `flight_time` seconds.
    pub fn launch_with_flight_time(
        &mut self,
        from: Point,
        to: Point,
        flight_time: f32,
        owner_id: impl Into<String>,
        target_id: Option<String>,
        visual: Option<V>,
    ) -> Result<ProjectileId, ProjectileError> {
        if !is_finite_point(&from) {
            return Err(ProjectileError::NonFiniteInput("origin"));
        }
        if !is_finite_point(&to) {
            return Err(ProjectileError::NonFiniteInput("target"));
        }
        let velocity = ballistics::launch_velocity(&from, &to, flight_time, self.settings.gravity)
            .ok_or(ProjectileError::InvalidFlightTime(flight_time))?;

        let id = self.spawn(
            owner_id.into(),
            target_id,
            ProjectileOrigin::Thrown,
            from,
            velocity,
            visual,
        );
        log::debug!("launched {id} from {from:?} toward {to:?} (v {velocity:?})");
        Ok(id)
    }

    /// Spawn a world drop at rest at `position`. Drops never collide with obstacles.
    pub fn drop(
        &mut self,
        position: Point,
        owner_id: impl Into<String>,
        visual: Option<V>,
    ) -> Result<ProjectileId, ProjectileError> {
        if !is_finite_point(&position) {
            return Err(ProjectileError::NonFiniteInput("position"));
        }
        let id = self.spawn(
            owner_id.into(),
            None,
            ProjectileOrigin::WorldDrop,
            position,
            nalgebra::Vector3::zeros(),
            visual,
        );
        log::debug!("dropped {id} at {position:?}");
        Ok(id)
    }

    /// Advance every projectile by `dt` seconds.
    ///
    /// `entities` are the hit / near-miss candidates for this tick. `obstacles` is
    /// consulted for thrown projectiles only. Non-positive or non-finite `dt` is ignored.
    pub fn update(
        &mut self,
        dt: f32,
        entities: &[NearbyEntity<'_>],
        terrain: &dyn TerrainHeight,
        obstacles: Option<&dyn ObstacleQuery>,
        events: &mut dyn EventSink<V>,
    ) {
        if !(dt.is_finite() && dt > 0.0) {
            log::trace!("ignoring projectile update with dt {dt}");
            return;
        }

        self.clock += f64::from(dt);
        self.near_misses.tick(dt);

        let tick = Tick {
            settings: self.settings,
            dt,
            entities,
            terrain,
            obstacles,
        };

        let mut slot = 0;
        while slot < self.projectiles.len() {
            let outcome = step(&mut self.projectiles[slot], &tick, &mut self.near_misses, events);
            match outcome {
                None => slot += 1,
                // The last projectile moves into `slot`; visit it next.
                Some(terminal) => {
                    let projectile = self.take(slot);
                    finish(projectile, terminal, events);
                }
            }
        }
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile<V>> {
        self.index.get(&id).map(|&slot| &self.projectiles[slot])
    }

    pub fn contains(&self, id: ProjectileId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile<V>> {
        self.projectiles.iter()
    }

    /// Remove a projectile without emitting an event. The caller takes its visual back.
    pub fn remove(&mut self, id: ProjectileId) -> Option<Projectile<V>> {
        let slot = *self.index.get(&id)?;
        log::debug!("removed {id}");
        Some(self.take(slot))
    }

    /// Remove every projectile without emitting events, returning their visual handles.
    ///
    /// Near-miss cooldowns are reset as well.
    pub fn clear(&mut self) -> Vec<V> {
        self.index.clear();
        self.near_misses.clear();
        self.projectiles
            .drain(..)
            .filter_map(Projectile::into_visual)
            .collect()
    }

    fn spawn(
        &mut self,
        owner_id: String,
        target_id: Option<String>,
        origin: ProjectileOrigin,
        position: Point,
        velocity: nalgebra::Vector3<f32>,
        visual: Option<V>,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        self.index.insert(id, self.projectiles.len());
        self.projectiles.push(Projectile::new(
            id, owner_id, target_id, origin, position, velocity, self.clock, visual,
        ));
        id
    }

    fn take(&mut self, slot: usize) -> Projectile<V> {
        let projectile = self.projectiles.swap_remove(slot);
        self.index.remove(&projectile.id);
        if let Some(moved) = self.projectiles.get(slot) {
            self.index.insert(moved.id, slot);
        }
        projectile
    }
}

fn step<V>(
    p: &mut Projectile<V>,
    tick: &Tick<'_, '_>,
    near_misses: &mut NearMissCooldowns,
    events: &mut dyn EventSink<V>,
) -> Option<Terminal> {
    let s = &tick.settings;
    p.spin(s.spin_rate * tick.dt);

    p.age += tick.dt;
    if p.age >= s.max_lifetime {
        return Some(Terminal::Miss {
            reason: MissReason::Expired,
            position: p.position,
        });
    }

    let Some(ground) = ground_height(p, tick.terrain) else {
        return Some(invalid_terrain(p));
    };

    let rest_y = ground + s.object_radius;
    let airborne = p.position.y > rest_y + s.ground_epsilon || p.velocity.y > 0.0;
    if airborne {
        return step_flying(p, tick, near_misses, events);
    }

    match ground::step_grounded(p, ground, tick.terrain, s, tick.dt) {
        GroundStep::Rolling | GroundStep::Bounced => None,
        GroundStep::Settled => Some(Terminal::Miss {
            reason: MissReason::Settled,
            position: p.position,
        }),
        GroundStep::InvalidTerrain => Some(invalid_terrain(p)),
    }
}

fn step_flying<V>(
    p: &mut Projectile<V>,
    tick: &Tick<'_, '_>,
    near_misses: &mut NearMissCooldowns,
    events: &mut dyn EventSink<V>,
) -> Option<Terminal> {
    let s = &tick.settings;
    p.grounded = false;
    p.rest_timer = 0.0;

    if let Some(entity) = detection::find_hit(&p.position, &p.owner_id, tick.entities, s.hit_radius)
    {
        return Some(Terminal::Hit {
            target_id: entity.id.to_string(),
            position: p.position,
        });
    }

    for entity in detection::near_miss_candidates(
        &p.position,
        &p.owner_id,
        tick.entities,
        s.hit_radius,
        s.near_miss_radius,
    ) {
        if near_misses.try_start(entity.id, s.near_miss_cooldown) {
            events.emit(ProjectileEvent::NearMiss {
                projectile_id: p.id,
                owner_id: p.owner_id.clone(),
                entity_id: entity.id.to_string(),
                position: p.position,
            });
        }
    }

    let Some((next, velocity)) =
        ballistics::step_flight(&p.position, &p.velocity, s.gravity, tick.dt)
    else {
        return Some(invalid_terrain(p));
    };

    let obstacles = match p.origin {
        ProjectileOrigin::Thrown => tick.obstacles,
        ProjectileOrigin::WorldDrop => None,
    };
    if let Some(obstacles) = obstacles {
        let resolution = obstacles.resolve(&p.owner_id, &p.position, &next);
        if resolution.collided {
            log::debug!(
                "{} struck obstacle {:?} at {:?}",
                p.id,
                resolution.blocked_by,
                p.position
            );
            return Some(Terminal::Miss {
                reason: MissReason::Obstacle,
                position: p.position,
            });
        }
    }

    let Some(height) = ground::sample(tick.terrain, next.x, next.z) else {
        return Some(invalid_terrain(p));
    };

    p.position = next;
    p.velocity = velocity;
    p.position.y = p.position.y.max(height + s.object_radius);
    p.ground_cache = Some(GroundSample {
        x: next.x,
        z: next.z,
        height,
    });
    p.last_good = p.position;
    None
}

/// Terrain height under the projectile, reusing the cached sample when it has not
/// moved in XZ.
fn ground_height<V>(p: &mut Projectile<V>, terrain: &dyn TerrainHeight) -> Option<f32> {
    match p.ground_cache {
        Some(cached) if cached.matches(&p.position) => Some(cached.height),
        _ => {
            let height = ground::sample(terrain, p.position.x, p.position.z)?;
            p.ground_cache = Some(GroundSample {
                x: p.position.x,
                z: p.position.z,
                height,
            });
            Some(height)
        }
    }
}

fn invalid_terrain<V>(p: &mut Projectile<V>) -> Terminal {
    log::warn!(
        "{} has no valid terrain near {:?}; terminating at last good position {:?}",
        p.id,
        p.position,
        p.last_good
    );
    p.position = p.last_good;
    Terminal::Miss {
        reason: MissReason::InvalidTerrain,
        position: p.last_good,
    }
}

fn finish<V>(projectile: Projectile<V>, terminal: Terminal, events: &mut dyn EventSink<V>) {
    let Projectile {
        id,
        owner_id,
        visual,
        ..
    } = projectile;

    let event = match terminal {
        Terminal::Hit {
            target_id,
            position,
        } => {
            log::debug!("{id} hit `{target_id}` at {position:?}");
            ProjectileEvent::Hit {
                projectile_id: id,
                owner_id,
                target_id,
                position,
                visual,
            }
        }
        Terminal::Miss { reason, position } => {
            log::debug!("{id} ended ({reason:?}) at {position:?}");
            ProjectileEvent::Miss {
                projectile_id: id,
                owner_id,
                position,
                reason,
                visual,
            }
        }
    };
    events.emit(event);
}
