//! Projectile Scenarios - End-to-End Runs Across Both Engines
//!
//! Drives the projectile engine with real terrain closures and a collision engine
//! as the obstacle query, checking only what a host would observe: events and
//! the projectile set.

use std::collections::HashMap;

use nalgebra::Point3;
use physics::{
    CollisionEngine, EventQueue, FlatTerrain, MissReason, NearbyEntity, ProjectileEngine,
    ProjectileEvent, ProjectileId, TerrainHeight,
    collision::{ColliderShapeDef, PreciseGeometry, Quat, Vec3},
    utils::planar_distance,
};

const DT: f32 = 1.0 / 60.0;

fn run(
    engine: &mut ProjectileEngine<u32>,
    ticks: usize,
    entities: &[NearbyEntity<'_>],
    terrain: &dyn TerrainHeight,
    world: Option<&CollisionEngine>,
) -> Vec<ProjectileEvent<u32>> {
    let mut queue = EventQueue::new();
    for _ in 0..ticks {
        engine.update(
            DT,
            entities,
            terrain,
            world.map(|w| w as &dyn physics::ObstacleQuery),
            &mut queue,
        );
    }
    queue.drain().collect()
}

// ============================================================================
// Ground Behaviour
// ============================================================================

#[test]
fn dropped_object_settles_on_flat_ground() {
    let mut engine = ProjectileEngine::new();
    let id = engine
        .drop(Point3::new(0.0, 5.0, 0.0), "world", Some(7))
        .unwrap();

    let events = run(&mut engine, 600, &[], &FlatTerrain::new(0.0), None);

    assert!(engine.is_empty());
    assert_eq!(events.len(), 1, "{events:?}");
    match &events[0] {
        ProjectileEvent::Miss {
            projectile_id,
            owner_id,
            position,
            reason,
            visual,
        } => {
            assert_eq!(*projectile_id, id);
            assert_eq!(owner_id, "world");
            assert_eq!(*reason, MissReason::Settled);
            assert!((position.y - 0.06).abs() < 1.0e-4, "y {}", position.y);
            assert!(position.x.abs() < 1.0e-6 && position.z.abs() < 1.0e-6);
            assert_eq!(*visual, Some(7));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn dropped_object_settles_on_raised_plateau() {
    let mut engine = ProjectileEngine::new();
    engine
        .drop(Point3::new(3.0, 12.0, -4.0), "world", None)
        .unwrap();

    let events = run(&mut engine, 600, &[], &FlatTerrain::new(7.5), None);

    assert_eq!(events.len(), 1);
    let ProjectileEvent::Miss {
        position, reason, ..
    } = &events[0]
    else {
        panic!("expected a miss, got {:?}", events[0]);
    };
    assert_eq!(*reason, MissReason::Settled);
    assert!((position.y - 7.56).abs() < 1.0e-3);
}

#[test]
fn object_rolls_downhill_on_steep_slope() {
    // Falls toward +X at 0.5 m per m (about 27 degrees).
    let slope = |x: f32, _z: f32| -0.5 * x;

    let mut engine = ProjectileEngine::<u32>::new();
    let id = engine
        .drop(Point3::new(0.0, 0.5, 0.0), "world", None)
        .unwrap();

    let mut queue = EventQueue::new();
    for _ in 0..120 {
        engine.update(DT, &[], &slope, None, &mut queue);
    }

    let p = engine.get(id).expect("still rolling");
    assert!(p.position().x > 0.5, "x {}", p.position().x);
    assert!(p.velocity().x > 0.0);
    assert!(p.position().z.abs() < 1.0e-4);
    assert!(queue.is_empty());
}

#[test]
fn thrown_object_keeps_sliding_until_lifetime_cap() {
    // Short, flat throw: lands, bounces, then friction bleeds off horizontal speed.
    let mut engine = ProjectileEngine::new();
    engine
        .launch_with_flight_time(
            Point3::new(0.0, 0.06, 0.0),
            Point3::new(0.3, 0.06, 0.0),
            0.3,
            "p1",
            None,
            Some(1),
        )
        .unwrap();

    let events = run(&mut engine, 320, &[], &FlatTerrain::new(0.0), None);
    // 1 m/s horizontal with 0.85/s friction never drops below 0.1 m/s in 5 s.
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        ProjectileEvent::Miss {
            reason: MissReason::Expired,
            ..
        }
    ));
}

// ============================================================================
// Collision Integration
// ============================================================================

#[test]
fn throw_into_precise_wall_ends_as_obstacle_miss() {
    let mut world = CollisionEngine::new();
    let wall = PreciseGeometry::from_def(
        Vec3::new(5.0, 2.0, 0.0),
        Quat::identity(),
        &ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(0.25, 2.0, 5.0),
        },
    )
    .unwrap();
    assert!(world.registry_mut().add_precise_obstacle("wall", wall));

    let mut engine = ProjectileEngine::new();
    let id = engine
        .launch(
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(10.0, 1.0, 0.0),
            "p1",
            None,
            Some(3),
        )
        .unwrap();

    let events = run(&mut engine, 60, &[], &FlatTerrain::new(0.0), Some(&world));

    assert_eq!(events.len(), 1, "{events:?}");
    match &events[0] {
        ProjectileEvent::Miss {
            projectile_id,
            reason,
            position,
            visual,
            ..
        } => {
            assert_eq!(*projectile_id, id);
            assert_eq!(*reason, MissReason::Obstacle);
            assert!(position.x < 4.75);
            assert_eq!(*visual, Some(3));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn thrower_never_blocks_own_projectile() {
    let mut world = CollisionEngine::new();
    world
        .registry_mut()
        .add_actor("p1", Point3::new(0.0, 0.0, 0.0), 0.5);

    let mut engine = ProjectileEngine::new();
    engine
        .launch(
            Point3::new(0.0, 1.5, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            "p1",
            None,
            None,
        )
        .unwrap();

    let owner = [NearbyEntity::new("p1", Point3::new(0.0, 1.0, 0.0))];
    let events = run(&mut engine, 20, &owner, &FlatTerrain::new(0.0), Some(&world));

    assert!(events.is_empty(), "{events:?}");
    assert_eq!(engine.len(), 1);
}

#[test]
fn actor_walking_into_obstacle_keeps_clearance() {
    let mut world = CollisionEngine::new();
    world
        .registry_mut()
        .add_obstacle("pillar", Point3::new(5.0, 0.0, 0.2), 1.0, 4.0);
    world
        .registry_mut()
        .add_actor("walker", Point3::new(0.0, 0.0, 0.0), 0.5);

    let mut pos = Point3::new(0.0, 0.0, 0.0);
    for _ in 0..100 {
        let to = Point3::new(pos.x + 0.1, pos.y, pos.z);
        let res = world.resolve("walker", &pos, &to);
        pos = res.position;
        world.registry_mut().update_position("walker", pos);

        let clearance = planar_distance(&pos, &Point3::new(5.0, 0.0, 0.2));
        assert!(clearance >= 1.5 - 1.0e-4, "clearance {clearance}");
    }
    assert_eq!(world.registry().get("walker").unwrap().position(), pos);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn every_projectile_ends_with_exactly_one_terminal_event() {
    let mut engine = ProjectileEngine::new();
    let npc = [NearbyEntity::new("npc", Point3::new(4.0, 1.0, 0.0))];
    let hills = |x: f32, z: f32| 0.3 * (0.2 * x).sin() + 0.2 * (0.3 * z).cos();

    let mut ids = Vec::new();
    for i in 0..16u32 {
        let angle = i as f32 * std::f32::consts::TAU / 16.0;
        let to = Point3::new(4.0 * angle.cos(), 1.0, 4.0 * angle.sin());
        ids.push(
            engine
                .launch(Point3::new(0.0, 1.5, 0.0), to, "p1", None, Some(i))
                .unwrap(),
        );
    }
    ids.push(
        engine
            .drop(Point3::new(-3.0, 4.0, 2.0), "world", Some(99))
            .unwrap(),
    );

    // Past the lifetime cap: nothing may survive.
    let events = run(&mut engine, 360, &npc, &hills, None);
    assert!(engine.is_empty());

    let mut terminal: HashMap<ProjectileId, usize> = HashMap::new();
    for event in events.iter().filter(|e| e.is_terminal()) {
        *terminal.entry(event.projectile_id()).or_default() += 1;
    }
    assert_eq!(terminal.len(), ids.len());
    assert!(terminal.values().all(|&n| n == 1), "{terminal:?}");

    // The throw aimed straight at the npc hits it.
    assert!(events.iter().any(|e| matches!(
        e,
        ProjectileEvent::Hit { target_id, visual: Some(0), .. } if target_id == "npc"
    )));
}
