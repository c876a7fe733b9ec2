//! Default tuning values for the collision and projectile engines.
//!
//! Distances are in meters, time in seconds, angles in radians unless noted.
//! Engines read these through [`crate::settings`], so hosts can override any
//! value per world without touching this file.

/// Size of one proximity grid cell in world units (meters).
/// All cells are square.
pub const CELL_SIZE: f32 = 5.0;

/// Radius (XZ) of the proximity query used before resolving a move.
pub const CHECK_RADIUS: f32 = 30.0;

/// Footprint radius assumed for movers without a registered collider.
pub const DEFAULT_MOVER_RADIUS: f32 = 0.5;

/// Height assumed for movers without a registered collider, and for actors
/// registered without an explicit height.
pub const DEFAULT_ACTOR_HEIGHT: f32 = 1.8;

/// Extra gap kept between a mover and an obstacle after a rigid slide.
pub const OBSTACLE_BUFFER: f32 = 0.1;

/// Fraction of the combined radii two actors may close to before pushing back.
pub const ACTOR_OVERLAP_RATIO: f32 = 0.7;

/// Precise-geometry contacts with a normal at least this vertical are floor, not wall.
/// cos(45°) ≈ 0.707.
pub const WALKABLE_NORMAL_Y: f32 = 0.7;

/// Squared planar distance under which two points are considered coincident.
pub const COINCIDENT_DIST_SQ: f32 = 1.0e-12;

/// Gravity along +Y (m/s²). Negative means down.
pub const GRAVITY: f32 = -9.8;

/// Time a thrown projectile takes to reach its target point.
pub const FLIGHT_TIME: f32 = 0.5;

/// Radius of a thrown object; its center rests this far above the terrain.
pub const OBJECT_RADIUS: f32 = 0.06;

/// Height above rest level under which a projectile counts as grounded.
pub const GROUND_EPSILON: f32 = 0.005;

/// 3D distance under which a flying projectile hits an entity.
pub const HIT_RADIUS: f32 = 0.8;

/// 3D distance under which a flying projectile counts as a near miss.
pub const NEAR_MISS_RADIUS: f32 = 2.0;

/// Per-entity quiet period after a near-miss notification (2000 ms).
pub const NEAR_MISS_COOLDOWN: f32 = 2.0;

/// Minimum downward speed at ground contact that produces a bounce (m/s).
pub const BOUNCE_THRESHOLD: f32 = 0.3;

/// Bounces allowed before vertical rebound is suppressed.
pub const MAX_BOUNCES: u32 = 2;

/// Fraction of vertical speed kept after a bounce.
pub const BOUNCE_DAMPING: f32 = 0.25;

/// Offset along X and Z used to sample the terrain gradient.
pub const SLOPE_SAMPLE_OFFSET: f32 = 0.3;

/// Slope under which a grounded projectile does not start rolling (3°).
pub const MIN_SLOPE_ANGLE: f32 = 3.0 * std::f32::consts::PI / 180.0;

/// Share of downhill acceleration lost to rolling resistance.
pub const ROLLING_FRICTION: f32 = 0.4;

/// Fraction of horizontal speed kept per second of ground contact.
pub const FRICTION_PER_SECOND: f32 = 0.85;

/// 3D speed under which a grounded projectile accumulates rest time (m/s).
pub const REST_VELOCITY_THRESHOLD: f32 = 0.1;

/// Continuous rest time needed to settle.
pub const REST_TIME_REQUIRED: f32 = 0.3;

/// Hard cap on projectile lifetime.
pub const MAX_LIFETIME: f32 = 5.0;

/// Cosmetic spin applied to the visual orientation (rad/s).
pub const SPIN_RATE: f32 = 10.0;
