/*!
Collision root module.

Movement-level collision for actors and thrown objects. The registry owns every
footprint; the engine turns a requested move into an allowed one. The code is
split for clarity:

- types:        shared data types (Collider, Resolution, CapsuleSpec, math aliases)
- geometry:     precise collider shapes (parry) built from shape definitions
- narrow_phase: capsule vs precise geometry penetration query
- registry:     collider storage and proximity culling
- resolve:      slide / push policies and the `ObstacleQuery` seam
*/

pub mod geometry;
pub mod narrow_phase;
pub mod registry;
pub mod resolve;
pub mod types;

// Re-export commonly used types and functions.
pub use geometry::{ColliderShapeDef, PreciseGeometry};
pub use narrow_phase::capsule_penetration;
pub use registry::ColliderRegistry;
pub use resolve::{CollisionEngine, ObstacleQuery};
pub use types::{CapsuleSpec, Collider, ColliderKind, Penetration, Point, Quat, Resolution, Vec3};
