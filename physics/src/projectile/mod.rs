/*!
Projectile root module.

Thrown and dropped objects: ballistic flight, ground bounce / roll / settle, and
hit detection against entities the host reports each tick.

- types:      Projectile, ProjectileId, ProjectileOrigin, NearbyEntity
- ballistics: launch solve and flight integration
- ground:     grounded tick (bounce, slope, rolling, friction, rest)
- detection:  hit and near-miss checks with per-entity cooldowns
- engine:     ProjectileEngine (launch, drop, update, queries)
*/

pub mod ballistics;
pub mod detection;
pub mod engine;
pub mod ground;
pub mod types;

pub use engine::ProjectileEngine;
pub use ground::{GroundStep, apply_friction};
pub use types::{NearbyEntity, Projectile, ProjectileId, ProjectileOrigin};
