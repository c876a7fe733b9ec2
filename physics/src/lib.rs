pub mod cell;
pub mod collision;
pub mod constants;
pub mod error;
pub mod events;
pub mod projectile;
pub mod settings;
pub mod terrain;
pub mod utils;

pub use collision::{
    Collider, ColliderKind, ColliderRegistry, ColliderShapeDef, CollisionEngine, ObstacleQuery,
    PreciseGeometry, Resolution,
};
pub use error::{GeometryError, ProjectileError, RegistryError, SettingsError};
pub use events::{EventQueue, EventSink, MissReason, ProjectileEvent};
pub use projectile::{NearbyEntity, Projectile, ProjectileEngine, ProjectileId, ProjectileOrigin};
pub use settings::{CollisionSettings, ProjectileSettings};
pub use terrain::{FlatTerrain, TerrainHeight};
