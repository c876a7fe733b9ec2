use thiserror::Error;

/// Errors returned by the fallible collider registration calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("collider `{0}` is already registered")]
    DuplicateId(String),

    #[error("collider `{id}` has invalid dimensions (radius {radius}, height {height})")]
    InvalidDimensions { id: String, radius: f32, height: f32 },

    #[error("collider `{0}` has a non-finite position")]
    NonFinitePosition(String),

    #[error("collider `{0}` has unbounded geometry")]
    UnboundedGeometry(String),
}

/// Errors raised while building precise collision geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid triangle mesh: {0}")]
    InvalidMesh(String),

    #[error("geometry pose is not finite")]
    NonFinitePose,

    #[error("shape dimension `{0}` must be positive and finite")]
    InvalidDimension(&'static str),
}

/// A settings value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("setting `{name}` = {value} is out of range ({expected})")]
pub struct SettingsError {
    pub name: &'static str,
    pub value: f32,
    pub expected: &'static str,
}

/// Rejected projectile spawn requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectileError {
    #[error("projectile {0} is not finite")]
    NonFiniteInput(&'static str),

    #[error("flight time {0} must be positive and finite")]
    InvalidFlightTime(f32),
}
