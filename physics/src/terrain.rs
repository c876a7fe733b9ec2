/// Source of terrain elevation for the projectile engine.
///
/// Implementations must be pure and cheap: the engine samples up to five
/// heights per projectile per tick. There is no error channel; a non-finite
/// return value means "no terrain here" and the engine terminates the affected
/// projectile instead of integrating it.
pub trait TerrainHeight {
    fn height(&self, x: f32, z: f32) -> f32;
}

impl<F> TerrainHeight for F
where
    F: Fn(f32, f32) -> f32,
{
    #[inline]
    fn height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Infinite horizontal ground at a fixed elevation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
    pub elevation: f32,
}

impl FlatTerrain {
    pub const fn new(elevation: f32) -> Self {
        Self { elevation }
    }
}

impl TerrainHeight for FlatTerrain {
    #[inline]
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.elevation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_terrain() {
        let ramp = |x: f32, _z: f32| x * 0.5;
        assert_eq!(ramp.height(4.0, 100.0), 2.0);
    }

    #[test]
    fn flat_terrain_ignores_position() {
        let flat = FlatTerrain::new(-3.0);
        assert_eq!(flat.height(1.0e6, -1.0e6), -3.0);
    }
}
