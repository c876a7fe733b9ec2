use std::fmt;

use nalgebra as na;
use rapier3d::parry::{
    bounding_volume::Aabb,
    shape::{ShapeType, SharedShape},
};

use super::types::{Iso, Point, Quat, Vec3};
use crate::{error::GeometryError, utils::is_finite_vector};

/// Supported precise collider shapes.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space). The normal is derived from the pose as `rotation * +Y`.
    ///
    /// Planes are accepted by [`PreciseGeometry::from_def`] but cannot be registered as
    /// obstacles: their footprint is unbounded.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Y-aligned cone (meters).
    ConeY { radius: f32, half_height: f32 },

    /// Rounded cuboid (meters). `border_radius` rounds all edges/corners.
    RoundCuboid {
        half_extents: Vec3,
        border_radius: f32,
    },

    /// Y-aligned rounded cylinder (meters).
    RoundCylinderY {
        radius: f32,
        half_height: f32,
        border_radius: f32,
    },

    /// Triangle mesh in local space (rocks, walls, props with complex outlines).
    TriMesh {
        vertices: Vec<Point>,
        indices: Vec<[u32; 3]>,
    },
}

/// Immutable, world-placed collision volume used for mesh-accurate resolution.
///
/// Cloning is cheap: the shape is reference counted.
#[derive(Clone)]
pub struct PreciseGeometry {
    shape: SharedShape,
    pose: Iso,
}

impl PreciseGeometry {
    /// Build geometry from a shape definition placed at `translation`/`rotation`.
    ///
    /// Planes: `normal = rotation * +Y`, `dist = dot(normal, translation) + offset`, and
    /// the half-space is placed at `normal * dist` with identity rotation.
    pub fn from_def(
        translation: Vec3,
        rotation: Quat,
        def: &ColliderShapeDef,
    ) -> Result<Self, GeometryError> {
        if !is_finite_vector(&translation) || !rotation.coords.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinitePose);
        }

        let pose = Iso::from_parts(na::Translation3::from(translation), rotation);

        let geometry = match def {
            ColliderShapeDef::Plane {
                offset_along_normal,
            } => {
                let n = rotation * Vec3::y();
                let dist = n.dot(&translation) + *offset_along_normal;
                let unit_n = na::Unit::new_normalize(n);
                Self {
                    shape: SharedShape::halfspace(unit_n),
                    pose: Iso::from_parts(
                        na::Translation3::from(unit_n.into_inner() * dist),
                        Quat::identity(),
                    ),
                }
            }

            ColliderShapeDef::Cuboid { half_extents } => {
                dimension("half_extents.x", half_extents.x)?;
                dimension("half_extents.y", half_extents.y)?;
                dimension("half_extents.z", half_extents.z)?;
                Self {
                    shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
                    pose,
                }
            }

            ColliderShapeDef::Sphere { radius } => {
                dimension("radius", *radius)?;
                Self {
                    shape: SharedShape::ball(*radius),
                    pose,
                }
            }

            ColliderShapeDef::CapsuleY {
                radius,
                half_height,
            } => {
                dimension("radius", *radius)?;
                Self {
                    shape: SharedShape::capsule_y(half_height.max(0.0), *radius),
                    pose,
                }
            }

            ColliderShapeDef::CylinderY {
                radius,
                half_height,
            } => {
                dimension("radius", *radius)?;
                dimension("half_height", *half_height)?;
                Self {
                    shape: SharedShape::cylinder(*half_height, *radius),
                    pose,
                }
            }

            ColliderShapeDef::ConeY {
                radius,
                half_height,
            } => {
                dimension("radius", *radius)?;
                dimension("half_height", *half_height)?;
                Self {
                    shape: SharedShape::cone(*half_height, *radius),
                    pose,
                }
            }

            ColliderShapeDef::RoundCuboid {
                half_extents,
                border_radius,
            } => {
                dimension("half_extents.x", half_extents.x)?;
                dimension("half_extents.y", half_extents.y)?;
                dimension("half_extents.z", half_extents.z)?;
                dimension("border_radius", *border_radius)?;
                Self {
                    shape: SharedShape::round_cuboid(
                        half_extents.x,
                        half_extents.y,
                        half_extents.z,
                        *border_radius,
                    ),
                    pose,
                }
            }

            ColliderShapeDef::RoundCylinderY {
                radius,
                half_height,
                border_radius,
            } => {
                dimension("radius", *radius)?;
                dimension("half_height", *half_height)?;
                dimension("border_radius", *border_radius)?;
                Self {
                    shape: SharedShape::round_cylinder(*half_height, *radius, *border_radius),
                    pose,
                }
            }

            ColliderShapeDef::TriMesh { vertices, indices } => {
                if vertices.iter().any(|v| !v.coords.iter().all(|c| c.is_finite())) {
                    return Err(GeometryError::InvalidMesh("non-finite vertex".into()));
                }
                if let Some(bad) = indices
                    .iter()
                    .flatten()
                    .find(|&&i| i as usize >= vertices.len())
                {
                    return Err(GeometryError::InvalidMesh(format!(
                        "index {bad} out of bounds for {} vertices",
                        vertices.len()
                    )));
                }
                let shape = SharedShape::trimesh(vertices.clone(), indices.clone())
                    .map_err(|e| GeometryError::InvalidMesh(format!("{e:?}")))?;
                Self { shape, pose }
            }
        };

        Ok(geometry)
    }

    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    pub fn pose(&self) -> &Iso {
        &self.pose
    }

    /// World-space bounds of the geometry.
    pub fn world_aabb(&self) -> Aabb {
        self.shape.compute_aabb(&self.pose)
    }

    /// Footprint derived from the world bounds: `(base, planar radius, height)`.
    ///
    /// The base is the bottom-center of the AABB; the radius encloses the AABB in XZ.
    /// Returns `None` for unbounded shapes (planes).
    pub fn footprint(&self) -> Option<(Point, f32, f32)> {
        if self.shape.shape_type() == ShapeType::HalfSpace {
            return None;
        }

        let aabb = self.world_aabb();
        let (mins, maxs) = (aabb.mins, aabb.maxs);
        let finite = mins.coords.iter().chain(maxs.coords.iter()).all(|c| c.is_finite());
        if !finite {
            return None;
        }

        let base = Point::new(
            (mins.x + maxs.x) * 0.5,
            mins.y,
            (mins.z + maxs.z) * 0.5,
        );
        let half_x = (maxs.x - mins.x) * 0.5;
        let half_z = (maxs.z - mins.z) * 0.5;
        let radius = (half_x * half_x + half_z * half_z).sqrt();
        let height = (maxs.y - mins.y).max(f32::EPSILON);
        Some((base, radius, height))
    }
}

impl fmt::Debug for PreciseGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreciseGeometry")
            .field("shape", &self.shape.shape_type())
            .field("pose", &self.pose)
            .finish()
    }
}

fn dimension(name: &'static str, value: f32) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidDimension(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_footprint_encloses_box() {
        let geom = PreciseGeometry::from_def(
            Vec3::new(10.0, 0.0, -4.0),
            Quat::identity(),
            &ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(3.0, 1.0, 4.0),
            },
        )
        .unwrap();

        let (base, radius, height) = geom.footprint().unwrap();
        assert!((base.x - 10.0).abs() < 1.0e-4);
        assert!((base.y + 1.0).abs() < 1.0e-4);
        assert!((base.z + 4.0).abs() < 1.0e-4);
        assert!((radius - 5.0).abs() < 1.0e-4);
        assert!((height - 2.0).abs() < 1.0e-4);
    }

    #[test]
    fn plane_has_no_footprint() {
        let geom = PreciseGeometry::from_def(
            Vec3::zeros(),
            Quat::identity(),
            &ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
        .unwrap();
        assert!(geom.footprint().is_none());
    }

    #[test]
    fn zero_radius_sphere_is_rejected() {
        let err = PreciseGeometry::from_def(
            Vec3::zeros(),
            Quat::identity(),
            &ColliderShapeDef::Sphere { radius: 0.0 },
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::InvalidDimension("radius"));
    }

    #[test]
    fn out_of_range_mesh_index_is_rejected() {
        let err = PreciseGeometry::from_def(
            Vec3::zeros(),
            Quat::identity(),
            &ColliderShapeDef::TriMesh {
                vertices: vec![Point::origin(), Point::new(1.0, 0.0, 0.0)],
                indices: vec![[0, 1, 2]],
            },
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidMesh(_)));
    }

    #[test]
    fn non_finite_translation_is_rejected() {
        let err = PreciseGeometry::from_def(
            Vec3::new(f32::NAN, 0.0, 0.0),
            Quat::identity(),
            &ColliderShapeDef::Sphere { radius: 1.0 },
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::NonFinitePose);
    }
}
