use nalgebra as na;
use rapier3d::parry::{query, shape as pshape};

use super::{
    geometry::PreciseGeometry,
    types::{CapsuleSpec, Iso, Penetration, Point, Vec3},
};

/// Test a vertical mover capsule against precise geometry and return the penetration (if any).
///
/// - `base`: footprint base of the mover (the capsule extends upward from here).
/// - `capsule`: the mover's capsule.
/// - `geometry`: the static volume to test against.
///
/// Touching contacts (zero depth) are not reported. Shape pairs parry cannot
/// query are treated as no contact.
pub fn capsule_penetration(
    base: &Point,
    capsule: CapsuleSpec,
    geometry: &PreciseGeometry,
) -> Option<Penetration> {
    let capsule_shape = pshape::Capsule::new_y(capsule.half_height, capsule.radius);
    let center = capsule.center_above(base);
    let capsule_iso = Iso::from_parts(
        na::Translation3::new(center.x, center.y, center.z),
        na::UnitQuaternion::identity(),
    );

    let contact = match query::contact(
        &capsule_iso,
        &capsule_shape as &dyn pshape::Shape,
        geometry.pose(),
        &**geometry.shape(),
        0.0,
    ) {
        Ok(Some(contact)) => contact,
        Ok(None) => return None,
        Err(_) => {
            log::trace!(
                "capsule contact unsupported for shape {:?}",
                geometry.shape().shape_type()
            );
            return None;
        }
    };

    // `dist` is negative while penetrating.
    let depth = -contact.dist;
    if depth <= 0.0 || !depth.is_finite() {
        return None;
    }

    // normal1 points from the capsule toward the geometry; we want the escape direction.
    let n1 = contact.normal1.into_inner();
    let normal = Vec3::new(-n1.x, -n1.y, -n1.z);

    Some(Penetration { normal, depth })
}
