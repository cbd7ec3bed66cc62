//! Implicit primitives
//!
//! Every primitive contributes `(radius / distance)^2` to the field, where
//! `distance` is measured to its skeleton (a point, circle, segment, or the
//! unit sphere of a scaled frame). An isolated primitive therefore crosses
//! the iso level 1.0 exactly at its nominal surface.

use prism_math::{mat3, Mat3, Vec3};

/// Distance below which contributions saturate instead of blowing up
const MIN_DISTANCE_SQUARED: f32 = 1e-6;

/// An implicit shape in gizmo space
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    /// Point skeleton
    Sphere { center: Vec3, radius: f32 },
    /// Circle skeleton in the local XZ plane (axis along local Y)
    Torus {
        center: Vec3,
        orientation: Mat3,
        major_radius: f32,
        minor_radius: f32,
    },
    /// Segment skeleton
    Capsule { start: Vec3, end: Vec3, radius: f32 },
    /// Unit sphere in a rotated, non-uniformly scaled frame
    Ellipsoid {
        center: Vec3,
        orientation: Mat3,
        radii: Vec3,
    },
}

impl Primitive {
    /// Sphere at `center`
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Primitive::Sphere { center, radius }
    }

    /// Torus at `center` rotated by `orientation`
    pub fn torus(center: Vec3, orientation: Mat3, major_radius: f32, minor_radius: f32) -> Self {
        Primitive::Torus {
            center,
            orientation,
            major_radius,
            minor_radius,
        }
    }

    /// Capsule between two points
    pub fn capsule(start: Vec3, end: Vec3, radius: f32) -> Self {
        Primitive::Capsule { start, end, radius }
    }

    /// Ellipsoid at `center`
    pub fn ellipsoid(center: Vec3, orientation: Mat3, radii: Vec3) -> Self {
        Primitive::Ellipsoid {
            center,
            orientation,
            radii,
        }
    }

    /// Field contribution at `p`
    pub fn value(&self, p: Vec3) -> f32 {
        match *self {
            Primitive::Sphere { center, radius } => {
                falloff(radius * radius, (p - center).length_squared())
            }
            Primitive::Torus {
                center,
                orientation,
                major_radius,
                minor_radius,
            } => {
                let q = mat3::inverse_transform(&orientation, p - center);
                let ring = (q.x * q.x + q.z * q.z).sqrt() - major_radius;
                falloff(minor_radius * minor_radius, ring * ring + q.y * q.y)
            }
            Primitive::Capsule { start, end, radius } => {
                let axis = end - start;
                let len2 = axis.length_squared();
                let t = if len2 > MIN_DISTANCE_SQUARED {
                    ((p - start).dot(axis) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = start + axis * t;
                falloff(radius * radius, (p - closest).length_squared())
            }
            Primitive::Ellipsoid {
                center,
                orientation,
                radii,
            } => {
                let q = mat3::inverse_transform(&orientation, p - center);
                let safe = Vec3::new(
                    radii.x.max(MIN_DISTANCE_SQUARED),
                    radii.y.max(MIN_DISTANCE_SQUARED),
                    radii.z.max(MIN_DISTANCE_SQUARED),
                );
                falloff(1.0, q.component_div(safe).length_squared())
            }
        }
    }

    /// A point inside the primitive, used to start surface crawling
    pub fn seed_point(&self) -> Vec3 {
        match *self {
            Primitive::Sphere { center, .. } => center,
            Primitive::Torus {
                center,
                orientation,
                major_radius,
                ..
            } => center + mat3::transform(&orientation, Vec3::new(major_radius, 0.0, 0.0)),
            Primitive::Capsule { start, .. } => start,
            Primitive::Ellipsoid { center, .. } => center,
        }
    }
}

#[inline]
fn falloff(radius_squared: f32, distance_squared: f32) -> f32 {
    radius_squared / distance_squared.max(MIN_DISTANCE_SQUARED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_math::mat3::{axis_rotation, IDENTITY};

    const EPSILON: f32 = 0.0001;

    #[test]
    fn test_sphere_crosses_iso_at_radius() {
        let s = Primitive::sphere(Vec3::new(0.1, 0.2, 0.3), 0.5);
        let on_surface = Vec3::new(0.6, 0.2, 0.3);
        assert!((s.value(on_surface) - 1.0).abs() < EPSILON);
        assert!(s.value(Vec3::new(0.2, 0.2, 0.3)) > 1.0);
        assert!(s.value(Vec3::new(2.0, 0.2, 0.3)) < 1.0);
    }

    #[test]
    fn test_sphere_center_is_clamped() {
        let s = Primitive::sphere(Vec3::ZERO, 0.5);
        let v = s.value(Vec3::ZERO);
        assert!(v.is_finite());
        assert!(v > 1.0);
    }

    #[test]
    fn test_torus_ring_and_hole() {
        let t = Primitive::torus(Vec3::ZERO, IDENTITY, 0.5, 0.1);
        // On the tube surface, outside edge of the ring
        assert!((t.value(Vec3::new(0.6, 0.0, 0.0)) - 1.0).abs() < EPSILON);
        // The hole in the middle is outside the surface
        assert!(t.value(Vec3::ZERO) < 1.0);
        // The seed sits on the ring
        assert!(t.value(t.seed_point()) > 1.0);
    }

    #[test]
    fn test_torus_orientation() {
        // Rotate the ring 90 degrees about X: the ring now lies in XY
        let t = Primitive::torus(Vec3::ZERO, axis_rotation(0, std::f32::consts::FRAC_PI_2), 0.5, 0.1);
        assert!(t.value(Vec3::new(0.0, 0.5, 0.0)) > 1.0);
        assert!(t.value(Vec3::new(0.0, 0.0, 0.5)) < 1.0);
    }

    #[test]
    fn test_capsule_segment_distance() {
        let c = Primitive::capsule(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.2);
        assert!((c.value(Vec3::new(0.5, 0.2, 0.0)) - 1.0).abs() < EPSILON);
        // Beyond the end cap
        assert!((c.value(Vec3::new(1.2, 0.0, 0.0)) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_degenerate_capsule_acts_as_sphere() {
        let c = Primitive::capsule(Vec3::ONE, Vec3::ONE, 0.3);
        let s = Primitive::sphere(Vec3::ONE, 0.3);
        let p = Vec3::new(1.4, 1.0, 0.9);
        assert!((c.value(p) - s.value(p)).abs() < EPSILON);
    }

    #[test]
    fn test_ellipsoid_radii() {
        let e = Primitive::ellipsoid(Vec3::ZERO, IDENTITY, Vec3::new(0.5, 0.25, 0.1));
        assert!((e.value(Vec3::new(0.5, 0.0, 0.0)) - 1.0).abs() < EPSILON);
        assert!((e.value(Vec3::new(0.0, 0.25, 0.0)) - 1.0).abs() < EPSILON);
        assert!((e.value(Vec3::new(0.0, 0.0, 0.1)) - 1.0).abs() < EPSILON);
    }
}
