//! 4x4 Matrix utilities for homogeneous 3D transforms
//!
//! Matrices are column-major (`m[column][row]`), matching WGSL `mat4x4<f32>`
//! so they can be uploaded to uniform buffers without transposing.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Translation matrix
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Non-uniform scale matrix
pub fn scale(s: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = s.x;
    m[1][1] = s.y;
    m[2][2] = s.z;
    m
}

/// Translate then scale about the translated origin: `T(t) * S(s)`
pub fn translation_scale(t: Vec3, s: Vec3) -> Mat4 {
    let mut m = scale(s);
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) and drop the homogeneous coordinate
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a direction (w = 0)
pub fn transform_vector(m: &Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Right-handed perspective projection mapping depth to wgpu's `[0, 1]`
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let nf = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far * nf, -1.0],
        [0.0, 0.0, far * near * nf, 0.0],
    ]
}

/// View matrix from an eye position and an orthonormal camera basis
///
/// The camera looks down `forward`; view space is right-handed with the
/// camera looking along -Z.
pub fn view_from_basis(eye: Vec3, right: Vec3, up: Vec3, forward: Vec3) -> Mat4 {
    [
        [right.x, up.x, -forward.x, 0.0],
        [right.y, up.y, -forward.y, 0.0],
        [right.z, up.z, -forward.z, 0.0],
        [-right.dot(eye), -up.dot(eye), forward.dot(eye), 1.0],
    ]
}

/// Look-at view matrix
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);
    view_from_basis(eye, s, u, f)
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(transform_point(&IDENTITY, p), p));
    }

    #[test]
    fn test_translation_scale_order() {
        // Scale first, then translate
        let m = translation_scale(Vec3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 1.0, 1.0));
        let p = transform_point(&m, Vec3::new(0.5, 0.5, 0.5));
        assert!(vec_approx_eq(p, Vec3::new(1.5, 0.5, 0.5)), "got {:?}", p);

        let composed = mul(translation(Vec3::new(2.0, 0.0, 0.0)), scale(Vec3::new(-1.0, 1.0, 1.0)));
        assert_eq!(composed, m);
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let m = translation(Vec3::new(5.0, 5.0, 5.0));
        assert!(vec_approx_eq(transform_vector(&m, Vec3::X), Vec3::X));
    }

    #[test]
    fn test_look_at_maps_target_to_negative_z() {
        let view = look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let p = transform_point(&view, Vec3::ZERO);
        assert!(vec_approx_eq(p, Vec3::new(0.0, 0.0, -5.0)), "got {:?}", p);

        let eye = transform_point(&view, Vec3::new(0.0, 0.0, 5.0));
        assert!(vec_approx_eq(eye, Vec3::ZERO));
    }

    #[test]
    fn test_perspective_matrix() {
        let proj = perspective(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0);
        assert!(proj[0][0] != 0.0);
        assert!(proj[1][1] != 0.0);
        assert_eq!(proj[2][3], -1.0);

        // Near plane lands on depth 0, far plane on depth 1
        let depth = |z: f32| (proj[2][2] * z + proj[3][2]) / -z;
        assert!(depth(-0.1).abs() < 1e-5);
        assert!((depth(-100.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transpose_roundtrip() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transpose(transpose(m)), m);
        assert_eq!(transpose(m)[0][3], 1.0);
    }
}
