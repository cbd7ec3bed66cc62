//! 3x3 rotation matrices
//!
//! Gizmo primitives carry their orientation as a `Mat3` built from Euler
//! angles each frame. Column-major like [`crate::Mat4`].

use crate::Vec3;

/// 3x3 matrix type (column-major)
pub type Mat3 = [[f32; 3]; 3];

/// Identity rotation
pub const IDENTITY: Mat3 = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Rotation about a single principal axis (0=X, 1=Y, 2=Z)
pub fn axis_rotation(axis: usize, angle: f32) -> Mat3 {
    let (sn, cs) = angle.sin_cos();
    let (a, b) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };

    let mut m = IDENTITY;
    m[a][a] = cs;
    m[b][b] = cs;
    m[a][b] = sn;
    m[b][a] = -sn;
    m
}

/// Rotation applying X, then Y, then Z
pub fn from_euler(x: f32, y: f32, z: f32) -> Mat3 {
    mul(axis_rotation(2, z), mul(axis_rotation(1, y), axis_rotation(0, x)))
}

/// Multiply two 3x3 matrices: result = a * b (b applied first)
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat3, b: Mat3) -> Mat3 {
    let mut result = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

/// Rotate a vector
pub fn transform(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Apply the inverse rotation (transpose) to a vector
pub fn inverse_transform(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}
