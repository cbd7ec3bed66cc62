//! 3D Mathematics Library
//!
//! This crate provides the small set of vector and matrix types shared by the
//! field, surface and render crates of the Prism generator.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Mat4`] - 4x4 column-major matrix for homogeneous transforms
//! - [`Mat3`] - 3x3 rotation matrix built from Euler angles

mod vec3;
pub mod mat3;
pub mod mat4;

pub use vec3::Vec3;
pub use mat3::Mat3;
pub use mat4::Mat4;
