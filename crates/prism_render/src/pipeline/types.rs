//! GPU-compatible data types for the mesh pipeline
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use prism_math::mat4;

/// Byte stride between per-draw model uniforms (dynamic offset alignment)
pub const MODEL_UNIFORM_STRIDE: u64 = 256;

/// Per-frame uniforms
/// Layout: 160 bytes total (must match mesh.wgsl FrameUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    /// View matrix (64 bytes)
    pub view_matrix: [[f32; 4]; 4],
    /// Projection matrix (64 bytes)
    pub projection_matrix: [[f32; 4]; 4],
    /// Light direction (normalized) + ambient (16 bytes)
    pub light_dir: [f32; 3],
    pub ambient_strength: f32,
    /// Base colour + diffuse (16 bytes)
    pub base_color: [f32; 3],
    pub diffuse_strength: f32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_matrix: mat4::IDENTITY,
            projection_matrix: mat4::IDENTITY,
            light_dir: [0.5, 1.0, 0.3],
            ambient_strength: 0.3,
            base_color: [0.9, 0.85, 0.8],
            diffuse_strength: 0.7,
        }
    }
}

/// Per-draw model transform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self {
            model: mat4::IDENTITY,
        }
    }
}
