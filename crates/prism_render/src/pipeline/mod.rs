//! Rendering pipeline components
//!
//! This module contains the wgpu pipeline that draws surface meshes.

pub mod types;
pub mod mesh_pipeline;

pub use types::{FrameUniforms, ModelUniform, MODEL_UNIFORM_STRIDE};
pub use mesh_pipeline::MeshPipeline;
