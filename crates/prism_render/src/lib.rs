//! Rendering library
//!
//! This crate places extracted surface meshes in the world and draws them.
//!
//! ## Key Components
//!
//! - [`frustum::FrustumCuller`] - Perspective transform and sphere visibility test
//! - [`tiler::KaleidoscopeTiler`] - Mirrored lattice tiling with per-octant LOD
//! - [`renderer::Renderer`] - Draw sink; [`renderer::RecordingRenderer`] for headless use
//! - [`camera::CameraRig`] - Orbiting / free-flying camera
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`pipeline::MeshPipeline`] - Lit mesh drawing with per-draw model matrices

pub mod error;
pub mod frustum;
pub mod tiler;
pub mod renderer;
pub mod camera;
pub mod context;
pub mod pipeline;

pub use error::RenderError;
pub use frustum::{FrustumCuller, FrustumParams};
pub use tiler::{KaleidoscopeTiler, OctantDraw, TileStats};
pub use renderer::{DrawCall, RecordingRenderer, Renderer, Winding};
pub use camera::{CameraRig, CameraRigConfig, CameraView};
