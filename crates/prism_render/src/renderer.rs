//! Draw sink abstraction
//!
//! The generator and the tiler only ever talk to a [`Renderer`]. The GPU
//! implementation lives in the host; [`RecordingRenderer`] captures draws
//! for headless runs and tests.

use prism_math::Mat4;
use prism_surface::{Mesh, MeshId};

use crate::camera::CameraView;
use crate::frustum::FrustumParams;

/// Front-face winding for a draw
///
/// Mirroring through an odd number of axes turns counter-clockwise
/// triangles clockwise, so such draws use the clockwise pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Winding {
    #[default]
    Ccw,
    Cw,
}

impl Winding {
    /// Winding after mirroring through `negative_axes` axes
    #[inline]
    pub fn for_negative_axes(negative_axes: u32) -> Self {
        if negative_axes % 2 == 1 {
            Winding::Cw
        } else {
            Winding::Ccw
        }
    }
}

/// Receives the frame's camera and mesh draws
pub trait Renderer {
    /// Current perspective parameters (aspect follows the surface size)
    fn frustum_params(&self) -> FrustumParams;

    /// Camera for every draw that follows in this frame
    fn set_camera(&mut self, view: &CameraView);

    /// Draw a mesh with a model transform
    ///
    /// The mesh is only guaranteed stable for the duration of the call;
    /// implementations copy what they need.
    fn draw(&mut self, mesh: &Mesh, model: &Mat4, winding: Winding);
}

/// One recorded draw
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshId,
    pub revision: u64,
    pub checksum: u64,
    pub triangles: usize,
    pub model: Mat4,
    pub winding: Winding,
}

/// Renderer that just records what it was asked to draw
#[derive(Clone, Debug)]
pub struct RecordingRenderer {
    params: FrustumParams,
    camera: Option<CameraView>,
    draws: Vec<DrawCall>,
    /// Skip hashing mesh contents when not needed
    checksums: bool,
}

impl RecordingRenderer {
    pub fn new(params: FrustumParams) -> Self {
        Self {
            params,
            camera: None,
            draws: Vec::new(),
            checksums: true,
        }
    }

    /// Disable per-draw mesh checksums
    pub fn without_checksums(mut self) -> Self {
        self.checksums = false;
        self
    }

    #[inline]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    #[inline]
    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    /// Forget recorded draws
    pub fn clear(&mut self) {
        self.draws.clear();
    }

    /// Take recorded draws, leaving the recorder empty
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new(FrustumParams::default())
    }
}

impl Renderer for RecordingRenderer {
    fn frustum_params(&self) -> FrustumParams {
        self.params
    }

    fn set_camera(&mut self, view: &CameraView) {
        self.camera = Some(*view);
    }

    fn draw(&mut self, mesh: &Mesh, model: &Mat4, winding: Winding) {
        self.draws.push(DrawCall {
            mesh: mesh.id(),
            revision: mesh.revision(),
            checksum: if self.checksums { mesh.checksum() } else { 0 },
            triangles: mesh.triangle_count(),
            model: *model,
            winding,
        });
    }
}
