//! View frustum culling
//!
//! The culler keeps four side-plane normals in view space, all passing
//! through the eye. There is no near plane: everything drawn is small
//! compared with the view distance.

use prism_math::{mat4, Mat4, Vec3};

use crate::camera::CameraView;

/// Perspective parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumParams {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FrustumParams {
    fn default() -> Self {
        Self {
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 40.0,
        }
    }
}

/// Sphere-vs-frustum test against the current camera
#[derive(Clone, Debug)]
pub struct FrustumCuller {
    params: FrustumParams,
    /// Inward normals of the left, right, top and bottom planes (view space)
    planes: [Vec3; 4],
    view: CameraView,
}

impl FrustumCuller {
    pub fn new(params: FrustumParams) -> Self {
        Self {
            params,
            planes: side_planes(&params),
            view: CameraView::default(),
        }
    }

    #[inline]
    pub fn params(&self) -> &FrustumParams {
        &self.params
    }

    /// Replace the perspective (e.g. after a resize)
    pub fn set_params(&mut self, params: FrustumParams) {
        self.params = params;
        self.planes = side_planes(&params);
    }

    /// Move the frustum to a camera
    pub fn set_camera(&mut self, view: CameraView) {
        self.view = view;
    }

    #[inline]
    pub fn camera(&self) -> &CameraView {
        &self.view
    }

    /// Perspective projection matrix
    pub fn projection(&self) -> Mat4 {
        let p = &self.params;
        mat4::perspective(p.fov_y, p.aspect, p.near, p.far)
    }

    /// True if any part of the sphere may be visible
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        let d = center - self.view.eye;
        // View space: x right, y up, camera looking down -z
        let v = Vec3::new(d.dot(self.view.right), d.dot(self.view.up), -d.dot(self.view.forward));

        if self.planes.iter().any(|n| n.dot(v) < -radius) {
            return false;
        }
        v.z >= -(self.params.far + radius)
    }
}

fn side_planes(params: &FrustumParams) -> [Vec3; 4] {
    let half_y = params.fov_y * 0.5;
    let half_x = (half_y.tan() * params.aspect).atan();
    let (sx, cx) = half_x.sin_cos();
    let (sy, cy) = half_y.sin_cos();
    [
        Vec3::new(cx, 0.0, -sx),  // left
        Vec3::new(-cx, 0.0, -sx), // right
        Vec3::new(0.0, -cy, -sy), // top
        Vec3::new(0.0, cy, -sy),  // bottom
    ]
}
