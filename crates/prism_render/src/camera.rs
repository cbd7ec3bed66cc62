//! Camera rig
//!
//! In single mode the camera orbits the gizmo at the origin. In kaleidoscope
//! mode it flies forward through the mirrored lattice while its heading
//! wanders slowly, so the view never repeats exactly.

use prism_field::SceneMode;
use prism_math::{mat3, mat4, Mat4, Vec3};

/// Eye position plus an orthonormal basis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub eye: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            forward: -Vec3::Z,
        }
    }
}

impl CameraView {
    /// Camera at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, world_up: Vec3) -> Self {
        let forward = (target - eye).normalized();
        let right = forward.cross(world_up).normalized();
        let up = right.cross(forward);
        Self {
            eye,
            right,
            up,
            forward,
        }
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        mat4::view_from_basis(self.eye, self.right, self.up, self.forward)
    }
}

/// Orbit / free-flight parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRigConfig {
    /// Multiplier on all camera motion
    pub speed: f32,
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Radians per second around the orbit at speed 1
    pub orbit_rate: f32,
    /// Units per second in kaleidoscope flight at speed 1
    pub flight_speed: f32,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            orbit_radius: 3.0,
            orbit_height: 0.8,
            orbit_rate: 0.25,
            flight_speed: 0.6,
        }
    }
}

/// Animated camera driven by elapsed time
pub struct CameraRig {
    config: CameraRigConfig,
    time: f32,
    orbit_angle: f32,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    view: CameraView,
}

impl CameraRig {
    pub fn new(config: CameraRigConfig) -> Self {
        let mut rig = Self {
            config,
            time: 0.0,
            orbit_angle: 0.0,
            // Start in a cell interior, clear of the mirror planes
            position: Vec3::new(0.5, 0.5, 0.5),
            yaw: 0.0,
            pitch: 0.0,
            view: CameraView::default(),
        };
        rig.view = rig.orbit_view();
        rig
    }

    #[inline]
    pub fn view(&self) -> &CameraView {
        &self.view
    }

    #[inline]
    pub fn config(&self) -> &CameraRigConfig {
        &self.config
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.config.speed = speed;
    }

    /// Advance the camera and return the new view
    pub fn update(&mut self, dt: f32, mode: SceneMode) -> CameraView {
        let dt = dt * self.config.speed;
        self.time += dt;

        self.view = match mode {
            SceneMode::Single => {
                self.orbit_angle += dt * self.config.orbit_rate;
                self.orbit_view()
            }
            SceneMode::Kaleidoscope => {
                self.yaw += dt * 0.15 * (self.time * 0.23).sin();
                self.pitch = 0.35 * (self.time * 0.11).sin();
                let view = self.flight_view();
                self.position += view.forward * (dt * self.config.flight_speed);
                CameraView {
                    eye: self.position,
                    ..view
                }
            }
        };
        self.view
    }

    fn orbit_view(&self) -> CameraView {
        let (s, c) = self.orbit_angle.sin_cos();
        let eye = Vec3::new(
            self.config.orbit_radius * s,
            self.config.orbit_height,
            self.config.orbit_radius * c,
        );
        CameraView::look_at(eye, Vec3::ZERO, Vec3::Y)
    }

    fn flight_view(&self) -> CameraView {
        let rotation = mat3::from_euler(self.pitch, self.yaw, 0.0);
        CameraView {
            eye: self.position,
            right: mat3::transform(&rotation, Vec3::X),
            up: mat3::transform(&rotation, Vec3::Y),
            forward: mat3::transform(&rotation, -Vec3::Z),
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraRigConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(v: &CameraView) {
        for axis in [v.right, v.up, v.forward] {
            assert!((axis.length() - 1.0).abs() < 1e-4);
        }
        assert!(v.right.dot(v.up).abs() < 1e-4);
        assert!(v.right.dot(v.forward).abs() < 1e-4);
        assert!(v.up.dot(v.forward).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_basis() {
        let v = CameraView::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_orthonormal(&v);
        assert!((v.forward - (-Vec3::Z)).length() < 1e-6);
        assert!((v.right - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let v = CameraView::look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        let p = mat4::transform_point(&v.view_matrix(), v.eye);
        assert!(p.length() < 1e-5);
    }

    #[test]
    fn test_orbit_keeps_distance_and_looks_at_origin() {
        let mut rig = CameraRig::default();
        for _ in 0..50 {
            let v = rig.update(0.1, SceneMode::Single);
            let horizontal = Vec3::new(v.eye.x, 0.0, v.eye.z).length();
            assert!((horizontal - 3.0).abs() < 1e-4);
            assert!(v.forward.dot(-v.eye.normalized()) > 0.999);
        }
    }

    #[test]
    fn test_flight_moves_forward() {
        let mut rig = CameraRig::default();
        let start = rig.update(0.0, SceneMode::Kaleidoscope).eye;
        let mut last = start;
        for _ in 0..20 {
            let v = rig.update(0.1, SceneMode::Kaleidoscope);
            assert_orthonormal(&v);
            last = v.eye;
        }
        assert!((last - start).length() > 0.5);
    }

    #[test]
    fn test_zero_dt_is_stationary() {
        let mut rig = CameraRig::default();
        let a = rig.update(0.0, SceneMode::Kaleidoscope);
        let b = rig.update(0.0, SceneMode::Kaleidoscope);
        assert_eq!(a, b);
        let c = rig.update(0.0, SceneMode::Single);
        let d = rig.update(0.0, SceneMode::Single);
        assert_eq!(c, d);
    }

    #[test]
    fn test_speed_zero_freezes() {
        let mut rig = CameraRig::new(CameraRigConfig {
            speed: 0.0,
            ..CameraRigConfig::default()
        });
        let a = rig.update(1.0, SceneMode::Single);
        let b = rig.update(1.0, SceneMode::Single);
        assert_eq!(a, b);
    }
}
