//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`PRISM_SECTION__KEY`)
//!
//! Configuration is read at startup only. Runtime systems receive the
//! sections they need by value.

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use prism_field::{GizmoConfig, ISO_LEVEL};
use prism_render::{CameraRigConfig, FrustumParams};
use prism_surface::PipelineConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Surface extraction configuration
    #[serde(default)]
    pub surface: SurfaceConfig,
    /// Kaleidoscope tiling configuration
    #[serde(default)]
    pub kaleidoscope: KaleidoscopeConfig,
    /// Mode and gizmo rotation configuration
    #[serde(default)]
    pub modes: ModesConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`PRISM_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // PRISM_KALEIDOSCOPE__DRAW_DEPTH=3 -> kaleidoscope.draw_depth = 3
        figment = figment.merge(Env::prefixed("PRISM_").split("__"));

        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the generator unusable
    ///
    /// Volumes are sized once, so bad values are rejected at startup
    /// rather than discovered mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(lod) = self.surface.resolutions.iter().position(|&r| r == 0) {
            return Err(ConfigError::invalid(format!(
                "surface.resolutions[{}] must be at least 1",
                lod
            )));
        }
        if !self.modes.single && !self.modes.kaleidoscope {
            return Err(ConfigError::invalid("at least one of modes.single and modes.kaleidoscope must be enabled"));
        }
        for (name, value) in [
            ("modes.single_duration", self.modes.single_duration),
            ("modes.kaleidoscope_duration", self.modes.kaleidoscope_duration),
            ("modes.transition_time", self.modes.transition_time),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        let [full, medium] = self.kaleidoscope.lod_distances;
        if !(full > 0.0 && medium >= full) {
            return Err(ConfigError::invalid(format!(
                "kaleidoscope.lod_distances must be increasing, got [{}, {}]",
                full, medium
            )));
        }
        Ok(())
    }

    /// Surface pipeline parameters
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            resolutions: self.surface.resolutions,
            threaded: self.surface.threaded,
            kaleidoscope: self.modes.kaleidoscope,
            iso_level: self.surface.iso_level,
        }
    }

    /// Camera rig parameters
    pub fn camera_rig_config(&self) -> CameraRigConfig {
        CameraRigConfig {
            speed: self.camera.speed,
            orbit_radius: self.camera.orbit_radius,
            orbit_height: self.camera.orbit_height,
            orbit_rate: self.camera.orbit_rate,
            flight_speed: self.camera.flight_speed,
        }
    }

    /// Perspective parameters for a surface aspect ratio
    pub fn frustum_params(&self, aspect: f32) -> FrustumParams {
        FrustumParams {
            fov_y: self.camera.fov.to_radians(),
            aspect,
            near: self.camera.near,
            far: self.camera.far,
        }
    }

    /// Animation settings handed to every gizmo
    pub fn gizmo_config(&self) -> GizmoConfig {
        GizmoConfig {
            speed: self.modes.gizmo_speed,
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Prism".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Multiplier on all camera motion
    pub speed: f32,
    /// Orbit radius in single mode
    pub orbit_radius: f32,
    /// Orbit height in single mode
    pub orbit_height: f32,
    /// Orbit rate in radians per second
    pub orbit_rate: f32,
    /// Flight speed through the lattice (units per second)
    pub flight_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.01,
            far: 40.0,
            speed: 1.0,
            orbit_radius: 3.0,
            orbit_height: 0.8,
            orbit_rate: 0.25,
            flight_speed: 0.6,
        }
    }
}

/// Surface extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Cells per axis for [full, medium, low] detail
    pub resolutions: [usize; 3],
    /// Extract on background workers
    pub threaded: bool,
    /// Field value at which the surface is extracted
    pub iso_level: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            resolutions: [40, 24, 12],
            threaded: true,
            iso_level: ISO_LEVEL,
        }
    }
}

/// Kaleidoscope tiling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KaleidoscopeConfig {
    /// Lattice cells drawn in each direction around the camera cell
    pub draw_depth: u32,
    /// Squared distances below which [full, medium] detail is used
    pub lod_distances: [f32; 2],
}

impl Default for KaleidoscopeConfig {
    fn default() -> Self {
        Self {
            draw_depth: 4,
            lod_distances: [16.0, 36.0],
        }
    }
}

/// Mode and gizmo rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModesConfig {
    /// Enable single-gizmo mode
    pub single: bool,
    /// Enable kaleidoscope mode
    pub kaleidoscope: bool,
    /// Seconds a gizmo is shown in single mode
    pub single_duration: f32,
    /// Seconds a gizmo is shown in kaleidoscope mode
    pub kaleidoscope_duration: f32,
    /// Seconds to grow in or shrink out
    pub transition_time: f32,
    /// Seconds before the easter-egg gizmo may be picked
    pub easter_egg_warmup: f32,
    /// Multiplier on gizmo animation
    pub gizmo_speed: f32,
    /// Fixed seed for gizmo selection (random when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            single: true,
            kaleidoscope: true,
            single_duration: 20.0,
            kaleidoscope_duration: 40.0,
            transition_time: 2.0,
            easter_egg_warmup: 600.0,
            gizmo_speed: 1.0,
            seed: None,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
    /// Surface base color [r, g, b]
    pub base_color: [f32; 3],
    /// Light direction [x, y, z]
    pub light_dir: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
    /// Diffuse light strength
    pub diffuse_strength: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: [0.02, 0.02, 0.05, 1.0],
            base_color: [0.9, 0.85, 0.8],
            light_dir: [0.5, 1.0, 0.3],
            ambient_strength: 0.3,
            diffuse_strength: 0.7,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or parsed
    Load(String),
    /// Values were read but are unusable
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(e.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Configuration error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
