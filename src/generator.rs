//! The per-frame host entry point
//!
//! [`Generator::tick`] runs one frame: advance the mode controller and the
//! camera, freeze the field, start the next extraction, draw the previous
//! frame's meshes, then wait for the workers.

use std::sync::Arc;

use prism_field::{GizmoLibrary, SceneMode};
use prism_math::mat4;
use prism_render::{
    CameraRig, FrustumCuller, KaleidoscopeTiler, OctantDraw, Renderer, TileStats, Winding,
};
use prism_surface::{Lod, PipelineError, SurfaceComputePipeline};

use crate::config::{AppConfig, ConfigError};
use crate::mode_controller::ModeController;

/// Errors from building or running the generator
#[derive(Debug)]
pub enum GeneratorError {
    Config(ConfigError),
    Pipeline(PipelineError),
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorError::Config(e) => write!(f, "{}", e),
            GeneratorError::Pipeline(e) => write!(f, "Surface pipeline: {}", e),
        }
    }
}

impl std::error::Error for GeneratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeneratorError::Config(e) => Some(e),
            GeneratorError::Pipeline(e) => Some(e),
        }
    }
}

impl From<ConfigError> for GeneratorError {
    fn from(e: ConfigError) -> Self {
        GeneratorError::Config(e)
    }
}

impl From<PipelineError> for GeneratorError {
    fn from(e: PipelineError) -> Self {
        GeneratorError::Pipeline(e)
    }
}

/// What one tick did
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub mode: SceneMode,
    pub gizmo: &'static str,
    pub transition: f32,
    /// Extraction ran inline this frame
    pub primed: bool,
    /// Tiling statistics (kaleidoscope mode only)
    pub tiles: Option<TileStats>,
}

/// Mode controller, camera, surface pipeline and tiler wired together
pub struct Generator {
    controller: ModeController,
    pipeline: SurfaceComputePipeline,
    camera: CameraRig,
    culler: FrustumCuller,
    tiler: KaleidoscopeTiler,
    scratch: Vec<OctantDraw>,
    frame: u64,
}

impl Generator {
    /// Build a generator with the built-in gizmo catalog
    pub fn new(config: &AppConfig) -> Result<Self, GeneratorError> {
        Self::with_library(config, GizmoLibrary::standard())
    }

    /// Build a generator around a specific gizmo library
    pub fn with_library(config: &AppConfig, library: GizmoLibrary) -> Result<Self, GeneratorError> {
        config.validate()?;

        let pipeline = SurfaceComputePipeline::new(config.pipeline_config())?;
        let controller = ModeController::new(library, &config.modes);
        let [full, medium] = config.kaleidoscope.lod_distances;
        let tiler = KaleidoscopeTiler::new(config.kaleidoscope.draw_depth)
            .with_lod_thresholds(full, medium);

        Ok(Self {
            controller,
            pipeline,
            camera: CameraRig::new(config.camera_rig_config()),
            culler: FrustumCuller::new(config.frustum_params(16.0 / 9.0)),
            tiler,
            scratch: Vec::new(),
            frame: 0,
        })
    }

    #[inline]
    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    #[inline]
    pub fn controller_mut(&mut self) -> &mut ModeController {
        &mut self.controller
    }

    #[inline]
    pub fn pipeline(&self) -> &SurfaceComputePipeline {
        &self.pipeline
    }

    #[inline]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    #[inline]
    pub fn tiler(&self) -> &KaleidoscopeTiler {
        &self.tiler
    }

    /// Advance by `dt` seconds and issue this frame's draws
    pub fn tick(&mut self, dt: f32, renderer: &mut dyn Renderer) -> Result<FrameStats, GeneratorError> {
        // The pipeline re-primes by itself when the mode changes
        self.controller.update(dt);
        let mode = self.controller.mode();

        let view = self.camera.update(dt, mode);
        self.culler.set_params(renderer.frustum_params());
        self.culler.set_camera(view);
        renderer.set_camera(&view);

        let field = Arc::new(self.controller.field(view.eye));
        let primed = self.pipeline.begin_frame(field)?;

        // Read buffers are stable until end_frame
        let tiles = match mode {
            SceneMode::Single => {
                let mesh = self.pipeline.read_mesh(Lod::Full);
                if !mesh.is_empty() {
                    renderer.draw(mesh, &mat4::IDENTITY, Winding::Ccw);
                }
                None
            }
            SceneMode::Kaleidoscope => Some(self.tiler.draw(
                &self.culler,
                self.pipeline.read_meshes(),
                renderer,
                &mut self.scratch,
            )),
        };

        self.pipeline.end_frame()?;

        let stats = FrameStats {
            frame: self.frame,
            mode,
            gizmo: self.controller.active_name(),
            transition: self.controller.transition(),
            primed,
            tiles,
        };
        if let Some(t) = &stats.tiles {
            log::trace!(
                "frame {}: {} cells ({} culled), {} octants drawn ({} culled), lod {:?}",
                stats.frame,
                t.cells_visited,
                t.cells_culled,
                t.octants_drawn,
                t.octants_culled,
                t.per_lod
            );
        } else {
            log::trace!("frame {}: single '{}' t={:.2}", stats.frame, stats.gizmo, stats.transition);
        }
        self.frame += 1;
        Ok(stats)
    }

    /// Stop the surface workers
    pub fn shutdown(&mut self) {
        self.pipeline.shutdown();
    }
}
