//! Frame simulation system
//!
//! Turns wall-clock time into capped frame steps for the generator and
//! keeps a smoothed frame rate for the window title.

use std::time::Instant;
use prism::{FrameStats, Generator, GeneratorError};
use prism_render::Renderer;

/// Longest step handed to the generator (after a stall or focus change)
const MAX_FRAME_TIME: f32 = 0.25;

/// Drives the generator from the frame clock
pub struct SimulationSystem {
    last_frame: Instant,
    fps: f32,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fps: 0.0,
        }
    }

    /// Run one frame of the generator
    pub fn update(
        &mut self,
        generator: &mut Generator,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameStats, GeneratorError> {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.track_fps(raw_dt);

        generator.tick(raw_dt.min(MAX_FRAME_TIME), renderer)
    }

    /// Smoothed frames per second
    pub fn fps(&self) -> f32 {
        self.fps
    }

    fn track_fps(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let instant = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            instant
        } else {
            self.fps * 0.9 + instant * 0.1
        };
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}
