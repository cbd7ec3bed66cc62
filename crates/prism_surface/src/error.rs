//! Error types for surface extraction and the compute pipeline

use std::fmt;
use std::io;

/// Error configuring a surface extractor
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// Grid resolution must be at least one cell
    InvalidResolution(usize),
    /// Cell size must be finite and positive
    InvalidCellSize(f32),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::InvalidResolution(n) => write!(f, "Invalid grid resolution: {}", n),
            SurfaceError::InvalidCellSize(s) => write!(f, "Invalid cell size: {}", s),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Error driving the compute pipeline
#[derive(Debug)]
pub enum PipelineError {
    /// A volume slot was configured with a zero resolution
    InvalidResolution { slot: usize },
    /// An extractor rejected its configuration
    Surface(SurfaceError),
    /// A background worker thread could not be started
    WorkerSpawn(io::Error),
    /// `begin_frame` called while the previous frame is still open
    FrameInProgress,
    /// `end_frame` called without a matching `begin_frame`
    NoFrameInProgress,
    /// Kaleidoscope frame requested from a single-mode-only pipeline
    KaleidoscopeUnavailable,
    /// A worker hung up (its thread panicked or exited)
    WorkerLost(String),
    /// The pipeline was already shut down
    ShutDown,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidResolution { slot } => {
                write!(f, "Volume slot {} has zero resolution", slot)
            }
            PipelineError::Surface(err) => write!(f, "Surface error: {}", err),
            PipelineError::WorkerSpawn(err) => write!(f, "Failed to spawn worker: {}", err),
            PipelineError::FrameInProgress => write!(f, "Frame already in progress"),
            PipelineError::NoFrameInProgress => write!(f, "No frame in progress"),
            PipelineError::KaleidoscopeUnavailable => {
                write!(f, "Pipeline was built without kaleidoscope support")
            }
            PipelineError::WorkerLost(name) => write!(f, "Worker '{}' was lost", name),
            PipelineError::ShutDown => write!(f, "Pipeline is shut down"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Surface(err) => Some(err),
            PipelineError::WorkerSpawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SurfaceError> for PipelineError {
    fn from(err: SurfaceError) -> Self {
        PipelineError::Surface(err)
    }
}

impl From<io::Error> for PipelineError {
    fn from(err: io::Error) -> Self {
        PipelineError::WorkerSpawn(err)
    }
}
