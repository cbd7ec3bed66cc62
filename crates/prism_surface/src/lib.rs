//! Surface extraction pipeline
//!
//! This crate turns an [`prism_field::ImplicitField`] into triangle meshes,
//! overlapping next-frame extraction with drawing of the previous frame:
//!
//! - [`Mesh`] - Interleaved position + normal triangle soup
//! - [`SurfaceExtractor`] - Polygonizer contract; [`CrawlingExtractor`] is the default
//! - [`VolumeSlot`] - One resolution level with a write/read mesh pair
//! - [`SurfaceComputePipeline`] - Owns the slots and the two background workers

mod error;
mod mesh;
mod grid;
pub mod lookup_tables;
mod extractor;
mod volume;
mod worker;
mod pipeline;

pub use error::{PipelineError, SurfaceError};
pub use mesh::{Mesh, MeshId, MeshVertex};
pub use grid::ScalarGrid;
pub use extractor::{CrawlingExtractor, SurfaceExtractor};
pub use volume::{Lod, SlotJob, VolumeSlot};
pub use worker::{Rejected, Worker, WorkerState};
pub use pipeline::{PipelineConfig, SurfaceComputePipeline, PRIMING_FRAMES};
