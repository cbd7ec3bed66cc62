//! Volume slots: one resolution level with its two mesh buffers
//!
//! A slot owns a read mesh (what the renderer draws) and a write mesh
//! (what the next extraction fills). While a worker is computing, the
//! write mesh and the extractor are moved out of the slot inside a
//! [`SlotJob`], so the main thread cannot touch them until the job is
//! handed back.

use prism_field::{ImplicitField, SceneMode, Vec3};

use crate::{Mesh, MeshId, PipelineError, SurfaceExtractor};

/// Level of detail, one per volume slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lod {
    /// Highest resolution, also the single-mode mesh
    Full,
    Medium,
    Low,
}

impl Lod {
    pub const ALL: [Lod; 3] = [Lod::Full, Lod::Medium, Lod::Low];

    /// Slot index backing this level
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Lod::Full => 0,
            Lod::Medium => 1,
            Lod::Low => 2,
        }
    }
}

/// The extractor and write mesh of one slot, in flight
pub struct SlotJob {
    slot: usize,
    extractor: Box<dyn SurfaceExtractor>,
    mesh: Mesh,
}

impl SlotJob {
    /// Index of the slot this job belongs to
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Run the extraction for one frame's field
    pub fn run(&mut self, field: &ImplicitField) {
        self.extractor.extract(field, field.seeds(), &mut self.mesh);
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// One resolution level of the compute pipeline
pub struct VolumeSlot {
    index: usize,
    resolution: usize,
    region: Option<SceneMode>,
    read: Mesh,
    write: Option<Mesh>,
    extractor: Option<Box<dyn SurfaceExtractor>>,
    /// The write mesh holds a finished extraction not yet published
    pending: bool,
    last_written: Option<MeshId>,
}

impl VolumeSlot {
    /// Create a slot with `resolution` cells per axis
    pub fn new(
        index: usize,
        resolution: usize,
        extractor: Box<dyn SurfaceExtractor>,
    ) -> Result<Self, PipelineError> {
        if resolution == 0 {
            return Err(PipelineError::InvalidResolution { slot: index });
        }
        let id = |buffer| MeshId {
            slot: index as u8,
            buffer,
        };
        Ok(Self {
            index,
            resolution,
            region: None,
            read: Mesh::new(id(0)),
            write: Some(Mesh::new(id(1))),
            extractor: Some(extractor),
            pending: false,
            last_written: None,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Region currently configured on the extractor
    #[inline]
    pub fn region(&self) -> Option<SceneMode> {
        self.region
    }

    /// True while the write side is out with a worker
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.write.is_none() || self.extractor.is_none()
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Point the extractor at the volume polygonised in `mode`
    ///
    /// No-op if the region is unchanged. Must not be called while busy.
    pub fn configure_region(&mut self, mode: SceneMode) -> Result<(), PipelineError> {
        if self.region == Some(mode) {
            return Ok(());
        }
        let extractor = self
            .extractor
            .as_mut()
            .ok_or(PipelineError::FrameInProgress)?;

        let extent = mode.volume_extent();
        let origin: Vec3 = mode.volume_origin();
        extractor.configure(self.resolution, extent / self.resolution as f32, origin)?;
        self.region = Some(mode);
        // Whatever was pending belongs to the old region
        self.pending = false;
        Ok(())
    }

    /// Move the extractor and write mesh out for computation
    pub fn take_job(&mut self) -> Option<SlotJob> {
        if self.is_busy() {
            return None;
        }
        let extractor = self.extractor.take()?;
        let mesh = self.write.take()?;
        Some(SlotJob {
            slot: self.index,
            extractor,
            mesh,
        })
    }

    /// Accept a job back from computation
    pub fn restore(&mut self, job: SlotJob) {
        debug_assert_eq!(job.slot, self.index);
        self.pending = job.mesh.is_complete();
        if self.pending {
            self.last_written = Some(job.mesh.id());
        }
        self.extractor = Some(job.extractor);
        self.write = Some(job.mesh);
    }

    /// Take back a job that never ran, leaving nothing to publish
    pub fn cancel(&mut self, job: SlotJob) {
        debug_assert_eq!(job.slot, self.index);
        self.pending = false;
        self.extractor = Some(job.extractor);
        self.write = Some(job.mesh);
    }

    /// Swap a completed write mesh into the read position
    ///
    /// Returns false (and leaves the read mesh alone) if nothing is pending.
    pub fn publish(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        match self.write.as_mut() {
            Some(write) => {
                std::mem::swap(&mut self.read, write);
                self.pending = false;
                true
            }
            None => false,
        }
    }

    /// The mesh the renderer may draw
    #[inline]
    pub fn read_mesh(&self) -> &Mesh {
        &self.read
    }

    #[inline]
    pub fn read_id(&self) -> MeshId {
        self.read.id()
    }

    /// Buffer most recently filled by a completed extraction
    #[inline]
    pub fn last_written_id(&self) -> Option<MeshId> {
        self.last_written
    }
}
