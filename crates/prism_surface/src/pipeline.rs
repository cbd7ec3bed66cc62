//! The surface compute pipeline
//!
//! Per frame the main thread calls [`SurfaceComputePipeline::begin_frame`],
//! draws from the read meshes, then calls
//! [`SurfaceComputePipeline::end_frame`]. Between the two calls the workers
//! extract the *next* frame's meshes into the write buffers, so frame N
//! draws what was computed during frame N-1.
//!
//! The first frames after startup (and after a mode change) are primed:
//! extraction runs inline and the fresh result is drawn the same frame, so
//! nothing stale or empty is ever shown.

use std::sync::Arc;

use prism_field::{ImplicitField, SceneMode, ISO_LEVEL};

use crate::{
    CrawlingExtractor, Lod, Mesh, PipelineError, Rejected, SlotJob, SurfaceExtractor, VolumeSlot,
    Worker,
};

/// Frames computed synchronously after startup or a mode change
pub const PRIMING_FRAMES: u32 = 2;

/// Pipeline construction parameters
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Cells per axis for the full, medium and low detail slots
    pub resolutions: [usize; 3],
    /// Run extraction on background workers (kaleidoscope pipelines only)
    pub threaded: bool,
    /// Allocate the medium/low slots and the second worker
    pub kaleidoscope: bool,
    pub iso_level: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolutions: [40, 24, 12],
            threaded: true,
            kaleidoscope: true,
            iso_level: ISO_LEVEL,
        }
    }
}

/// Owns the volume slots and the two surface workers
///
/// Worker 0 always serves the full-detail slot. Worker 1 serves the
/// medium and low slots in that order. Workers only exist for kaleidoscope
/// capable pipelines; a single-mode pipeline always extracts inline.
pub struct SurfaceComputePipeline {
    slots: Vec<VolumeSlot>,
    workers: [Option<Worker>; 2],
    threaded: bool,
    priming_frames: u32,
    mode: Option<SceneMode>,
    frame_open: bool,
    frame_count: u64,
    shut_down: bool,
    lost_worker: Option<String>,
}

impl SurfaceComputePipeline {
    /// Build a pipeline with crawling extractors
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let iso_level = config.iso_level;
        Self::with_extractors(config, |_| Box::new(CrawlingExtractor::new(iso_level)))
    }

    /// Build a pipeline with a custom extractor per slot
    pub fn with_extractors<F>(config: PipelineConfig, mut make_extractor: F) -> Result<Self, PipelineError>
    where
        F: FnMut(usize) -> Box<dyn SurfaceExtractor>,
    {
        let slot_count = if config.kaleidoscope { 3 } else { 1 };
        let mut slots = Vec::with_capacity(slot_count);
        for (index, &resolution) in config.resolutions.iter().enumerate().take(slot_count) {
            slots.push(VolumeSlot::new(index, resolution, make_extractor(index))?);
        }

        let threaded = config.threaded && config.kaleidoscope;
        let workers = if threaded {
            [Some(Worker::spawn("surface-0")?), Some(Worker::spawn("surface-1")?)]
        } else {
            [None, None]
        };

        log::info!(
            "Surface pipeline: {} slot(s) at {:?}, {}",
            slot_count,
            &config.resolutions[..slot_count],
            if threaded { "threaded" } else { "synchronous" }
        );

        Ok(Self {
            slots,
            workers,
            threaded,
            priming_frames: PRIMING_FRAMES,
            mode: None,
            frame_open: false,
            frame_count: 0,
            shut_down: false,
            lost_worker: None,
        })
    }

    /// Compute the next frames inline again
    pub fn request_priming(&mut self) {
        self.priming_frames = PRIMING_FRAMES;
    }

    #[inline]
    pub fn is_priming(&self) -> bool {
        self.priming_frames > 0
    }

    #[inline]
    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    #[inline]
    pub fn supports_kaleidoscope(&self) -> bool {
        self.slots.len() == 3
    }

    /// Frames completed with `end_frame`
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn slot(&self, lod: Lod) -> Option<&VolumeSlot> {
        self.slots.get(lod.index())
    }

    pub fn worker(&self, index: usize) -> Option<&Worker> {
        self.workers.get(index).and_then(|w| w.as_ref())
    }

    /// Start frame N: publish frame N-1's meshes and launch the next extraction
    ///
    /// The field is frozen for the whole compute phase; workers only ever
    /// see it through the shared `Arc`. Returns true when the meshes were
    /// extracted inline, so this frame draws its own field.
    pub fn begin_frame(&mut self, field: Arc<ImplicitField>) -> Result<bool, PipelineError> {
        if self.shut_down {
            return Err(PipelineError::ShutDown);
        }
        if let Some(name) = &self.lost_worker {
            return Err(PipelineError::WorkerLost(name.clone()));
        }
        if self.frame_open {
            return Err(PipelineError::FrameInProgress);
        }

        let mode = field.params().mode;
        let active = match mode {
            SceneMode::Single => 1,
            SceneMode::Kaleidoscope if self.supports_kaleidoscope() => 3,
            SceneMode::Kaleidoscope => return Err(PipelineError::KaleidoscopeUnavailable),
        };

        if self.mode != Some(mode) {
            for slot in &mut self.slots[..active] {
                slot.configure_region(mode)?;
            }
            if self.mode.is_some() {
                log::debug!("Surface pipeline re-priming for {:?}", mode);
                self.request_priming();
            }
            self.mode = Some(mode);
        }

        self.frame_open = true;

        if !self.threaded || self.priming_frames > 0 {
            for slot in &mut self.slots[..active] {
                let mut job = slot.take_job().ok_or(PipelineError::FrameInProgress)?;
                job.run(&field);
                slot.restore(job);
                slot.publish();
            }
            self.priming_frames = self.priming_frames.saturating_sub(1);
            return Ok(true);
        }

        for slot in &mut self.slots[..active] {
            slot.publish();
        }

        let primary = self.slots[0].take_job().ok_or(PipelineError::FrameInProgress)?;
        self.dispatch(0, Arc::clone(&field), vec![primary])?;

        if active == 3 {
            let mut jobs = Vec::with_capacity(2);
            for slot in &mut self.slots[1..3] {
                jobs.push(slot.take_job().ok_or(PipelineError::FrameInProgress)?);
            }
            self.dispatch(1, field, jobs)?;
        }

        Ok(false)
    }

    /// Hand jobs to a worker, unwinding the frame if it refuses them
    fn dispatch(
        &mut self,
        index: usize,
        field: Arc<ImplicitField>,
        jobs: Vec<SlotJob>,
    ) -> Result<(), PipelineError> {
        let result = match self.workers[index].as_mut() {
            Some(worker) => worker.dispatch(field, jobs),
            None => Err(Rejected {
                error: PipelineError::ShutDown,
                jobs,
            }),
        };
        let Err(rejected) = result else {
            return Ok(());
        };

        for job in rejected.jobs {
            let slot = job.slot();
            self.slots[slot].cancel(job);
        }
        if let PipelineError::WorkerLost(name) = &rejected.error {
            self.lost_worker = Some(name.clone());
        }
        // The other worker may already hold this frame's jobs
        let collected = self.collect();
        self.frame_open = false;
        collected?;
        Err(rejected.error)
    }

    /// Wait for every dispatched worker and return its jobs to their slots
    fn collect(&mut self) -> Result<(), PipelineError> {
        let mut first_error = None;
        for worker in self.workers.iter_mut().flatten() {
            match worker.wait() {
                Ok(jobs) => {
                    for job in jobs {
                        let slot = job.slot();
                        self.slots[slot].restore(job);
                    }
                }
                Err(err) => {
                    if let PipelineError::WorkerLost(name) = &err {
                        log::error!("Surface worker '{}' hung up", name);
                        self.lost_worker.get_or_insert_with(|| name.clone());
                    }
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Mesh to draw for a level of detail
    ///
    /// Falls back to the full-detail mesh if the pipeline has no such slot.
    pub fn read_mesh(&self, lod: Lod) -> &Mesh {
        self.slots
            .get(lod.index())
            .unwrap_or(&self.slots[0])
            .read_mesh()
    }

    /// Meshes for all three levels of detail
    pub fn read_meshes(&self) -> [&Mesh; 3] {
        Lod::ALL.map(|lod| self.read_mesh(lod))
    }

    /// Finish frame N: wait for the workers and take back the slot jobs
    pub fn end_frame(&mut self) -> Result<(), PipelineError> {
        if !self.frame_open {
            return Err(PipelineError::NoFrameInProgress);
        }

        let collected = self.collect();
        self.frame_open = false;
        collected?;
        self.frame_count += 1;
        Ok(())
    }

    /// Stop both workers and join their threads
    ///
    /// After this the pipeline refuses new frames. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        for worker in self.workers.iter_mut().flatten() {
            worker.shutdown();
        }
        self.shut_down = true;
        self.frame_open = false;
        log::info!("Surface pipeline shut down after {} frames", self.frame_count);
    }
}

impl Drop for SurfaceComputePipeline {
    fn drop(&mut self) {
        // Join workers before the slots they were writing into go away
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_field::{FieldParameters, GizmoSnapshot, Primitive, Vec3};

    fn field(mode: SceneMode) -> Arc<ImplicitField> {
        let gizmo = GizmoSnapshot {
            name: "ball",
            primitives: vec![Primitive::sphere(Vec3::splat(0.25), 0.3)],
            seeds: vec![Vec3::splat(0.25)],
        };
        let params = FieldParameters {
            mode,
            ..FieldParameters::default()
        };
        Arc::new(ImplicitField::new(gizmo, params))
    }

    fn config(threaded: bool) -> PipelineConfig {
        PipelineConfig {
            resolutions: [12, 8, 4],
            threaded,
            kaleidoscope: true,
            iso_level: ISO_LEVEL,
        }
    }

    #[test]
    fn test_zero_resolution_fails_construction() {
        let mut cfg = config(false);
        cfg.resolutions[1] = 0;
        assert!(matches!(
            SurfaceComputePipeline::new(cfg),
            Err(PipelineError::InvalidResolution { slot: 1 })
        ));
    }

    #[test]
    fn test_single_mode_only_pipeline() {
        let cfg = PipelineConfig {
            kaleidoscope: false,
            ..config(true)
        };
        let mut pipeline = SurfaceComputePipeline::new(cfg).unwrap();
        assert!(!pipeline.is_threaded());
        assert!(pipeline.worker(0).is_none());
        assert!(pipeline.worker(1).is_none());
        assert!(matches!(
            pipeline.begin_frame(field(SceneMode::Kaleidoscope)),
            Err(PipelineError::KaleidoscopeUnavailable)
        ));
        pipeline.begin_frame(field(SceneMode::Single)).unwrap();
        // Missing levels fall back to the full mesh
        assert_eq!(pipeline.read_mesh(Lod::Low).id(), pipeline.read_mesh(Lod::Full).id());
        pipeline.end_frame().unwrap();
    }

    #[test]
    fn test_frame_calls_must_pair() {
        let mut pipeline = SurfaceComputePipeline::new(config(false)).unwrap();
        assert!(matches!(pipeline.end_frame(), Err(PipelineError::NoFrameInProgress)));
        pipeline.begin_frame(field(SceneMode::Single)).unwrap();
        assert!(matches!(
            pipeline.begin_frame(field(SceneMode::Single)),
            Err(PipelineError::FrameInProgress)
        ));
        pipeline.end_frame().unwrap();
        assert_eq!(pipeline.frame_count(), 1);
    }

    #[test]
    fn test_priming_draws_fresh_mesh() {
        let mut pipeline = SurfaceComputePipeline::new(config(true)).unwrap();
        assert!(pipeline.is_priming());
        pipeline.begin_frame(field(SceneMode::Kaleidoscope)).unwrap();
        for mesh in pipeline.read_meshes() {
            assert!(mesh.is_complete());
            assert_eq!(mesh.revision(), 1);
        }
        assert!(!pipeline.read_mesh(Lod::Full).is_empty());
        pipeline.end_frame().unwrap();
    }

    #[test]
    fn test_single_mode_only_pipeline_stays_inline_after_priming() {
        let cfg = PipelineConfig {
            kaleidoscope: false,
            ..config(true)
        };
        let mut pipeline = SurfaceComputePipeline::new(cfg).unwrap();
        for _ in 0..PRIMING_FRAMES + 2 {
            assert!(pipeline.begin_frame(field(SceneMode::Single)).unwrap());
            assert!(pipeline.read_mesh(Lod::Full).is_complete());
            pipeline.end_frame().unwrap();
        }
    }

    #[test]
    fn test_priming_ends_after_two_frames() {
        let mut pipeline = SurfaceComputePipeline::new(config(true)).unwrap();
        assert!(pipeline.is_threaded());
        for _ in 0..PRIMING_FRAMES {
            pipeline.begin_frame(field(SceneMode::Single)).unwrap();
            pipeline.end_frame().unwrap();
        }
        assert!(!pipeline.is_priming());

        pipeline.begin_frame(field(SceneMode::Single)).unwrap();
        assert_eq!(pipeline.worker(0).map(|w| w.is_busy()), Some(true));
        pipeline.end_frame().unwrap();
    }

    #[test]
    fn test_mode_change_reprimes() {
        let mut pipeline = SurfaceComputePipeline::new(config(true)).unwrap();
        for _ in 0..3 {
            pipeline.begin_frame(field(SceneMode::Single)).unwrap();
            pipeline.end_frame().unwrap();
        }
        assert!(!pipeline.is_priming());

        pipeline.begin_frame(field(SceneMode::Kaleidoscope)).unwrap();
        assert!(pipeline.is_priming());
        for mesh in pipeline.read_meshes() {
            assert!(mesh.is_complete());
            for v in mesh.vertices() {
                assert!(v.position.iter().all(|&c| (0.0..=1.0).contains(&c)));
            }
        }
        pipeline.end_frame().unwrap();
    }

    #[test]
    fn test_synchronous_pipeline_draws_current_frame() {
        let mut pipeline = SurfaceComputePipeline::new(config(false)).unwrap();
        for n in 1..=5 {
            pipeline.begin_frame(field(SceneMode::Single)).unwrap();
            assert_eq!(pipeline.read_mesh(Lod::Full).revision(), (n + 1) / 2);
            pipeline.end_frame().unwrap();
        }
    }

    #[test]
    fn test_shutdown_refuses_frames() {
        let mut pipeline = SurfaceComputePipeline::new(config(true)).unwrap();
        pipeline.shutdown();
        pipeline.shutdown();
        assert!(matches!(
            pipeline.begin_frame(field(SceneMode::Single)),
            Err(PipelineError::ShutDown)
        ));
    }
}
