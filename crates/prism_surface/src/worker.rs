//! Background surface workers
//!
//! Each worker is a named thread that sleeps on a one-slot request
//! channel. A request carries the frame's field behind an `Arc` plus the
//! slot jobs to run; the reply hands the jobs back. Everything the worker
//! touches is owned by the message, so the channel send/receive is the only
//! synchronisation between the main thread and the worker.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use prism_field::ImplicitField;

use crate::{PipelineError, SlotJob};

/// Observable worker state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Blocked waiting for a request
    Idle,
    /// Request sent, not yet picked up
    Signaled,
    /// Running extraction jobs
    Computing,
    /// Thread has exited
    Stopped,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WorkerState::Idle,
            1 => WorkerState::Signaled,
            2 => WorkerState::Computing,
            _ => WorkerState::Stopped,
        }
    }
}

enum WorkerRequest {
    Compute {
        field: Arc<ImplicitField>,
        jobs: Vec<SlotJob>,
    },
    Stop,
}

struct WorkerReply {
    jobs: Vec<SlotJob>,
}

/// A dispatch the worker did not accept; the jobs come back untouched
pub struct Rejected {
    pub error: PipelineError,
    pub jobs: Vec<SlotJob>,
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("jobs", &self.jobs.len())
            .finish()
    }
}

impl From<Rejected> for PipelineError {
    fn from(rejected: Rejected) -> Self {
        rejected.error
    }
}

/// Handle to one background worker thread
pub struct Worker {
    name: String,
    request_tx: SyncSender<WorkerRequest>,
    reply_rx: Receiver<WorkerReply>,
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    handle: Option<JoinHandle<()>>,
    in_flight: bool,
}

impl Worker {
    /// Spawn a worker thread
    pub fn spawn(name: &str) -> Result<Self, PipelineError> {
        let (request_tx, request_rx) = mpsc::sync_channel::<WorkerRequest>(1);
        let (reply_tx, reply_rx) = mpsc::sync_channel::<WorkerReply>(1);
        let stop = Arc::new(AtomicBool::new(false));
        let state = Arc::new(AtomicU8::new(WorkerState::Idle as u8));

        let thread_stop = Arc::clone(&stop);
        let thread_state = Arc::clone(&state);
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                run_worker(&thread_name, request_rx, reply_tx, thread_stop, thread_state)
            })?;

        log::debug!("Spawned surface worker '{}'", name);

        Ok(Self {
            name: name.to_string(),
            request_tx,
            reply_rx,
            stop,
            state,
            handle: Some(handle),
            in_flight: false,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True between `dispatch` and the matching `wait`
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Hand jobs to the worker; returns immediately
    pub fn dispatch(
        &mut self,
        field: Arc<ImplicitField>,
        jobs: Vec<SlotJob>,
    ) -> Result<(), Rejected> {
        if self.in_flight {
            return Err(Rejected { error: PipelineError::FrameInProgress, jobs });
        }
        if self.handle.is_none() {
            return Err(Rejected { error: PipelineError::ShutDown, jobs });
        }

        self.state
            .store(WorkerState::Signaled as u8, Ordering::Release);
        let (error, request) = match self.request_tx.try_send(WorkerRequest::Compute { field, jobs }) {
            Ok(()) => {
                self.in_flight = true;
                return Ok(());
            }
            Err(TrySendError::Full(request)) => (PipelineError::FrameInProgress, request),
            Err(TrySendError::Disconnected(request)) => {
                self.state.store(WorkerState::Stopped as u8, Ordering::Release);
                (PipelineError::WorkerLost(self.name.clone()), request)
            }
        };
        let jobs = match request {
            WorkerRequest::Compute { jobs, .. } => jobs,
            WorkerRequest::Stop => Vec::new(),
        };
        Err(Rejected { error, jobs })
    }

    /// Block until the dispatched jobs come back
    ///
    /// Returns an empty list if nothing was dispatched.
    pub fn wait(&mut self) -> Result<Vec<SlotJob>, PipelineError> {
        if !self.in_flight {
            return Ok(Vec::new());
        }
        let reply = self.reply_rx.recv();
        self.in_flight = false;
        reply
            .map(|reply| reply.jobs)
            .map_err(|_| PipelineError::WorkerLost(self.name.clone()))
    }

    /// Stop and join the thread
    ///
    /// Never blocks on the request channel; a worker mid-computation
    /// finishes its current job, sees the stop flag and exits.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.stop.store(true, Ordering::Release);
        // A full channel means a request is already queued; the flag covers it
        let _ = self.request_tx.try_send(WorkerRequest::Stop);

        if handle.join().is_err() {
            log::error!("Surface worker '{}' panicked", self.name);
        } else {
            log::debug!("Surface worker '{}' joined", self.name);
        }
        self.in_flight = false;
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    name: &str,
    requests: Receiver<WorkerRequest>,
    replies: SyncSender<WorkerReply>,
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
) {
    while let Ok(request) = requests.recv() {
        if stop.load(Ordering::Acquire) {
            break;
        }

        let (field, mut jobs) = match request {
            WorkerRequest::Stop => break,
            WorkerRequest::Compute { field, jobs } => (field, jobs),
        };

        state.store(WorkerState::Computing as u8, Ordering::Release);
        for job in jobs.iter_mut() {
            if stop.load(Ordering::Acquire) {
                log::trace!("Worker '{}' abandoning frame", name);
                state.store(WorkerState::Stopped as u8, Ordering::Release);
                return;
            }
            job.run(&field);
        }
        drop(field);

        state.store(WorkerState::Idle as u8, Ordering::Release);
        if replies.send(WorkerReply { jobs }).is_err() {
            break;
        }
    }
    state.store(WorkerState::Stopped as u8, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_idle_worker_shuts_down() {
        let mut worker = Worker::spawn("test-idle").unwrap();
        assert_eq!(worker.state(), WorkerState::Idle);
        worker.shutdown();
        assert_eq!(worker.state(), WorkerState::Stopped);
        // Second shutdown is a no-op
        worker.shutdown();
    }

    #[test]
    fn test_wait_without_dispatch_is_empty() {
        let mut worker = Worker::spawn("test-wait").unwrap();
        assert!(worker.wait().unwrap().is_empty());
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_drop_joins_thread() {
        let start = Instant::now();
        {
            let _worker = Worker::spawn("test-drop").unwrap();
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_dispatch_after_shutdown_fails() {
        let mut worker = Worker::spawn("test-stopped").unwrap();
        worker.shutdown();
        let field = Arc::new(ImplicitField::new(
            prism_field::GizmoSnapshot::empty(),
            prism_field::FieldParameters::default(),
        ));
        assert!(matches!(
            worker.dispatch(field, Vec::new()),
            Err(Rejected { error: PipelineError::ShutDown, .. })
        ));
    }

    #[test]
    fn test_empty_dispatch_round_trip() {
        let mut worker = Worker::spawn("test-empty").unwrap();
        let field = Arc::new(ImplicitField::new(
            prism_field::GizmoSnapshot::empty(),
            prism_field::FieldParameters::default(),
        ));
        worker.dispatch(field, Vec::new()).unwrap();
        assert!(worker.is_busy());
        assert!(worker.wait().unwrap().is_empty());
        assert!(!worker.is_busy());
    }
}
