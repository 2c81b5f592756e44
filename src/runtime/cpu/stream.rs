//! CPU execution stream: a worker thread draining a FIFO of kernel launches

use crate::error::{Error, Result};
use crate::runtime::Stream;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// One enqueued kernel launch
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct StreamState {
    /// Jobs enqueued but not yet finished (or discarded)
    pending: usize,
    /// First fault since the last synchronization
    fault: Option<String>,
}

#[derive(Default)]
struct StreamCore {
    state: Mutex<StreamState>,
    idle: Condvar,
}

struct StreamShared {
    id: usize,
    core: Arc<StreamCore>,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Ordered queue of kernel launches backed by one worker thread
///
/// Clones refer to the same queue. Each launch runs to completion before the
/// next one starts; the blocks inside a launch run on the client's rayon
/// pool.
///
/// A panic inside a kernel is recorded as a fault. While a fault is pending
/// the stream discards further launches, and the next
/// [`synchronize`](Stream::synchronize) reports it as
/// [`Error::AsyncExecution`] and clears it.
#[derive(Clone)]
pub struct CpuStream {
    shared: Arc<StreamShared>,
}

impl CpuStream {
    /// Spawn a new stream with its own worker thread
    pub(crate) fn new(id: usize) -> Result<Self> {
        let core = Arc::new(StreamCore::default());
        let (sender, receiver) = mpsc::channel::<Job>();

        let worker_core = Arc::clone(&core);
        let worker = thread::Builder::new()
            .name(format!("tileprim-stream-{id}"))
            .spawn(move || run_worker(id, worker_core, receiver))
            .map_err(|e| Error::Backend(format!("failed to spawn stream worker: {e}")))?;

        tracing::trace!(stream = id, "stream created");
        Ok(Self {
            shared: Arc::new(StreamShared {
                id,
                core,
                sender: Mutex::new(Some(sender)),
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Enqueue a launch
    ///
    /// Fails with [`Error::LaunchFailed`] once the stream has been shut down.
    pub(crate) fn enqueue(&self, kernel: &'static str, job: Job) -> Result<()> {
        let sender = self.shared.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return Err(Error::launch_failed(kernel, "stream has been shut down"));
        };

        self.shared.core.state.lock().pending += 1;
        if tx.send(job).is_err() {
            self.shared.core.finish_one();
            return Err(Error::launch_failed(kernel, "stream worker has exited"));
        }
        Ok(())
    }

    /// Stop accepting work, drain what is queued and join the worker
    ///
    /// Later launches on any clone of this stream fail with a launch error.
    /// A fault recorded by the drained work is still reported by the next
    /// [`synchronize`](Stream::synchronize).
    pub fn shutdown(&self) {
        self.shared.close();
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shared.sender.lock().is_none()
    }
}

impl Stream for CpuStream {
    fn id(&self) -> usize {
        self.shared.id
    }

    fn synchronize(&self) -> Result<()> {
        let core = &self.shared.core;
        let mut state = core.state.lock();
        while state.pending > 0 {
            core.idle.wait(&mut state);
        }
        match state.fault.take() {
            Some(reason) => Err(Error::AsyncExecution { reason }),
            None => Ok(()),
        }
    }

    fn query(&self) -> bool {
        self.shared.core.state.lock().pending == 0
    }
}

impl fmt::Debug for CpuStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuStream")
            .field("id", &self.shared.id)
            .field("pending", &self.shared.core.state.lock().pending)
            .finish()
    }
}

impl StreamCore {
    fn finish_one(&self) {
        let mut state = self.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }
}

impl StreamShared {
    fn close(&self) {
        // Dropping the sender ends the worker loop after the queue drains.
        if self.sender.lock().take().is_some() {
            tracing::trace!(stream = self.id, "stream shut down");
        }
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for StreamShared {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(id: usize, core: Arc<StreamCore>, jobs: Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        let faulted = core.state.lock().fault.is_some();
        if faulted {
            tracing::trace!(stream = id, "discarding launch after fault");
            drop(job);
        } else if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
            let reason = panic_message(payload.as_ref());
            tracing::warn!(stream = id, %reason, "kernel faulted");
            core.state.lock().fault.get_or_insert(reason);
        }
        // The job and everything it captured is gone before completion is
        // signalled.
        core.finish_one();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "kernel panicked".to_string()
    }
}
