//! Frame-request bookkeeping for hosts that drive a list from a plain loop.
//!
//! A [`StdRuntime`] hands out the [`RuntimeHandle`] a
//! [`ListController`](dynlist_core::ListController) builder needs. Whenever
//! the list asks for a frame the request is latched, and the next
//! [`StdRuntime::pump`] drains the list's queued work.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dynlist_core::{Runtime, RuntimeHandle, RuntimeScheduler};

#[derive(Default)]
struct FrameLatch {
    requested: AtomicBool,
}

impl RuntimeScheduler for FrameLatch {
    fn schedule_frame(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

pub struct StdRuntime {
    latch: Arc<FrameLatch>,
    runtime: Runtime,
}

impl StdRuntime {
    pub fn new() -> Self {
        let latch = Arc::new(FrameLatch::default());
        let runtime = Runtime::new(latch.clone());
        Self { latch, runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Drains queued list work if a frame was requested since the last pump.
    /// Returns whether anything was drained.
    pub fn pump(&self) -> bool {
        if !self.latch.requested.swap(false, Ordering::SeqCst) {
            return false;
        }
        log::trace!("draining list runtime");
        self.runtime.handle().drain_ui();
        true
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("frame_requested", &self.latch.requested.load(Ordering::SeqCst))
            .field("runtime", &self.runtime)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/std_runtime_tests.rs"]
mod tests;
