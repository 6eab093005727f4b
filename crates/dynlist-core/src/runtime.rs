//! Single-threaded UI runtime used to sequence list work.
//!
//! The runtime owns two queues, both drained on the UI thread:
//!
//! - next-tick tasks, which are held back until the *following* drain,
//! - spawned futures, polled with a waker that requests a new frame.
//!
//! Nothing here is preemptive: a task runs to completion before the next one
//! starts, which is what makes check-and-set of plain `Cell` guards safe.
//! Spawned futures cannot be aborted; they are polled until they finish.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::ThreadId;

use crate::platform::RuntimeScheduler;

type UiTask = Box<dyn FnOnce() + 'static>;
type UiFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    next_tick: RefCell<Vec<UiTask>>,
    tasks: RefCell<Vec<UiFuture>>,
    task_waker: Waker,
    ui_thread_id: ThreadId,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let task_waker = RuntimeTaskWaker::new(scheduler.clone()).into_waker();
        Self {
            scheduler,
            next_tick: RefCell::new(Vec::new()),
            tasks: RefCell::new(Vec::new()),
            task_waker,
            ui_thread_id: std::thread::current().id(),
        }
    }

    fn schedule(&self) {
        self.scheduler.schedule_frame();
    }

    fn post_next_tick(&self, task: UiTask) {
        self.next_tick.borrow_mut().push(task);
        self.schedule();
    }

    fn spawn_ui_task(&self, future: UiFuture) {
        self.tasks.borrow_mut().push(future);
        self.schedule();
    }

    fn poll_async_tasks(&self) -> bool {
        let mut cx = Context::from_waker(&self.task_waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut pending = Vec::with_capacity(tasks.len());
        let mut made_progress = false;
        for mut future in tasks {
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => made_progress = true,
                Poll::Pending => pending.push(future),
            }
        }
        let mut tasks = self.tasks.borrow_mut();
        if !tasks.is_empty() {
            // Spawned while polling; poll them on this drain too.
            made_progress = true;
        }
        pending.append(&mut tasks);
        *tasks = pending;
        made_progress
    }

    fn drain_ui(&self) {
        let deferred = std::mem::take(&mut *self.next_tick.borrow_mut());
        for task in deferred {
            task();
        }
        while self.poll_async_tasks() {}
    }

    fn has_pending_ui(&self) -> bool {
        let tick_pending = self
            .next_tick
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        let async_pending = self
            .tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        tick_pending || async_pending
    }
}

/// Owner of the runtime queues. Dropping the last `Runtime` turns every
/// outstanding [`RuntimeHandle`] into a no-op.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
            ui_thread_id: self.inner.ui_thread_id,
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("has_pending_ui", &self.inner.has_pending_ui())
            .finish()
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
pub struct TestRuntime {
    runtime: Runtime,
}

#[cfg(test)]
impl TestRuntime {
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new(Arc::new(DefaultScheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }
}

/// Weak, clonable access to a [`Runtime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
    ui_thread_id: ThreadId,
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    /// Schedules work for the next drain only; a task posted from inside a
    /// drain is not picked up by that same drain. Returns `false` (and drops
    /// the task) if the runtime no longer exists.
    pub fn post_next_tick(&self, task: impl FnOnce() + 'static) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.post_next_tick(Box::new(task));
                true
            }
            None => false,
        }
    }

    /// Spawns `fut` on the UI thread. Returns `false` if the runtime no
    /// longer exists.
    pub fn spawn_ui<F>(&self, fut: F) -> bool
    where
        F: Future<Output = ()> + 'static,
    {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.spawn_ui_task(Box::pin(fut));
                true
            }
            None => false,
        }
    }

    pub fn drain_ui(&self) {
        self.assert_ui_thread();
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or(false)
    }

    pub fn assert_ui_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "list runtime driven off its UI thread"
        );
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl RuntimeTaskWaker {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self { scheduler }
    }

    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.scheduler.schedule_frame();
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
