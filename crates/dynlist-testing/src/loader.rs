//! Load cooperator whose pages are settled by the test.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use dynlist_core::{LoadCooperator, LoadError, LoadFuture};

/// Shared completion slot of one `load_more` call.
#[derive(Default)]
struct PendingLoad {
    result: RefCell<Option<Result<(), LoadError>>>,
    waker: RefCell<Option<Waker>>,
}

impl PendingLoad {
    fn settle(&self, result: Result<(), LoadError>) {
        *self.result.borrow_mut() = Some(result);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }
}

struct PendingLoadFuture {
    load: Rc<PendingLoad>,
}

impl Future for PendingLoadFuture {
    type Output = Result<(), LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.load.result.borrow_mut().take() {
            return Poll::Ready(result);
        }
        *self.load.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// Records every call and leaves each load pending until
/// [`ScriptedLoader::resolve_next`] or [`ScriptedLoader::fail_next`].
#[derive(Default)]
pub struct ScriptedLoader {
    has_more: Cell<bool>,
    calls: Cell<usize>,
    pending: RefCell<VecDeque<Rc<PendingLoad>>>,
    visibility: RefCell<Vec<(usize, usize)>>,
}

impl ScriptedLoader {
    pub fn new(has_more: bool) -> Rc<Self> {
        let loader = Self::default();
        loader.has_more.set(has_more);
        Rc::new(loader)
    }

    pub fn set_has_more(&self, has_more: bool) {
        self.has_more.set(has_more);
    }

    /// Number of `load_more` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Loads started but not settled yet.
    pub fn outstanding(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Every `(min, max)` passed to `on_visibility_change`, in order.
    pub fn visibility_log(&self) -> Vec<(usize, usize)> {
        self.visibility.borrow().clone()
    }

    /// Completes the oldest outstanding load. Returns `false` if none.
    pub fn resolve_next(&self) -> bool {
        self.settle_next(Ok(()))
    }

    /// Fails the oldest outstanding load. Returns `false` if none.
    pub fn fail_next(&self, err: LoadError) -> bool {
        self.settle_next(Err(err))
    }

    fn settle_next(&self, result: Result<(), LoadError>) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        match next {
            Some(load) => {
                load.settle(result);
                true
            }
            None => false,
        }
    }
}

impl LoadCooperator for ScriptedLoader {
    fn has_more(&self) -> bool {
        self.has_more.get()
    }

    fn load_more(&self) -> LoadFuture {
        self.calls.set(self.calls.get() + 1);
        log::debug!("scripted load #{} requested", self.calls.get());
        let load = Rc::new(PendingLoad::default());
        self.pending.borrow_mut().push_back(Rc::clone(&load));
        Box::pin(PendingLoadFuture { load })
    }

    fn on_visibility_change(&self, min: usize, max: usize) {
        self.visibility.borrow_mut().push((min, max));
    }
}

impl fmt::Debug for ScriptedLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedLoader")
            .field("has_more", &self.has_more.get())
            .field("calls", &self.calls.get())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
