//! Single-flight pagination driven by the visible frontier.
//!
//! Every pagination *cycle* (rows replaced, visible `max` moved, mount, an
//! error reset) recomputes `done` and may start one load. A finished load
//! only releases the guard; the row update that follows it starts the next
//! cycle. A cycle owns a
//! validity flag; starting the next cycle or unmounting flips the previous
//! flag so a late failure from that cycle is dropped instead of captured.
//! The in-flight guard is set before the load future is created and cleared
//! only by that load's completion, whatever the validity.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::LoadError;
use crate::load::LoadCooperator;
use crate::runtime::RuntimeHandle;

pub(crate) struct Pagination {
    load: RefCell<Option<Rc<dyn LoadCooperator>>>,
    data_len: Cell<usize>,
    visible_max: Cell<Option<usize>>,
    done: Cell<bool>,
    loading_more: Cell<bool>,
    error: RefCell<Option<LoadError>>,
    cycle: RefCell<Rc<Cell<bool>>>,
    mounted: Cell<bool>,
    needs_render: Cell<bool>,
    loads_started: Cell<usize>,
    runtime: RuntimeHandle,
}

impl Pagination {
    pub(crate) fn new(
        load: Option<Rc<dyn LoadCooperator>>,
        data_len: usize,
        runtime: RuntimeHandle,
    ) -> Rc<Self> {
        let done = !has_more(load.as_deref());
        Rc::new(Self {
            load: RefCell::new(load),
            data_len: Cell::new(data_len),
            visible_max: Cell::new(None),
            done: Cell::new(done),
            loading_more: Cell::new(false),
            error: RefCell::new(None),
            cycle: RefCell::new(Rc::new(Cell::new(true))),
            mounted: Cell::new(false),
            needs_render: Cell::new(false),
            loads_started: Cell::new(0),
            runtime,
        })
    }

    pub(crate) fn load(&self) -> Option<Rc<dyn LoadCooperator>> {
        self.load.borrow().clone()
    }

    pub(crate) fn set_load(&self, load: Option<Rc<dyn LoadCooperator>>) {
        *self.load.borrow_mut() = load;
    }

    pub(crate) fn set_data_len(&self, len: usize) {
        self.data_len.set(len);
    }

    pub(crate) fn set_visible_max(&self, max: Option<usize>) {
        self.visible_max.set(max);
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done.get()
    }

    pub(crate) fn is_loading_more(&self) -> bool {
        self.loading_more.get()
    }

    pub(crate) fn loads_started(&self) -> usize {
        self.loads_started.get()
    }

    pub(crate) fn error(&self) -> Option<LoadError> {
        self.error.borrow().clone()
    }

    pub(crate) fn take_error(&self) -> Option<LoadError> {
        self.error.borrow_mut().take()
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub(crate) fn set_mounted(&self, mounted: bool) {
        self.mounted.set(mounted);
    }

    pub(crate) fn request_render(&self) {
        self.needs_render.set(true);
        self.runtime.schedule();
    }

    pub(crate) fn needs_render(&self) -> bool {
        self.needs_render.get()
    }

    pub(crate) fn clear_render_request(&self) {
        self.needs_render.set(false);
    }

    /// Invalidates the running cycle without starting a new one.
    pub(crate) fn invalidate(&self) {
        self.cycle.borrow().set(false);
    }

    /// Runs one pagination cycle. `done` is always recomputed; a load can
    /// only start while mounted.
    pub(crate) fn run_cycle(self: &Rc<Self>) {
        let valid = Rc::new(Cell::new(true));
        let previous = self.cycle.replace(Rc::clone(&valid));
        previous.set(false);

        let load = self.load();
        let done = !has_more(load.as_deref());
        if done != self.done.get() {
            log::debug!("pagination done = {done}");
            self.done.set(done);
            self.request_render();
        }

        if done || !self.mounted.get() || self.loading_more.get() || self.error.borrow().is_some() {
            return;
        }
        let Some(max) = self.visible_max.get() else {
            return;
        };
        let len = self.data_len.get();
        if max + 1 < len {
            return;
        }
        if let Some(load) = load {
            self.start_load(load, len, valid);
        }
    }

    fn start_load(self: &Rc<Self>, load: Rc<dyn LoadCooperator>, len: usize, valid: Rc<Cell<bool>>) {
        self.loading_more.set(true);
        self.loads_started.set(self.loads_started.get() + 1);
        log::debug!("visible frontier reached {len}; loading more rows");

        let future = load.load_more();
        let this = Rc::clone(self);
        let spawned = self.runtime.spawn_ui(async move {
            let result = future.await;
            this.finish_load(result, &valid);
        });
        if !spawned {
            log::warn!("runtime gone; load request abandoned");
            self.loading_more.set(false);
        }
    }

    fn finish_load(&self, result: Result<(), LoadError>, valid: &Cell<bool>) {
        self.loading_more.set(false);
        match result {
            Ok(()) => log::debug!("load finished"),
            Err(err) if valid.get() => {
                log::error!("load failed: {err}");
                *self.error.borrow_mut() = Some(err);
                self.request_render();
            }
            Err(err) => {
                log::debug!("dropping failure from a stale load: {err}");
            }
        }
    }
}

fn has_more(load: Option<&dyn LoadCooperator>) -> bool {
    load.is_some_and(|load| load.has_more())
}

impl fmt::Debug for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pagination")
            .field("data_len", &self.data_len.get())
            .field("visible_max", &self.visible_max.get())
            .field("done", &self.done.get())
            .field("loading_more", &self.loading_more.get())
            .field("error", &self.error.borrow().is_some())
            .field("mounted", &self.mounted.get())
            .finish()
    }
}
