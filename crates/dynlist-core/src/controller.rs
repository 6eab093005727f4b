//! The list controller: rows, window tree, visibility and pagination glued
//! together behind explicit lifecycle entry points.
//!
//! A host drives the controller the way a UI framework would drive a
//! component:
//!
//! 1. [`ListController::on_mount`] once its container exists,
//! 2. [`ListController::render`] whenever [`ListController::needs_render`]
//!    reports true, mounting one container child per returned slot,
//! 3. [`ListController::on_observation`] for every batch the platform
//!    observer delivers (or [`ListController::on_visibility_changed`] when the
//!    host computes ranges itself),
//! 4. [`ListController::on_data_changed`] when the row source grows,
//! 5. [`ListController::on_unmount`] when the container goes away.
//!
//! Loads run as futures on the [`Runtime`](crate::Runtime), so the host also
//! drains the runtime between frames.

use std::fmt;
use std::rc::Rc;

use crate::error::{ListError, LoadError, SpecError};
use crate::load::LoadCooperator;
use crate::observation::{ContainerRef, ObservationEntry, ObserverPlatform};
use crate::pagination::Pagination;
use crate::rows::RowSequence;
use crate::runtime::RuntimeHandle;
use crate::spec::DynamicListSpec;
use crate::visibility::{VisibilityRange, VisibilityTracker};
use crate::window_tree::{RenderPass, Slot, SlotLayout, WindowTree};

type RowRenderer<R, V> = Box<dyn FnMut(&R, usize) -> Option<V>>;

/// Caller content for the non-row outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Placeholders<V> {
    /// Prefetch-frontier slots.
    pub loading: Option<V>,
    /// Shown once everything is loaded and there are no rows.
    pub empty: Option<V>,
    /// Collapsed, off-screen subtrees.
    pub dummy: Option<V>,
}

impl<V> Default for Placeholders<V> {
    fn default() -> Self {
        Self {
            loading: None,
            empty: None,
            dummy: None,
        }
    }
}

/// Output of one render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedList<V> {
    /// One entry per container child, in order.
    pub slots: Vec<Slot<V>>,
    /// True iff loading is done and there are no rows.
    pub empty_state: bool,
    /// The empty placeholder, present only in the empty state.
    pub empty: Option<V>,
}

impl<V> RenderedList<V> {
    /// Total number of indices covered by the slots.
    pub fn covered_len(&self) -> usize {
        self.slots.iter().map(Slot::span).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Slot<V>> {
        self.slots.iter().filter(|slot| slot.is_row())
    }
}

/// Builder for [`ListController`].
pub struct ListControllerBuilder<R, V> {
    spec: DynamicListSpec,
    rows: RowSequence<R>,
    load: Option<Rc<dyn LoadCooperator>>,
    renderer: Option<RowRenderer<R, V>>,
    placeholders: Placeholders<V>,
    container: ContainerRef,
    check_visibility: Option<Rc<dyn Fn(usize, usize) -> bool>>,
    platform: Option<Rc<dyn ObserverPlatform>>,
    runtime: RuntimeHandle,
}

impl<R: 'static, V: Clone + 'static> ListControllerBuilder<R, V> {
    fn new(runtime: RuntimeHandle) -> Self {
        Self {
            spec: DynamicListSpec::default(),
            rows: RowSequence::empty(),
            load: None,
            renderer: None,
            placeholders: Placeholders::default(),
            container: ContainerRef::new(),
            check_visibility: None,
            platform: None,
            runtime,
        }
    }

    pub fn spec(mut self, spec: DynamicListSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn rows(mut self, rows: impl Into<RowSequence<R>>) -> Self {
        self.rows = rows.into();
        self
    }

    pub fn load(mut self, load: Rc<dyn LoadCooperator>) -> Self {
        self.load = Some(load);
        self
    }

    /// Renders the row at `index`. Returning `None` mounts an empty slot.
    pub fn row_renderer(mut self, renderer: impl FnMut(&R, usize) -> Option<V> + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn placeholders(mut self, placeholders: Placeholders<V>) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn loading(mut self, content: V) -> Self {
        self.placeholders.loading = Some(content);
        self
    }

    pub fn empty(mut self, content: V) -> Self {
        self.placeholders.empty = Some(content);
        self
    }

    pub fn dummy(mut self, content: V) -> Self {
        self.placeholders.dummy = Some(content);
        self
    }

    pub fn container(mut self, container: ContainerRef) -> Self {
        self.container = container;
        self
    }

    /// Bypasses observation entirely.
    pub fn check_visibility(mut self, check: impl Fn(usize, usize) -> bool + 'static) -> Self {
        self.check_visibility = Some(Rc::new(check));
        self
    }

    pub fn observer_platform(mut self, platform: Rc<dyn ObserverPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn build(self) -> Result<ListController<R, V>, SpecError> {
        let tree = WindowTree::new(&self.spec)?;
        let branch = self.spec.branch;
        let tracker = match self.check_visibility {
            Some(check) => {
                VisibilityTracker::with_check(check, self.container.clone(), branch, self.runtime.clone())
            }
            None => VisibilityTracker::observed(
                self.platform.as_deref(),
                &self.spec.observer_options(),
                self.container.clone(),
                branch,
                self.runtime.clone(),
            ),
        };
        let renderer: RowRenderer<R, V> = match self.renderer {
            Some(renderer) => renderer,
            None => Box::new(|_: &R, _: usize| None),
        };
        let pagination = Pagination::new(self.load, self.rows.len(), self.runtime);
        Ok(ListController {
            spec: self.spec,
            tree,
            rows: self.rows,
            renderer,
            placeholders: self.placeholders,
            container: self.container,
            tracker,
            pagination,
        })
    }
}

/// See the [module documentation](self).
pub struct ListController<R, V> {
    spec: DynamicListSpec,
    tree: WindowTree,
    rows: RowSequence<R>,
    renderer: RowRenderer<R, V>,
    placeholders: Placeholders<V>,
    container: ContainerRef,
    tracker: VisibilityTracker,
    pagination: Rc<Pagination>,
}

impl<R: 'static, V: Clone + 'static> ListController<R, V> {
    pub fn builder(runtime: RuntimeHandle) -> ListControllerBuilder<R, V> {
        ListControllerBuilder::new(runtime)
    }

    pub fn spec(&self) -> &DynamicListSpec {
        &self.spec
    }

    pub fn root_size(&self) -> usize {
        self.tree.root_size()
    }

    pub fn rows(&self) -> &RowSequence<R> {
        &self.rows
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    pub fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    pub fn visibility(&self) -> VisibilityRange {
        self.tracker.range()
    }

    pub fn is_done(&self) -> bool {
        self.pagination.is_done()
    }

    pub fn is_loading_more(&self) -> bool {
        self.pagination.is_loading_more()
    }

    pub fn is_mounted(&self) -> bool {
        self.pagination.is_mounted()
    }

    /// Number of `load_more` calls made so far.
    pub fn loads_started(&self) -> usize {
        self.pagination.loads_started()
    }

    pub fn error(&self) -> Option<LoadError> {
        self.pagination.error()
    }

    /// Whether state changed since the last [`ListController::render`].
    pub fn needs_render(&self) -> bool {
        self.pagination.needs_render()
    }

    /// `data_len + page_size` while more pages may exist, `data_len` after.
    pub fn rendered_len(&self) -> usize {
        let data_len = self.rows.len();
        if self.pagination.is_done() {
            data_len
        } else {
            data_len + self.spec.page_size
        }
    }

    pub fn is_empty_state(&self) -> bool {
        self.pagination.is_done() && self.rows.is_empty()
    }

    /// Swaps the cooperator used by later triggers. Nothing re-runs.
    pub fn set_load(&mut self, load: Option<Rc<dyn LoadCooperator>>) {
        self.pagination.set_load(load);
    }

    pub fn on_mount(&mut self) {
        log::debug!("list mounted with {} rows", self.rows.len());
        self.pagination.set_mounted(true);
        self.pagination.set_visible_max(self.tracker.range().max());
        self.pagination.run_cycle();
        self.notify_visibility(self.tracker.range());
        // Children only exist now; the next pass registers them.
        self.pagination.request_render();
    }

    /// Replaces the row sequence. A sequence sharing storage with the
    /// current one is not a change.
    pub fn on_data_changed(&mut self, rows: RowSequence<R>) {
        if rows.same_rows(&self.rows) {
            return;
        }
        log::debug!("rows changed: {} -> {}", self.rows.len(), rows.len());
        self.rows = rows;
        self.pagination.set_data_len(self.rows.len());
        self.pagination.run_cycle();
        self.pagination.request_render();
    }

    /// Applies a range computed by the host. Returns whether it changed.
    pub fn on_visibility_changed(&mut self, range: VisibilityRange) -> bool {
        let previous = self.tracker.range();
        if !self.tracker.set_range(range) {
            return false;
        }
        self.apply_range(previous, range);
        true
    }

    /// Folds one platform observation batch. Returns whether the visible
    /// range changed.
    pub fn on_observation(&mut self, entries: &[ObservationEntry]) -> bool {
        let previous = self.tracker.range();
        match self.tracker.process_batch(entries) {
            Some(range) => {
                self.apply_range(previous, range);
                true
            }
            None => false,
        }
    }

    fn apply_range(&mut self, previous: VisibilityRange, range: VisibilityRange) {
        self.pagination.request_render();
        self.notify_visibility(range);
        if previous.max() != range.max() {
            self.pagination.set_visible_max(range.max());
            self.pagination.run_cycle();
        }
    }

    fn notify_visibility(&self, range: VisibilityRange) {
        if !self.pagination.is_mounted() {
            return;
        }
        let (Some((min, max)), Some(load)) = (range.bounds(), self.pagination.load()) else {
            return;
        };
        load.on_visibility_change(min, max);
    }

    pub fn on_unmount(&mut self) {
        log::debug!("list unmounted");
        self.pagination.set_mounted(false);
        self.pagination.invalidate();
        self.tracker.disconnect();
    }

    /// Clears a captured load failure so pagination can resume. Returns the
    /// failure that was cleared.
    pub fn reset_error(&mut self) -> Option<LoadError> {
        let cleared = self.pagination.take_error()?;
        log::debug!("load failure cleared: {cleared}");
        self.pagination.run_cycle();
        self.pagination.request_render();
        Some(cleared)
    }

    /// Renders the current window.
    ///
    /// A captured load failure is returned instead of any output, on every
    /// call, until [`ListController::reset_error`].
    pub fn render(&mut self) -> Result<RenderedList<V>, ListError> {
        if let Some(err) = self.pagination.error() {
            return Err(ListError::LoadFailed(err));
        }
        let data_len = self.rows.len();
        let rendered_len = self.rendered_len();
        let rows = &self.rows;
        let renderer = &mut self.renderer;
        let mut row = |index: usize| rows.get(index).and_then(|data| renderer(data, index));
        let mut pass = RenderPass {
            visibility: &self.tracker,
            row: &mut row,
            loading: self.placeholders.loading.as_ref(),
            dummy: self.placeholders.dummy.as_ref(),
            data_len,
            rendered_len,
        };
        let slots = self.tree.render(&mut pass);
        self.tracker.set_layout(SlotLayout::from_slots(&slots));
        self.pagination.clear_render_request();

        let empty_state = self.is_empty_state();
        log::trace!(
            "rendered {} slots for {rendered_len} indices (visible {})",
            slots.len(),
            self.tracker.range()
        );
        Ok(RenderedList {
            slots,
            empty_state,
            empty: if empty_state {
                self.placeholders.empty.clone()
            } else {
                None
            },
        })
    }
}

impl<R, V> fmt::Debug for ListController<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("spec", &self.spec)
            .field("rows", &self.rows.len())
            .field("tracker", &self.tracker)
            .field("pagination", &self.pagination)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
