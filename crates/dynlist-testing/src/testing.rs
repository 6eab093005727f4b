use std::fmt;
use std::rc::Rc;

use dynlist_core::{
    ContainerRef, DynamicListSpec, ListController, ListError, LoadError, RenderedList, RowSequence,
    Slot, SpecError,
};
use dynlist_runtime_std::StdRuntime;

use crate::container::FakeContainer;
use crate::loader::ScriptedLoader;
use crate::observer::{FakeObserver, FakeObserverPlatform, Viewport};

/// Height of one row in the fake layout.
pub const ROW_HEIGHT: f32 = 50.0;
/// Height of the fake viewport.
pub const VIEWPORT_HEIGHT: f32 = 500.0;

const MAX_PUMP_ITERATIONS: usize = 100;

/// Headless harness wiring a [`ListController`] to a fake container, a
/// geometry-driven observer and a scripted loader.
///
/// `ListTestRule` plays the host: it mounts one container child per rendered
/// slot, forwards observer batches, and drains the runtime until nothing is
/// left to do. Rows are rendered as their `Debug` text.
pub struct ListTestRule<R> {
    runtime: StdRuntime,
    container: Rc<FakeContainer>,
    container_ref: ContainerRef,
    observer: Rc<FakeObserver>,
    loader: Rc<ScriptedLoader>,
    list: ListController<R, String>,
    rendered: Option<RenderedList<String>>,
    renders: usize,
}

impl<R: fmt::Debug + Clone + 'static> ListTestRule<R> {
    /// Builds a rule with an available observer.
    pub fn new(spec: DynamicListSpec, rows: Vec<R>, has_more: bool) -> Result<Self, SpecError> {
        Self::with_platform(spec, rows, has_more, true)
    }

    /// Builds a rule whose platform cannot create observers.
    pub fn without_observer(
        spec: DynamicListSpec,
        rows: Vec<R>,
        has_more: bool,
    ) -> Result<Self, SpecError> {
        Self::with_platform(spec, rows, has_more, false)
    }

    fn with_platform(
        spec: DynamicListSpec,
        rows: Vec<R>,
        has_more: bool,
        available: bool,
    ) -> Result<Self, SpecError> {
        let runtime = StdRuntime::new();
        let container = FakeContainer::new(ROW_HEIGHT);
        let container_ref = ContainerRef::new();
        let observer = FakeObserver::new(container.clone(), Viewport::new(VIEWPORT_HEIGHT));
        let platform = if available {
            FakeObserverPlatform::new(observer.clone())
        } else {
            FakeObserverPlatform::unavailable(observer.clone())
        };
        let loader = ScriptedLoader::new(has_more);
        let list = ListController::builder(runtime.runtime_handle())
            .spec(spec)
            .rows(rows)
            .load(loader.clone())
            .row_renderer(|row: &R, index| Some(format!("{index}: {row:?}")))
            .loading("loading".to_string())
            .empty("empty".to_string())
            .dummy("dummy".to_string())
            .container(container_ref.clone())
            .observer_platform(platform)
            .build()?;
        Ok(Self {
            runtime,
            container,
            container_ref,
            observer,
            loader,
            list,
            rendered: None,
            renders: 0,
        })
    }

    /// Renders once, attaches the container, then runs the mount effects.
    pub fn mount(&mut self) -> Result<(), ListError> {
        self.container_ref.set(self.container.clone());
        self.render()?;
        self.list.on_mount();
        self.pump_until_idle()
    }

    pub fn unmount(&mut self) {
        self.list.on_unmount();
        self.container.clear();
        self.container_ref.clear();
    }

    /// Drive the list until there are no pending renders, runtime work or
    /// observer changes remaining.
    pub fn pump_until_idle(&mut self) -> Result<(), ListError> {
        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > MAX_PUMP_ITERATIONS {
                panic!("pump_until_idle looped too many times!");
            }
            let mut progressed = false;

            if self.list.needs_render() && self.list.is_mounted() {
                self.render()?;
                progressed = true;
            }

            if self.runtime.pump() {
                progressed = true;
            }

            if self.list.is_mounted() {
                let batch = self.observer.take_batch();
                if !batch.is_empty() {
                    log::trace!("delivering {} observation entries", batch.len());
                    self.list.on_observation(&batch);
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }
        Ok(())
    }

    /// Scrolls the viewport to `scroll_top` pixels and settles.
    pub fn scroll_to(&mut self, scroll_top: f32) -> Result<(), ListError> {
        self.observer.scroll_to(scroll_top);
        self.pump_until_idle()
    }

    /// Scrolls so that row `index` sits at the top of the viewport.
    pub fn scroll_to_row(&mut self, index: usize) -> Result<(), ListError> {
        self.scroll_to(index as f32 * ROW_HEIGHT)
    }

    /// Scrolls to the bottom of the mounted content.
    pub fn scroll_to_end(&mut self) -> Result<(), ListError> {
        let bottom = self.container.content_height() - VIEWPORT_HEIGHT;
        self.scroll_to(bottom)
    }

    /// Completes the oldest load, then appends `rows` with `has_more`
    /// updated, as a host does once the fetched page arrives.
    pub fn resolve_page(
        &mut self,
        rows: impl IntoIterator<Item = R>,
        has_more: bool,
    ) -> Result<(), ListError> {
        self.loader.set_has_more(has_more);
        self.loader.resolve_next();
        self.pump_until_idle()?;
        let appended = self.list.rows().appended(rows);
        self.list.on_data_changed(appended);
        self.pump_until_idle()
    }

    /// Fails the oldest load.
    pub fn fail_page(&mut self, message: &str) -> Result<(), ListError> {
        self.loader.fail_next(LoadError::msg(message));
        self.pump_until_idle()
    }

    /// Replaces the rows outright.
    pub fn set_rows(&mut self, rows: Vec<R>) -> Result<(), ListError> {
        self.list.on_data_changed(RowSequence::from(rows));
        self.pump_until_idle()
    }

    pub fn list(&self) -> &ListController<R, String> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListController<R, String> {
        &mut self.list
    }

    pub fn loader(&self) -> &Rc<ScriptedLoader> {
        &self.loader
    }

    pub fn observer(&self) -> &Rc<FakeObserver> {
        &self.observer
    }

    pub fn container(&self) -> &Rc<FakeContainer> {
        &self.container
    }

    pub fn runtime(&self) -> &StdRuntime {
        &self.runtime
    }

    /// Output of the last successful render.
    pub fn rendered(&self) -> Option<&RenderedList<String>> {
        self.rendered.as_ref()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Indices of the rows currently mounted.
    pub fn mounted_rows(&self) -> Vec<usize> {
        self.rendered
            .iter()
            .flat_map(|rendered| rendered.slots.iter())
            .filter_map(|slot| match slot {
                Slot::Row { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    fn render(&mut self) -> Result<(), ListError> {
        let rendered = self.list.render()?;
        self.renders += 1;
        self.container.mount(&rendered.slots);
        self.rendered = Some(rendered);
        Ok(())
    }
}

impl<R> fmt::Debug for ListTestRule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListTestRule")
            .field("list", &self.list)
            .field("observer", &self.observer)
            .field("loader", &self.loader)
            .field("renders", &self.renders)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
