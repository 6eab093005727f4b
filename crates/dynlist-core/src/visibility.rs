//! Tracks which part of the list is near the viewport.
//!
//! The tracker keeps a single inclusive `{min, max}` range of row indices.
//! Until the first observation arrives the range is *unobserved* and every
//! query answers `true`, so the first render materializes something that can
//! then be observed.
//!
//! Observation coverage grows lazily: when the tree asks about a leaf-group
//! sized range (width equal to the branch factor), the container children
//! backing that range are registered with the platform observer. Children
//! first seen inside an observation batch are registered on the next tick,
//! never from within the batch itself.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::collections::map::{HashMap, HashSet};
use crate::observation::{
    ContainerRef, ElementHandle, ObservationEntry, ObserverOptions, ObserverPlatform,
    VisibilityObserver,
};
use crate::runtime::RuntimeHandle;
use crate::window_tree::{SlotLayout, VisibilityCheck};

/// Inclusive bounds of the indices currently observed on or near screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisibilityRange {
    bounds: Option<(usize, usize)>,
}

impl VisibilityRange {
    /// Nothing observed yet: every range counts as visible.
    pub const UNOBSERVED: Self = Self { bounds: None };

    pub fn new(min: usize, max: usize) -> Self {
        debug_assert!(min <= max, "visibility range {min}..={max} is inverted");
        Self {
            bounds: Some((min.min(max), max.max(min))),
        }
    }

    pub fn is_observed(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn min(&self) -> Option<usize> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<usize> {
        self.bounds.map(|(_, max)| max)
    }

    pub fn bounds(&self) -> Option<(usize, usize)> {
        self.bounds
    }

    /// Whether `[start, end)` lies within one index of the observed range.
    pub fn is_near(&self, start: usize, end: usize) -> bool {
        match self.bounds {
            None => true,
            Some((min, max)) => start <= max.saturating_add(1) && end.saturating_add(1) >= min,
        }
    }

    fn include(self, first: usize, last: usize) -> Self {
        match self.bounds {
            None => Self::new(first, last),
            Some((min, max)) => Self::new(min.min(first), max.max(last)),
        }
    }
}

impl fmt::Display for VisibilityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some((min, max)) => write!(f, "{min}..={max}"),
            None => f.write_str("unobserved"),
        }
    }
}

enum Mode {
    Custom(Rc<dyn Fn(usize, usize) -> bool>),
    Observed(Rc<dyn VisibilityObserver>),
    Unavailable,
}

#[derive(Default)]
struct ObservationState {
    /// Last reported intersection per element.
    membership: HashMap<ElementHandle, bool>,
    /// Elements currently registered with the observer.
    registered: HashSet<ElementHandle>,
    /// Visibility by container position; single-row positions whose element
    /// has not reported yet keep the last value seen there.
    positional: Vec<bool>,
    layout: SlotLayout,
}

/// See the [module documentation](self).
pub struct VisibilityTracker {
    mode: Mode,
    container: ContainerRef,
    branch: usize,
    range: Cell<VisibilityRange>,
    runtime: RuntimeHandle,
    state: Rc<RefCell<ObservationState>>,
}

impl VisibilityTracker {
    /// Uses `check` verbatim; no observation is ever registered.
    pub fn with_check(
        check: Rc<dyn Fn(usize, usize) -> bool>,
        container: ContainerRef,
        branch: usize,
        runtime: RuntimeHandle,
    ) -> Self {
        Self::with_mode(Mode::Custom(check), container, branch, runtime)
    }

    /// Observes container children through `platform`. Without a platform,
    /// or if it cannot create an observer, the tracker reports everything as
    /// visible.
    pub fn observed(
        platform: Option<&dyn ObserverPlatform>,
        options: &ObserverOptions,
        container: ContainerRef,
        branch: usize,
        runtime: RuntimeHandle,
    ) -> Self {
        let mode = match platform.and_then(|platform| platform.create_observer(options)) {
            Some(observer) => Mode::Observed(observer),
            None => {
                log::warn!(
                    "visibility observation unavailable; every row will be materialized"
                );
                Mode::Unavailable
            }
        };
        Self::with_mode(mode, container, branch, runtime)
    }

    fn with_mode(mode: Mode, container: ContainerRef, branch: usize, runtime: RuntimeHandle) -> Self {
        Self {
            mode,
            container,
            branch,
            range: Cell::new(VisibilityRange::UNOBSERVED),
            runtime,
            state: Rc::new(RefCell::new(ObservationState::default())),
        }
    }

    pub fn range(&self) -> VisibilityRange {
        self.range.get()
    }

    pub fn is_observing(&self) -> bool {
        matches!(self.mode, Mode::Observed(_))
    }

    pub fn has_custom_check(&self) -> bool {
        matches!(self.mode, Mode::Custom(_))
    }

    /// Number of elements currently registered with the observer.
    pub fn registered_count(&self) -> usize {
        self.state.borrow().registered.len()
    }

    /// Replaces the range. Returns whether it actually changed.
    pub fn set_range(&self, range: VisibilityRange) -> bool {
        if self.range.get() == range {
            return false;
        }
        log::trace!("visibility {} -> {}", self.range.get(), range);
        self.range.set(range);
        true
    }

    /// Records which index span each container child covers after a render.
    pub fn set_layout(&self, layout: SlotLayout) {
        self.state.borrow_mut().layout = layout;
    }

    /// Folds one observation batch into the range.
    ///
    /// Returns the new range if it changed. Batches are ignored when a custom
    /// check is in use or no observer exists.
    pub fn process_batch(&self, entries: &[ObservationEntry]) -> Option<VisibilityRange> {
        let Mode::Observed(observer) = &self.mode else {
            return None;
        };
        let container = self.container.current();
        let mut state = self.state.borrow_mut();
        let mut detached: SmallVec<[ElementHandle; 8]> = SmallVec::new();

        for entry in entries {
            match &container {
                Some(parent) if parent.is_connected(entry.target) => {
                    state.membership.insert(entry.target, entry.is_intersecting);
                }
                _ => {
                    state.membership.remove(&entry.target);
                    state.registered.remove(&entry.target);
                    detached.push(entry.target);
                }
            }
        }

        let Some(parent) = container else {
            drop(state);
            for element in detached {
                observer.unobserve(element);
            }
            return None;
        };

        let count = parent.child_count();
        state.positional.resize(count, false);
        let mut discovered: Vec<ElementHandle> = Vec::new();
        for position in 0..count {
            let Some(child) = parent.child_at(position) else {
                continue;
            };
            match state.membership.get(&child).copied() {
                Some(visible) => state.positional[position] = visible,
                None => {
                    // A stale flag may only stand in for a single row, never
                    // for a whole collapsed span.
                    if state.layout.covered(position).len() > 1 {
                        state.positional[position] = false;
                    }
                    if !state.registered.contains(&child) {
                        discovered.push(child);
                    }
                }
            }
        }

        let mut next = VisibilityRange::UNOBSERVED;
        for (position, visible) in state.positional.iter().enumerate() {
            if *visible {
                let covered = state.layout.covered(position);
                next = next.include(covered.start, covered.end - 1);
            }
        }
        drop(state);

        for element in detached {
            log::trace!("unobserving detached element {element}");
            observer.unobserve(element);
        }
        if !discovered.is_empty() {
            self.register_next_tick(observer, discovered);
        }

        self.set_range(next).then_some(next)
    }

    fn register_next_tick(&self, observer: &Rc<dyn VisibilityObserver>, elements: Vec<ElementHandle>) {
        let observer = Rc::clone(observer);
        let state = Rc::clone(&self.state);
        let container = self.container.clone();
        let posted = self.runtime.post_next_tick(move || {
            let parent = container.current();
            let mut state = state.borrow_mut();
            for element in elements {
                let connected = parent
                    .as_ref()
                    .is_some_and(|parent| parent.is_connected(element));
                if connected && state.registered.insert(element) {
                    log::trace!("observing discovered element {element}");
                    observer.observe(element);
                }
            }
        });
        if !posted {
            log::debug!("runtime gone; dropping deferred observer registrations");
        }
    }

    fn register_range(&self, observer: &Rc<dyn VisibilityObserver>, start: usize, end: usize) {
        let Some(parent) = self.container.current() else {
            return;
        };
        let mut fresh: SmallVec<[ElementHandle; 8]> = SmallVec::new();
        {
            let mut state = self.state.borrow_mut();
            for position in state.layout.positions_for(start, end) {
                if let Some(child) = parent.child_at(position) {
                    if state.registered.insert(child) {
                        fresh.push(child);
                    }
                }
            }
        }
        for element in fresh {
            observer.observe(element);
        }
    }

    /// Unregisters every element and forgets all observations.
    pub fn disconnect(&self) {
        let registered: Vec<_> = {
            let mut state = self.state.borrow_mut();
            state.membership.clear();
            state.positional.clear();
            state.registered.drain().collect()
        };
        if let Mode::Observed(observer) = &self.mode {
            for element in registered {
                observer.unobserve(element);
            }
        }
    }
}

impl VisibilityCheck for VisibilityTracker {
    fn is_visible(&self, start: usize, end: usize) -> bool {
        match &self.mode {
            Mode::Custom(check) => check(start, end),
            Mode::Unavailable => true,
            Mode::Observed(observer) => {
                if end.saturating_sub(start) == self.branch {
                    self.register_range(observer, start, end);
                }
                self.range.get().is_near(start, end)
            }
        }
    }
}

impl fmt::Debug for VisibilityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Custom(_) => "custom",
            Mode::Observed(_) => "observed",
            Mode::Unavailable => "unavailable",
        };
        f.debug_struct("VisibilityTracker")
            .field("mode", &mode)
            .field("branch", &self.branch)
            .field("range", &self.range.get())
            .field("registered", &self.registered_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/visibility_tests.rs"]
mod tests;
