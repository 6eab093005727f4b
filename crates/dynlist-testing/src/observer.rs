//! Geometry-driven stand-in for the platform visibility primitive.
//!
//! The observer intersects each registered element's box, as laid out by
//! [`FakeContainer`], with the viewport grown by the configured margin.
//! Like the real primitive it reports an element the first time it is
//! observed and afterwards only when its intersection flips. A target that
//! left the container is reported once as not intersecting.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use dynlist_core::collections::map::HashMap;
use dynlist_core::{
    ElementHandle, ObservationEntry, ObserverOptions, ObserverPlatform, VisibilityObserver,
};

use crate::container::FakeContainer;

/// The visible window of the scroll container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(height: f32) -> Self {
        Self {
            scroll_top: 0.0,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reported {
    Intersecting(bool),
    Detached,
}

pub struct FakeObserver {
    container: Rc<FakeContainer>,
    viewport: Cell<Viewport>,
    margin: Cell<f32>,
    /// Registration order is kept so batches are deterministic.
    observed: RefCell<Vec<ElementHandle>>,
    reported: RefCell<HashMap<ElementHandle, Reported>>,
    observe_calls: Cell<usize>,
}

impl FakeObserver {
    pub fn new(container: Rc<FakeContainer>, viewport: Viewport) -> Rc<Self> {
        Rc::new(Self {
            container,
            viewport: Cell::new(viewport),
            margin: Cell::new(0.0),
            observed: RefCell::new(Vec::new()),
            reported: RefCell::new(HashMap::default()),
            observe_calls: Cell::new(0),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn scroll_to(&self, scroll_top: f32) {
        let mut viewport = self.viewport.get();
        viewport.scroll_top = scroll_top.max(0.0);
        self.viewport.set(viewport);
    }

    pub fn margin(&self) -> f32 {
        self.margin.get()
    }

    pub fn is_observing(&self, element: ElementHandle) -> bool {
        self.observed.borrow().contains(&element)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.borrow().len()
    }

    /// Number of `observe` calls that added a new registration.
    pub fn observe_calls(&self) -> usize {
        self.observe_calls.get()
    }

    /// Computes the next batch of changes.
    pub fn take_batch(&self) -> Vec<ObservationEntry> {
        let viewport = self.viewport.get();
        let low = viewport.scroll_top - self.margin.get();
        let high = viewport.scroll_top + viewport.height + self.margin.get();

        let mut reported = self.reported.borrow_mut();
        let mut batch = Vec::new();
        for &element in self.observed.borrow().iter() {
            let now = match self.container.bounds_of(element) {
                Some((top, bottom)) => Reported::Intersecting(bottom > low && top < high),
                None => Reported::Detached,
            };
            if reported.insert(element, now) == Some(now) {
                continue;
            }
            batch.push(ObservationEntry::new(
                element,
                now == Reported::Intersecting(true),
            ));
        }
        batch
    }
}

impl VisibilityObserver for FakeObserver {
    fn observe(&self, element: ElementHandle) {
        let mut observed = self.observed.borrow_mut();
        if !observed.contains(&element) {
            observed.push(element);
            self.observe_calls.set(self.observe_calls.get() + 1);
        }
    }

    fn unobserve(&self, element: ElementHandle) {
        self.observed.borrow_mut().retain(|&other| other != element);
        self.reported.borrow_mut().remove(&element);
    }
}

impl fmt::Debug for FakeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeObserver")
            .field("viewport", &self.viewport.get())
            .field("margin", &self.margin.get())
            .field("observed", &self.observed.borrow().len())
            .finish()
    }
}

/// Hands out the shared [`FakeObserver`], or nothing when unavailable.
#[derive(Debug)]
pub struct FakeObserverPlatform {
    observer: Rc<FakeObserver>,
    available: bool,
}

impl FakeObserverPlatform {
    pub fn new(observer: Rc<FakeObserver>) -> Rc<Self> {
        Rc::new(Self {
            observer,
            available: true,
        })
    }

    pub fn unavailable(observer: Rc<FakeObserver>) -> Rc<Self> {
        Rc::new(Self {
            observer,
            available: false,
        })
    }

    pub fn observer(&self) -> &Rc<FakeObserver> {
        &self.observer
    }
}

impl ObserverPlatform for FakeObserverPlatform {
    fn create_observer(&self, options: &ObserverOptions) -> Option<Rc<dyn VisibilityObserver>> {
        if !self.available {
            return None;
        }
        self.observer.margin.set(options.margin);
        let observer: Rc<dyn VisibilityObserver> = self.observer.clone();
        Some(observer)
    }
}

#[cfg(test)]
#[path = "tests/observer_tests.rs"]
mod tests;
