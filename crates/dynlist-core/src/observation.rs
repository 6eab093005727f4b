//! Host-facing types for the platform visibility primitive.
//!
//! The list never touches real elements. A host exposes its scroll container
//! through [`Container`], hands out opaque [`ElementHandle`]s for the
//! container's direct children, and forwards batched intersection results as
//! [`ObservationEntry`] slices. Observers themselves are created by an
//! [`ObserverPlatform`]; when none is available the tracker falls back to
//! treating everything as visible.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::{smallvec, SmallVec};

/// Stable, opaque identity of a mounted element.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The scrollable element whose direct children correspond 1:1, in order,
/// to the slots produced by a render pass.
pub trait Container {
    /// Number of direct children currently mounted.
    fn child_count(&self) -> usize;

    /// Handle of the child at `position`, if one is mounted there.
    fn child_at(&self, position: usize) -> Option<ElementHandle>;

    /// Whether `element` is still attached to the container.
    fn is_connected(&self, element: ElementHandle) -> bool;
}

/// Mutable reference cell pointing at the currently mounted container.
///
/// The container may not exist yet (before mount) or may have gone away
/// (after unmount); every consumer must handle the empty case.
#[derive(Clone, Default)]
pub struct ContainerRef {
    current: Rc<RefCell<Option<Rc<dyn Container>>>>,
}

impl ContainerRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(container: Rc<dyn Container>) -> Self {
        let this = Self::new();
        this.set(container);
        this
    }

    pub fn set(&self, container: Rc<dyn Container>) {
        *self.current.borrow_mut() = Some(container);
    }

    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    pub fn current(&self) -> Option<Rc<dyn Container>> {
        self.current.borrow().clone()
    }
}

impl fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerRef")
            .field("attached", &self.current.borrow().is_some())
            .finish()
    }
}

/// One element's visibility change inside an observation batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObservationEntry {
    pub target: ElementHandle,
    pub is_intersecting: bool,
}

impl ObservationEntry {
    pub fn new(target: ElementHandle, is_intersecting: bool) -> Self {
        Self {
            target,
            is_intersecting,
        }
    }
}

/// Options an observer is created with.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Extra distance added above and below the viewport before an element
    /// counts as intersecting. The horizontal margin is always zero.
    pub margin: f32,
    /// Intersection ratios at which the platform reports changes.
    pub thresholds: SmallVec<[f32; 2]>,
}

impl ObserverOptions {
    pub fn with_margin(margin: f32) -> Self {
        Self {
            margin,
            thresholds: smallvec![0.0, 0.1],
        }
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::with_margin(0.0)
    }
}

/// A live registration set on the platform's visibility primitive.
pub trait VisibilityObserver {
    fn observe(&self, element: ElementHandle);
    fn unobserve(&self, element: ElementHandle);
}

/// Creates observers. Returning `None` means the primitive is unavailable.
pub trait ObserverPlatform {
    fn create_observer(&self, options: &ObserverOptions) -> Option<Rc<dyn VisibilityObserver>>;
}
