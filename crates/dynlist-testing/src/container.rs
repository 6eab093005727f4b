//! In-memory scroll container.
//!
//! Children are reconciled by [`SlotKey`]: mounting a render pass keeps the
//! handle of every slot whose key survived and mints fresh handles for the
//! rest, the way a keyed UI framework would. Each child is laid out
//! vertically with a height of `span * row_height`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use dynlist_core::collections::map::HashMap;
use dynlist_core::{Container, ElementHandle, Slot, SlotKey};

#[derive(Clone, Copy, Debug)]
struct MountedChild {
    key: SlotKey,
    handle: ElementHandle,
    span: usize,
}

/// What changed during one [`FakeContainer::mount`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountStats {
    pub reused: usize,
    pub created: usize,
    pub removed: usize,
}

pub struct FakeContainer {
    row_height: f32,
    next_handle: Cell<u64>,
    children: RefCell<Vec<MountedChild>>,
}

impl FakeContainer {
    pub fn new(row_height: f32) -> Rc<Self> {
        Rc::new(Self {
            row_height,
            next_handle: Cell::new(1),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Replaces the children with one per slot, reusing handles by key.
    pub fn mount<V>(&self, slots: &[Slot<V>]) -> MountStats {
        let mut previous: HashMap<SlotKey, ElementHandle> = self
            .children
            .borrow()
            .iter()
            .map(|child| (child.key, child.handle))
            .collect();
        let mut stats = MountStats::default();
        let mut next = Vec::with_capacity(slots.len());
        for slot in slots {
            let key = slot.key();
            let handle = match previous.remove(&key) {
                Some(handle) => {
                    stats.reused += 1;
                    handle
                }
                None => {
                    stats.created += 1;
                    self.mint()
                }
            };
            next.push(MountedChild {
                key,
                handle,
                span: slot.span(),
            });
        }
        stats.removed = previous.len();
        *self.children.borrow_mut() = next;
        log::trace!("mounted {} children: {stats:?}", slots.len());
        stats
    }

    /// Removes every child.
    pub fn clear(&self) {
        self.children.borrow_mut().clear();
    }

    pub fn handle_for(&self, key: SlotKey) -> Option<ElementHandle> {
        self.children
            .borrow()
            .iter()
            .find(|child| child.key == key)
            .map(|child| child.handle)
    }

    pub fn keys(&self) -> Vec<SlotKey> {
        self.children.borrow().iter().map(|child| child.key).collect()
    }

    /// Top and bottom edge of `element`, if it is mounted.
    pub fn bounds_of(&self, element: ElementHandle) -> Option<(f32, f32)> {
        let mut top = 0.0;
        for child in self.children.borrow().iter() {
            let height = child.span as f32 * self.row_height;
            if child.handle == element {
                return Some((top, top + height));
            }
            top += height;
        }
        None
    }

    pub fn content_height(&self) -> f32 {
        let spans: usize = self.children.borrow().iter().map(|child| child.span).sum();
        spans as f32 * self.row_height
    }

    fn mint(&self) -> ElementHandle {
        let raw = self.next_handle.get();
        self.next_handle.set(raw + 1);
        ElementHandle::new(raw)
    }
}

impl Container for FakeContainer {
    fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn child_at(&self, position: usize) -> Option<ElementHandle> {
        self.children.borrow().get(position).map(|child| child.handle)
    }

    fn is_connected(&self, element: ElementHandle) -> bool {
        self.children
            .borrow()
            .iter()
            .any(|child| child.handle == element)
    }
}

impl fmt::Debug for FakeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeContainer")
            .field("row_height", &self.row_height)
            .field("children", &self.keys())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/container_tests.rs"]
mod tests;
