#![doc = r"Tree-partitioned windowing engine for very large, paged lists."]

pub mod collections;
pub mod controller;
pub mod error;
pub mod load;
pub mod observation;
mod pagination;
pub mod platform;
pub mod rows;
pub mod runtime;
pub mod spec;
pub mod visibility;
pub mod window_tree;

pub use controller::{ListController, ListControllerBuilder, Placeholders, RenderedList};
pub use error::{ListError, LoadError, SpecError};
pub use load::{LoadCooperator, LoadFuture};
pub use observation::{
    Container, ContainerRef, ElementHandle, ObservationEntry, ObserverOptions, ObserverPlatform,
    VisibilityObserver,
};
pub use platform::RuntimeScheduler;
pub use rows::RowSequence;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use spec::{DynamicListSpec, DEFAULT_BRANCH, DEFAULT_PADDING, DEFAULT_PAGE_SIZE};
pub use visibility::{VisibilityRange, VisibilityTracker};
pub use window_tree::{
    Children, PartitionNode, RenderPass, Slot, SlotKey, SlotLayout, SlotSpan, VisibilityCheck,
    WindowTree,
};

#[cfg(test)]
pub use runtime::TestRuntime;
