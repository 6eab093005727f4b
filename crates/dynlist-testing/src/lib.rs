//! Testing utilities and harness for dynlist

pub mod container;
pub mod loader;
pub mod observer;
pub mod testing;

pub use container::{FakeContainer, MountStats};
pub use loader::ScriptedLoader;
pub use observer::{FakeObserver, FakeObserverPlatform, Viewport};
pub use testing::*;

pub mod prelude {
    pub use crate::container::*;
    pub use crate::loader::*;
    pub use crate::observer::*;
    pub use crate::testing::*;
}
