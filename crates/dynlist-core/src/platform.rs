//! Platform abstraction traits for dynlist runtime services.
//!
//! The list engine never drives frames itself. It asks the host to schedule
//! one through [`RuntimeScheduler`], which keeps the core independent of any
//! particular event loop.

/// Schedules work for the dynlist runtime.
///
/// Implementations are responsible for triggering frame processing on
/// behalf of the runtime. They must be safe to use from multiple threads
/// because wakers built on top of them may be cloned anywhere.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
