//! Contract between the list and whoever owns the paged data source.

use std::future::Future;
use std::pin::Pin;

use crate::error::LoadError;

/// Future returned by [`LoadCooperator::load_more`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<(), LoadError>> + 'static>>;

/// Drives incremental loading for a list.
///
/// `load_more` is only ever called while no previous load is outstanding.
/// Rows it produces reach the list through
/// [`ListController::on_data_changed`](crate::ListController::on_data_changed);
/// the future only reports completion or failure.
pub trait LoadCooperator {
    /// Whether another page may exist.
    fn has_more(&self) -> bool;

    /// Starts loading the next page.
    fn load_more(&self) -> LoadFuture;

    /// Called whenever the observed visible range changes. Never called
    /// before something has been observed.
    fn on_visibility_change(&self, _min: usize, _max: usize) {}
}
