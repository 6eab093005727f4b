//! Plain configuration for a dynamic list.

use crate::error::SpecError;
use crate::observation::ObserverOptions;

/// Render-distance margin used when none is configured, in client-area units.
pub const DEFAULT_PADDING: f32 = 400.0;
/// Number of prefetch slots appended while more data may exist.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Fan-out of the partition tree.
pub const DEFAULT_BRANCH: usize = 5;

/// Tuning knobs for a [`ListController`](crate::ListController).
///
/// # Example
///
/// ```rust
/// use dynlist_core::DynamicListSpec;
///
/// let spec = DynamicListSpec::default().page_size(5).branch(3);
/// assert_eq!(spec.root_size(), Ok(9));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicListSpec {
    pub page_size: usize,
    pub branch: usize,
    pub padding: f32,
}

impl Default for DynamicListSpec {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            branch: DEFAULT_BRANCH,
            padding: DEFAULT_PADDING,
        }
    }
}

impl DynamicListSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn branch(mut self, branch: usize) -> Self {
        self.branch = branch;
        self
    }

    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Capacity of one root partition: `branch^(branch-1)`.
    pub fn root_size(&self) -> Result<usize, SpecError> {
        if self.branch < 2 {
            return Err(SpecError::BranchTooSmall {
                branch: self.branch,
            });
        }
        let exponent = u32::try_from(self.branch - 1)
            .map_err(|_| SpecError::RootOverflow { branch: self.branch })?;
        self.branch
            .checked_pow(exponent)
            .ok_or(SpecError::RootOverflow { branch: self.branch })
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        self.root_size().map(|_| ())
    }

    /// Options the tracker creates its observer with.
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions::with_margin(self.padding)
    }
}

#[cfg(test)]
#[path = "tests/spec_tests.rs"]
mod tests;
