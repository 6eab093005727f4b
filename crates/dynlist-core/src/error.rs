use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// Configuration rejected by [`DynamicListSpec::validate`](crate::DynamicListSpec::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    BranchTooSmall { branch: usize },
    RootOverflow { branch: usize },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::BranchTooSmall { branch } => {
                write!(f, "branch factor {branch} is too small; expected at least 2")
            }
            SpecError::RootOverflow { branch } => {
                write!(f, "root partition size {branch}^{} overflows usize", branch - 1)
            }
        }
    }
}

impl Error for SpecError {}

#[derive(Debug)]
struct LoadMessage(String);

impl fmt::Display for LoadMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for LoadMessage {}

/// Failure reported by a load cooperator's `load_more`.
///
/// Cloning is cheap: the underlying error is shared so that it can be stored
/// by the controller and re-raised on every render until it is reset.
#[derive(Clone)]
pub struct LoadError {
    inner: Rc<dyn Error + 'static>,
}

impl LoadError {
    pub fn new(err: impl Error + 'static) -> Self {
        Self {
            inner: Rc::new(err),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(LoadMessage(message.into()))
    }

    pub fn get_ref(&self) -> &(dyn Error + 'static) {
        &*self.inner
    }

    /// Attempts to view the wrapped error as a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Whether both values wrap the very same failure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadError").field(&self.inner).finish()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source()
    }
}

/// Failure surfaced by [`ListController::render`](crate::ListController::render).
#[derive(Debug, Clone)]
pub enum ListError {
    LoadFailed(LoadError),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::LoadFailed(err) => write!(f, "loading more rows failed: {err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ListError::LoadFailed(err) => Some(err),
        }
    }
}

impl From<LoadError> for ListError {
    fn from(err: LoadError) -> Self {
        ListError::LoadFailed(err)
    }
}
