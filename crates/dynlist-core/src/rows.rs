//! Indexable, cheaply clonable view over caller row data.

use std::fmt;
use std::ops::Index;
use std::rc::Rc;

/// Materialized row data.
///
/// Any iterable is collected once into shared storage; clones share it.
/// Two sequences are the *same reference* only if they share storage, which
/// is how the controller tells "rows changed" apart from "rows re-rendered".
pub struct RowSequence<R> {
    rows: Rc<[R]>,
}

impl<R> RowSequence<R> {
    pub fn empty() -> Self {
        Self {
            rows: Rc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn same_rows(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.rows, &other.rows)
    }
}

impl<R: Clone> RowSequence<R> {
    /// Returns a new sequence holding these rows followed by `more`.
    ///
    /// Indices already assigned keep their meaning.
    pub fn appended(&self, more: impl IntoIterator<Item = R>) -> Self {
        self.iter().cloned().chain(more).collect()
    }
}

impl<R> Clone for RowSequence<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Rc::clone(&self.rows),
        }
    }
}

impl<R> Default for RowSequence<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> FromIterator<R> for RowSequence<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<R> From<Vec<R>> for RowSequence<R> {
    fn from(rows: Vec<R>) -> Self {
        Self { rows: rows.into() }
    }
}

impl<R> Index<usize> for RowSequence<R> {
    type Output = R;

    fn index(&self, index: usize) -> &R {
        &self.rows[index]
    }
}

impl<R: fmt::Debug> fmt::Debug for RowSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}
