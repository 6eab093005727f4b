//! Recursive k-ary partition of the index space.
//!
//! Nodes are never allocated: a node is just the `(offset, size)` range it
//! covers, and its children are computed arithmetically on demand. The root
//! capacity is fixed at `branch^(branch-1)`; longer lists are covered by a
//! forest of equally sized roots laid end to end. Because neither the root
//! size nor the partition rule depends on the data length, an index always
//! resolves to the same path, so appending rows never reshapes the part of
//! the tree that was already rendered.

use std::ops::Range;

use crate::error::SpecError;
use crate::spec::DynamicListSpec;

/// Answers "is `[start, end)` near the viewport".
pub trait VisibilityCheck {
    fn is_visible(&self, start: usize, end: usize) -> bool;
}

impl<F> VisibilityCheck for F
where
    F: Fn(usize, usize) -> bool,
{
    fn is_visible(&self, start: usize, end: usize) -> bool {
        self(start, end)
    }
}

/// A node of the partition, identified purely by the range it covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartitionNode {
    Leaf { index: usize },
    Internal { offset: usize, size: usize },
}

impl PartitionNode {
    /// Builds the node covering `[offset, offset + size)`. `size` must be non-zero.
    pub fn new(offset: usize, size: usize) -> Self {
        debug_assert!(size > 0, "partition nodes cover at least one index");
        if size == 1 {
            PartitionNode::Leaf { index: offset }
        } else {
            PartitionNode::Internal { offset, size }
        }
    }

    pub fn offset(&self) -> usize {
        match *self {
            PartitionNode::Leaf { index } => index,
            PartitionNode::Internal { offset, .. } => offset,
        }
    }

    pub fn size(&self) -> usize {
        match *self {
            PartitionNode::Leaf { .. } => 1,
            PartitionNode::Internal { size, .. } => size,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset()..self.offset() + self.size()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PartitionNode::Leaf { .. })
    }

    /// Splits the node into at most `branch` contiguous children, in index
    /// order. Leading children absorb the remainder; a leaf has no children.
    pub fn children(&self, branch: usize) -> Children {
        match *self {
            PartitionNode::Leaf { index } => Children::empty(index),
            PartitionNode::Internal { offset, size } => Children {
                next_offset: offset,
                base: size / branch,
                remainder: size % branch,
                position: 0,
                branch,
            },
        }
    }
}

/// Iterator over a node's children. See [`PartitionNode::children`].
#[derive(Clone, Debug)]
pub struct Children {
    next_offset: usize,
    base: usize,
    remainder: usize,
    position: usize,
    branch: usize,
}

impl Children {
    fn empty(offset: usize) -> Self {
        Self {
            next_offset: offset,
            base: 0,
            remainder: 0,
            position: 0,
            branch: 0,
        }
    }
}

impl Iterator for Children {
    type Item = PartitionNode;

    fn next(&mut self) -> Option<PartitionNode> {
        if self.position >= self.branch {
            return None;
        }
        let size = self.base + usize::from(self.position < self.remainder);
        if size == 0 {
            // Only trailing children can be empty.
            self.position = self.branch;
            return None;
        }
        let node = PartitionNode::new(self.next_offset, size);
        self.next_offset += size;
        self.position += 1;
        Some(node)
    }
}

/// One piece of rendered output. Each slot becomes exactly one direct child
/// of the host container, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot<V> {
    /// A materialized row.
    Row { index: usize, content: Option<V> },
    /// A prefetch-frontier slot past the end of the known data.
    Loading { index: usize, content: Option<V> },
    /// A collapsed subtree reserving space for `span` indices.
    Dummy {
        offset: usize,
        span: usize,
        content: Option<V>,
    },
}

/// Identity of a slot across renders, suitable as a reconciliation key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotKey {
    Row(usize),
    Loading(usize),
    Dummy { offset: usize, span: usize },
}

impl<V> Slot<V> {
    pub fn offset(&self) -> usize {
        match *self {
            Slot::Row { index, .. } | Slot::Loading { index, .. } => index,
            Slot::Dummy { offset, .. } => offset,
        }
    }

    /// Number of indices this slot stands for.
    pub fn span(&self) -> usize {
        match *self {
            Slot::Row { .. } | Slot::Loading { .. } => 1,
            Slot::Dummy { span, .. } => span,
        }
    }

    pub fn key(&self) -> SlotKey {
        match *self {
            Slot::Row { index, .. } => SlotKey::Row(index),
            Slot::Loading { index, .. } => SlotKey::Loading(index),
            Slot::Dummy { offset, span, .. } => SlotKey::Dummy { offset, span },
        }
    }

    pub fn content(&self) -> Option<&V> {
        match self {
            Slot::Row { content, .. }
            | Slot::Loading { content, .. }
            | Slot::Dummy { content, .. } => content.as_ref(),
        }
    }

    pub fn is_row(&self) -> bool {
        matches!(self, Slot::Row { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading { .. })
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Slot::Dummy { .. })
    }
}

/// Index span covered by one container child.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotSpan {
    pub offset: usize,
    pub span: usize,
}

impl SlotSpan {
    pub fn end(&self) -> usize {
        self.offset + self.span
    }
}

/// Maps container child positions to the index ranges they cover, as of the
/// last render. Spans are sorted and never overlap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotLayout {
    spans: Vec<SlotSpan>,
}

impl SlotLayout {
    pub fn from_slots<V>(slots: &[Slot<V>]) -> Self {
        Self {
            spans: slots
                .iter()
                .map(|slot| SlotSpan {
                    offset: slot.offset(),
                    span: slot.span(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[SlotSpan] {
        &self.spans
    }

    /// Index range covered by the child at `position`. Positions the layout
    /// does not know about map to themselves.
    pub fn covered(&self, position: usize) -> Range<usize> {
        match self.spans.get(position) {
            Some(span) => span.offset..span.end(),
            None => position..position + 1,
        }
    }

    /// Child positions whose spans intersect `[start, end)`. Without a
    /// layout the mapping is the identity.
    pub fn positions_for(&self, start: usize, end: usize) -> Range<usize> {
        if self.spans.is_empty() {
            return start..end;
        }
        let first = self.spans.partition_point(|span| span.end() <= start);
        let last = self.spans.partition_point(|span| span.offset < end);
        first..last.max(first)
    }
}

/// Inputs of one render pass over the tree.
pub struct RenderPass<'a, V> {
    pub visibility: &'a dyn VisibilityCheck,
    pub row: &'a mut dyn FnMut(usize) -> Option<V>,
    pub loading: Option<&'a V>,
    pub dummy: Option<&'a V>,
    /// Number of rows backed by data.
    pub data_len: usize,
    /// `data_len` plus any prefetch-frontier slots.
    pub rendered_len: usize,
}

/// The partition tree for a fixed branch factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowTree {
    branch: usize,
    root_size: usize,
}

impl WindowTree {
    pub fn new(spec: &DynamicListSpec) -> Result<Self, SpecError> {
        Ok(Self {
            branch: spec.branch,
            root_size: spec.root_size()?,
        })
    }

    pub fn with_branch(branch: usize) -> Result<Self, SpecError> {
        Self::new(&DynamicListSpec::default().branch(branch))
    }

    pub fn branch(&self) -> usize {
        self.branch
    }

    pub fn root_size(&self) -> usize {
        self.root_size
    }

    /// Roots needed to cover `len` indices.
    pub fn roots(&self, len: usize) -> impl Iterator<Item = PartitionNode> {
        let root_size = self.root_size;
        let count = len.div_ceil(root_size);
        (0..count).map(move |k| PartitionNode::new(k * root_size, root_size))
    }

    /// Renders every root needed for `pass.rendered_len`, in index order.
    pub fn render<V: Clone>(&self, pass: &mut RenderPass<'_, V>) -> Vec<Slot<V>> {
        let mut out = Vec::new();
        for root in self.roots(pass.rendered_len) {
            self.render_node(root, pass, &mut out);
        }
        out
    }

    /// Renders the subtree rooted at `node`, appending its slots to `out`.
    pub fn render_node<V: Clone>(
        &self,
        node: PartitionNode,
        pass: &mut RenderPass<'_, V>,
        out: &mut Vec<Slot<V>>,
    ) {
        let offset = node.offset();
        if offset >= pass.rendered_len {
            return;
        }
        let size = node.size();
        if !pass.visibility.is_visible(offset, offset + size) {
            out.push(Slot::Dummy {
                offset,
                span: size.min(pass.rendered_len - offset),
                content: pass.dummy.cloned(),
            });
            return;
        }
        match node {
            PartitionNode::Leaf { index } => {
                if index < pass.data_len {
                    let content = (pass.row)(index);
                    out.push(Slot::Row { index, content });
                } else {
                    out.push(Slot::Loading {
                        index,
                        content: pass.loading.cloned(),
                    });
                }
            }
            PartitionNode::Internal { .. } => {
                for child in node.children(self.branch) {
                    self.render_node(child, pass, out);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/window_tree_tests.rs"]
mod tests;
