//! Lattice sites.
//!
//! A [`LatticeNode`] is a fixed point of the Potts lattice. It knows its
//! global index, its position, and the indices of the elements that currently
//! occupy it. Elements refer to nodes by index and nodes refer to elements by
//! index, so neither side owns the other.

#![forbid(unsafe_code)]

use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A lattice site.
///
/// The containing-element set is ordered, so iterating it visits elements in
/// ascending index order on every run.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::node::LatticeNode;
///
/// let mut node = LatticeNode::new(5, [1.0, 1.0]);
/// node.add_element(3);
/// node.add_element(1);
/// assert_eq!(node.containing_element_indices().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// assert!(!node.is_unoccupied());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeNode<const D: usize> {
    index: usize,
    location: Point<D>,
    is_boundary_node: bool,
    containing_elements: BTreeSet<usize>,
}

impl<const D: usize> LatticeNode<D> {
    /// Creates an unoccupied interior node.
    #[must_use]
    pub fn new(index: usize, location: impl Into<Point<D>>) -> Self {
        Self {
            index,
            location: location.into(),
            is_boundary_node: false,
            containing_elements: BTreeSet::new(),
        }
    }

    /// Creates an unoccupied node, flagging whether it lies on the domain boundary.
    #[must_use]
    pub fn with_boundary_flag(
        index: usize,
        location: impl Into<Point<D>>,
        is_boundary_node: bool,
    ) -> Self {
        Self {
            is_boundary_node,
            ..Self::new(index, location)
        }
    }

    /// Global index of the node.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Position of the node.
    #[must_use]
    pub const fn location(&self) -> &Point<D> {
        &self.location
    }

    /// Whether the node lies on the edge of the domain.
    #[must_use]
    pub const fn is_boundary_node(&self) -> bool {
        self.is_boundary_node
    }

    /// Indices of the elements currently containing this node.
    #[must_use]
    pub const fn containing_element_indices(&self) -> &BTreeSet<usize> {
        &self.containing_elements
    }

    /// Whether no element occupies this node (the node is medium).
    #[must_use]
    pub fn is_unoccupied(&self) -> bool {
        self.containing_elements.is_empty()
    }

    /// Whether element `element_index` contains this node.
    #[must_use]
    pub fn is_in_element(&self, element_index: usize) -> bool {
        self.containing_elements.contains(&element_index)
    }

    /// Records that element `element_index` now contains this node.
    pub fn add_element(&mut self, element_index: usize) {
        self.containing_elements.insert(element_index);
    }

    /// Records that element `element_index` no longer contains this node.
    /// Returns `true` if the element was listed.
    pub fn remove_element(&mut self, element_index: usize) -> bool {
        self.containing_elements.remove(&element_index)
    }

    /// Replaces the containing-element set. Used when elements are renumbered.
    pub(crate) fn set_containing_elements(&mut self, elements: BTreeSet<usize>) {
        self.containing_elements = elements;
    }
}
