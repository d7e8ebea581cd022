//! Potts elements: the set of lattice sites occupied by one cell.
//!
//! An element stores the global indices of its sites in insertion order. The
//! order has no geometric meaning; it only makes iteration deterministic.
//! Elements are never physically removed during a sweep: retiring one flips
//! its [`ElementState`] to `Deleted` so that every other index stays valid.

#![forbid(unsafe_code)]

use super::node::LatticeNode;
use crate::geometry::{
    point::Point,
    quality::{QualityError, aspect_ratio},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by element-level queries.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ElementError {
    /// The element lists a node that is not present in the supplied node table.
    #[error("Element {element} references node {node} which is not in the node table")]
    NodeNotFound {
        /// Index of the element.
        element: usize,
        /// Global index of the missing node.
        node: usize,
    },
    /// The element has no sites.
    #[error("Element {element} has no sites")]
    Empty {
        /// Index of the element.
        element: usize,
    },
    /// The shape computation is undefined for the element's sites.
    #[error("Shape computation failed for element {element}: {source}")]
    Geometry {
        /// Index of the element.
        element: usize,
        /// The geometric failure.
        #[source]
        source: QualityError,
    },
}

/// Lifecycle state of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// The element takes part in the simulation.
    #[default]
    Active,
    /// The element has been retired but keeps its slot so indices stay stable.
    Deleted,
}

/// The sites occupied by one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PottsElement<const D: usize> {
    index: usize,
    nodes: Vec<usize>,
    state: ElementState,
}

impl<const D: usize> PottsElement<D> {
    /// Creates an empty, active element with the given index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            nodes: Vec::new(),
            state: ElementState::Active,
        }
    }

    /// Creates an element over `nodes`, registering it with each of them.
    pub fn with_nodes<'a, I>(index: usize, nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a mut LatticeNode<D>>,
    {
        let mut element = Self::new(index);
        for node in nodes {
            element.add_node(node);
        }
        element
    }

    /// Index of the element in its mesh.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Number of sites the element occupies (its volume).
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Global indices of the occupied sites, in insertion order.
    #[must_use]
    pub fn node_indices(&self) -> &[usize] {
        &self.nodes
    }

    /// Global index of the site at `local_index`.
    #[must_use]
    pub fn node_global_index(&self, local_index: usize) -> Option<usize> {
        self.nodes.get(local_index).copied()
    }

    /// Position of global node `global_index` within this element.
    #[must_use]
    pub fn node_local_index(&self, global_index: usize) -> Option<usize> {
        self.nodes.iter().position(|&n| n == global_index)
    }

    /// Whether the element occupies node `global_index`.
    #[must_use]
    pub fn contains_node(&self, global_index: usize) -> bool {
        self.nodes.contains(&global_index)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ElementState {
        self.state
    }

    /// Whether the element has been retired.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self.state, ElementState::Deleted)
    }

    /// Retires the element, releasing every site it holds.
    pub fn mark_as_deleted(&mut self, nodes: &mut [LatticeNode<D>]) {
        for &global in &self.nodes {
            if let Some(node) = nodes.get_mut(global) {
                node.remove_element(self.index);
            }
        }
        self.nodes.clear();
        self.state = ElementState::Deleted;
    }

    /// Appends `node` to the element and records the element on the node.
    /// Returns `false`, leaving both sides untouched, if the element already
    /// contains the node.
    ///
    /// No adjacency check is made; the caller keeps elements topologically
    /// sensible.
    pub fn add_node(&mut self, node: &mut LatticeNode<D>) -> bool {
        if self.contains_node(node.index()) {
            return false;
        }
        node.add_element(self.index);
        self.nodes.push(node.index());
        true
    }

    /// Removes `node` from the element and the element from the node.
    /// Returns `false` if the element did not contain the node.
    pub fn delete_node(&mut self, node: &mut LatticeNode<D>) -> bool {
        match self.node_local_index(node.index()) {
            Some(local) => {
                self.nodes.remove(local);
                node.remove_element(self.index);
                true
            }
            None => false,
        }
    }

    /// Positions of the element's sites, looked up in `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::NodeNotFound`] if a listed site is missing.
    pub fn node_locations(&self, nodes: &[LatticeNode<D>]) -> Result<Vec<Point<D>>, ElementError> {
        self.nodes
            .iter()
            .map(|&global| {
                nodes
                    .get(global)
                    .map(|node| *node.location())
                    .ok_or(ElementError::NodeNotFound {
                        element: self.index,
                        node: global,
                    })
            })
            .collect()
    }

    /// Mean position of the element's sites.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Empty`] for an element with no sites, or
    /// [`ElementError::NodeNotFound`] if a listed site is missing.
    pub fn centroid(&self, nodes: &[LatticeNode<D>]) -> Result<Point<D>, ElementError> {
        let locations = self.node_locations(nodes)?;
        Point::mean(&locations).ok_or(ElementError::Empty {
            element: self.index,
        })
    }
}

impl PottsElement<2> {
    /// Aspect ratio of the element: the ratio of the major to the minor
    /// eigenvalue of its sites' position covariance.
    ///
    /// Only defined in two dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Geometry`] wrapping
    /// [`QualityError::DegenerateGeometry`] when the sites are collinear, or
    /// [`QualityError::NegativeEigenvalue`] on a numerical failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::core::{element::PottsElement, node::LatticeNode};
    ///
    /// let mut nodes: Vec<LatticeNode<2>> = (0..3)
    ///     .map(|i| LatticeNode::new(i, [i as f64, 0.0]))
    ///     .collect();
    /// let element = PottsElement::with_nodes(0, nodes.iter_mut());
    /// assert!(element.aspect_ratio(&nodes).is_err());
    /// ```
    pub fn aspect_ratio(&self, nodes: &[LatticeNode<2>]) -> Result<f64, ElementError> {
        let locations = self.node_locations(nodes)?;
        aspect_ratio(&locations).map_err(|source| ElementError::Geometry {
            element: self.index,
            source,
        })
    }
}
