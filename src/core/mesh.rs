//! The Potts mesh: an arena of lattice nodes and an arena of elements.
//!
//! Nodes are created once and never move. Elements are addressed by their
//! position in the element table. Retiring an element tombstones it
//! ([`PottsMesh::delete_element`]) so that indices held elsewhere stay valid;
//! [`PottsMesh::compact`] later squeezes tombstones out and reports the
//! renumbering as an [`ElementIndexMap`].
//!
//! # Invariant
//!
//! Node `n` lists element `e` in its containing set if and only if element
//! `e` lists node `n`. Every mutator on this type preserves that.

#![forbid(unsafe_code)]

use super::collections::ElementIndexBuffer;
use super::element::{ElementError, PottsElement};
use super::node::LatticeNode;
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised by mesh lookups and mutations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeshError {
    /// A node index past the end of the node table.
    #[error("Node index {index} out of range (mesh has {num_nodes} nodes)")]
    NodeIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of nodes in the mesh.
        num_nodes: usize,
    },
    /// An element index past the end of the element table.
    #[error("Element index {index} out of range (mesh has {num_elements} element slots)")]
    ElementIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of element slots, deleted ones included.
        num_elements: usize,
    },
    /// The element has been retired.
    #[error("Element {index} has been deleted")]
    ElementDeleted {
        /// The requested index.
        index: usize,
    },
    /// A coordinate axis the mesh does not have.
    #[error("Dimension {dimension} out of range for a {mesh_dimension}D mesh")]
    DimensionOutOfRange {
        /// The requested axis.
        dimension: usize,
        /// The mesh dimension.
        mesh_dimension: usize,
    },
    /// Node table entries must carry their own position as index.
    #[error("Node at position {position} carries index {index}")]
    NodeIndexMismatch {
        /// Position in the node table.
        position: usize,
        /// Index stored on the node.
        index: usize,
    },
    /// An element-level failure.
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Old-to-new element index mapping produced by [`PottsMesh::compact`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementIndexMap {
    new_indices: Vec<Option<usize>>,
}

impl ElementIndexMap {
    /// The identity mapping over `num_elements` slots.
    #[must_use]
    pub fn identity(num_elements: usize) -> Self {
        Self {
            new_indices: (0..num_elements).map(Some).collect(),
        }
    }

    /// Number of old slots covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.new_indices.len()
    }

    /// Whether the mapping covers no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_indices.is_empty()
    }

    /// New index of old element `old`, or `None` if it was deleted or unknown.
    #[must_use]
    pub fn new_index(&self, old: usize) -> Option<usize> {
        self.new_indices.get(old).copied().flatten()
    }

    /// Whether old element `old` was removed by the compaction.
    #[must_use]
    pub fn is_deleted(&self, old: usize) -> bool {
        matches!(self.new_indices.get(old), Some(None))
    }

    /// Whether every slot maps to itself.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.new_indices
            .iter()
            .enumerate()
            .all(|(old, new)| *new == Some(old))
    }
}

/// Lattice nodes together with the elements partitioning them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PottsMesh<const D: usize> {
    nodes: Vec<LatticeNode<D>>,
    elements: Vec<PottsElement<D>>,
}

impl<const D: usize> PottsMesh<D> {
    /// Builds a mesh from `nodes` and one site list per element.
    ///
    /// Element `i` is created with index `i` and registered with its sites.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NodeIndexMismatch`] if a node's index differs from
    /// its position, or [`MeshError::NodeIndexOutOfRange`] if an element lists
    /// a node that does not exist.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::core::{mesh::PottsMesh, node::LatticeNode};
    ///
    /// let nodes = (0..4).map(|i| LatticeNode::new(i, [(i % 2) as f64, (i / 2) as f64])).collect();
    /// let mesh: PottsMesh<2> = PottsMesh::new(nodes, &[vec![0, 1], vec![2, 3]]).unwrap();
    /// assert_eq!(mesh.num_elements(), 2);
    /// assert!(mesh.node(3).unwrap().is_in_element(1));
    /// ```
    pub fn new(nodes: Vec<LatticeNode<D>>, element_nodes: &[Vec<usize>]) -> Result<Self, MeshError> {
        if let Some((position, node)) = nodes
            .iter()
            .enumerate()
            .find(|(position, node)| node.index() != *position)
        {
            return Err(MeshError::NodeIndexMismatch {
                position,
                index: node.index(),
            });
        }

        let mut mesh = Self {
            nodes,
            elements: Vec::with_capacity(element_nodes.len()),
        };
        for (index, site_list) in element_nodes.iter().enumerate() {
            mesh.elements.push(PottsElement::new(index));
            for &node in site_list {
                mesh.add_node_to_element(node, index)?;
            }
        }
        Ok(mesh)
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of active (non-deleted) elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.elements.iter().filter(|e| !e.is_deleted()).count()
    }

    /// Number of element slots, deleted ones included.
    #[must_use]
    pub fn num_all_elements(&self) -> usize {
        self.elements.len()
    }

    /// The node table.
    #[must_use]
    pub fn nodes(&self) -> &[LatticeNode<D>] {
        &self.nodes
    }

    /// Node `index`, if it exists.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&LatticeNode<D>> {
        self.nodes.get(index)
    }

    /// Element slot `index` (active or deleted), if it exists.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&PottsElement<D>> {
        self.elements.get(index)
    }

    /// All element slots, deleted ones included.
    #[must_use]
    pub fn all_elements(&self) -> &[PottsElement<D>] {
        &self.elements
    }

    /// Iterator over active elements in index order.
    pub fn elements(&self) -> impl Iterator<Item = &PottsElement<D>> {
        self.elements.iter().filter(|e| !e.is_deleted())
    }

    fn check_node(&self, index: usize) -> Result<(), MeshError> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(MeshError::NodeIndexOutOfRange {
                index,
                num_nodes: self.nodes.len(),
            })
        }
    }

    /// Looks up an active element.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ElementIndexOutOfRange`] or
    /// [`MeshError::ElementDeleted`].
    pub fn active_element(&self, index: usize) -> Result<&PottsElement<D>, MeshError> {
        let element = self
            .elements
            .get(index)
            .ok_or(MeshError::ElementIndexOutOfRange {
                index,
                num_elements: self.elements.len(),
            })?;
        if element.is_deleted() {
            return Err(MeshError::ElementDeleted { index });
        }
        Ok(element)
    }

    /// Extent of the node positions along axis `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DimensionOutOfRange`] if `dimension >= D`.
    pub fn width(&self, dimension: usize) -> Result<f64, MeshError> {
        if dimension >= D {
            return Err(MeshError::DimensionOutOfRange {
                dimension,
                mesh_dimension: D,
            });
        }
        let mut coords = self.nodes.iter().map(|n| n.location()[dimension]);
        let Some(first) = coords.next() else {
            return Ok(0.0);
        };
        let (min, max) = coords.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));
        Ok(max - min)
    }

    /// Mean position of an active element's sites.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for a missing or deleted element, or
    /// [`ElementError::Empty`] for an element with no sites.
    pub fn centroid_of_element(&self, index: usize) -> Result<Point<D>, MeshError> {
        Ok(self.active_element(index)?.centroid(&self.nodes)?)
    }

    /// Adds node `node` to active element `element`. Returns `false` if the
    /// element already contained it.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for a missing node or a missing/deleted element.
    pub fn add_node_to_element(&mut self, node: usize, element: usize) -> Result<bool, MeshError> {
        self.check_node(node)?;
        self.active_element(element)?;
        Ok(self.elements[element].add_node(&mut self.nodes[node]))
    }

    /// Removes node `node` from element `element`. Returns whether the element
    /// contained it.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for a missing node or element.
    pub fn remove_node_from_element(&mut self, node: usize, element: usize) -> Result<bool, MeshError> {
        self.check_node(node)?;
        let num_elements = self.elements.len();
        let slot = self
            .elements
            .get_mut(element)
            .ok_or(MeshError::ElementIndexOutOfRange {
                index: element,
                num_elements,
            })?;
        Ok(slot.delete_node(&mut self.nodes[node]))
    }

    /// Moves node `node` out of every element containing it and into active
    /// element `target`. Returns the elements it was removed from, in
    /// ascending index order.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for a missing node or a missing/deleted target.
    /// The mesh is unchanged on error.
    pub fn reassign_node(&mut self, node: usize, target: usize) -> Result<ElementIndexBuffer, MeshError> {
        self.check_node(node)?;
        self.active_element(target)?;

        let previous: ElementIndexBuffer = self.nodes[node]
            .containing_element_indices()
            .iter()
            .copied()
            .collect();
        for &element in &previous {
            self.elements[element].delete_node(&mut self.nodes[node]);
        }
        self.elements[target].add_node(&mut self.nodes[node]);
        Ok(previous)
    }

    /// Tombstones element `index`, releasing its sites.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ElementIndexOutOfRange`] for an unknown index.
    /// Deleting an already deleted element is a no-op.
    pub fn delete_element(&mut self, index: usize) -> Result<(), MeshError> {
        let num_elements = self.elements.len();
        let element = self
            .elements
            .get_mut(index)
            .ok_or(MeshError::ElementIndexOutOfRange { index, num_elements })?;
        element.mark_as_deleted(&mut self.nodes);
        Ok(())
    }

    /// Removes all tombstoned elements, renumbering the survivors in order
    /// and rewriting every node's containing set.
    pub fn compact(&mut self) -> ElementIndexMap {
        let mut new_indices = Vec::with_capacity(self.elements.len());
        let mut next = 0;
        for element in &self.elements {
            if element.is_deleted() {
                new_indices.push(None);
            } else {
                new_indices.push(Some(next));
                next += 1;
            }
        }
        let map = ElementIndexMap { new_indices };
        if map.is_identity() {
            return map;
        }

        self.elements.retain(|e| !e.is_deleted());
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.set_index(index);
        }
        for node in &mut self.nodes {
            let renumbered: BTreeSet<usize> = node
                .containing_element_indices()
                .iter()
                .filter_map(|&old| map.new_index(old))
                .collect();
            node.set_containing_elements(renumbered);
        }
        map
    }
}

impl PottsMesh<2> {
    /// Aspect ratio of active element `index`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error, or [`ElementError::Geometry`] for collinear sites.
    pub fn element_aspect_ratio(&self, index: usize) -> Result<f64, MeshError> {
        Ok(self.active_element(index)?.aspect_ratio(&self.nodes)?)
    }
}
