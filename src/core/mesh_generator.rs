//! Rectangular lattice construction.
//!
//! [`PottsMeshGenerator`] lays out `nodes_across × nodes_up` unit-spaced sites
//! and carves `elements_across × elements_up` rectangular elements of
//! `element_width × element_height` sites out of them. The block of elements
//! is centred on the lattice unless `start_at_bottom_left` is set.
//!
//! # Examples
//!
//! ```rust
//! use cellular_potts::core::mesh_generator::PottsMeshGeneratorBuilder;
//!
//! let generator = PottsMeshGeneratorBuilder::default()
//!     .nodes_across(4)
//!     .elements_across(1)
//!     .element_width(2)
//!     .nodes_up(4)
//!     .elements_up(2)
//!     .element_height(2)
//!     .build()
//!     .unwrap();
//! let mesh = generator.generate().unwrap();
//! assert_eq!(mesh.num_nodes(), 16);
//! assert_eq!(mesh.element(0).unwrap().node_indices(), &[1, 2, 5, 6]);
//! assert_eq!(mesh.element(1).unwrap().node_indices(), &[9, 10, 13, 14]);
//! ```

#![forbid(unsafe_code)]

use super::mesh::{MeshError, PottsMesh};
use super::node::LatticeNode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while generating a lattice.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// The requested block of elements is wider or taller than the lattice.
    #[error(
        "Elements do not fit along {axis}: {required} sites required, {available} available"
    )]
    ElementsDoNotFit {
        /// `"x"` or `"y"`.
        axis: &'static str,
        /// Sites the elements need.
        required: usize,
        /// Sites the lattice has.
        available: usize,
    },
    /// Mesh assembly failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Configuration of a rectangular Potts lattice.
#[derive(Builder, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PottsMeshGenerator {
    /// Sites along x.
    nodes_across: usize,
    /// Elements along x.
    elements_across: usize,
    /// Sites per element along x.
    element_width: usize,
    /// Sites along y.
    nodes_up: usize,
    /// Elements along y.
    elements_up: usize,
    /// Sites per element along y.
    element_height: usize,
    /// Place the block of elements at the origin instead of centring it.
    #[builder(default)]
    start_at_bottom_left: bool,
}

impl PottsMeshGeneratorBuilder {
    fn validate(&self) -> Result<(), String> {
        match (self.nodes_across, self.nodes_up) {
            (Some(0), _) | (_, Some(0)) => {
                Err("lattice must have at least one site along each axis".to_owned())
            }
            _ => Ok(()),
        }
    }
}

impl PottsMeshGenerator {
    /// Generator for a centred block of elements.
    #[must_use]
    pub const fn new(
        nodes_across: usize,
        elements_across: usize,
        element_width: usize,
        nodes_up: usize,
        elements_up: usize,
        element_height: usize,
    ) -> Self {
        Self {
            nodes_across,
            elements_across,
            element_width,
            nodes_up,
            elements_up,
            element_height,
            start_at_bottom_left: false,
        }
    }

    /// Sites along x.
    #[must_use]
    pub const fn nodes_across(&self) -> usize {
        self.nodes_across
    }

    /// Sites along y.
    #[must_use]
    pub const fn nodes_up(&self) -> usize {
        self.nodes_up
    }

    fn margin(
        axis: &'static str,
        available: usize,
        count: usize,
        size: usize,
        at_origin: bool,
    ) -> Result<usize, GeneratorError> {
        let required = count * size;
        if required > available {
            return Err(GeneratorError::ElementsDoNotFit {
                axis,
                required,
                available,
            });
        }
        Ok(if at_origin { 0 } else { (available - required) / 2 })
    }

    /// Builds the lattice.
    ///
    /// Site `(x, y)` has global index `y·nodes_across + x` and sits at
    /// position `(x, y)`; sites on the outer ring are flagged as boundary
    /// nodes. Elements are numbered row-major from the bottom-left and each
    /// element lists its sites row-major.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::ElementsDoNotFit`] when the elements need
    /// more sites than the lattice has along either axis.
    pub fn generate(&self) -> Result<PottsMesh<2>, GeneratorError> {
        let x0 = Self::margin(
            "x",
            self.nodes_across,
            self.elements_across,
            self.element_width,
            self.start_at_bottom_left,
        )?;
        let y0 = Self::margin(
            "y",
            self.nodes_up,
            self.elements_up,
            self.element_height,
            self.start_at_bottom_left,
        )?;

        let mut nodes = Vec::with_capacity(self.nodes_across * self.nodes_up);
        for y in 0..self.nodes_up {
            for x in 0..self.nodes_across {
                let on_boundary =
                    x == 0 || y == 0 || x + 1 == self.nodes_across || y + 1 == self.nodes_up;
                #[allow(clippy::cast_precision_loss)]
                let location = [x as f64, y as f64];
                nodes.push(LatticeNode::with_boundary_flag(
                    y * self.nodes_across + x,
                    location,
                    on_boundary,
                ));
            }
        }

        let mut element_nodes = Vec::with_capacity(self.elements_across * self.elements_up);
        for ey in 0..self.elements_up {
            for ex in 0..self.elements_across {
                let left = x0 + ex * self.element_width;
                let bottom = y0 + ey * self.element_height;
                let sites: Vec<usize> = (bottom..bottom + self.element_height)
                    .flat_map(|y| (left..left + self.element_width).map(move |x| y * self.nodes_across + x))
                    .collect();
                element_nodes.push(sites);
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            elements = element_nodes.len(),
            "generated Potts lattice"
        );
        Ok(PottsMesh::new(nodes, &element_nodes)?)
    }
}
