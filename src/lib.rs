//! # cellular-potts
//!
//! Core data structures of a two-dimensional Cellular Potts Model: a lattice
//! of sites partitioned into elements, a population pairing every active
//! element with exactly one cell, and the Hamiltonian terms a Monte Carlo
//! stepper uses to score a proposed site copy.
//!
//! # Features
//!
//! - Rectangular lattices with Moore or von Neumann neighbourhoods
//! - Element↔cell bookkeeping with explicit validation
//! - Dead-cell removal with tombstoned or re-indexed element retirement
//! - Volume constraint, adhesion and differential (label-dependent) adhesion rules
//! - Seedable simulation context passed explicitly, never global
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use cellular_potts::prelude::*;
//!
//! // 4×4 lattice holding two 2×2 elements stacked vertically.
//! let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
//! assert_eq!(mesh.num_nodes(), 16);
//! assert_eq!(mesh.num_elements(), 2);
//!
//! let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
//! let population =
//!     PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();
//! assert_eq!(population.num_cells(), 2);
//!
//! let mut hamiltonian = Hamiltonian::<2>::new();
//! hamiltonian.add_rule(VolumeConstraintUpdateRule::<2>::default());
//! hamiltonian.add_rule(AdhesionUpdateRule::<2>::default());
//!
//! // Element 0 against the medium: 0.5·(4 − 16)² + 10 contacts at 0.2.
//! let energy = hamiltonian.evaluate(0, None, &population).unwrap();
//! assert!((energy - 74.0).abs() < 1e-9);
//! ```
//!
//! # Cell death and element retirement
//!
//! Killing a cell leaves its element behind until the next
//! [`update`](core::population::PottsBasedCellPopulation::update):
//!
//! ```rust
//! use cellular_potts::prelude::*;
//!
//! let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
//! let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
//! let mut population =
//!     PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();
//!
//! let key = population.cell_using_location_index(0).unwrap();
//! population.cell_mut(key).unwrap().kill();
//!
//! assert_eq!(population.update(true).unwrap(), 1);
//! assert_eq!(population.num_elements(), 1);
//! assert!(population.validate().is_ok());
//! ```

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module holds the lattice, the cell population and the
/// Hamiltonian update rules.
pub mod core {
    pub mod cell;
    /// Seeded generators of initial cell populations
    pub mod cells_generator;
    /// Collection aliases used by the lattice and the population
    pub mod collections;
    pub mod context;
    pub mod element;
    pub mod mesh;
    /// Rectangular lattice generation
    pub mod mesh_generator;
    pub mod node;
    pub mod population;
    /// Lattice neighbour queries
    pub mod topology;
    pub mod update_rules;
    pub mod util;
    // Re-export the `core` modules.
    pub use cell::*;
    pub use cells_generator::*;
    pub use context::*;
    pub use element::*;
    pub use mesh::*;
    pub use mesh_generator::*;
    pub use node::*;
    pub use population::*;
    pub use topology::*;
    pub use update_rules::*;
    pub use util::*;
    // Note: collections module not re-exported here to avoid namespace pollution
}

/// Lattice positions and shape measures.
pub mod geometry {
    pub mod point;
    /// Shape measures of 2-D site clouds
    pub mod quality;
    pub use point::*;
    pub use quality::*;
}

/// Result writers.
pub mod io;

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        cell::*, cells_generator::*, context::*, element::*, mesh::*, mesh_generator::*, node::*,
        population::*, topology::*, update_rules::*, util::*,
    };

    pub use crate::core::collections::{
        FastHashMap, FastHashSet, NeighbourBuffer, SmallBuffer, StorageMap,
        fast_hash_map_with_capacity, fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{point::*, quality::*};

    pub use crate::io::*;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
