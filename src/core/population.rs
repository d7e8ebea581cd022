//! Potts-based cell population.
//!
//! [`PottsBasedCellPopulation`] is the aggregate root of a simulation: it owns
//! the [`PottsMesh`], the arena of [`Cell`]s, and the two maps that tie each
//! active element to exactly one live cell:
//!
//! - `location_cell_map`: element index → cell key
//! - `cell_location_map`: cell key → element index
//!
//! The maps are not checked continuously. [`PottsBasedCellPopulation::validate`]
//! checks the bijection in one pass and is run after bulk mutations (cell
//! removal, element retirement). Site moves never change which cell an element
//! belongs to, so they do not need it.
//!
//! # Element retirement
//!
//! When a cell dies its element is left behind. [`PottsBasedCellPopulation::update`]
//! retires every active element without a live cell, following
//! [`PopulationConfig::element_retirement`]:
//!
//! - [`ElementRetirement::Tombstone`] keeps every index stable.
//! - [`ElementRetirement::Reindex`] compacts the element table and rewrites
//!   both maps through the returned [`ElementIndexMap`].

#![forbid(unsafe_code)]

use super::cell::{Cell, CellKey, CellProliferativeType};
use super::collections::{
    CellLocationMap, ElementIndexBuffer, FastHashSet, LocationCellMap, NeighbourBuffer,
    StorageMap, fast_hash_map_with_capacity, fast_hash_set_with_capacity,
};
use super::element::PottsElement;
use super::mesh::{ElementIndexMap, MeshError, PottsMesh};
use super::node::LatticeNode;
use super::topology::{GridDimensions, Neighbourhood, TopologyError, neighbouring_node_indices};
use crate::geometry::point::Point;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ERRORS
// =============================================================================

/// A broken element↔cell correspondence found by validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// An active element has no live cell.
    #[error("Element {element} does not appear to have a cell associated with it")]
    ElementWithoutCell {
        /// The element index.
        element: usize,
    },
    /// An active element has several live cells.
    #[error("Element {element} appears to have {count} cells associated with it")]
    ElementWithMultipleCells {
        /// The element index.
        element: usize,
        /// Number of live cells mapped to it.
        count: usize,
    },
    /// A live cell has no element.
    #[error("Cell {cell} has no location")]
    CellWithoutLocation {
        /// The cell's identity.
        cell: Uuid,
    },
    /// A live cell points at an element that is missing or deleted.
    #[error("Cell {cell} is mapped to element {element}, which is missing or deleted")]
    CellMappedToMissingElement {
        /// The cell's identity.
        cell: Uuid,
        /// The element index it points at.
        element: usize,
    },
    /// The element→cell map disagrees with the cell→element map.
    #[error("Element {element} is not mapped back to cell {cell}")]
    MappingInconsistency {
        /// The element index.
        element: usize,
        /// The cell whose back-reference names the element.
        cell: Uuid,
    },
}

/// Errors raised by population operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PopulationError {
    /// The element↔cell correspondence is broken.
    #[error("Population invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),
    /// Explicit location indices do not pair up with the cells.
    #[error("{num_cells} cells supplied with {num_locations} location indices")]
    CellCountMismatch {
        /// Number of cells.
        num_cells: usize,
        /// Number of location indices.
        num_locations: usize,
    },
    /// The key names no cell of this population.
    #[error("Cell key {key:?} is not in the population")]
    UnknownCell {
        /// The key.
        key: CellKey,
    },
    /// No cell occupies the element.
    #[error("No cell is associated with location {index}")]
    NoCellAtLocation {
        /// The element index.
        index: usize,
    },
    /// Lattice neighbour queries are only defined in two dimensions.
    #[error("Neighbour queries are not supported for {dimension}D lattices")]
    UnsupportedDimension {
        /// The lattice dimension.
        dimension: usize,
    },
    /// Mesh lookup or mutation failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// Neighbour query failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// All invariant violations found in one validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationValidationReport {
    /// Violations in the order they were found.
    pub violations: Vec<InvariantViolation>,
}

impl PopulationValidationReport {
    /// Returns `true` if no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// What happens to an element whose cell has gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementRetirement {
    /// Mark the element deleted and keep its slot.
    #[default]
    Tombstone,
    /// Remove deleted elements and renumber the survivors.
    Reindex,
}

/// Population settings.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::population::{ElementRetirement, PopulationConfigBuilder};
///
/// let config = PopulationConfigBuilder::default()
///     .element_retirement(ElementRetirement::Reindex)
///     .build()
///     .unwrap();
/// assert!(config.validate_on_construction());
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Run [`PottsBasedCellPopulation::validate`] in the constructor.
    #[builder(default = "true")]
    validate_on_construction: bool,
    /// Retirement policy used by [`PottsBasedCellPopulation::update`].
    #[builder(default)]
    element_retirement: ElementRetirement,
    /// Neighbourhood used by lattice neighbour queries.
    #[builder(default)]
    neighbourhood: Neighbourhood,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            validate_on_construction: true,
            element_retirement: ElementRetirement::Tombstone,
            neighbourhood: Neighbourhood::Moore,
        }
    }
}

impl PopulationConfig {
    /// Whether construction validates the population.
    #[must_use]
    pub const fn validate_on_construction(&self) -> bool {
        self.validate_on_construction
    }

    /// Retirement policy.
    #[must_use]
    pub const fn element_retirement(&self) -> ElementRetirement {
        self.element_retirement
    }

    /// Neighbourhood used by neighbour queries.
    #[must_use]
    pub const fn neighbourhood(&self) -> Neighbourhood {
        self.neighbourhood
    }
}

// =============================================================================
// POPULATION
// =============================================================================

/// Cells living on a Potts lattice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PottsBasedCellPopulation<const D: usize> {
    mesh: PottsMesh<D>,
    cells: StorageMap<CellKey, Cell>,
    /// Iteration order of the cells; result lines follow it.
    cell_order: Vec<CellKey>,
    location_cell_map: LocationCellMap,
    cell_location_map: CellLocationMap,
    grid: Option<GridDimensions>,
    config: PopulationConfig,
}

impl<const D: usize> PottsBasedCellPopulation<D> {
    /// Builds a population over `mesh`.
    ///
    /// Without `location_indices`, cell `i` is attached to element `i`;
    /// otherwise cell `i` is attached to element `location_indices[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::CellCountMismatch`] if explicit location
    /// indices do not match the number of cells, and an
    /// [`InvariantViolation`] if validation on construction fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::prelude::*;
    ///
    /// let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
    /// let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
    /// let population =
    ///     PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();
    /// assert_eq!(population.num_cells(), 2);
    /// ```
    pub fn new(
        mesh: PottsMesh<D>,
        cells: Vec<Cell>,
        location_indices: Option<Vec<usize>>,
        config: PopulationConfig,
    ) -> Result<Self, PopulationError> {
        let locations = match location_indices {
            Some(indices) if indices.len() != cells.len() => {
                return Err(PopulationError::CellCountMismatch {
                    num_cells: cells.len(),
                    num_locations: indices.len(),
                });
            }
            Some(indices) => indices,
            None => (0..cells.len()).collect(),
        };

        let grid = if D == 2 && mesh.num_nodes() > 0 {
            Some(GridDimensions::from_extent(mesh.width(0)?, mesh.width(1)?)?)
        } else {
            None
        };

        let mut population = Self {
            mesh,
            cells: StorageMap::with_capacity_and_key(cells.len()),
            cell_order: Vec::with_capacity(cells.len()),
            location_cell_map: fast_hash_map_with_capacity(cells.len()),
            cell_location_map: CellLocationMap::new(),
            grid,
            config,
        };
        for (cell, location) in cells.into_iter().zip(locations) {
            let key = population.cells.insert(cell);
            population.cell_order.push(key);
            population.location_cell_map.insert(location, key);
            population.cell_location_map.insert(key, location);
        }

        if config.validate_on_construction {
            population.validate()?;
        }
        Ok(population)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The mesh.
    #[must_use]
    pub const fn mesh(&self) -> &PottsMesh<D> {
        &self.mesh
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Number of lattice sites.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.mesh.num_nodes()
    }

    /// Number of active elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.mesh.num_elements()
    }

    /// Number of cells held, dead ones not yet removed included.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cell_order.len()
    }

    /// Number of cells that are not dead.
    #[must_use]
    pub fn num_live_cells(&self) -> usize {
        self.cells().filter(|(_, cell)| !cell.is_dead()).count()
    }

    /// Lattice site `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&LatticeNode<D>> {
        self.mesh.node(index)
    }

    /// Element slot `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&PottsElement<D>> {
        self.mesh.element(index)
    }

    /// Extent of the lattice along axis `dimension`.
    ///
    /// # Errors
    ///
    /// Returns a mesh error if `dimension >= D`.
    pub fn width(&self, dimension: usize) -> Result<f64, PopulationError> {
        Ok(self.mesh.width(dimension)?)
    }

    /// Cells in population order.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cell_order
            .iter()
            .filter_map(|&key| self.cells.get(key).map(|cell| (key, cell)))
    }

    /// Cell `key`.
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// Mutable access to cell `key`, so it can be labelled or killed.
    pub fn cell_mut(&mut self, key: CellKey) -> Option<&mut Cell> {
        self.cells.get_mut(key)
    }

    /// Key of the cell occupying element `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::NoCellAtLocation`] if no cell is mapped there.
    pub fn cell_using_location_index(&self, index: usize) -> Result<CellKey, PopulationError> {
        self.location_cell_map
            .get(&index)
            .copied()
            .ok_or(PopulationError::NoCellAtLocation { index })
    }

    /// Element index of cell `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::UnknownCell`] for a key with no location.
    pub fn location_index_using_cell(&self, key: CellKey) -> Result<usize, PopulationError> {
        self.cell_location_map
            .get(key)
            .copied()
            .ok_or(PopulationError::UnknownCell { key })
    }

    /// Element slot of cell `key`, active or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::UnknownCell`] for an unknown key, or a mesh
    /// error if the mapped index is out of range.
    pub fn element_corresponding_to_cell(&self, key: CellKey) -> Result<&PottsElement<D>, PopulationError> {
        let index = self.location_index_using_cell(key)?;
        self.mesh.element(index).ok_or_else(|| {
            PopulationError::Mesh(MeshError::ElementIndexOutOfRange {
                index,
                num_elements: self.mesh.num_all_elements(),
            })
        })
    }

    /// Centroid of cell `key`'s element.
    ///
    /// # Errors
    ///
    /// Returns a lookup error, or [`super::element::ElementError::Empty`]
    /// (wrapped) if the element has no sites.
    pub fn location_of_cell_centre(&self, key: CellKey) -> Result<Point<D>, PopulationError> {
        let index = self.location_index_using_cell(key)?;
        Ok(self.mesh.centroid_of_element(index)?)
    }

    /// Whether cell `key` sits in a deleted element.
    ///
    /// # Errors
    ///
    /// Returns a lookup error for an unknown key.
    pub fn is_cell_associated_with_a_deleted_location(&self, key: CellKey) -> Result<bool, PopulationError> {
        Ok(self.element_corresponding_to_cell(key)?.is_deleted())
    }

    /// Live cells per proliferative type, indexed by
    /// [`CellProliferativeType::index`].
    #[must_use]
    pub fn cell_proliferative_type_counts(&self) -> [usize; 3] {
        let mut counts = [0; CellProliferativeType::ALL.len()];
        for (_, cell) in self.cells().filter(|(_, cell)| !cell.is_dead()) {
            counts[cell.proliferative_type().index()] += 1;
        }
        counts
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Collects every violation of the element↔cell bijection.
    ///
    /// Only live cells and active elements take part.
    #[must_use]
    pub fn validation_report(&self) -> PopulationValidationReport {
        let mut violations = Vec::new();
        let mut counts = vec![0_usize; self.mesh.num_all_elements()];

        for (key, cell) in self.cells().filter(|(_, cell)| !cell.is_dead()) {
            let Some(&element) = self.cell_location_map.get(key) else {
                violations.push(InvariantViolation::CellWithoutLocation { cell: cell.uuid() });
                continue;
            };
            match self.mesh.element(element) {
                Some(slot) if !slot.is_deleted() => counts[element] += 1,
                _ => violations.push(InvariantViolation::CellMappedToMissingElement {
                    cell: cell.uuid(),
                    element,
                }),
            }
        }

        for element in self.mesh.elements().map(PottsElement::index) {
            match counts[element] {
                0 => violations.push(InvariantViolation::ElementWithoutCell { element }),
                1 => {}
                count => violations.push(InvariantViolation::ElementWithMultipleCells { element, count }),
            }
        }

        for (key, cell) in self.cells().filter(|(_, cell)| !cell.is_dead()) {
            if let Some(&element) = self.cell_location_map.get(key)
                && counts.get(element) == Some(&1)
                && self.location_cell_map.get(&element) != Some(&key)
            {
                violations.push(InvariantViolation::MappingInconsistency {
                    element,
                    cell: cell.uuid(),
                });
            }
        }

        PopulationValidationReport { violations }
    }

    /// Checks that every active element maps to exactly one live cell and
    /// every live cell to exactly one active element.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), PopulationError> {
        match self.validation_report().violations.into_iter().next() {
            Some(violation) => {
                tracing::warn!(%violation, "population validation failed");
                Err(violation.into())
            }
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    fn detach_cell(&mut self, key: CellKey) -> Option<Cell> {
        if let Some(element) = self.cell_location_map.remove(key)
            && self.location_cell_map.get(&element) == Some(&key)
        {
            self.location_cell_map.remove(&element);
        }
        self.cells.remove(key)
    }

    /// Removes every dead cell and returns how many were removed.
    ///
    /// The elements they occupied stay active until [`Self::update`] retires
    /// them.
    pub fn remove_dead_cells(&mut self) -> usize {
        let dead: Vec<CellKey> = self
            .cells()
            .filter(|(_, cell)| cell.is_dead())
            .map(|(key, _)| key)
            .collect();
        for &key in &dead {
            self.detach_cell(key);
        }
        self.cell_order.retain(|key| self.cells.contains_key(*key));
        if !dead.is_empty() {
            tracing::debug!(removed = dead.len(), remaining = self.cell_order.len(), "removed dead cells");
        }
        dead.len()
    }

    /// Retires every active element without a live cell, then validates.
    /// Returns the number of elements retired.
    ///
    /// Does nothing but validate when `has_had_births_or_deaths` is `false`.
    /// A dead cell still attached to a retired element is dropped.
    ///
    /// # Errors
    ///
    /// Returns a mesh error if retirement fails, or an
    /// [`InvariantViolation`] if the population is inconsistent afterwards.
    pub fn update(&mut self, has_had_births_or_deaths: bool) -> Result<usize, PopulationError> {
        let mut retired = 0;
        if has_had_births_or_deaths {
            let orphans: Vec<usize> = self
                .mesh
                .elements()
                .map(PottsElement::index)
                .filter(|index| {
                    self.location_cell_map
                        .get(index)
                        .and_then(|&key| self.cells.get(key))
                        .is_none_or(Cell::is_dead)
                })
                .collect();

            for &index in &orphans {
                if let Some(&key) = self.location_cell_map.get(&index) {
                    tracing::warn!(element = index, "dropping dead cell attached to a retired element");
                    self.detach_cell(key);
                }
                self.mesh.delete_element(index)?;
            }
            self.cell_order.retain(|key| self.cells.contains_key(*key));
            retired = orphans.len();

            if retired > 0 {
                tracing::debug!(retired, policy = ?self.config.element_retirement, "retired elements");
            }
            if retired > 0 && self.config.element_retirement == ElementRetirement::Reindex {
                let map = self.mesh.compact();
                self.apply_element_index_map(&map);
            }
        }
        self.validate()?;
        Ok(retired)
    }

    fn apply_element_index_map(&mut self, map: &ElementIndexMap) {
        if map.is_identity() {
            return;
        }
        let mut location_cell_map = fast_hash_map_with_capacity(self.cell_order.len());
        let mut lost = Vec::new();
        for &key in &self.cell_order {
            let new_index = self
                .cell_location_map
                .get(key)
                .and_then(|&old| map.new_index(old));
            match new_index {
                Some(new_index) => {
                    location_cell_map.insert(new_index, key);
                    self.cell_location_map.insert(key, new_index);
                }
                None => lost.push(key),
            }
        }
        self.location_cell_map = location_cell_map;
        for key in lost {
            tracing::warn!(?key, "cell removed because its element was deleted");
            self.cell_location_map.remove(key);
            self.cells.remove(key);
        }
        self.cell_order.retain(|key| self.cells.contains_key(*key));
        tracing::debug!(elements = self.mesh.num_all_elements(), "re-indexed elements");
    }

    fn move_site_into(&mut self, site: usize, element: usize) -> Result<ElementIndexBuffer, PopulationError> {
        let previous = self.mesh.reassign_node(site, element)?;
        tracing::trace!(site, element, from = ?previous.as_slice(), "reassigned site");
        Ok(previous)
    }

    /// Moves the site after `site_index` (wrapping at the end of the lattice)
    /// into the lowest-indexed element containing `site_index`. Returns that
    /// element, or `None` if `site_index` is unoccupied and nothing moved.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NodeIndexOutOfRange`] (wrapped) for an unknown site.
    pub fn migrate_node(&mut self, site_index: usize) -> Result<Option<usize>, PopulationError> {
        let num_nodes = self.mesh.num_nodes();
        let node = self.mesh.node(site_index).ok_or(MeshError::NodeIndexOutOfRange {
            index: site_index,
            num_nodes,
        })?;
        let Some(&target) = node.containing_element_indices().first() else {
            return Ok(None);
        };
        self.move_site_into((site_index + 1) % num_nodes, target)?;
        Ok(Some(target))
    }

    /// For every active, non-empty element in index order, moves the site
    /// after its last site into it.
    ///
    /// # Errors
    ///
    /// Propagates mesh errors.
    pub fn update_node_locations(&mut self) -> Result<(), PopulationError> {
        let num_nodes = self.mesh.num_nodes();
        let active: Vec<usize> = self.mesh.elements().map(PottsElement::index).collect();
        for index in active {
            let element = self.mesh.active_element(index)?;
            let Some(last) = element.node_indices().last().copied() else {
                continue;
            };
            self.move_site_into((last + 1) % num_nodes, index)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lattice neighbours
    // -------------------------------------------------------------------------

    /// Grid dimensions of the lattice, derived from its extent.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::UnsupportedDimension`] unless `D == 2`.
    pub fn grid_dimensions(&self) -> Result<GridDimensions, PopulationError> {
        self.grid
            .ok_or(PopulationError::UnsupportedDimension { dimension: D })
    }

    /// Neighbours of site `index` in N, NW, W, SW, S, SE, E, NE order
    /// (von Neumann: N, W, S, E), skipping off-lattice directions.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::UnsupportedDimension`] unless `D == 2`, or a
    /// topology error for a site off the lattice.
    pub fn neighbouring_node_indices_vector(&self, index: usize) -> Result<NeighbourBuffer, PopulationError> {
        let grid = self.grid_dimensions()?;
        Ok(neighbouring_node_indices(index, grid, self.config.neighbourhood)?)
    }

    /// Neighbours of site `index` as a set.
    ///
    /// # Errors
    ///
    /// As [`Self::neighbouring_node_indices_vector`].
    pub fn neighbouring_node_indices(&self, index: usize) -> Result<FastHashSet<usize>, PopulationError> {
        let neighbours = self.neighbouring_node_indices_vector(index)?;
        let mut set = fast_hash_set_with_capacity(neighbours.len());
        set.extend(neighbours);
        Ok(set)
    }

    // -------------------------------------------------------------------------
    // Results
    // -------------------------------------------------------------------------

    /// Writes one result line:
    /// `<time>\t<n_1> <site> ... <n_2> <site> ...\n`.
    ///
    /// Elements appear in cell order. An element is skipped when it is
    /// deleted or its cell is dead.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write_results<W: Write + ?Sized>(&self, time: f64, out: &mut W) -> io::Result<()> {
        write!(out, "{time}\t")?;
        for (key, _) in self.cells() {
            let Some(&index) = self.cell_location_map.get(key) else {
                continue;
            };
            let occupant_is_dead = self
                .location_cell_map
                .get(&index)
                .and_then(|&occupant| self.cells.get(occupant))
                .is_some_and(Cell::is_dead);
            let Some(element) = self.mesh.element(index) else {
                continue;
            };
            if element.is_deleted() || occupant_is_dead {
                continue;
            }
            write!(out, "{} ", element.num_nodes())?;
            for site in element.node_indices() {
                write!(out, "{site} ")?;
            }
        }
        writeln!(out)
    }
}
