//! Initial cell populations.
//!
//! A [`CellsGenerator`] produces one [`Cell`] per element. The basic
//! generators make identical transit cells; [`CellsGenerator::generate_for_crypt`]
//! classifies cells by the height of their element's centroid, the usual
//! set-up for an intestinal crypt.

#![forbid(unsafe_code)]

use super::cell::{Cell, CellProliferativeType};
use super::context::SimulationContext;
use super::mesh::{MeshError, PottsMesh};
use super::util::make_uuid_from_rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while generating cells.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CellsGeneratorError {
    /// Crypt thresholds must increase strictly.
    #[error("Crypt thresholds must satisfy y0 < y1 < y2 < y3, got {thresholds:?}")]
    UnorderedThresholds {
        /// The thresholds supplied.
        thresholds: [f64; 4],
    },
    /// A requested location index names no active element.
    #[error("Location index {index} is not an active element")]
    UnknownLocation {
        /// The offending index.
        index: usize,
    },
    /// Mesh lookup failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Heights separating the crypt zones.
///
/// A cell whose centroid height is `y` is a stem cell for `y ≤ y0`, a transit
/// cell of generation 1, 2 or 3 for `y < y1`, `y < y2`, `y < y3`, and of
/// generation 4 above that.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptThresholds {
    y0: f64,
    y1: f64,
    y2: f64,
    y3: f64,
}

impl CryptThresholds {
    /// Creates crypt thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`CellsGeneratorError::UnorderedThresholds`] unless
    /// `y0 < y1 < y2 < y3`.
    pub fn new(y0: f64, y1: f64, y2: f64, y3: f64) -> Result<Self, CellsGeneratorError> {
        if !(y0 < y1 && y1 < y2 && y2 < y3) {
            return Err(CellsGeneratorError::UnorderedThresholds {
                thresholds: [y0, y1, y2, y3],
            });
        }
        Ok(Self { y0, y1, y2, y3 })
    }

    fn classify(&self, y: f64, can_differentiate: bool) -> (CellProliferativeType, u32) {
        if y <= self.y0 {
            (CellProliferativeType::Stem, 0)
        } else if y < self.y1 {
            (CellProliferativeType::Transit, 1)
        } else if y < self.y2 {
            (CellProliferativeType::Transit, 2)
        } else if y < self.y3 {
            (CellProliferativeType::Transit, 3)
        } else if can_differentiate {
            (CellProliferativeType::Differentiated, 4)
        } else {
            (CellProliferativeType::Transit, 4)
        }
    }
}

/// Factory for the initial cells of a population.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::cells_generator::CellsGenerator;
///
/// let cells = CellsGenerator::default().generate_basic(3);
/// assert_eq!(cells.len(), 3);
/// assert!(cells.iter().all(|c| c.birth_time() == 0.0));
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellsGenerator {
    /// Typical cycle time of a transit cell, in hours.
    #[builder(default = "12.0")]
    typical_transit_cycle_time: f64,
    /// Typical cycle time of a stem cell, in hours.
    #[builder(default = "24.0")]
    typical_stem_cycle_time: f64,
    /// Whether cells above the top crypt threshold are differentiated.
    #[builder(default = "true")]
    cells_can_differentiate: bool,
}

impl Default for CellsGenerator {
    fn default() -> Self {
        Self {
            typical_transit_cycle_time: 12.0,
            typical_stem_cycle_time: 24.0,
            cells_can_differentiate: true,
        }
    }
}

impl CellsGenerator {
    /// Typical transit cycle time.
    #[must_use]
    pub const fn typical_transit_cycle_time(&self) -> f64 {
        self.typical_transit_cycle_time
    }

    /// Typical stem cycle time.
    #[must_use]
    pub const fn typical_stem_cycle_time(&self) -> f64 {
        self.typical_stem_cycle_time
    }

    /// `num_cells` transit cells born at time zero.
    ///
    /// Identities come from OS entropy. Use [`Self::generate_basic_random`]
    /// or [`Self::generate_for_crypt`] when a seeded replay must reproduce
    /// them.
    #[must_use]
    pub fn generate_basic(&self, num_cells: usize) -> Vec<Cell> {
        (0..num_cells)
            .map(|_| Cell::new(CellProliferativeType::Transit, 0.0))
            .collect()
    }

    /// `num_cells` transit cells with birth times spread uniformly over the
    /// preceding transit cycle, drawn from `ctx`.
    pub fn generate_basic_random(&self, num_cells: usize, ctx: &mut SimulationContext) -> Vec<Cell> {
        (0..num_cells)
            .map(|_| {
                let birth_time = -ctx.ranf() * self.typical_transit_cycle_time;
                Self::seeded_cell(ctx, CellProliferativeType::Transit, 0, birth_time)
            })
            .collect()
    }

    /// One cell per active element of `mesh` (or per listed element when
    /// `location_indices` is given), classified by centroid height.
    ///
    /// With `random_birth_times` each birth time is `−U·T`, `U` drawn from
    /// `ctx` and `T` the stem or transit cycle time as appropriate; otherwise
    /// every cell is born at time zero.
    ///
    /// # Errors
    ///
    /// Returns [`CellsGeneratorError::UnknownLocation`] for a listed index
    /// that is not an active element, or a mesh error for an empty element.
    pub fn generate_for_crypt(
        &self,
        mesh: &PottsMesh<2>,
        ctx: &mut SimulationContext,
        thresholds: &CryptThresholds,
        location_indices: Option<&[usize]>,
        random_birth_times: bool,
    ) -> Result<Vec<Cell>, CellsGeneratorError> {
        let indices: Vec<usize> = match location_indices {
            Some(indices) => {
                if let Some(&index) = indices.iter().find(|&&i| mesh.active_element(i).is_err()) {
                    return Err(CellsGeneratorError::UnknownLocation { index });
                }
                indices.to_vec()
            }
            None => mesh.elements().map(|e| e.index()).collect(),
        };

        let mut cells = Vec::with_capacity(indices.len());
        for index in indices {
            let y = mesh.centroid_of_element(index)?[1];
            let (kind, generation) = thresholds.classify(y, self.cells_can_differentiate);
            let cycle_time = match kind {
                CellProliferativeType::Stem => self.typical_stem_cycle_time,
                _ => self.typical_transit_cycle_time,
            };
            let birth_time = if random_birth_times {
                -ctx.ranf() * cycle_time
            } else {
                0.0
            };
            cells.push(Self::seeded_cell(ctx, kind, generation, birth_time));
        }
        tracing::debug!(num_cells = cells.len(), "generated crypt cells");
        Ok(cells)
    }

    fn seeded_cell(
        ctx: &mut SimulationContext,
        kind: CellProliferativeType,
        generation: u32,
        birth_time: f64,
    ) -> Cell {
        let uuid = make_uuid_from_rng(ctx.rng_mut());
        Cell::from_parts(uuid, kind, generation, birth_time)
    }
}
