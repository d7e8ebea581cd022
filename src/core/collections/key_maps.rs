use super::{CellSecondaryMap, FastHashMap};
use crate::core::cell::CellKey;

// =============================================================================
// ELEMENT <-> CELL MAPPING TYPES
// =============================================================================

/// Mapping from element index to the key of the cell that occupies it.
///
/// The hot direction during result emission and Hamiltonian evaluation.
pub type LocationCellMap = FastHashMap<usize, CellKey>;

/// Back-reference from a cell to the index of its element.
///
/// Stored as a secondary map of the cell arena so entries cannot outlive the
/// keys they are attached to.
pub type CellLocationMap = CellSecondaryMap<usize>;
