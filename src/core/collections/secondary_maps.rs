use crate::core::cell::CellKey;
use slotmap::SparseSecondaryMap;

// =============================================================================
// SLOTMAP SECONDARY MAPS FOR AUXILIARY DATA
// =============================================================================

/// Sparse secondary map for data associated with cells of a population.
///
/// Only stores entries for cells that have associated data.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::collections::CellSecondaryMap;
///
/// let visited: CellSecondaryMap<bool> = CellSecondaryMap::new();
/// assert!(visited.is_empty());
/// ```
pub type CellSecondaryMap<V> = SparseSecondaryMap<CellKey, V>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_maps_compile_and_instantiate() {
        let aux: CellSecondaryMap<usize> = CellSecondaryMap::new();
        assert_eq!(aux.len(), 0);
    }
}
