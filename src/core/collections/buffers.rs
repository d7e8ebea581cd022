use super::{MAX_NEIGHBOURHOOD_SIZE, SmallBuffer};

// =============================================================================
// LATTICE QUERY BUFFERS
// =============================================================================

/// Ordered neighbour node indices of one lattice site.
///
/// Stack-allocated for the full Moore neighbourhood, so neighbour queries in
/// the Hamiltonian hot loop never touch the heap.
pub type NeighbourBuffer = SmallBuffer<usize, MAX_NEIGHBOURHOOD_SIZE>;

/// Element indices gathered during a bookkeeping pass (retirement, migration).
///
/// Most passes touch only a handful of elements.
pub type ElementIndexBuffer = SmallBuffer<usize, 4>;
