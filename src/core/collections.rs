//! Collection types used by the lattice, the mesh and the population.
//!
//! Everything here is a thin alias over `rustc-hash`, `smallvec` and
//! `slotmap` so that internal code names its intent (`NeighbourBuffer`,
//! `LocationCellMap`) instead of a concrete container.

mod aliases;
mod buffers;
mod helpers;
mod key_maps;
mod secondary_maps;

pub use aliases::*;
pub use buffers::*;
pub use helpers::*;
pub use key_maps::*;
pub use secondary_maps::*;
