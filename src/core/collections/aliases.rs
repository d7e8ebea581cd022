use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// Re-export UUID for convenience in cell identity
pub use uuid::Uuid;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for the cell arena of a population.
///
/// Abstracts over `DenseSlotMap` (**default**, via the `dense-slotmap`
/// feature) and `SlotMap` (with `--no-default-features`) without exposing the
/// choice in public APIs. Public methods hand out iterators and keys instead.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for internal index mappings.
/// Uses `FastHasher` (`rustc_hash::FxHasher`) for faster hashing in non-cryptographic contexts.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: Do not use with attacker-controlled keys.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<usize, usize> = FastHashMap::default();
/// map.insert(3, 7);
/// assert_eq!(map.get(&3), Some(&7));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic hasher alias for internal collections.
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Optimized `HashSet` type for membership testing.
///
/// Iteration order is deterministic for a given insertion sequence but is not
/// sorted; use an ordered set where iteration order carries meaning.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<usize> = FastHashSet::default();
/// set.insert(9);
/// assert!(set.contains(&9));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// # Size Guidelines
///
/// - **N=4**: von Neumann neighbourhoods, per-element bookkeeping
/// - **N=8**: Moore neighbourhoods
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 8> = SmallBuffer::new();
/// buffer.extend(0..5);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS
// =============================================================================

/// Largest neighbourhood a 2-D lattice site can have (the Moore neighbourhood).
pub const MAX_NEIGHBOURHOOD_SIZE: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<usize, usize> = FastHashMap::default();
        assert!(map.is_empty());
        map.insert(123, 456);
        assert_eq!(map.get(&123), Some(&456));

        let mut set: FastHashSet<usize> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_small_buffer_stays_inline_for_a_full_neighbourhood() {
        let mut buffer: SmallBuffer<usize, MAX_NEIGHBOURHOOD_SIZE> = SmallBuffer::new();
        buffer.extend(0..MAX_NEIGHBOURHOOD_SIZE);
        assert!(!buffer.spilled());
        buffer.push(99);
        assert!(buffer.spilled());
    }
}
