//! Neighbour topology of a rectangular 2-D lattice.
//!
//! Sites are numbered row-major from the bottom-left corner, so site `i` sits
//! in column `i % nodes_across` and row `i / nodes_across`. The domain is not
//! periodic: a site on an edge simply has fewer neighbours.
//!
//! ```text
//!  NW ---- N ---- NE
//!   |      |      |
//!   W ---- x ---- E
//!   |      |      |
//!  SW ---- S ---- SE
//! ```
//!
//! Neighbours are always reported in the fixed order
//! N, NW, W, SW, S, SE, E, NE with unavailable directions skipped. Everything
//! here is pure arithmetic on the flat index.

#![forbid(unsafe_code)]

use super::collections::NeighbourBuffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by neighbour queries.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopologyError {
    /// The grid has no sites along some axis.
    #[error("Grid must have at least one site along each axis (got {nodes_across} x {nodes_up})")]
    EmptyGrid {
        /// Sites along x.
        nodes_across: usize,
        /// Sites along y.
        nodes_up: usize,
    },
    /// The physical extent cannot be turned into a site count.
    #[error("Domain extent {extent} is not a finite non-negative number")]
    InvalidExtent {
        /// The offending extent.
        extent: f64,
    },
    /// The queried site is not on the grid.
    #[error("Node {index} is outside a grid of {num_nodes} sites")]
    NodeOutsideGrid {
        /// The queried index.
        index: usize,
        /// Number of sites on the grid.
        num_nodes: usize,
    },
}

/// Which neighbours of a site count as adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighbourhood {
    /// The eight surrounding sites.
    #[default]
    Moore,
    /// The four edge-sharing sites (N, W, S, E).
    VonNeumann,
}

/// Compass direction of a neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Row above.
    North,
    /// Row above, column left.
    NorthWest,
    /// Column left.
    West,
    /// Row below, column left.
    SouthWest,
    /// Row below.
    South,
    /// Row below, column right.
    SouthEast,
    /// Column right.
    East,
    /// Row above, column right.
    NorthEast,
}

impl Direction {
    /// All directions in reporting order.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
        Self::East,
        Self::NorthEast,
    ];

    /// Whether the direction is diagonal.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthWest | Self::SouthWest | Self::SouthEast | Self::NorthEast
        )
    }

    /// `(column, row)` step of the direction.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::North => (0, 1),
            Self::NorthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, -1),
            Self::South => (0, -1),
            Self::SouthEast => (1, -1),
            Self::East => (1, 0),
            Self::NorthEast => (1, 1),
        }
    }
}

/// Size of a rectangular lattice in sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    nodes_across: usize,
    nodes_up: usize,
}

impl GridDimensions {
    /// Creates grid dimensions from site counts.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EmptyGrid`] if either count is zero.
    pub const fn new(nodes_across: usize, nodes_up: usize) -> Result<Self, TopologyError> {
        if nodes_across == 0 || nodes_up == 0 {
            return Err(TopologyError::EmptyGrid {
                nodes_across,
                nodes_up,
            });
        }
        Ok(Self {
            nodes_across,
            nodes_up,
        })
    }

    /// Derives site counts from the physical extent of a unit-spaced lattice:
    /// `floor(width) + 1` across and `floor(height) + 1` up.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidExtent`] for a negative or non-finite
    /// extent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::core::topology::GridDimensions;
    ///
    /// let grid = GridDimensions::from_extent(3.0, 3.0).unwrap();
    /// assert_eq!(grid.nodes_across(), 4);
    /// assert_eq!(grid.num_nodes(), 16);
    /// ```
    pub fn from_extent(width: f64, height: f64) -> Result<Self, TopologyError> {
        Self::new(sites_along(width)?, sites_along(height)?)
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

    /// Total number of sites.
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.nodes_across * self.nodes_up
    }

    /// Whether `index` names a site of this grid.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.num_nodes()
    }
}

fn sites_along(extent: f64) -> Result<usize, TopologyError> {
    if !extent.is_finite() || extent < 0.0 {
        return Err(TopologyError::InvalidExtent { extent });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = extent.floor() as usize;
    Ok(whole + 1)
}

/// Index of the neighbour of `index` in `direction`, or `None` if that step
/// leaves the grid.
fn step(index: usize, direction: Direction, grid: GridDimensions) -> Option<usize> {
    let (dx, dy) = direction.offset();
    let column = (index % grid.nodes_across).checked_add_signed(dx)?;
    let row = (index / grid.nodes_across).checked_add_signed(dy)?;
    (column < grid.nodes_across && row < grid.nodes_up).then_some(row * grid.nodes_across + column)
}

/// Neighbours of site `index`, in N, NW, W, SW, S, SE, E, NE order with
/// off-grid directions (and, for [`Neighbourhood::VonNeumann`], diagonals)
/// skipped.
///
/// # Errors
///
/// Returns [`TopologyError::NodeOutsideGrid`] if `index` is not on the grid.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::topology::{GridDimensions, Neighbourhood, neighbouring_node_indices};
///
/// let grid = GridDimensions::new(4, 4).unwrap();
/// let corner = neighbouring_node_indices(0, grid, Neighbourhood::Moore).unwrap();
/// assert_eq!(corner.as_slice(), &[4, 1]);
///
/// let interior = neighbouring_node_indices(5, grid, Neighbourhood::Moore).unwrap();
/// assert_eq!(interior.as_slice(), &[9, 8, 4, 0, 1, 2, 6, 10]);
/// ```
pub fn neighbouring_node_indices(
    index: usize,
    grid: GridDimensions,
    neighbourhood: Neighbourhood,
) -> Result<NeighbourBuffer, TopologyError> {
    if !grid.contains(index) {
        return Err(TopologyError::NodeOutsideGrid {
            index,
            num_nodes: grid.num_nodes(),
        });
    }

    Ok(Direction::ALL
        .into_iter()
        .filter(|&d| neighbourhood == Neighbourhood::Moore || !d.is_diagonal())
        .filter_map(|d| step(index, d, grid))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moore(index: usize, across: usize, up: usize) -> Vec<usize> {
        let grid = GridDimensions::new(across, up).unwrap();
        neighbouring_node_indices(index, grid, Neighbourhood::Moore)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_offsets_match_reported_neighbours() {
        // 5x5 grid, centre site (2, 2)
        let grid = GridDimensions::new(5, 5).unwrap();
        let neighbours = neighbouring_node_indices(12, grid, Neighbourhood::Moore).unwrap();
        for (direction, &neighbour) in Direction::ALL.iter().zip(neighbours.iter()) {
            let (dx, dy) = direction.offset();
            let column = isize::try_from(neighbour % 5).unwrap();
            let row = isize::try_from(neighbour / 5).unwrap();
            assert_eq!((column - 2, row - 2), (dx, dy), "{direction:?}");
            assert_eq!(direction.is_diagonal(), dx != 0 && dy != 0);
        }
    }

    #[test]
    fn test_corners_of_square_grid() {
        assert_eq!(moore(0, 4, 4), vec![4, 1]);
        assert_eq!(moore(3, 4, 4), vec![7, 6, 2]);
        assert_eq!(moore(12, 4, 4), vec![8, 9, 13]);
        assert_eq!(moore(15, 4, 4), vec![14, 10, 11]);
    }

    #[test]
    fn test_interior_and_edges_of_square_grid() {
        assert_eq!(moore(5, 4, 4), vec![9, 8, 4, 0, 1, 2, 6, 10]);
        // south edge
        assert_eq!(moore(1, 4, 4), vec![5, 4, 0, 2, 6]);
        // north edge
        assert_eq!(moore(13, 4, 4), vec![12, 8, 9, 10, 14]);
    }

    #[test]
    fn test_north_edge_of_wide_grid() {
        // 3 across, 2 up: the top row is 3, 4, 5
        assert_eq!(moore(3, 3, 2), vec![0, 1, 4]);
        assert_eq!(moore(4, 3, 2), vec![3, 0, 1, 2, 5]);
        assert_eq!(moore(5, 3, 2), vec![4, 1, 2]);
    }

    #[test]
    fn test_north_edge_of_tall_grid() {
        // 2 across, 3 up: the top row is 4, 5
        assert_eq!(moore(4, 2, 3), vec![2, 3, 5]);
        assert_eq!(moore(2, 2, 3), vec![4, 0, 1, 3, 5]);
    }

    #[test]
    fn test_single_column_grid() {
        assert_eq!(moore(1, 1, 3), vec![2, 0]);
        assert!(moore(0, 1, 1).is_empty());
    }

    #[test]
    fn test_von_neumann_drops_diagonals() {
        let grid = GridDimensions::new(4, 4).unwrap();
        let n = neighbouring_node_indices(5, grid, Neighbourhood::VonNeumann).unwrap();
        assert_eq!(n.as_slice(), &[9, 4, 1, 6]);
        let n = neighbouring_node_indices(0, grid, Neighbourhood::VonNeumann).unwrap();
        assert_eq!(n.as_slice(), &[4, 1]);
    }

    #[test]
    fn test_query_is_repeatable() {
        let grid = GridDimensions::new(5, 3).unwrap();
        for i in 0..grid.num_nodes() {
            let a = neighbouring_node_indices(i, grid, Neighbourhood::Moore).unwrap();
            let b = neighbouring_node_indices(i, grid, Neighbourhood::Moore).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_errors() {
        let grid = GridDimensions::new(2, 2).unwrap();
        assert_eq!(
            neighbouring_node_indices(4, grid, Neighbourhood::Moore),
            Err(TopologyError::NodeOutsideGrid { index: 4, num_nodes: 4 })
        );
        assert!(GridDimensions::new(0, 3).is_err());
        assert!(GridDimensions::from_extent(-1.0, 2.0).is_err());
        assert!(GridDimensions::from_extent(f64::NAN, 2.0).is_err());
        assert_eq!(
            GridDimensions::from_extent(2.9, 0.0).unwrap(),
            GridDimensions::new(3, 1).unwrap()
        );
    }
}
