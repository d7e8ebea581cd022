//! Property-based tests for the covariance aspect ratio of 2-D site clouds.
//!
//! - The ratio of a non-degenerate cloud is at least 1
//! - It is invariant under rotation, translation and uniform scaling
//! - Collinear clouds are reported as degenerate

use approx::assert_relative_eq;
use cellular_potts::geometry::point::Point;
use cellular_potts::geometry::quality::{QualityError, aspect_ratio};
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

fn finite_coordinate() -> impl Strategy<Value = f64> {
    -50.0..50.0f64
}

fn point_cloud() -> impl Strategy<Value = Vec<Point<2>>> {
    prop::collection::vec(
        prop::array::uniform2(finite_coordinate()).prop_map(Point::new),
        3..16,
    )
}

fn transform(points: &[Point<2>], angle: f64, scale: f64, shift: [f64; 2]) -> Vec<Point<2>> {
    let (sin, cos) = angle.sin_cos();
    points
        .iter()
        .map(|p| {
            let [x, y] = *p.coords();
            Point::new([
                scale * (cos * x - sin * y) + shift[0],
                scale * (sin * x + cos * y) + shift[1],
            ])
        })
        .collect()
}

/// Non-zero integer step between consecutive lattice sites on a line.
fn lattice_direction() -> impl Strategy<Value = [i32; 2]> {
    prop::array::uniform2(-4i32..=4).prop_filter("direction must be non-zero", |d| *d != [0, 0])
}

/// Ratios of clouds that are close to degenerate amplify rounding error.
fn well_conditioned(points: &[Point<2>]) -> Option<f64> {
    aspect_ratio(points).ok().filter(|&r| r < 1e6)
}

proptest! {
    /// Property: the major axis is never shorter than the minor axis
    #[test]
    fn prop_aspect_ratio_at_least_one(points in point_cloud()) {
        if let Ok(ratio) = aspect_ratio(&points) {
            prop_assert!(ratio >= 1.0 - 1e-9, "ratio {} < 1", ratio);
        }
    }

    /// Property: rigid motions and uniform scaling preserve the ratio
    #[test]
    fn prop_aspect_ratio_similarity_invariant(
        points in point_cloud(),
        angle in 0.0..std::f64::consts::TAU,
        scale in 0.1..10.0f64,
        shift in prop::array::uniform2(finite_coordinate()),
    ) {
        if let Some(ratio) = well_conditioned(&points) {
            let moved = aspect_ratio(&transform(&points, angle, scale, shift)).unwrap();
            prop_assert!(
                (moved - ratio).abs() <= 1e-6 * ratio,
                "ratio changed from {} to {}",
                ratio,
                moved
            );
        }
    }

    /// Property: points on an axis-aligned line have no minor axis
    #[test]
    fn prop_axis_aligned_points_are_degenerate(
        ts in prop::collection::vec(finite_coordinate(), 3..10),
        offset in -50i32..50,
        vertical in any::<bool>(),
    ) {
        let offset = f64::from(offset);
        let line: Vec<Point<2>> = ts
            .iter()
            .map(|&t| if vertical { Point::new([offset, t]) } else { Point::new([t, offset]) })
            .collect();
        let is_degenerate = matches!(
            aspect_ratio(&line),
            Err(QualityError::DegenerateGeometry { .. })
        );
        prop_assert!(is_degenerate);
    }

    /// Property: lattice sites along any integer direction have no minor axis
    #[test]
    fn prop_sloped_lattice_lines_are_degenerate(
        origin in prop::array::uniform2(-20i32..20),
        direction in lattice_direction(),
        steps in prop::collection::vec(-10i32..10, 3..10),
    ) {
        let line: Vec<Point<2>> = steps
            .iter()
            .map(|&k| {
                Point::new([
                    f64::from(origin[0] + k * direction[0]),
                    f64::from(origin[1] + k * direction[1]),
                ])
            })
            .collect();
        let result = aspect_ratio(&line);
        prop_assert!(
            matches!(result, Err(QualityError::DegenerateGeometry { .. })),
            "direction {:?} steps {:?} gave {:?}",
            direction,
            steps,
            result
        );
    }
}

#[test]
fn test_rectangular_block_ratio() {
    // 4×2 block of sites: variances 1.25 and 0.25.
    let block: Vec<Point<2>> = (0..2)
        .flat_map(|y| (0..4).map(move |x| Point::new([f64::from(x), f64::from(y)])))
        .collect();
    assert_relative_eq!(aspect_ratio(&block).unwrap(), 5.0, epsilon = 1e-12);
}
