//! Shape descriptors for sets of lattice sites.
//!
//! The aspect ratio of a 2-D site set is estimated from the covariance matrix
//! of the site positions:
//!
//! ```text
//! | var_x   cov_xy |
//! | cov_xy  var_y  |
//! ```
//!
//! Its eigenvalues are the variances along the principal axes, so the ratio of
//! the larger to the smaller eigenvalue measures elongation. An isotropic site
//! set has ratio 1; a set whose sites are collinear has a zero minor eigenvalue
//! and no finite aspect ratio.
//!
//! # References
//!
//! - Jolliffe, I.T. *Principal Component Analysis*, 2nd ed. Springer (2002), ch. 1.

use crate::geometry::point::Point;
use std::{error::Error, fmt};

/// Errors that can occur while computing shape descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityError {
    /// The shape measure is undefined for the site configuration: the sites
    /// have zero spatial extent along one principal axis.
    DegenerateGeometry {
        /// Number of sites examined.
        num_points: usize,
        /// The major eigenvalue of the covariance matrix.
        major_eigenvalue: f64,
    },
    /// A covariance eigenvalue came out negative. Covariance matrices are
    /// positive semi-definite, so this is a numerical bug.
    NegativeEigenvalue {
        /// The offending eigenvalue.
        eigenvalue: f64,
    },
    /// The measure needs at least one site.
    EmptyPointSet,
}

impl fmt::Display for QualityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry {
                num_points,
                major_eigenvalue,
            } => write!(
                f,
                "Degenerate geometry: all {num_points} sites lie on a line \
                 (major eigenvalue {major_eigenvalue}, minor eigenvalue 0), \
                 so the aspect ratio is unbounded"
            ),
            Self::NegativeEigenvalue { eigenvalue } => write!(
                f,
                "Covariance eigenvalue {eigenvalue} is negative; covariance matrices are positive semi-definite"
            ),
            Self::EmptyPointSet => write!(f, "Shape measure requested for an empty site set"),
        }
    }
}

impl Error for QualityError {}

/// Population covariance of a set of 2-D points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Covariance2 {
    /// Variance of the x coordinates.
    pub variance_x: f64,
    /// Variance of the y coordinates.
    pub variance_y: f64,
    /// Covariance of x and y.
    pub covariance_xy: f64,
}

impl Covariance2 {
    /// Computes the (population, divide-by-n) covariance of `points`.
    ///
    /// # Errors
    ///
    /// Returns [`QualityError::EmptyPointSet`] if `points` is empty.
    pub fn from_points(points: &[Point<2>]) -> Result<Self, QualityError> {
        let mean = Point::mean(points).ok_or(QualityError::EmptyPointSet)?;
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;

        let mut variance_x = 0.0;
        let mut variance_y = 0.0;
        let mut covariance_xy = 0.0;
        for p in points {
            let dx = p[0] - mean[0];
            let dy = p[1] - mean[1];
            variance_x += dx * dx;
            variance_y += dy * dy;
            covariance_xy += dx * dy;
        }

        Ok(Self {
            variance_x: variance_x / n,
            variance_y: variance_y / n,
            covariance_xy: covariance_xy / n,
        })
    }

    /// Returns the matrix trace.
    #[must_use]
    pub fn trace(&self) -> f64 {
        self.variance_x + self.variance_y
    }

    /// Returns the matrix determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.variance_x.mul_add(self.variance_y, -(self.covariance_xy * self.covariance_xy))
    }

    /// Returns `(λ_max, λ_min)` from the closed-form symmetric 2×2 formula
    /// `λ = ½(trace ± √(trace² − 4·det))`.
    ///
    /// The discriminant equals `(var_x − var_y)² + 4·cov_xy²`; it is evaluated
    /// in that form so it can never go negative through cancellation.
    #[must_use]
    pub fn eigenvalues(&self) -> (f64, f64) {
        let trace = self.trace();
        let diff = self.variance_x - self.variance_y;
        let discriminant = diff.mul_add(diff, 4.0 * self.covariance_xy * self.covariance_xy);
        let root = discriminant.sqrt();
        (0.5 * (trace + root), 0.5 * (trace - root))
    }
}

/// Minor eigenvalues within this fraction of the major eigenvalue are
/// rounding residue of a collinear site set.
pub const DEGENERACY_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Computes the aspect ratio `λ_max / λ_min` of a 2-D site set.
///
/// # Errors
///
/// - [`QualityError::EmptyPointSet`] for an empty slice.
/// - [`QualityError::DegenerateGeometry`] if `|λ_min|` is within
///   [`DEGENERACY_RELATIVE_TOLERANCE`]`·λ_max` of zero (collinear sites,
///   including a single site).
/// - [`QualityError::NegativeEigenvalue`] if an eigenvalue is negative beyond
///   that tolerance.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::geometry::point::Point;
/// use cellular_potts::geometry::quality::{aspect_ratio, QualityError};
///
/// let square = [
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([1.0, 1.0]),
/// ];
/// assert!((aspect_ratio(&square).unwrap() - 1.0).abs() < 1e-12);
///
/// let line = [Point::new([0.0, 0.0]), Point::new([1.0, 2.0]), Point::new([2.0, 4.0])];
/// assert!(matches!(aspect_ratio(&line), Err(QualityError::DegenerateGeometry { .. })));
/// ```
pub fn aspect_ratio(points: &[Point<2>]) -> Result<f64, QualityError> {
    let covariance = Covariance2::from_points(points)?;
    let (eig_max, eig_min) = covariance.eigenvalues();

    if eig_max < 0.0 {
        return Err(QualityError::NegativeEigenvalue { eigenvalue: eig_max });
    }

    if eig_min.abs() <= DEGENERACY_RELATIVE_TOLERANCE * eig_max {
        return Err(QualityError::DegenerateGeometry {
            num_points: points.len(),
            major_eigenvalue: eig_max,
        });
    }

    if eig_min < 0.0 {
        return Err(QualityError::NegativeEigenvalue { eigenvalue: eig_min });
    }

    Ok(eig_max / eig_min)
}
