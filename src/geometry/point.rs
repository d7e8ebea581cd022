//! Data and operations on d-dimensional lattice positions.
//!
//! Lattice sites live at fixed `f64` coordinates. A [`Point`] is an immutable
//! coordinate array; the const parameter `D` is the spatial dimension.
//!
//! # Serialization
//!
//! Points serialize as a fixed-length tuple so that any `D` works with serde.
//! Non-finite coordinates are written as `null` (NaN) or the strings
//! `"Infinity"`/`"-Infinity"` and read back the same way, which keeps JSON
//! checkpoints loss-free.

#![forbid(unsafe_code)]

use serde::de::{Error, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A position in `D`-dimensional space.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0]);
/// assert_eq!(p[1], 2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<const D: usize> {
    coords: [f64; D],
}

impl<const D: usize> Point<D> {
    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; D]) -> Self {
        Self { coords }
    }

    /// Returns the coordinates as an array reference.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; D] {
        &self.coords
    }

    /// Returns the dimension `D`.
    #[inline]
    #[must_use]
    pub const fn dim(&self) -> usize {
        D
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }

    /// Returns the arithmetic mean of `points`, or `None` for an empty slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::geometry::point::Point;
    ///
    /// let c = Point::mean(&[Point::new([0.0, 0.0]), Point::new([2.0, 4.0])]).unwrap();
    /// assert_eq!(c.coords(), &[1.0, 2.0]);
    /// ```
    #[must_use]
    pub fn mean(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut sum = [0.0; D];
        for point in points {
            for (acc, c) in sum.iter_mut().zip(point.coords.iter()) {
                *acc += c;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        Some(Self::new(sum.map(|s| s / n)))
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::new([0.0; D])
    }
}

impl<const D: usize> Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coords[index]
    }
}

impl<const D: usize> From<[f64; D]> for Point<D> {
    fn from(coords: [f64; D]) -> Self {
        Self::new(coords)
    }
}

impl<const D: usize> From<Point<D>> for [f64; D] {
    fn from(point: Point<D>) -> Self {
        point.coords
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

impl<const D: usize> Serialize for Point<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(D)?;
        for coord in &self.coords {
            if coord.is_finite() {
                tuple.serialize_element(coord)?;
            } else if coord.is_nan() {
                tuple.serialize_element(&Option::<f64>::None)?;
            } else if coord.is_sign_positive() {
                tuple.serialize_element("Infinity")?;
            } else {
                tuple.serialize_element("-Infinity")?;
            }
        }
        tuple.end()
    }
}

/// Wire representation of one coordinate.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordRepr {
    Num(f64),
    Str(String),
    Null,
}

impl<'de, const D: usize> Deserialize<'de> for Point<D> {
    fn deserialize<DE>(deserializer: DE) -> Result<Self, DE::Error>
    where
        DE: serde::Deserializer<'de>,
    {
        struct ArrayVisitor<const D: usize>;

        impl<'de, const D: usize> Visitor<'de> for ArrayVisitor<D> {
            type Value = Point<D>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an array of {D} coordinates")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut coords = [0.0; D];
                for (i, slot) in coords.iter_mut().enumerate() {
                    let element: CoordRepr = seq
                        .next_element()?
                        .ok_or_else(|| Error::invalid_length(i, &self))?;
                    *slot = match element {
                        CoordRepr::Num(value) => value,
                        CoordRepr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                            "infinity" | "inf" => f64::INFINITY,
                            "-infinity" | "-inf" => f64::NEG_INFINITY,
                            "nan" => f64::NAN,
                            _ => {
                                return Err(Error::custom(format!("Unknown special value: {s}")));
                            }
                        },
                        CoordRepr::Null => f64::NAN,
                    };
                }
                Ok(Point::new(coords))
            }
        }

        deserializer.deserialize_tuple(D, ArrayVisitor::<D>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_accessors() {
        let p = Point::new([1.5, -2.0, 3.25]);
        assert_eq!(p.dim(), 3);
        assert_relative_eq!(p[0], 1.5);
        assert_relative_eq!(p[2], 3.25);
        assert!(p.is_finite());
        let arr: [f64; 3] = p.into();
        assert_eq!(arr, [1.5, -2.0, 3.25]);
    }

    #[test]
    fn test_point_mean_empty_is_none() {
        assert!(Point::<2>::mean(&[]).is_none());
    }

    #[test]
    fn test_point_json_roundtrip() {
        let p = Point::new([0.1, 7.0]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[0.1,7.0]");
        let back: Point<2> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_point_non_finite_serialization() {
        let p = Point::new([f64::INFINITY, f64::NEG_INFINITY, f64::NAN]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"["Infinity","-Infinity",null]"#);
        let back: Point<3> = serde_json::from_str(&json).unwrap();
        assert!(back[0].is_infinite() && back[0].is_sign_positive());
        assert!(back[1].is_infinite() && back[1].is_sign_negative());
        assert!(back[2].is_nan());
    }

    #[test]
    fn test_point_wrong_length_rejected() {
        let result: Result<Point<3>, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(result.is_err());
    }
}
