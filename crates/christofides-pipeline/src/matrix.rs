//! Validated distance matrix: the only input the pipeline reads.
//!
//! A [`DistanceMatrix`] can only be built through a constructor that
//! checks every entry, so the stages downstream never see a matrix that
//! is ragged, asymmetric, negative, or has a non-zero diagonal.

use serde::{Deserialize, Serialize};

use crate::types::{InputError, Point, SolverConfig};

/// Immutable `N x N` matrix of non-negative pairwise distances.
///
/// Stored row-major. Serializes as a list of rows and re-validates on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Validate `rows` and build a matrix.
    ///
    /// `symmetry_tolerance` is the largest accepted absolute difference
    /// between `d(i, j)` and `d(j, i)`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidTolerance`] for a NaN, infinite or
    /// negative `symmetry_tolerance`. Otherwise returns the first
    /// [`InputError`] found, scanning row by row: an empty matrix, a row
    /// of the wrong length, a non-finite or negative entry, a non-zero
    /// diagonal, then asymmetry.
    pub fn from_rows(rows: &[Vec<f64>], symmetry_tolerance: f64) -> Result<Self, InputError> {
        if !symmetry_tolerance.is_finite() || symmetry_tolerance < 0.0 {
            return Err(InputError::InvalidTolerance {
                tolerance: symmetry_tolerance,
            });
        }
        let n = rows.len();
        if n == 0 {
            return Err(InputError::Empty);
        }

        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(InputError::NotSquare {
                    row,
                    len: values.len(),
                    expected: n,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() {
                    return Err(InputError::NonFinite { row, col });
                }
                if value < 0.0 {
                    return Err(InputError::Negative { row, col, value });
                }
            }
            if values[row] != 0.0 {
                return Err(InputError::NonZeroDiagonal {
                    index: row,
                    value: values[row],
                });
            }
            data.extend_from_slice(values);
        }

        for row in 0..n {
            for col in row + 1..n {
                let forward = data[row * n + col];
                let backward = data[col * n + row];
                if (forward - backward).abs() > symmetry_tolerance {
                    return Err(InputError::Asymmetric {
                        row,
                        col,
                        forward,
                        backward,
                    });
                }
            }
        }

        Ok(Self { n, data })
    }

    /// Build the Euclidean distance matrix of a set of points.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Empty`] if `points` is empty, or
    /// [`InputError::NonFinite`] if a coordinate is NaN or infinite.
    pub fn from_points(points: &[Point]) -> Result<Self, InputError> {
        let rows: Vec<Vec<f64>> = points
            .iter()
            .map(|&a| points.iter().map(|&b| a.distance(b)).collect())
            .collect();
        // Euclidean distance is symmetric bit-for-bit, so no tolerance.
        Self::from_rows(&rows, 0.0)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Always `false`: an empty matrix is rejected at construction.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance from `i` to `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`len`](Self::len).
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Distances from `i` to every vertex.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Copy the matrix back out as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.row(i).to_vec()).collect()
    }

    /// Find a triple `(i, j, k)` with `d(i, k) > d(i, j) + d(j, k) + tolerance`.
    ///
    /// Returns the first violation in lexicographic order, or `None` if
    /// the matrix is metric. The 1.5 approximation bound only holds for
    /// metric input; the pipeline still runs on anything else.
    #[must_use]
    pub fn find_triangle_violation(&self, tolerance: f64) -> Option<(usize, usize, usize)> {
        for i in 0..self.n {
            for k in i + 1..self.n {
                let direct = self.get(i, k);
                for j in 0..self.n {
                    if j == i || j == k {
                        continue;
                    }
                    if direct > self.get(i, j) + self.get(j, k) + tolerance {
                        return Some((i, j, k));
                    }
                }
            }
        }
        None
    }
}

impl TryFrom<Vec<Vec<f64>>> for DistanceMatrix {
    type Error = InputError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows, SolverConfig::DEFAULT_SYMMETRY_TOLERANCE)
    }
}

impl From<DistanceMatrix> for Vec<Vec<f64>> {
    fn from(matrix: DistanceMatrix) -> Self {
        matrix.to_rows()
    }
}
