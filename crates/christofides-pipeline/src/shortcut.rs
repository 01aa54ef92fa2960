//! Shortcutting an Euler walk into a Hamiltonian cycle.

use crate::matrix::DistanceMatrix;
use crate::types::{EulerTour, InvariantViolation, PipelineError, Tour};

/// Stage 6: keep the first occurrence of every vertex in `walk` and
/// close the cycle back to the first vertex.
///
/// The length is summed from the matrix along the returned order,
/// including the closing leg.
///
/// # Errors
///
/// Returns [`InvariantViolation::IncompleteTour`] if the walk does not
/// visit every vertex of `matrix`.
pub fn shortcut(walk: &EulerTour, matrix: &DistanceMatrix) -> Result<Tour, PipelineError> {
    let n = matrix.len();
    let mut seen = vec![false; n];
    let mut vertices = Vec::with_capacity(n);
    for &v in walk.vertices() {
        if v < n && !seen[v] {
            seen[v] = true;
            vertices.push(v);
        }
    }

    if vertices.len() != n {
        return Err(InvariantViolation::IncompleteTour {
            visited: vertices.len(),
            vertex_count: n,
        }
        .into());
    }

    let length = tour_length(matrix, &vertices);
    Ok(Tour::new(vertices, length))
}

/// Length of the closed tour visiting `vertices` in order.
///
/// Each leg uses `d(from, to)` in the direction travelled. A single
/// vertex has length `d(v, v) = 0`; an empty slice has length 0.
#[must_use]
pub fn tour_length(matrix: &DistanceMatrix, vertices: &[usize]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| matrix.get(vertices[i], vertices[(i + 1) % n]))
        .sum()
}
