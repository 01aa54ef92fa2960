//! Odd-degree vertex detection.

use crate::types::{InvariantViolation, OddVertices, PipelineError, SpanningTree};

/// Collect the vertices of odd degree in `tree`, in ascending order.
///
/// The degree sequence is recomputed from the tree and checked against
/// the vertex count before it is scanned: a tree on `N` vertices has a
/// degree sum of exactly `2 * (N - 1)`.
///
/// # Errors
///
/// Returns [`InvariantViolation::DegreeSequence`] if the degrees do not
/// describe a tree on the vertex set, or
/// [`InvariantViolation::OddVertexCountOdd`] if the odd set has odd size.
pub fn odd_degree_vertices(tree: &SpanningTree) -> Result<OddVertices, PipelineError> {
    let n = tree.vertex_count();
    let degrees = tree.degrees();
    if degrees.len() != n || degrees.sum() != 2 * n.saturating_sub(1) {
        return Err(InvariantViolation::DegreeSequence {
            len: degrees.len(),
            sum: degrees.sum(),
            vertex_count: n,
        }
        .into());
    }

    let odd: Vec<usize> = degrees
        .as_slice()
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree % 2 == 1)
        .map(|(vertex, _)| vertex)
        .collect();

    if odd.len() % 2 != 0 {
        return Err(InvariantViolation::OddVertexCountOdd { count: odd.len() }.into());
    }

    Ok(OddVertices::new(odd))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Edge;

    #[test]
    fn star_has_odd_centre_and_leaves() {
        let tree = SpanningTree::new(
            4,
            vec![
                Edge::new(0, 1, 1.0),
                Edge::new(0, 2, 1.0),
                Edge::new(0, 3, 1.0),
            ],
        );
        let odd = odd_degree_vertices(&tree).unwrap();
        assert_eq!(odd.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn path_has_two_odd_ends() {
        let tree = SpanningTree::new(
            4,
            vec![
                Edge::new(2, 0, 1.0),
                Edge::new(2, 1, 1.0),
                Edge::new(1, 3, 1.0),
            ],
        );
        let odd = odd_degree_vertices(&tree).unwrap();
        assert_eq!(odd.as_slice(), &[0, 3]);
    }

    #[test]
    fn single_vertex_has_no_odd_vertices() {
        let odd = odd_degree_vertices(&SpanningTree::new(1, Vec::new())).unwrap();
        assert!(odd.is_empty());
    }

    #[test]
    fn too_few_edges_is_rejected() {
        // Three vertices need two edges.
        let tree = SpanningTree::new(3, vec![Edge::new(0, 1, 1.0)]);
        let err = odd_degree_vertices(&tree).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvariantViolation(InvariantViolation::DegreeSequence {
                len: 3,
                sum: 2,
                vertex_count: 3,
            })
        );
    }
}
