//! Eulerian circuit via Hierholzer's algorithm.

use crate::multigraph::Multigraph;
use crate::types::{EulerTour, InvariantViolation, PipelineError};

/// Stage 5: a closed walk from `start` that uses every multigraph edge
/// exactly once.
///
/// Follows unused edges from the top of a stack until stuck, then
/// backtracks, emitting vertices; sub-circuits found while backtracking
/// are spliced in automatically. The emitted sequence is reversed at the
/// end so the walk reads from `start`.
///
/// # Errors
///
/// Returns the [`InvariantViolation`] from
/// [`Multigraph::check_eulerian`] if the graph has an odd vertex or is
/// disconnected, or [`InvariantViolation::IncompleteCircuit`] if the
/// walk does not close at `start` after using every edge.
pub fn euler_circuit(graph: &Multigraph, start: usize) -> Result<EulerTour, PipelineError> {
    graph.check_eulerian(start)?;

    let edge_count = graph.edge_count();
    let mut used_edges = vec![false; edge_count];
    let mut stack = vec![start];
    let mut path = Vec::with_capacity(edge_count + 1);

    while let Some(&current) = stack.last() {
        let next_edge = graph
            .incident(current)
            .find(|&(edge, _)| !used_edges[edge]);

        if let Some((edge, target)) = next_edge {
            used_edges[edge] = true;
            stack.push(target);
        } else if let Some(done) = stack.pop() {
            path.push(done);
        }
    }
    path.reverse();

    let closed = path.first() == Some(&start) && path.last() == Some(&start);
    if !closed || path.len() != edge_count + 1 {
        return Err(InvariantViolation::IncompleteCircuit {
            traversed: path.len().saturating_sub(1),
            edges: edge_count,
        }
        .into());
    }

    Ok(EulerTour::new(path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{Edge, Matching, SpanningTree};

    /// Multiset of unordered edges walked by `tour`.
    fn walked(tour: &EulerTour) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::new();
        for w in tour.vertices().windows(2) {
            let key = (w[0].min(w[1]), w[0].max(w[1]));
            *counts.entry(key).or_default() += 1;
        }
        counts
    }

    #[test]
    fn triangle_circuit() {
        let tree = SpanningTree::new(3, vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)]);
        let matching = Matching::new(vec![Edge::new(0, 2, 1.0)]);
        let g = Multigraph::assemble(&tree, &matching);

        let tour = euler_circuit(&g, 0).unwrap();
        assert_eq!(tour.len(), 4, "3 edges need 4 walk vertices");
        assert_eq!(tour.vertices()[0], 0);
        assert_eq!(tour.vertices()[3], 0);
        assert_eq!(walked(&tour).values().sum::<usize>(), 3);
    }

    #[test]
    fn parallel_edges_are_both_walked() {
        let tree = SpanningTree::new(2, vec![Edge::new(0, 1, 5.0)]);
        let matching = Matching::new(vec![Edge::new(0, 1, 5.0)]);
        let g = Multigraph::assemble(&tree, &matching);

        let tour = euler_circuit(&g, 1).unwrap();
        assert_eq!(tour.vertices(), &[1, 0, 1]);
    }

    #[test]
    fn figure_eight_splices_sub_circuit() {
        // Two triangles sharing vertex 2: 0-1-2 and 2-3-4.
        let tree = SpanningTree::new(
            5,
            vec![
                Edge::new(0, 1, 1.0),
                Edge::new(1, 2, 1.0),
                Edge::new(2, 3, 1.0),
                Edge::new(3, 4, 1.0),
            ],
        );
        let matching = Matching::new(vec![Edge::new(0, 2, 1.0), Edge::new(2, 4, 1.0)]);
        let g = Multigraph::assemble(&tree, &matching);

        let tour = euler_circuit(&g, 0).unwrap();
        assert_eq!(tour.len(), 7);
        assert_eq!(tour.vertices().first(), Some(&0));
        assert_eq!(tour.vertices().last(), Some(&0));
        let counts = walked(&tour);
        for key in [(0, 1), (1, 2), (2, 3), (3, 4), (0, 2), (2, 4)] {
            assert_eq!(counts.get(&key), Some(&1), "edge {key:?}");
        }
    }

    #[test]
    fn single_vertex_walk() {
        let g = Multigraph::assemble(&SpanningTree::new(1, Vec::new()), &Matching::default());
        let tour = euler_circuit(&g, 0).unwrap();
        assert_eq!(tour.vertices(), &[0]);
    }

    #[test]
    fn odd_vertex_is_rejected() {
        let tree = SpanningTree::new(2, vec![Edge::new(0, 1, 1.0)]);
        let g = Multigraph::assemble(&tree, &Matching::default());
        let err = euler_circuit(&g, 0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvariantViolation(InvariantViolation::OddMultigraphDegree { .. })
        ));
    }
}
