//! Minimum spanning tree via Prim's algorithm.
//!
//! The input graph is complete, so the dense `O(N²)` form is used: one
//! `key`/`parent` slot per vertex, no heap. Ties on equal weight are
//! resolved by [`TieBreak`] on vertex index so the tree (and every stage
//! downstream of it) is reproducible.

use crate::matrix::DistanceMatrix;
use crate::types::{Edge, InputError, InvariantViolation, PipelineError, SpanningTree, TieBreak};

/// Build a minimum spanning tree grown from `start`.
///
/// Edges are returned in the order they were added. For each newly
/// connected vertex `v` the edge weight is `d(parent, v)`.
///
/// # Errors
///
/// Returns [`InputError::StartOutOfRange`] if `start` is not a vertex,
/// or [`InvariantViolation::SpanningTreeIncomplete`] if the tree ends
/// up with fewer than `N - 1` edges.
#[allow(clippy::float_cmp)] // exact ties go to the tie-break rule
pub fn spanning_tree(
    matrix: &DistanceMatrix,
    start: usize,
    tie_break: TieBreak,
) -> Result<SpanningTree, PipelineError> {
    let n = matrix.len();
    if start >= n {
        return Err(InputError::StartOutOfRange {
            start,
            vertex_count: n,
        }
        .into());
    }

    let mut connected = vec![false; n];
    let mut key = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    connected[start] = true;
    for v in (0..n).filter(|&v| v != start) {
        key[v] = matrix.get(start, v);
        parent[v] = Some(start);
    }

    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    while let Some(next) = cheapest_frontier_vertex(&connected, &key, tie_break) {
        connected[next] = true;
        if let Some(from) = parent[next] {
            edges.push(Edge::new(from, next, matrix.get(from, next)));
        }

        for w in 0..n {
            if connected[w] {
                continue;
            }
            let weight = matrix.get(next, w);
            let better = weight < key[w]
                || (weight == key[w] && parent[w].is_none_or(|p| tie_break.prefers(next, p)));
            if better {
                key[w] = weight;
                parent[w] = Some(next);
            }
        }
    }

    if edges.len() + 1 != n {
        return Err(InvariantViolation::SpanningTreeIncomplete {
            edges: edges.len(),
            vertex_count: n,
        }
        .into());
    }

    Ok(SpanningTree::new(n, edges))
}

/// The unconnected vertex with the smallest key, or `None` once every
/// vertex is connected.
#[allow(clippy::float_cmp)]
fn cheapest_frontier_vertex(connected: &[bool], key: &[f64], tie_break: TieBreak) -> Option<usize> {
    let mut best: Option<usize> = None;
    for v in (0..key.len()).filter(|&v| !connected[v]) {
        best = match best {
            None => Some(v),
            Some(b) if key[v] < key[b] || (key[v] == key[b] && tie_break.prefers(v, b)) => Some(v),
            keep => keep,
        };
    }
    best
}
