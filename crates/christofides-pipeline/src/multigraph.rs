//! Union of spanning-tree and matching edges as an undirected multigraph.
//!
//! Parallel edges are kept: a matched pair that is also a tree edge
//! yields two traversable edges between the same vertices.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use serde::{Deserialize, Serialize};

use crate::types::{InvariantViolation, Matching, SpanningTree};

/// Which stage contributed a multigraph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeOrigin {
    /// Minimum spanning tree edge.
    Tree,
    /// Perfect matching edge.
    Matching,
}

/// Edge payload: weight and origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiEdge {
    /// Distance between the endpoints.
    pub weight: f64,
    /// Stage the edge came from.
    pub origin: EdgeOrigin,
}

/// Connected multigraph on `0..N` in which every vertex should have even
/// degree. Node index `i` is vertex `i`.
#[derive(Debug, Clone)]
pub struct Multigraph {
    graph: UnGraph<(), MultiEdge>,
}

impl Multigraph {
    /// Stage 4: tree edges followed by matching edges, one node per
    /// vertex of the tree.
    #[must_use]
    pub fn assemble(tree: &SpanningTree, matching: &Matching) -> Self {
        let n = tree.vertex_count();
        let mut graph =
            UnGraph::with_capacity(n, tree.edges().len() + matching.len());
        for _ in 0..n {
            graph.add_node(());
        }

        let tree_edges = tree.edges().iter().map(|e| (e, EdgeOrigin::Tree));
        let matching_edges = matching.pairs().iter().map(|e| (e, EdgeOrigin::Matching));
        for (edge, origin) in tree_edges.chain(matching_edges) {
            graph.add_edge(
                NodeIndex::new(edge.u),
                NodeIndex::new(edge.v),
                MultiEdge {
                    weight: edge.weight,
                    origin,
                },
            );
        }

        Self { graph }
    }

    /// The underlying petgraph graph.
    #[must_use]
    pub const fn graph(&self) -> &UnGraph<(), MultiEdge> {
        &self.graph
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of traversable edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges contributed by `origin`.
    #[must_use]
    pub fn count_origin(&self, origin: EdgeOrigin) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| e.origin == origin)
            .count()
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().map(|e| e.weight).sum()
    }

    /// Number of edge ends at `vertex`.
    #[must_use]
    pub fn degree(&self, vertex: usize) -> usize {
        self.graph.edges(NodeIndex::new(vertex)).count()
    }

    /// Check the Eulerian-circuit precondition: every vertex has even
    /// degree and every vertex is reachable from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::OddMultigraphDegree`] for the first
    /// odd vertex, or [`InvariantViolation::DisconnectedMultigraph`].
    pub fn check_eulerian(&self, start: usize) -> Result<(), InvariantViolation> {
        for node in self.graph.node_indices() {
            let degree = self.graph.edges(node).count();
            if degree % 2 != 0 {
                return Err(InvariantViolation::OddMultigraphDegree {
                    vertex: node.index(),
                    degree,
                });
            }
        }

        let vertex_count = self.vertex_count();
        let reached = if start < vertex_count {
            let mut bfs = Bfs::new(&self.graph, NodeIndex::new(start));
            let mut reached = 0;
            while bfs.next(&self.graph).is_some() {
                reached += 1;
            }
            reached
        } else {
            0
        };
        if reached != vertex_count {
            return Err(InvariantViolation::DisconnectedMultigraph {
                reached,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Edges incident to `vertex` as `(edge index, other endpoint)`.
    pub(crate) fn incident(&self, vertex: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edges(NodeIndex::new(vertex))
            .map(move |e| {
                let other = if e.source().index() == vertex {
                    e.target()
                } else {
                    e.source()
                };
                (e.id().index(), other.index())
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Edge;

    fn path_tree() -> SpanningTree {
        // 0 - 1 - 2
        SpanningTree::new(3, vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 2.0)])
    }

    #[test]
    fn assemble_counts_edges_by_origin() {
        let matching = Matching::new(vec![Edge::new(0, 2, 3.0)]);
        let g = Multigraph::assemble(&path_tree(), &matching);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.count_origin(EdgeOrigin::Tree), 2);
        assert_eq!(g.count_origin(EdgeOrigin::Matching), 1);
        assert!((g.total_weight() - 6.0).abs() < f64::EPSILON);
        assert!(g.check_eulerian(0).is_ok());
    }

    #[test]
    fn parallel_edges_are_kept() {
        let tree = SpanningTree::new(2, vec![Edge::new(0, 1, 4.0)]);
        let matching = Matching::new(vec![Edge::new(0, 1, 4.0)]);
        let g = Multigraph::assemble(&tree, &matching);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(1), 2);
        assert!(g.check_eulerian(1).is_ok());
    }

    #[test]
    fn odd_degree_is_reported() {
        let g = Multigraph::assemble(&path_tree(), &Matching::default());
        assert_eq!(
            g.check_eulerian(0),
            Err(InvariantViolation::OddMultigraphDegree {
                vertex: 0,
                degree: 1
            })
        );
    }

    #[test]
    fn disconnection_is_reported() {
        // Two separate 2-cycles: even everywhere but not connected.
        let tree = SpanningTree::new(4, vec![Edge::new(0, 1, 1.0), Edge::new(2, 3, 1.0)]);
        let matching = Matching::new(vec![Edge::new(0, 1, 1.0), Edge::new(2, 3, 1.0)]);
        let g = Multigraph::assemble(&tree, &matching);
        assert_eq!(
            g.check_eulerian(0),
            Err(InvariantViolation::DisconnectedMultigraph {
                reached: 2,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn single_vertex_is_trivially_eulerian() {
        let g = Multigraph::assemble(&SpanningTree::new(1, Vec::new()), &Matching::default());
        assert_eq!(g.edge_count(), 0);
        assert!(g.check_eulerian(0).is_ok());
    }

    #[test]
    fn incident_reports_other_endpoint() {
        let g = Multigraph::assemble(&path_tree(), &Matching::default());
        let mut around_one: Vec<usize> = g.incident(1).map(|(_, other)| other).collect();
        around_one.sort_unstable();
        assert_eq!(around_one, vec![0, 2]);
    }
}
