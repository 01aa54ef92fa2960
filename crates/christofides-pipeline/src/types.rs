//! Shared types for the Christofides pipeline.

use serde::{Deserialize, Serialize};

use crate::matching::MatcherKind;

/// A 2D point, used to build Euclidean distance matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An undirected weighted edge between two distinct vertices.
///
/// Endpoints are stored in canonical order (`u < v`) so two edges over
/// the same pair compare equal regardless of construction order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint.
    pub u: usize,
    /// Higher endpoint.
    pub v: usize,
    /// Weight taken from the distance matrix.
    pub weight: f64,
}

impl Edge {
    /// Create an edge, swapping endpoints into canonical order.
    #[must_use]
    pub const fn new(a: usize, b: usize, weight: f64) -> Self {
        if a <= b {
            Self { u: a, v: b, weight }
        } else {
            Self { u: b, v: a, weight }
        }
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not on
    /// this edge.
    #[must_use]
    pub const fn other(&self, vertex: usize) -> Option<usize> {
        if vertex == self.u {
            Some(self.v)
        } else if vertex == self.v {
            Some(self.u)
        } else {
            None
        }
    }
}

/// A spanning tree over all vertices of a distance matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanningTree {
    vertex_count: usize,
    edges: Vec<Edge>,
}

impl SpanningTree {
    pub(crate) const fn new(vertex_count: usize, edges: Vec<Edge>) -> Self {
        Self {
            vertex_count,
            edges,
        }
    }

    /// Number of vertices the tree spans.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Tree edges in the order Prim's algorithm added them.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Degree of every vertex in the tree.
    #[must_use]
    pub fn degrees(&self) -> DegreeSequence {
        let mut degrees = vec![0; self.vertex_count];
        for edge in &self.edges {
            degrees[edge.u] += 1;
            degrees[edge.v] += 1;
        }
        DegreeSequence(degrees)
    }
}

/// Per-vertex count of incident tree edges, indexed by vertex.
///
/// Always derived from a [`SpanningTree`]; never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeSequence(Vec<usize>);

impl DegreeSequence {
    /// Degrees indexed by vertex.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Sum of all degrees (twice the edge count).
    #[must_use]
    pub fn sum(&self) -> usize {
        self.0.iter().sum()
    }

    /// Number of vertices covered by the sequence.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the sequence covers no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Vertices of odd tree degree, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddVertices(Vec<usize>);

impl OddVertices {
    pub(crate) const fn new(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }

    /// The odd-degree vertices.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of odd-degree vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if every tree vertex has even degree.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A set of vertex-disjoint pairs covering the odd vertex set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matching {
    pairs: Vec<Edge>,
}

impl Matching {
    pub(crate) const fn new(pairs: Vec<Edge>) -> Self {
        Self { pairs }
    }

    /// Matched pairs, sorted by lower endpoint.
    #[must_use]
    pub fn pairs(&self) -> &[Edge] {
        &self.pairs
    }

    /// Number of matched pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if nothing was matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of matched pair weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.pairs.iter().map(|e| e.weight).sum()
    }
}

/// A closed walk `v0, v1, ..., vk = v0` using every multigraph edge once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerTour(Vec<usize>);

impl EulerTour {
    pub(crate) const fn new(walk: Vec<usize>) -> Self {
        Self(walk)
    }

    /// The walk, including the repeated start vertex at the end.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    /// Number of vertices in the walk (edges traversed + 1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the walk is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The final Hamiltonian cycle and its total length.
///
/// `vertices` holds each vertex exactly once; the cycle closes
/// implicitly from the last vertex back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    vertices: Vec<usize>,
    length: f64,
}

impl Tour {
    pub(crate) const fn new(vertices: Vec<usize>, length: f64) -> Self {
        Self { vertices, length }
    }

    /// Visit order, starting at the requested start vertex.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Total length including the closing edge.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Number of vertices visited.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the tour visits nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consecutive `(from, to)` legs, ending with the closing leg back
    /// to the first vertex. A single-vertex tour yields one `(v, v)` leg.
    pub fn legs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Consumes the tour and returns the visit order.
    #[must_use]
    pub fn into_vertices(self) -> Vec<usize> {
        self.vertices
    }
}

/// Deterministic tie-break rule for Prim's algorithm.
///
/// Any fixed rule keeps the approximation bound; fixtures in tests are
/// tied to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// Prefer the lowest vertex index among equal-weight candidates, and
    /// keep the lowest-index tree endpoint for a given vertex.
    #[default]
    LowestIndex,
    /// Mirror image of [`LowestIndex`](Self::LowestIndex).
    HighestIndex,
}

impl TieBreak {
    /// Whether `candidate` should win a tie against `incumbent`.
    #[must_use]
    pub const fn prefers(self, candidate: usize, incumbent: usize) -> bool {
        match self {
            Self::LowestIndex => candidate < incumbent,
            Self::HighestIndex => candidate > incumbent,
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Prim tie-break policy.
    pub tie_break: TieBreak,

    /// Which perfect-matching primitive to run on the odd vertex set.
    pub matcher: MatcherKind,

    /// Absolute tolerance when checking `d(i, j) == d(j, i)`.
    pub symmetry_tolerance: f64,
}

impl SolverConfig {
    /// Default Prim tie-break policy.
    pub const DEFAULT_TIE_BREAK: TieBreak = TieBreak::LowestIndex;

    /// Default matching primitive.
    pub const DEFAULT_MATCHER: MatcherKind = MatcherKind::Blossom;

    /// Default symmetry tolerance.
    pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1e-9;

    /// Check the configuration for values no run can use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `symmetry_tolerance`
    /// is negative or not finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.symmetry_tolerance.is_finite() || self.symmetry_tolerance < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "symmetry_tolerance must be finite and non-negative, got {}",
                self.symmetry_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tie_break: Self::DEFAULT_TIE_BREAK,
            matcher: Self::DEFAULT_MATCHER,
            symmetry_tolerance: Self::DEFAULT_SYMMETRY_TOLERANCE,
        }
    }
}

/// Every intermediate produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Vertex the tour starts from.
    pub start: usize,
    /// Stage 1: minimum spanning tree.
    pub tree: SpanningTree,
    /// Stage 2: vertices of odd tree degree.
    pub odd_vertices: OddVertices,
    /// Stage 3: minimum-weight perfect matching on the odd vertices.
    pub matching: Matching,
    /// Stage 4: number of traversable edges in the assembled multigraph.
    pub multigraph_edges: usize,
    /// Stage 5: Eulerian circuit of the multigraph.
    pub euler_tour: EulerTour,
    /// Stage 6: shortcut Hamiltonian cycle and its length.
    pub tour: Tour,
}

/// Malformed distance matrix or start vertex, detected before any stage runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum InputError {
    /// The matrix has no rows.
    #[error("distance matrix is empty")]
    Empty,

    /// The symmetry tolerance is NaN, infinite or negative.
    #[error("symmetry tolerance must be finite and non-negative, got {tolerance}")]
    InvalidTolerance {
        /// The rejected tolerance.
        tolerance: f64,
    },

    /// A row has the wrong number of entries.
    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Entries found in that row.
        len: usize,
        /// Number of rows in the matrix.
        expected: usize,
    },

    /// An entry is NaN or infinite.
    #[error("entry ({row}, {col}) is not finite")]
    NonFinite {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// An entry is negative.
    #[error("entry ({row}, {col}) is negative: {value}")]
    Negative {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The negative value.
        value: f64,
    },

    /// A diagonal entry is not zero.
    #[error("diagonal entry ({index}, {index}) is {value}, expected 0")]
    NonZeroDiagonal {
        /// Vertex index.
        index: usize,
        /// The non-zero value.
        value: f64,
    },

    /// `d(row, col)` and `d(col, row)` differ by more than the tolerance.
    #[error("matrix is not symmetric at ({row}, {col}): {forward} vs {backward}")]
    Asymmetric {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// `d(row, col)`.
        forward: f64,
        /// `d(col, row)`.
        backward: f64,
    },

    /// The start vertex is not a vertex of the matrix.
    #[error("start vertex {start} is out of range for {vertex_count} vertices")]
    StartOutOfRange {
        /// Requested start vertex.
        start: usize,
        /// Number of vertices.
        vertex_count: usize,
    },
}

/// A stage found a precondition the previous stage should have guaranteed.
///
/// These indicate a bug in the pipeline, never bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum InvariantViolation {
    /// Prim's algorithm stopped before connecting every vertex.
    #[error("spanning tree has {edges} edges for {vertex_count} vertices")]
    SpanningTreeIncomplete {
        /// Edges produced.
        edges: usize,
        /// Vertices to span.
        vertex_count: usize,
    },

    /// The degree sequence does not describe a tree on the vertex set.
    #[error(
        "degree sequence covers {len} vertices with degree sum {sum}, expected {vertex_count} vertices"
    )]
    DegreeSequence {
        /// Vertices in the sequence.
        len: usize,
        /// Sum of degrees.
        sum: usize,
        /// Vertices in the tree.
        vertex_count: usize,
    },

    /// The odd vertex set has odd size.
    #[error("odd vertex set has odd size {count}")]
    OddVertexCountOdd {
        /// Size of the set.
        count: usize,
    },

    /// The matcher left vertices uncovered.
    #[error("matching leaves {} odd vertices uncovered: {uncovered:?}", .uncovered.len())]
    ImperfectMatching {
        /// Odd vertices not in any pair.
        uncovered: Vec<usize>,
    },

    /// A vertex appears in more than one matched pair.
    #[error("vertex {vertex} appears in more than one matched pair")]
    MatchingOverlap {
        /// Repeated vertex.
        vertex: usize,
    },

    /// A matched pair uses a vertex outside the odd vertex set.
    #[error("matched vertex {vertex} is not an odd-degree vertex")]
    MatchingForeignVertex {
        /// Offending vertex.
        vertex: usize,
    },

    /// The blossom matcher's bookkeeping contradicted itself.
    #[error("blossom matcher reached an inconsistent state: {0}")]
    BlossomState(String),

    /// A multigraph vertex has odd degree.
    #[error("multigraph vertex {vertex} has odd degree {degree}")]
    OddMultigraphDegree {
        /// Offending vertex.
        vertex: usize,
        /// Its degree.
        degree: usize,
    },

    /// Not every vertex is reachable from the start vertex.
    #[error("multigraph is disconnected: reached {reached} of {vertex_count} vertices")]
    DisconnectedMultigraph {
        /// Vertices reachable from the start.
        reached: usize,
        /// Vertices in the graph.
        vertex_count: usize,
    },

    /// The Euler walk did not use every edge or did not close.
    #[error("euler circuit traversed {traversed} of {edges} edges")]
    IncompleteCircuit {
        /// Edges in the walk.
        traversed: usize,
        /// Edges in the multigraph.
        edges: usize,
    },

    /// Shortcutting did not visit every vertex.
    #[error("shortcut tour visits {visited} of {vertex_count} vertices")]
    IncompleteTour {
        /// Distinct vertices in the tour.
        visited: usize,
        /// Vertices in the matrix.
        vertex_count: usize,
    },
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// The distance matrix or start vertex is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Solver configuration is invalid.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// A pipeline stage broke an invariant the next stage relies on.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}
