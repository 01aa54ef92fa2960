//! christofides-pipeline: Christofides' approximation for the metric
//! travelling salesman problem (sans-IO).
//!
//! Turns a distance matrix into a closed tour through:
//! minimum spanning tree -> odd-degree vertices -> minimum-weight perfect
//! matching -> Eulerian multigraph -> Euler circuit -> shortcut tour.
//!
//! When the distances satisfy the triangle inequality the tour is at most
//! 1.5 times the optimum. Non-metric input still produces a valid tour,
//! just without that bound.
//!
//! This crate has **no I/O dependencies**: it reads an in-memory
//! [`DistanceMatrix`] and returns structured data. Loading problems,
//! labelling vertices and timing live in `christofides-cli`.

mod blossom;
pub mod diagnostics;
pub mod euler;
pub mod matching;
pub mod matrix;
pub mod mst;
pub mod multigraph;
pub mod parity;
pub mod pipeline;
pub mod shortcut;
pub mod types;

pub use matching::{MatcherKind, PerfectMatcher};
pub use matrix::DistanceMatrix;
pub use multigraph::{EdgeOrigin, Multigraph};
pub use pipeline::Pipeline;
pub use types::{
    Edge, EulerTour, InputError, InvariantViolation, Matching, OddVertices, PipelineError, Point,
    SolverConfig, SpanningTree, StagedResult, TieBreak, Tour,
};

/// Run the full pipeline and return the tour.
///
/// The tour starts at `start` and is implicitly closed; its length is
/// summed from `matrix` along the returned order.
///
/// # Pipeline steps
///
/// 1. Prim's minimum spanning tree from `start`
/// 2. Vertices of odd tree degree
/// 3. Minimum-weight perfect matching on those vertices (pluggable)
/// 4. Tree ∪ matching multigraph
/// 5. Hierholzer Euler circuit from `start`
/// 6. Shortcut repeated vertices
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for an unusable config,
/// [`PipelineError::InvalidInput`] if `start` is out of range, and
/// [`PipelineError::InvariantViolation`] if a stage finds its input
/// broken.
pub fn solve(
    matrix: &DistanceMatrix,
    start: usize,
    config: &SolverConfig,
) -> Result<Tour, PipelineError> {
    Ok(solve_staged(matrix, start, config)?.tour)
}

/// Validate raw rows with `config.symmetry_tolerance`, then [`solve`].
///
/// # Errors
///
/// As [`solve`], plus [`PipelineError::InvalidInput`] for any malformed
/// row.
pub fn solve_rows(
    rows: &[Vec<f64>],
    start: usize,
    config: &SolverConfig,
) -> Result<Tour, PipelineError> {
    config.validate()?;
    let matrix = DistanceMatrix::from_rows(rows, config.symmetry_tolerance)?;
    solve(&matrix, start, config)
}

/// Run the full pipeline and keep every intermediate.
///
/// # Errors
///
/// As [`solve`].
pub fn solve_staged(
    matrix: &DistanceMatrix,
    start: usize,
    config: &SolverConfig,
) -> Result<StagedResult, PipelineError> {
    let result = Pipeline::new(matrix, start, config.clone())
        .build_tree()?
        .find_odd_vertices()?
        .match_odd_vertices()?
        .assemble()
        .traverse()?
        .shortcut()?
        .into_result();
    Ok(result)
}
