//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::solve_staged`] which runs every stage in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use christofides_pipeline::{DistanceMatrix, Pipeline, PipelineError, Point, SolverConfig};
//! # fn run() -> Result<(), PipelineError> {
//! let matrix = DistanceMatrix::from_points(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(3.0, 0.0),
//!     Point::new(3.0, 4.0),
//! ])?;
//! let pipeline = Pipeline::new(&matrix, 0, SolverConfig::default())
//!     .build_tree()?
//!     .find_odd_vertices()?
//!     .match_odd_vertices()?
//!     .assemble()
//!     .traverse()?
//!     .shortcut()?;
//!
//! let staged = pipeline.into_result();
//! assert_eq!(staged.tour.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying every previously computed
//! intermediate. The distance matrix is borrowed for the whole chain and
//! never modified.

use log::debug;

use crate::diagnostics::StageMetrics;
use crate::matrix::DistanceMatrix;
use crate::multigraph::{EdgeOrigin, Multigraph};
use crate::types::{
    EulerTour, Matching, OddVertices, PipelineError, SolverConfig, SpanningTree, StagedResult,
    Tour,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any stage has run.
///
/// Call [`build_tree`](Self::build_tree) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing — call .build_tree() to continue"]
pub struct Pending<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    config: SolverConfig,
}

impl<'a> Pending<'a> {
    /// The input distance matrix.
    #[must_use]
    pub const fn matrix(&self) -> &'a DistanceMatrix {
        self.matrix
    }

    /// The vertex the tour will start from.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Validate the config and grow a minimum spanning tree from the
    /// start vertex.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the config fails
    /// [`SolverConfig::validate`], [`PipelineError::InvalidInput`] if
    /// `start` is not a vertex, or [`PipelineError::InvariantViolation`]
    /// if the tree is incomplete.
    pub fn build_tree(self) -> Result<TreeBuilt<'a>, PipelineError> {
        self.config.validate()?;
        let tree = crate::mst::spanning_tree(self.matrix, self.start, self.config.tie_break)?;
        debug!(
            "spanning tree: {} edges, weight {:.6}",
            tree.edges().len(),
            tree.total_weight()
        );
        Ok(TreeBuilt {
            matrix: self.matrix,
            start: self.start,
            config: self.config,
            tree,
        })
    }
}

// ───────────────────────── Stage 1: TreeBuilt ────────────────────────

/// Pipeline state after building the minimum spanning tree.
#[must_use = "pipeline stages are consumed by advancing — call .find_odd_vertices() to continue"]
pub struct TreeBuilt<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    config: SolverConfig,
    tree: SpanningTree,
}

impl<'a> TreeBuilt<'a> {
    /// The minimum spanning tree.
    #[must_use]
    pub const fn tree(&self) -> &SpanningTree {
        &self.tree
    }

    /// Collect the vertices of odd tree degree.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvariantViolation`] if the degree
    /// sequence is inconsistent with the tree or the odd set has odd
    /// size.
    pub fn find_odd_vertices(self) -> Result<OddFound<'a>, PipelineError> {
        let odd = crate::parity::odd_degree_vertices(&self.tree)?;
        debug!("odd-degree vertices: {}", odd.len());
        Ok(OddFound {
            matrix: self.matrix,
            start: self.start,
            config: self.config,
            tree: self.tree,
            odd,
        })
    }
}

// ───────────────────────── Stage 2: OddFound ─────────────────────────

/// Pipeline state after finding the odd-degree vertices.
#[must_use = "pipeline stages are consumed by advancing — call .match_odd_vertices() to continue"]
pub struct OddFound<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    config: SolverConfig,
    tree: SpanningTree,
    odd: OddVertices,
}

impl<'a> OddFound<'a> {
    /// The vertices of odd tree degree, ascending.
    #[must_use]
    pub const fn odd_vertices(&self) -> &OddVertices {
        &self.odd
    }

    /// Pair the odd vertices with minimum total weight using the
    /// configured matcher.
    ///
    /// When the odd set is empty the tree is already Eulerian and the
    /// matcher is not called.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the matcher cannot
    /// handle this many vertices, or [`PipelineError::InvariantViolation`]
    /// if the result is not a perfect matching of the odd set.
    pub fn match_odd_vertices(self) -> Result<Matched<'a>, PipelineError> {
        let skipped = self.odd.is_empty();
        let matching =
            crate::matching::match_odd_vertices(self.matrix, &self.odd, &self.config.matcher)?;
        if skipped {
            debug!("matching skipped: spanning tree is already Eulerian");
        } else {
            debug!(
                "{} matching: {} pairs, weight {:.6}",
                self.config.matcher.name(),
                matching.len(),
                matching.total_weight()
            );
        }
        Ok(Matched {
            matrix: self.matrix,
            start: self.start,
            config: self.config,
            tree: self.tree,
            odd: self.odd,
            matching,
            skipped,
        })
    }
}

// ───────────────────────── Stage 3: Matched ──────────────────────────

/// Pipeline state after matching the odd vertices.
#[must_use = "pipeline stages are consumed by advancing — call .assemble() to continue"]
pub struct Matched<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    config: SolverConfig,
    tree: SpanningTree,
    odd: OddVertices,
    matching: Matching,
    skipped: bool,
}

impl<'a> Matched<'a> {
    /// The minimum-weight perfect matching.
    #[must_use]
    pub const fn matching(&self) -> &Matching {
        &self.matching
    }

    /// Whether matching was skipped because the odd set was empty.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        self.skipped
    }

    /// Union the tree and matching edges into a multigraph.
    pub fn assemble(self) -> Assembled<'a> {
        let graph = Multigraph::assemble(&self.tree, &self.matching);
        debug!(
            "multigraph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        Assembled {
            matrix: self.matrix,
            start: self.start,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            graph,
        }
    }
}

// ───────────────────────── Stage 4: Assembled ────────────────────────

/// Pipeline state after assembling the multigraph.
#[must_use = "pipeline stages are consumed by advancing — call .traverse() to continue"]
pub struct Assembled<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    tree: SpanningTree,
    odd: OddVertices,
    matching: Matching,
    graph: Multigraph,
}

impl<'a> Assembled<'a> {
    /// The assembled multigraph.
    #[must_use]
    pub const fn multigraph(&self) -> &Multigraph {
        &self.graph
    }

    /// Walk an Eulerian circuit of the multigraph from the start vertex.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvariantViolation`] if the multigraph
    /// is not Eulerian or the walk does not use every edge.
    pub fn traverse(self) -> Result<Traversed<'a>, PipelineError> {
        let walk = crate::euler::euler_circuit(&self.graph, self.start)?;
        debug!("euler circuit: {} vertices", walk.len());
        Ok(Traversed {
            matrix: self.matrix,
            start: self.start,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph_edges: self.graph.edge_count(),
            walk,
        })
    }
}

// ───────────────────────── Stage 5: Traversed ────────────────────────

/// Pipeline state after walking the Eulerian circuit.
#[must_use = "pipeline stages are consumed by advancing — call .shortcut() to continue"]
pub struct Traversed<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    tree: SpanningTree,
    odd: OddVertices,
    matching: Matching,
    multigraph_edges: usize,
    walk: EulerTour,
}

impl<'a> Traversed<'a> {
    /// The Eulerian circuit.
    #[must_use]
    pub const fn euler_tour(&self) -> &EulerTour {
        &self.walk
    }

    /// Drop repeated vertices from the circuit, the final pipeline step.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvariantViolation`] if the circuit
    /// misses a vertex.
    pub fn shortcut(self) -> Result<Shortcut<'a>, PipelineError> {
        let tour = crate::shortcut::shortcut(&self.walk, self.matrix)?;
        debug!("tour: {} vertices, length {:.6}", tour.len(), tour.length());
        Ok(Shortcut {
            matrix: self.matrix,
            start: self.start,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph_edges: self.multigraph_edges,
            walk: self.walk,
            tour,
        })
    }
}

// ───────────────────────── Stage 6: Shortcut ─────────────────────────

/// Pipeline state after shortcutting, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`] containing all intermediates.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Shortcut<'a> {
    matrix: &'a DistanceMatrix,
    start: usize,
    tree: SpanningTree,
    odd: OddVertices,
    matching: Matching,
    multigraph_edges: usize,
    walk: EulerTour,
    tour: Tour,
}

impl Shortcut<'_> {
    /// The final tour.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.tour
    }

    /// The input distance matrix.
    #[must_use]
    pub const fn matrix(&self) -> &DistanceMatrix {
        self.matrix
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            start: self.start,
            tree: self.tree,
            odd_vertices: self.odd,
            matching: self.matching,
            multigraph_edges: self.multigraph_edges,
            euler_tour: self.walk,
            tour: self.tour,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 7;

/// The output produced by a single pipeline stage.
///
/// Each variant borrows the data that the corresponding stage computed.
#[must_use]
pub enum StageOutput<'a> {
    /// Input matrix and start vertex (nothing computed yet).
    Input {
        /// The distance matrix.
        matrix: &'a DistanceMatrix,
        /// The start vertex.
        start: usize,
    },
    /// Minimum spanning tree.
    Tree {
        /// The tree.
        tree: &'a SpanningTree,
    },
    /// Odd-degree vertex set.
    OddVertices {
        /// The odd vertices.
        odd: &'a OddVertices,
    },
    /// Perfect matching on the odd vertices.
    Matching {
        /// The matched pairs.
        matching: &'a Matching,
        /// Whether the matcher was skipped.
        skipped: bool,
    },
    /// Tree ∪ matching multigraph.
    Multigraph {
        /// The multigraph.
        graph: &'a Multigraph,
    },
    /// Eulerian circuit.
    Euler {
        /// The closed walk.
        walk: &'a EulerTour,
    },
    /// Final tour.
    Tour {
        /// The Hamiltonian cycle.
        tour: &'a Tour,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Each stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
///
/// # Loop pattern
///
/// ```rust
/// # use christofides_pipeline::{DistanceMatrix, Pipeline, PipelineError, SolverConfig};
/// # use christofides_pipeline::pipeline::{Advance, Stage};
/// # fn run(matrix: &DistanceMatrix) -> Result<(), PipelineError> {
/// let mut stage: Stage<'_> = Pipeline::new(matrix, 0, SolverConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage<'a>: Sized {
    /// Short name of this stage (e.g. `"tree"`, `"matching"`).
    const NAME: &'static str;

    /// Zero-based index of this stage (`0` for Pending through `6` for
    /// Shortcut).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage, which has not
    /// done any work yet.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if the stage transition fails.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] from the stage being run.
    fn next(self) -> Result<Option<Stage<'a>>, PipelineError>;

    /// Run all remaining stages and return the final [`StagedResult`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    fn complete(self) -> Result<StagedResult, PipelineError>;
}

impl<'a> PipelineStage<'a> for Pending<'a> {
    const NAME: &'static str = "input";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Input {
            matrix: self.matrix,
            start: self.start,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::TreeBuilt(self.build_tree()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.build_tree()?.complete()
    }
}

impl<'a> PipelineStage<'a> for TreeBuilt<'a> {
    const NAME: &'static str = "tree";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Tree { tree: &self.tree }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Tree {
            edge_count: self.tree.edges().len(),
            weight: self.tree.total_weight(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::OddFound(self.find_odd_vertices()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.find_odd_vertices()?.complete()
    }
}

impl<'a> PipelineStage<'a> for OddFound<'a> {
    const NAME: &'static str = "odd";
    const INDEX: usize = 2;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::OddVertices { odd: &self.odd }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::OddVertices {
            count: self.odd.len(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::Matched(self.match_odd_vertices()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.match_odd_vertices()?.complete()
    }
}

impl<'a> PipelineStage<'a> for Matched<'a> {
    const NAME: &'static str = "matching";
    const INDEX: usize = 3;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Matching {
            matching: &self.matching,
            skipped: self.skipped,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Matching {
            pairs: self.matching.len(),
            weight: self.matching.total_weight(),
            matcher: self.config.matcher.name().to_owned(),
            skipped: self.skipped,
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::Assembled(self.assemble())))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.assemble().complete()
    }
}

impl<'a> PipelineStage<'a> for Assembled<'a> {
    const NAME: &'static str = "multigraph";
    const INDEX: usize = 4;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Multigraph { graph: &self.graph }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Multigraph {
            edges: self.graph.edge_count(),
            tree_edges: self.graph.count_origin(EdgeOrigin::Tree),
            matching_edges: self.graph.count_origin(EdgeOrigin::Matching),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::Traversed(self.traverse()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.traverse()?.complete()
    }
}

impl<'a> PipelineStage<'a> for Traversed<'a> {
    const NAME: &'static str = "euler";
    const INDEX: usize = 5;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Euler { walk: &self.walk }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Euler {
            length: self.walk.len(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(Some(Stage::Shortcut(self.shortcut()?)))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        Ok(self.shortcut()?.into_result())
    }
}

impl<'a> PipelineStage<'a> for Shortcut<'a> {
    const NAME: &'static str = "shortcut";
    const INDEX: usize = 6;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Tour { tour: &self.tour }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        // The closing return to the start is not a dropped repeat.
        let repeats_dropped = self.walk.len().saturating_sub(self.tour.len() + 1);
        Some(StageMetrics::Shortcut {
            vertices: self.tour.len(),
            repeats_dropped,
            length: self.tour.length(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        Ok(self.into_result())
    }
}

/// Enum wrapping all pipeline stages for uniform, loopable access.
///
/// Use [`From`] conversions to enter the dynamic API from any typed
/// stage, then call [`advance`](Self::advance) in a loop.
#[must_use]
pub enum Stage<'a> {
    /// See [`Pending`].
    Pending(Pending<'a>),
    /// See [`TreeBuilt`].
    TreeBuilt(TreeBuilt<'a>),
    /// See [`OddFound`].
    OddFound(OddFound<'a>),
    /// See [`Matched`].
    Matched(Matched<'a>),
    /// See [`Assembled`].
    Assembled(Assembled<'a>),
    /// See [`Traversed`].
    Traversed(Traversed<'a>),
    /// See [`Shortcut`].
    Shortcut(Shortcut<'a>),
}

/// Compile-time guard: if a [`Stage`] variant is added, this match becomes
/// non-exhaustive and the build fails, a reminder to bump [`STAGE_COUNT`].
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage<'_>) {
    match s {
        Stage::Pending(_)
        | Stage::TreeBuilt(_)
        | Stage::OddFound(_)
        | Stage::Matched(_)
        | Stage::Assembled(_)
        | Stage::Traversed(_)
        | Stage::Shortcut(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance<'a> {
    /// The pipeline advanced to this next stage.
    Next(Stage<'a>),
    /// The pipeline was already at the final stage, returned unchanged.
    Complete(Stage<'a>),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::TreeBuilt(s) => s.$method($($arg),*),
            Self::OddFound(s) => s.$method($($arg),*),
            Self::Matched(s) => s.$method($($arg),*),
            Self::Assembled(s) => s.$method($($arg),*),
            Self::Traversed(s) => s.$method($($arg),*),
            Self::Shortcut(s) => s.$method($($arg),*),
        }
    };
}

impl<'a> Stage<'a> {
    /// Short name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// Stage-specific metrics for diagnostics, `None` for `Pending`.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Shortcut(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(None)` if already complete (the final stage is
    /// consumed).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// Unlike [`next`](Self::next), the final stage is handed back in
    /// [`Advance::Complete`] so [`complete`](Self::complete) can still
    /// be called on it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn advance(self) -> Result<Advance<'a>, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Non-complete stages always return Ok(Some(_)) from next().
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    pub fn complete(self) -> Result<StagedResult, PipelineError> {
        delegate!(self, complete)
    }
}

// Lets the macro call `.name()` and `.index()` on `&self`; associated
// constants aren't reachable as `self.NAME`.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<'a, T: PipelineStage<'a>> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

impl<'a> From<Pending<'a>> for Stage<'a> {
    fn from(s: Pending<'a>) -> Self {
        Self::Pending(s)
    }
}

impl<'a> From<TreeBuilt<'a>> for Stage<'a> {
    fn from(s: TreeBuilt<'a>) -> Self {
        Self::TreeBuilt(s)
    }
}

impl<'a> From<OddFound<'a>> for Stage<'a> {
    fn from(s: OddFound<'a>) -> Self {
        Self::OddFound(s)
    }
}

impl<'a> From<Matched<'a>> for Stage<'a> {
    fn from(s: Matched<'a>) -> Self {
        Self::Matched(s)
    }
}

impl<'a> From<Assembled<'a>> for Stage<'a> {
    fn from(s: Assembled<'a>) -> Self {
        Self::Assembled(s)
    }
}

impl<'a> From<Traversed<'a>> for Stage<'a> {
    fn from(s: Traversed<'a>) -> Self {
        Self::Traversed(s)
    }
}

impl<'a> From<Shortcut<'a>> for Stage<'a> {
    fn from(s: Shortcut<'a>) -> Self {
        Self::Shortcut(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental Christofides pipeline.
///
/// Created via [`Pipeline::new`], which stores the matrix, start vertex
/// and config without doing any work. Each stage method consumes the
/// current state and returns the next, making it a compile-time error
/// to skip stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline over `matrix`, touring from `start`.
    ///
    /// Nothing is validated until [`build_tree`](Pending::build_tree).
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(matrix: &DistanceMatrix, start: usize, config: SolverConfig) -> Pending<'_> {
        Pending {
            matrix,
            start,
            config,
        }
    }
}
