//! Pipeline diagnostics: timing, counts and weights for each stage.
//!
//! [`solve_with_diagnostics`] drives the [`Stage`] loop and records the
//! wall-clock time of every advance alongside the stage's
//! [`StageMetrics`]. Time is read through the [`Clock`] trait so the
//! library itself never touches a platform timer.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matrix::DistanceMatrix;
use crate::pipeline::{Advance, Pipeline, STAGE_COUNT, Stage};
use crate::types::{PipelineError, SolverConfig, StagedResult};

/// Source of timestamps for stage timing.
///
/// The CLI implements this with `std::time::Instant`; tests use a
/// manual clock.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// One entry per executed stage, in pipeline order (the initial
    /// input stage does no work and is not listed).
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Headline numbers for the whole run.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Stage name, as in [`Stage::name`].
    pub stage: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Minimum spanning tree.
    Tree {
        /// Number of tree edges (`N - 1`).
        edge_count: usize,
        /// Total tree weight, a lower bound on the optimal tour.
        weight: f64,
    },
    /// Odd-degree vertex detection.
    OddVertices {
        /// Number of odd-degree vertices (always even).
        count: usize,
    },
    /// Minimum-weight perfect matching.
    Matching {
        /// Number of matched pairs.
        pairs: usize,
        /// Total matching weight.
        weight: f64,
        /// Which matcher was configured.
        matcher: String,
        /// `true` when the odd set was empty and the matcher never ran.
        skipped: bool,
    },
    /// Multigraph assembly.
    Multigraph {
        /// Total traversable edges.
        edges: usize,
        /// Edges contributed by the tree.
        tree_edges: usize,
        /// Edges contributed by the matching.
        matching_edges: usize,
    },
    /// Eulerian circuit.
    Euler {
        /// Vertices in the closed walk, including the return to start.
        length: usize,
    },
    /// Shortcutting.
    Shortcut {
        /// Vertices in the final tour.
        vertices: usize,
        /// Repeated vertices skipped while walking the circuit.
        repeats_dropped: usize,
        /// Final tour length.
        length: f64,
    },
}

/// High-level numbers for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of vertices in the input.
    pub vertex_count: usize,
    /// Vertex the tour starts from.
    pub start: usize,
    /// Minimum spanning tree weight.
    pub mst_weight: f64,
    /// Final tour length.
    pub tour_length: f64,
    /// `tour_length / mst_weight`, or `None` when the tree has zero
    /// weight.
    pub ratio: Option<f64>,
}

impl PipelineSummary {
    fn from_result(vertex_count: usize, result: &StagedResult) -> Self {
        let mst_weight = result.tree.total_weight();
        let tour_length = result.tour.length();
        let ratio = (mst_weight > 0.0).then(|| tour_length / mst_weight);
        Self {
            vertex_count,
            start: result.start,
            mst_weight,
            tour_length,
            ratio,
        }
    }
}

impl PipelineDiagnostics {
    /// Diagnostics for the stage called `name`, if it ran.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageDiagnostics> {
        self.stages.iter().find(|s| s.stage == name)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Vertices: {} (start {})",
            self.summary.vertex_count, self.summary.start,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for diag in &self.stages {
            let name = &diag.stage;
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        let ratio = self
            .summary
            .ratio
            .map_or_else(|| "n/a".to_owned(), |r| format!("{r:.3}"));
        lines.push(format!(
            "MST weight: {:.3}  |  Tour length: {:.3}  |  Tour / MST: {ratio}",
            self.summary.mst_weight, self.summary.tour_length,
        ));

        lines.join("\n")
    }
}

/// Run the whole pipeline through the [`Stage`] loop, timing each stage.
///
/// # Errors
///
/// Returns the first [`PipelineError`] raised by any stage.
pub fn solve_with_diagnostics<C: Clock>(
    matrix: &DistanceMatrix,
    start: usize,
    config: &SolverConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let pipeline_start = clock.now();
    let mut stages = Vec::with_capacity(STAGE_COUNT - 1);

    let mut stage: Stage<'_> = Pipeline::new(matrix, start, config.clone()).into();
    loop {
        let stage_start = clock.now();
        match stage.advance()? {
            Advance::Next(next) => {
                let duration = clock.elapsed(&stage_start);
                if let Some(metrics) = next.metrics() {
                    stages.push(StageDiagnostics {
                        stage: next.name().to_owned(),
                        duration,
                        metrics,
                    });
                }
                stage = next;
            }
            Advance::Complete(done) => {
                stage = done;
                break;
            }
        }
    }
    let result = stage.complete()?;
    let total_duration = clock.elapsed(&pipeline_start);

    let diagnostics = PipelineDiagnostics {
        stages,
        total_duration,
        summary: PipelineSummary::from_result(matrix.len(), &result),
    };
    Ok((result, diagnostics))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Tree { edge_count, weight } => {
            format!("{edge_count} edges, weight={weight:.3}")
        }
        StageMetrics::OddVertices { count } => format!("{count} odd vertices"),
        StageMetrics::Matching {
            matcher,
            skipped: true,
            ..
        } => format!("{matcher} skipped (tree already Eulerian)"),
        StageMetrics::Matching {
            pairs,
            weight,
            matcher,
            ..
        } => format!("{matcher} {pairs} pairs, weight={weight:.3}"),
        StageMetrics::Multigraph {
            edges,
            tree_edges,
            matching_edges,
        } => format!("{edges} edges ({tree_edges} tree + {matching_edges} matching)"),
        StageMetrics::Euler { length } => format!("{length} walk vertices"),
        StageMetrics::Shortcut {
            vertices,
            repeats_dropped,
            length,
        } => format!("{vertices} vertices, {repeats_dropped} repeats dropped, length={length:.3}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::Point;

    /// Clock that advances by one millisecond every time it is read.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl TickClock {
        const fn new() -> Self {
            Self {
                ticks: Cell::new(0),
            }
        }

        fn tick(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            self.tick()
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.tick() - since)
        }
    }

    fn unit_square() -> DistanceMatrix {
        DistanceMatrix::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn records_every_working_stage() {
        let m = unit_square();
        let (result, diag) =
            solve_with_diagnostics(&m, 0, &SolverConfig::default(), &TickClock::new()).unwrap();

        let names: Vec<&str> = diag.stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(
            names,
            vec!["tree", "odd", "matching", "multigraph", "euler", "shortcut"]
        );
        for s in &diag.stages {
            assert_eq!(s.duration, Duration::from_millis(1));
        }
        let stage_total: Duration = diag.stages.iter().map(|s| s.duration).sum();
        assert!(diag.total_duration >= stage_total);

        assert_eq!(diag.summary.vertex_count, 4);
        assert!((diag.summary.tour_length - result.tour.length()).abs() < f64::EPSILON);
        assert!((diag.summary.mst_weight - 3.0).abs() < 1e-12);
        assert!((diag.summary.ratio.unwrap() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_vertex_has_no_ratio_and_skipped_matching() {
        let m = DistanceMatrix::from_rows(&[vec![0.0]], 0.0).unwrap();
        let (_, diag) =
            solve_with_diagnostics(&m, 0, &SolverConfig::default(), &TickClock::new()).unwrap();
        assert!(diag.summary.ratio.is_none());
        assert!(matches!(
            diag.stage("matching").unwrap().metrics,
            StageMetrics::Matching { skipped: true, .. }
        ));
        assert!(diag.report().contains("skipped"));
    }

    #[test]
    fn errors_propagate() {
        let m = unit_square();
        let err = solve_with_diagnostics(&m, 7, &SolverConfig::default(), &TickClock::new())
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn report_produces_nonempty_string() {
        let m = unit_square();
        let (_, diag) =
            solve_with_diagnostics(&m, 0, &SolverConfig::default(), &TickClock::new()).unwrap();
        let report = diag.report();
        assert!(report.starts_with("Pipeline Diagnostics Report"));
        assert!(report.contains("Vertices: 4 (start 0)"));
        assert!(report.contains("blossom 1 pairs"));
        assert!(report.contains("Tour length: 4.000"));
    }

    #[test]
    fn serializes_durations_as_seconds() {
        let m = unit_square();
        let (_, diag) =
            solve_with_diagnostics(&m, 0, &SolverConfig::default(), &TickClock::new()).unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        let first = json["stages"][0]["duration"].as_f64().unwrap();
        assert!((first - 0.001).abs() < 1e-12);

        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.stages.len(), diag.stages.len());
        assert_eq!(back.stages[5].metrics, diag.stages[5].metrics);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let json = r#"{"stage":"tree","duration":-1.0,"metrics":{"OddVertices":{"count":0}}}"#;
        assert!(serde_json::from_str::<StageDiagnostics>(json).is_err());
    }
}
