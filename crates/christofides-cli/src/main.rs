//! christofides: solve travelling-salesman instances with Christofides'
//! algorithm and inspect what every stage did.
//!
//! Reads a JSON problem file holding either a distance matrix or a list
//! of points (optionally with vertex labels), runs the pipeline, and
//! prints the closed route, its length and per-stage diagnostics.
//! Useful for:
//!
//! - Comparing matching primitives (`blossom` vs `exhaustive`)
//! - Checking how the Prim tie-break policy changes the tour
//! - Measuring per-stage durations on larger instances
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin christofides -- [OPTIONS] <PROBLEM>
//! cargo run --release --bin christofides -- --symmetrize --start SFO demos/airports.json
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod problem;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use christofides_pipeline::diagnostics::{Clock, PipelineDiagnostics, solve_with_diagnostics};
use christofides_pipeline::{MatcherKind, SolverConfig, StagedResult, TieBreak};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::Serialize;

use crate::problem::Problem;

/// Absolute slack when looking for triangle-inequality violations.
const TRIANGLE_TOLERANCE: f64 = 1e-9;

/// Christofides TSP approximation with per-stage diagnostics.
///
/// Solves the problem in PROBLEM and prints the tour, its length, and
/// per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "christofides", version)]
struct Cli {
    /// Path to a JSON problem: `{"labels"?, "distances"}` or `{"labels"?, "points"}`.
    problem: PathBuf,

    /// Start vertex, as an index or a label.
    #[arg(long, default_value = "0")]
    start: String,

    /// Prim tie-break policy for equal-weight edges.
    #[arg(long, value_enum, default_value_t = Tie::LowestIndex)]
    tie_break: Tie,

    /// Perfect-matching primitive for the odd-degree vertices.
    #[arg(long, value_enum, default_value_t = Matcher::Blossom)]
    matcher: Matcher,

    /// Largest accepted difference between d(i, j) and d(j, i).
    #[arg(long, default_value_t = SolverConfig::DEFAULT_SYMMETRY_TOLERANCE)]
    symmetry_tolerance: f64,

    /// Average each d(i, j), d(j, i) pair before validating the matrix.
    #[arg(long)]
    symmetrize: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output the tour and diagnostics as JSON instead of a report.
    #[arg(long)]
    json: bool,

    /// Full solver config as a JSON string.
    ///
    /// When provided, `--tie-break`, `--matcher` and
    /// `--symmetry-tolerance` are ignored. The JSON must be a valid
    /// `SolverConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Log more (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prim tie-break policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Tie {
    /// Prefer the lowest vertex index among equal-weight edges.
    LowestIndex,
    /// Prefer the highest vertex index among equal-weight edges.
    HighestIndex,
}

/// Matching primitive selection.
#[derive(Clone, Copy, ValueEnum)]
enum Matcher {
    /// Edmonds' blossom algorithm.
    Blossom,
    /// Exact subset dynamic program (small odd sets only).
    Exhaustive,
}

/// Build a [`SolverConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual solver flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SolverConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        SolverConfig {
            tie_break: match cli.tie_break {
                Tie::LowestIndex => TieBreak::LowestIndex,
                Tie::HighestIndex => TieBreak::HighestIndex,
            },
            matcher: match cli.matcher {
                Matcher::Blossom => MatcherKind::Blossom,
                Matcher::Exhaustive => MatcherKind::Exhaustive,
            },
            symmetry_tolerance: cli.symmetry_tolerance,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Initialize `env_logger` on stderr at the level `-v` asks for.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

/// JSON shape of a single run.
#[derive(Serialize)]
struct RunOutput<'a> {
    route: Vec<String>,
    tour: &'a [usize],
    length: f64,
    diagnostics: &'a PipelineDiagnostics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let problem = match Problem::load(&cli.problem, cli.symmetrize, config.symmetry_tolerance) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "loaded {} vertices from {}",
        problem.matrix.len(),
        cli.problem.display()
    );
    if let Some((i, j, k)) = problem.matrix.find_triangle_violation(TRIANGLE_TOLERANCE) {
        warn!(
            "input is not metric: d({a}, {c}) > d({a}, {b}) + d({b}, {c}); the 1.5 bound does not apply",
            a = problem.label(i),
            b = problem.label(j),
            c = problem.label(k),
        );
    }

    let start = match problem.resolve_start(&cli.start) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Problem: {}", cli.problem.display());
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match solve_with_diagnostics(&problem.matrix, start, &config, &StdClock) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    if let Err(msg) = print_json(&problem, &staged, &diagnostics) {
                        eprintln!("{msg}");
                        return ExitCode::FAILURE;
                    }
                } else {
                    if run == 0 {
                        println!("Route: {}", problem.route(staged.tour.vertices()));
                        println!("Length: {:.3}", staged.tour.length());
                        println!();
                    }
                    println!("{}", diagnostics.report());
                }
                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Print one run as pretty JSON on stdout.
fn print_json(
    problem: &Problem,
    staged: &StagedResult,
    diagnostics: &PipelineDiagnostics,
) -> Result<(), String> {
    let vertices = staged.tour.vertices();
    let output = RunOutput {
        route: vertices.iter().map(|&v| problem.label(v)).collect(),
        tour: vertices,
        length: staged.tour.length(),
        diagnostics,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
    println!("{json}");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let Some(first) = all_diagnostics.first() else {
        println!("Warning: no diagnostics to summarize");
        return;
    };

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    for name in first.stages.iter().map(|s| s.stage.as_str()) {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.stage(name))
            .map(|s| s.duration.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
