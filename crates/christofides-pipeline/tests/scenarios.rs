//! Integration tests: end-to-end scenarios and seeded random properties.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use christofides_pipeline::matching::verify_perfect;
use christofides_pipeline::shortcut::tour_length;
use christofides_pipeline::{
    DistanceMatrix, MatcherKind, Multigraph, Point, SolverConfig, StagedResult, TieBreak, solve,
    solve_staged,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_square() -> DistanceMatrix {
    DistanceMatrix::from_points(&[
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ])
    .unwrap()
}

fn random_instance(rng: &mut StdRng, n: usize) -> DistanceMatrix {
    let points: Vec<Point> = (0..n)
        .map(|_| Point::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect();
    DistanceMatrix::from_points(&points).unwrap()
}

/// Check every structural property a finished run must have.
fn assert_well_formed(matrix: &DistanceMatrix, staged: &StagedResult) {
    let n = matrix.len();
    let tour = staged.tour.vertices();

    let mut sorted = tour.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "tour is not a permutation");
    assert_eq!(tour[0], staged.start, "tour does not start at start");

    assert_eq!(staged.odd_vertices.len() % 2, 0, "odd set has odd size");
    verify_perfect(staged.odd_vertices.as_slice(), &staged.matching).unwrap();

    let graph = Multigraph::assemble(&staged.tree, &staged.matching);
    graph.check_eulerian(staged.start).unwrap();
    assert_eq!(graph.edge_count(), staged.multigraph_edges);
    assert_eq!(staged.euler_tour.len(), staged.multigraph_edges + 1);

    assert!((staged.tour.length() - tour_length(matrix, tour)).abs() < 1e-9);
    assert!(
        staged.tour.length() + 1e-9 >= staged.tree.total_weight(),
        "tour {} shorter than MST {}",
        staged.tour.length(),
        staged.tree.total_weight()
    );
}

/// Shortest closed tour by trying every order of `1..n` after vertex 0.
fn brute_force_optimum(matrix: &DistanceMatrix) -> f64 {
    fn search(
        matrix: &DistanceMatrix,
        order: &mut Vec<usize>,
        used: &mut [bool],
        length: f64,
        best: &mut f64,
    ) {
        let last = order[order.len() - 1];
        if order.len() == used.len() {
            *best = best.min(length + matrix.get(last, order[0]));
            return;
        }
        for next in 1..used.len() {
            if used[next] {
                continue;
            }
            let extended = length + matrix.get(last, next);
            if extended >= *best {
                continue;
            }
            used[next] = true;
            order.push(next);
            search(matrix, order, used, extended, best);
            order.pop();
            used[next] = false;
        }
    }

    let n = matrix.len();
    let mut used = vec![false; n];
    used[0] = true;
    let mut best = f64::INFINITY;
    search(matrix, &mut vec![0], &mut used, 0.0, &mut best);
    best
}

// ─────────── Named scenarios ─────────────────────────────────────

#[test]
fn unit_square_yields_perimeter_tour() {
    let m = unit_square();
    let tour = solve(&m, 0, &SolverConfig::default()).unwrap();

    assert_eq!(tour.vertices()[0], 0);
    assert!((tour.length() - 4.0).abs() < 1e-12);
    // Every leg is a side, never a diagonal.
    for (a, b) in tour.legs() {
        assert!((m.get(a, b) - 1.0).abs() < 1e-12, "leg {a}->{b} is a diagonal");
    }
}

#[test]
fn unit_square_from_every_start() {
    let m = unit_square();
    for start in 0..4 {
        let tour = solve(&m, start, &SolverConfig::default()).unwrap();
        assert_eq!(tour.vertices()[0], start);
        assert!((tour.length() - 4.0).abs() < 1e-12);
    }
}

#[test]
fn single_vertex_needs_no_matching() {
    let m = DistanceMatrix::from_rows(&[vec![0.0]], 0.0).unwrap();
    let staged = solve_staged(&m, 0, &SolverConfig::default()).unwrap();

    assert!(staged.tree.edges().is_empty());
    assert!(staged.odd_vertices.is_empty());
    assert!(staged.matching.is_empty());
    assert_eq!(staged.multigraph_edges, 0);
    assert_eq!(staged.euler_tour.vertices(), &[0]);
    assert_eq!(staged.tour.vertices(), &[0]);
    assert!(staged.tour.length().abs() < f64::EPSILON);
}

#[test]
fn two_vertices_go_there_and_back() {
    let m = DistanceMatrix::from_rows(&[vec![0.0, 7.0], vec![7.0, 0.0]], 0.0).unwrap();
    let staged = solve_staged(&m, 1, &SolverConfig::default()).unwrap();

    assert_eq!(staged.odd_vertices.as_slice(), &[0, 1]);
    assert_eq!(staged.matching.len(), 1);
    assert_eq!(staged.multigraph_edges, 2);
    assert_eq!(staged.tour.vertices(), &[1, 0]);
    assert!((staged.tour.length() - 14.0).abs() < f64::EPSILON);
}

#[test]
fn collinear_points_visit_in_line_order() {
    let points: Vec<Point> = (0..6).map(|i| Point::new(f64::from(i), 0.0)).collect();
    let m = DistanceMatrix::from_points(&points).unwrap();
    let tour = solve(&m, 0, &SolverConfig::default()).unwrap();
    // Out along the line and straight back: 5 + 5.
    assert!((tour.length() - 10.0).abs() < 1e-12);
}

#[test]
fn tie_break_policies_both_produce_valid_tours() {
    // Regular hexagon: every side has the same length, so Prim sees ties.
    let points: Vec<Point> = (0..6)
        .map(|i| {
            let angle = std::f64::consts::PI / 3.0 * f64::from(i);
            Point::new(angle.cos(), angle.sin())
        })
        .collect();
    let m = DistanceMatrix::from_points(&points).unwrap();
    for tie_break in [TieBreak::LowestIndex, TieBreak::HighestIndex] {
        let config = SolverConfig {
            tie_break,
            ..SolverConfig::default()
        };
        let staged = solve_staged(&m, 0, &config).unwrap();
        assert_well_formed(&m, &staged);
    }
}

// ─────────── Seeded properties ───────────────────────────────────

#[test]
fn random_instances_are_well_formed() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for n in 1..=40 {
        let m = random_instance(&mut rng, n);
        let start = rng.random_range(0..n);
        let staged = solve_staged(&m, start, &SolverConfig::default()).unwrap();
        assert_well_formed(&m, &staged);
    }
}

#[test]
fn small_instances_stay_within_one_and_a_half_of_optimum() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in 3..=8 {
        for _ in 0..10 {
            let m = random_instance(&mut rng, n);
            let tour = solve(&m, 0, &SolverConfig::default()).unwrap();
            let optimum = brute_force_optimum(&m);
            assert!(
                tour.length() <= 1.5 * optimum + 1e-9,
                "n={n}: tour {} exceeds 1.5 x optimum {optimum}",
                tour.length()
            );
        }
    }
}

#[test]
fn runs_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let m = random_instance(&mut rng, 25);
    let config = SolverConfig::default();
    let first = solve_staged(&m, 3, &config).unwrap();
    let second = solve_staged(&m, 3, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.tour.length().to_bits(), second.tour.length().to_bits());
}

#[test]
fn blossom_and_exhaustive_find_equal_matching_weight() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..30 {
        let n = rng.random_range(2..=24);
        let m = random_instance(&mut rng, n);
        let blossom = solve_staged(&m, 0, &SolverConfig::default()).unwrap();
        if blossom.odd_vertices.len() > christofides_pipeline::matching::MAX_EXHAUSTIVE_VERTICES {
            continue;
        }
        let exhaustive = solve_staged(
            &m,
            0,
            &SolverConfig {
                matcher: MatcherKind::Exhaustive,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        assert_eq!(blossom.odd_vertices, exhaustive.odd_vertices);
        assert!(
            (blossom.matching.total_weight() - exhaustive.matching.total_weight()).abs() < 1e-9,
            "blossom {} vs exhaustive {}",
            blossom.matching.total_weight(),
            exhaustive.matching.total_weight()
        );
        assert_well_formed(&m, &exhaustive);
    }
}

#[test]
fn grid_instances_with_repeats_match_exhaustive() {
    // Integer grid points: equal edge weights and coincident cities.
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..60 {
        let n = rng.random_range(2..=16);
        let points: Vec<Point> = (0..n)
            .map(|_| {
                Point::new(
                    f64::from(rng.random_range(0_u8..4)),
                    f64::from(rng.random_range(0_u8..4)),
                )
            })
            .collect();
        let m = DistanceMatrix::from_points(&points).unwrap();
        let blossom = solve_staged(&m, 0, &SolverConfig::default()).unwrap();
        let exhaustive = solve_staged(
            &m,
            0,
            &SolverConfig {
                matcher: MatcherKind::Exhaustive,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        assert!(
            (blossom.matching.total_weight() - exhaustive.matching.total_weight()).abs() < 1e-9,
            "blossom {} vs exhaustive {}",
            blossom.matching.total_weight(),
            exhaustive.matching.total_weight()
        );
        assert_well_formed(&m, &blossom);
    }
}

#[test]
fn staged_result_survives_json() {
    let m = unit_square();
    let staged = solve_staged(&m, 0, &SolverConfig::default()).unwrap();
    let json = serde_json::to_string(&staged).unwrap();
    let back: StagedResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, staged);
}
