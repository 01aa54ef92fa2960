//! Minimum-weight perfect matching on the odd-degree vertices.
//!
//! Defines the [`PerfectMatcher`] trait for pluggable matching primitives
//! and the [`MatcherKind`] enum for runtime selection. Whatever primitive
//! runs, its output is checked with [`verify_perfect`] before the
//! pipeline trusts it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blossom::max_weight_matching;
use crate::matrix::DistanceMatrix;
use crate::types::{Edge, InvariantViolation, Matching, OddVertices, PipelineError};

/// Largest vertex set [`MatcherKind::Exhaustive`] accepts.
///
/// The dynamic program holds `2^k` states.
pub const MAX_EXHAUSTIVE_VERTICES: usize = 20;

/// Selects which perfect-matching primitive to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatcherKind {
    /// Edmonds' blossom algorithm on negated distances with maximum
    /// cardinality forced, `O(k³)`.
    #[default]
    Blossom,

    /// Exact dynamic program over vertex subsets, `O(k² 2^k)`.
    ///
    /// Limited to [`MAX_EXHAUSTIVE_VERTICES`] vertices. Mainly an oracle
    /// for checking [`Blossom`](Self::Blossom).
    Exhaustive,
}

impl MatcherKind {
    /// Short human-readable name, used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blossom => "blossom",
            Self::Exhaustive => "exhaustive",
        }
    }
}

/// Trait for perfect-matching primitives.
///
/// Input: the distance matrix and a set of distinct vertices of even
/// size. Output: vertex-disjoint pairs covering every input vertex, with
/// minimum total weight, weights looked up as `d(u, v)` for `u < v`.
pub trait PerfectMatcher {
    /// Match every vertex in `vertices` with minimum total weight.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the primitive cannot
    /// handle this many vertices, or [`PipelineError::InvariantViolation`]
    /// if `vertices` has odd size or no perfect matching was found.
    fn perfect_matching(
        &self,
        matrix: &DistanceMatrix,
        vertices: &[usize],
    ) -> Result<Matching, PipelineError>;
}

impl PerfectMatcher for MatcherKind {
    fn perfect_matching(
        &self,
        matrix: &DistanceMatrix,
        vertices: &[usize],
    ) -> Result<Matching, PipelineError> {
        if vertices.len() % 2 != 0 {
            return Err(InvariantViolation::OddVertexCountOdd {
                count: vertices.len(),
            }
            .into());
        }
        match *self {
            Self::Blossom => blossom_matching(matrix, vertices),
            Self::Exhaustive => exhaustive_matching(matrix, vertices),
        }
    }
}

/// Stage 3: match the odd-degree vertices and verify the result.
///
/// An empty odd set returns an empty matching without calling `matcher`:
/// the tree is already Eulerian.
///
/// # Errors
///
/// Propagates the matcher's error, or returns the
/// [`InvariantViolation`] found by [`verify_perfect`].
pub fn match_odd_vertices<M: PerfectMatcher + ?Sized>(
    matrix: &DistanceMatrix,
    odd: &OddVertices,
    matcher: &M,
) -> Result<Matching, PipelineError> {
    if odd.is_empty() {
        return Ok(Matching::default());
    }
    let matching = matcher.perfect_matching(matrix, odd.as_slice())?;
    verify_perfect(odd.as_slice(), &matching)?;
    Ok(matching)
}

/// Check that `matching` pairs every vertex of `vertices` exactly once
/// and uses nothing else.
///
/// # Errors
///
/// Returns [`InvariantViolation::MatchingForeignVertex`],
/// [`InvariantViolation::MatchingOverlap`], or
/// [`InvariantViolation::ImperfectMatching`] (listing the uncovered
/// vertices in ascending order).
pub fn verify_perfect(vertices: &[usize], matching: &Matching) -> Result<(), InvariantViolation> {
    let allowed: HashSet<usize> = vertices.iter().copied().collect();
    let mut covered = HashSet::with_capacity(vertices.len());
    for pair in matching.pairs() {
        for vertex in [pair.u, pair.v] {
            if !allowed.contains(&vertex) {
                return Err(InvariantViolation::MatchingForeignVertex { vertex });
            }
            if !covered.insert(vertex) {
                return Err(InvariantViolation::MatchingOverlap { vertex });
            }
        }
    }

    let mut uncovered: Vec<usize> = vertices
        .iter()
        .copied()
        .filter(|v| !covered.contains(v))
        .collect();
    if uncovered.is_empty() {
        Ok(())
    } else {
        uncovered.sort_unstable();
        Err(InvariantViolation::ImperfectMatching { uncovered })
    }
}

fn pair(matrix: &DistanceMatrix, a: usize, b: usize) -> Edge {
    let (u, v) = if a <= b { (a, b) } else { (b, a) };
    Edge::new(u, v, matrix.get(u, v))
}

fn into_matching(mut pairs: Vec<Edge>) -> Matching {
    pairs.sort_by_key(|e| (e.u, e.v));
    Matching::new(pairs)
}

/// Minimum-weight perfect matching as maximum-weight matching on negated
/// weights, restricted to maximum cardinality.
fn blossom_matching(
    matrix: &DistanceMatrix,
    vertices: &[usize],
) -> Result<Matching, PipelineError> {
    let k = vertices.len();
    let mut edges = Vec::with_capacity(k * k.saturating_sub(1) / 2);
    for i in 0..k {
        for j in i + 1..k {
            edges.push((i, j, -pair(matrix, vertices[i], vertices[j]).weight));
        }
    }

    let mate = max_weight_matching(&edges, true)?;

    let mut pairs = Vec::with_capacity(k / 2);
    let mut uncovered = Vec::new();
    for (i, &vertex) in vertices.iter().enumerate() {
        match mate.get(i).copied().flatten() {
            Some(j) if i < j => pairs.push(pair(matrix, vertex, vertices[j])),
            Some(_) => {}
            None => uncovered.push(vertex),
        }
    }
    if !uncovered.is_empty() {
        uncovered.sort_unstable();
        return Err(InvariantViolation::ImperfectMatching { uncovered }.into());
    }
    Ok(into_matching(pairs))
}

/// Exact minimum-weight perfect matching by dynamic programming over the
/// set of still-unmatched vertices.
///
/// The lowest unmatched vertex is always paired next, so each state has
/// at most `k - 1` transitions. Ties keep the lowest partner.
fn exhaustive_matching(
    matrix: &DistanceMatrix,
    vertices: &[usize],
) -> Result<Matching, PipelineError> {
    let k = vertices.len();
    if k > MAX_EXHAUSTIVE_VERTICES {
        return Err(PipelineError::InvalidConfig(format!(
            "exhaustive matcher handles at most {MAX_EXHAUSTIVE_VERTICES} vertices, got {k}"
        )));
    }

    let weight = |i: usize, j: usize| pair(matrix, vertices[i], vertices[j]).weight;
    let states = 1usize << k;
    let mut cost = vec![f64::INFINITY; states];
    let mut partner: Vec<Option<(usize, usize)>> = vec![None; states];
    cost[0] = 0.0;

    for mask in 1..states {
        if mask.count_ones() % 2 != 0 {
            continue;
        }
        let i = mask.trailing_zeros() as usize;
        let rest = mask & !(1 << i);
        for j in (i + 1..k).filter(|&j| rest & (1 << j) != 0) {
            let candidate = weight(i, j) + cost[rest & !(1 << j)];
            if candidate < cost[mask] {
                cost[mask] = candidate;
                partner[mask] = Some((i, j));
            }
        }
    }

    let mut pairs = Vec::with_capacity(k / 2);
    let mut mask = states - 1;
    while mask != 0 {
        let Some((i, j)) = partner[mask] else {
            let uncovered = (0..k)
                .filter(|&v| mask & (1 << v) != 0)
                .map(|v| vertices[v])
                .collect();
            return Err(InvariantViolation::ImperfectMatching { uncovered }.into());
        };
        pairs.push(pair(matrix, vertices[i], vertices[j]));
        mask &= !((1 << i) | (1 << j));
    }
    Ok(into_matching(pairs))
}
