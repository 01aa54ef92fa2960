//! Problem files: a distance matrix or a point set, optionally labelled.

use std::path::Path;

use christofides_pipeline::{DistanceMatrix, Point};
use serde::Deserialize;

/// On-disk shape of a problem. Exactly one of `distances` and `points`
/// must be present.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProblemFile {
    labels: Option<Vec<String>>,
    distances: Option<Vec<Vec<f64>>>,
    points: Option<Vec<Point>>,
}

/// A validated problem ready to solve.
#[derive(Debug)]
pub struct Problem {
    /// Vertex names, one per matrix row, when the file provides them.
    pub labels: Option<Vec<String>>,
    /// The validated distance matrix.
    pub matrix: DistanceMatrix,
}

impl Problem {
    /// Read and validate a problem file.
    pub fn load(path: &Path, symmetrize: bool, symmetry_tolerance: f64) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        Self::from_json(&text, symmetrize, symmetry_tolerance)
            .map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Parse and validate a problem from JSON text.
    pub fn from_json(text: &str, symmetrize: bool, symmetry_tolerance: f64) -> Result<Self, String> {
        let file: ProblemFile =
            serde_json::from_str(text).map_err(|e| format!("invalid problem JSON: {e}"))?;

        let matrix = match (file.distances, file.points) {
            (Some(rows), None) => {
                let rows = if symmetrize { symmetrized(&rows) } else { rows };
                DistanceMatrix::from_rows(&rows, symmetry_tolerance)
            }
            (None, Some(points)) => DistanceMatrix::from_points(&points),
            (Some(_), Some(_)) => {
                return Err("problem has both \"distances\" and \"points\"".to_owned());
            }
            (None, None) => {
                return Err("problem needs either \"distances\" or \"points\"".to_owned());
            }
        }
        .map_err(|e| format!("invalid distance matrix: {e}"))?;

        if let Some(labels) = &file.labels
            && labels.len() != matrix.len()
        {
            return Err(format!(
                "{} labels for {} vertices",
                labels.len(),
                matrix.len()
            ));
        }

        Ok(Self {
            labels: file.labels,
            matrix,
        })
    }

    /// Resolve `--start`: a vertex index, or a label when labels exist.
    pub fn resolve_start(&self, start: &str) -> Result<usize, String> {
        if let Ok(index) = start.parse::<usize>() {
            return if index < self.matrix.len() {
                Ok(index)
            } else {
                Err(format!(
                    "start vertex {index} is out of range for {} vertices",
                    self.matrix.len()
                ))
            };
        }
        self.labels
            .as_ref()
            .and_then(|labels| labels.iter().position(|l| l == start))
            .ok_or_else(|| format!("unknown start vertex {start:?}"))
    }

    /// Display name of vertex `v`: its label, or its index.
    pub fn label(&self, v: usize) -> String {
        self.labels
            .as_ref()
            .and_then(|labels| labels.get(v))
            .map_or_else(|| v.to_string(), Clone::clone)
    }

    /// The closed route as `A -> B -> ... -> A`.
    pub fn route(&self, vertices: &[usize]) -> String {
        vertices
            .iter()
            .chain(vertices.first())
            .map(|&v| self.label(v))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Replace each `d(i, j)`, `d(j, i)` pair by its mean.
fn symmetrized(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, &forward)| {
                    rows.get(j)
                        .and_then(|r| r.get(i))
                        .map_or(forward, |&backward| f64::midpoint(forward, backward))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LABELLED: &str = r#"{
        "labels": ["A", "B", "C"],
        "distances": [[0, 1, 2], [1, 0, 1.5], [2, 1.5, 0]]
    }"#;

    #[test]
    fn loads_labelled_distances() {
        let p = Problem::from_json(LABELLED, false, 0.0).unwrap();
        assert_eq!(p.matrix.len(), 3);
        assert_eq!(p.label(2), "C");
        assert_eq!(p.route(&[0, 2, 1]), "A -> C -> B -> A");
    }

    #[test]
    fn loads_points_without_labels() {
        let json = r#"{"points": [{"x": 0, "y": 0}, {"x": 3, "y": 4}]}"#;
        let p = Problem::from_json(json, false, 0.0).unwrap();
        assert!((p.matrix.get(0, 1) - 5.0).abs() < f64::EPSILON);
        assert_eq!(p.label(1), "1");
        assert_eq!(p.route(&[1, 0]), "1 -> 0 -> 1");
    }

    #[test]
    fn start_by_index_or_label() {
        let p = Problem::from_json(LABELLED, false, 0.0).unwrap();
        assert_eq!(p.resolve_start("1").unwrap(), 1);
        assert_eq!(p.resolve_start("C").unwrap(), 2);
        assert!(p.resolve_start("3").is_err());
        assert!(p.resolve_start("Z").is_err());
    }

    #[test]
    fn symmetrize_repairs_small_asymmetry() {
        let json = r#"{"distances": [[0, 1.0], [1.2, 0]]}"#;
        assert!(Problem::from_json(json, false, 1e-9).is_err());
        let p = Problem::from_json(json, true, 1e-9).unwrap();
        assert!((p.matrix.get(0, 1) - 1.1).abs() < 1e-12);
        assert!((p.matrix.get(1, 0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn nan_tolerance_does_not_admit_asymmetry() {
        let json = r#"{"distances": [[0, 1], [500, 0]]}"#;
        let err = Problem::from_json(json, false, f64::NAN).unwrap_err();
        assert!(err.contains("symmetry tolerance"), "{err}");
    }

    #[test]
    fn rejects_ambiguous_or_missing_body() {
        let both = r#"{"distances": [[0]], "points": [{"x": 0, "y": 0}]}"#;
        assert!(Problem::from_json(both, false, 0.0).is_err());
        assert!(Problem::from_json("{}", false, 0.0).is_err());
    }

    #[test]
    fn rejects_label_count_mismatch() {
        let json = r#"{"labels": ["A"], "distances": [[0, 1], [1, 0]]}"#;
        let err = Problem::from_json(json, false, 0.0).unwrap_err();
        assert_eq!(err, "1 labels for 2 vertices");
    }
}
