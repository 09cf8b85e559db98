//! Similarity metric and ranking.
//!
//! The metric is a single fixed choice per deployment: cosine (normalize
//! both vectors, dot product of unit vectors) or raw dot product, which is
//! valid when the embedding provider pre-normalizes its vectors — a
//! deployment invariant, not something re-derived at query time.
//!
//! Ranking is descending by similarity with ties broken by the candidate's
//! original retrieval order (stable sort, no secondary key). Internal
//! comparisons use full precision; [`round4`] is applied only at the
//! presentation edge.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    Dot,
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "dot" | "ip" => Ok(Metric::Dot),
            _ => Err(anyhow::anyhow!("Invalid similarity metric: {}", s)),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Metric::Cosine => write!(f, "cosine"),
            Metric::Dot => write!(f, "dot"),
        }
    }
}

impl Metric {
    /// Score two vectors of equal dimension.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Metric::Dot => dot(a, b),
            Metric::Cosine => {
                let denom = norm(a) * norm(b);
                if denom == 0.0 {
                    0.0
                } else {
                    dot(a, b) / denom
                }
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Score every candidate against `query`, sort descending, truncate to `k`.
///
/// The sort is stable, so candidates with equal scores keep their retrieval
/// order. Returns `(index, score)` pairs referring back into `candidates`.
pub fn rank_top_k<'a, I>(metric: Metric, query: &[f32], candidates: I, k: usize) -> Vec<(usize, f32)>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut scored: Vec<(usize, f32)> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, emb)| (i, metric.score(query, emb)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Round a similarity score to 4 decimal digits for presentation.
pub fn round4(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_score() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_eq!(Metric::Dot.score(&a, &b), 32.0);
    }

    #[test]
    fn test_cosine_score_of_parallel_vectors() {
        let a = [2.0, 0.0];
        let b = [5.0, 0.0];
        assert!((Metric::Cosine.score(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_score_of_orthogonal_vectors() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!(Metric::Cosine.score(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_scores_zero() {
        let a = [0.0, 0.0];
        let b = [1.0, 1.0];
        assert_eq!(Metric::Cosine.score(&a, &b), 0.0);
    }

    #[test]
    fn test_rank_orders_descending() {
        let query = [1.0, 0.0];
        let candidates: Vec<Vec<f32>> = vec![
            vec![0.0, 1.0], // 0.0
            vec![1.0, 0.0], // 1.0
            vec![1.0, 1.0], // ~0.707
        ];
        let ranked = rank_top_k(
            Metric::Cosine,
            &query,
            candidates.iter().map(|v| v.as_slice()),
            3,
        );
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let query = [1.0];
        let candidates: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32]).collect();
        let ranked = rank_top_k(
            Metric::Dot,
            &query,
            candidates.iter().map(|v| v.as_slice()),
            3,
        );
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 9);
    }

    #[test]
    fn test_ties_preserve_retrieval_order() {
        let query = [1.0, 0.0];
        // Candidates 0 and 2 score identically; 0 must come first.
        let candidates: Vec<Vec<f32>> = vec![
            vec![3.0, 0.0],
            vec![5.0, 0.0],
            vec![3.0, 0.0],
        ];
        let ranked = rank_top_k(
            Metric::Dot,
            &query,
            candidates.iter().map(|v| v.as_slice()),
            3,
        );
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.98765), 0.9877);
        assert_eq!(round4(-0.00004), -0.0);
    }
}
