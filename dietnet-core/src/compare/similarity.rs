//! Jaccard similarity over per-sample KO sets.

use crate::compare::kos::SampleKos;
use std::collections::BTreeSet;

/// Jaccard similarity of two sets, with the convention that two empty sets
/// are maximally similar (1.0), not undefined.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Square, symmetric similarity matrix with unit diagonal. Row/column order
/// follows the input sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Builds the full n×n matrix over the given samples' KO lists.
    pub fn calculate(sample_kos: &SampleKos) -> Self {
        let labels: Vec<String> = sample_kos.iter().map(|(name, _)| name.clone()).collect();
        let sets: Vec<BTreeSet<String>> = sample_kos
            .iter()
            .map(|(_, kos)| kos.iter().cloned().collect())
            .collect();

        let n = labels.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                values[i][j] = jaccard(&sets[i], &sets[j]);
            }
        }

        Self { labels, values }
    }

    pub fn n(&self) -> usize {
        self.labels.len()
    }

    /// The `1 - similarity` distance matrix.
    pub fn to_distance(&self) -> Vec<Vec<f64>> {
        self.values
            .iter()
            .map(|row| row.iter().map(|s| 1.0 - s).collect())
            .collect()
    }

    /// Row/column permutation of the matrix. Values are moved, never
    /// recomputed.
    pub fn permuted(&self, order: &[usize]) -> SimilarityMatrix {
        let labels = order.iter().map(|&i| self.labels[i].clone()).collect();
        let values = order
            .iter()
            .map(|&i| order.iter().map(|&j| self.values[i][j]).collect())
            .collect();
        SimilarityMatrix { labels, values }
    }
}
