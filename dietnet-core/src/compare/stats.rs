//! Distance-based group testing: PERMANOVA on the Jaccard distance matrix,
//! with Benjamini-Hochberg correction across grouping variables.

use crate::compare::kos::SampleKos;
use crate::compare::similarity::SimilarityMatrix;
use crate::error::DietNetError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::warn;

pub const DEFAULT_PERMUTATIONS: usize = 5000;
pub const DEFAULT_SEED: u64 = 5;
pub const FDR_ALPHA: f64 = 0.05;

/// Outcome of one PERMANOVA run.
#[derive(Debug, Clone, PartialEq)]
pub struct PermanovaResult {
    /// Pseudo-F statistic.
    pub test_statistic: f64,
    pub p_value: f64,
    pub permutations: usize,
    /// Samples retained after under-sized groups were dropped.
    pub sample_size: usize,
    /// Groups retained after under-sized groups were dropped.
    pub groups: usize,
    /// Effect size: R^2 = F(k-1) / (F(k-1) + (n-k)).
    pub effect_size: f64,
}

/// Runs PERMANOVA for one grouping variable over the per-sample KO sets of a
/// pattern.
///
/// Requires at least 2 samples and a grouping label for every sample (a
/// missing label is a hard error). Groups with fewer than 2 members are
/// dropped with a warning; if fewer than 2 groups remain the test fails with
/// an insufficient-groups error instead of crashing on an unbalanced design.
pub fn stat_test(
    sample_kos: &SampleKos,
    grouping: &HashMap<String, String>,
    group_col: &str,
    permutations: usize,
    seed: u64,
) -> Result<PermanovaResult, DietNetError> {
    let matrix = SimilarityMatrix::calculate(sample_kos);
    if matrix.n() < 2 {
        return Err(DietNetError::InsufficientSamples(group_col.to_string()));
    }

    let labels: Vec<String> = matrix
        .labels
        .iter()
        .map(|sample| {
            grouping
                .get(sample)
                .cloned()
                .ok_or_else(|| DietNetError::MissingGroupLabel {
                    sample: sample.clone(),
                    column: group_col.to_string(),
                })
        })
        .collect::<Result<_, _>>()?;

    // Drop groups that cannot contribute within-group distances.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    for (group, count) in &counts {
        if *count < 2 {
            warn!(
                group_col,
                group, count, "dropping group with fewer than 2 samples"
            );
        }
    }

    let retained: Vec<usize> = (0..matrix.n())
        .filter(|&i| counts[labels[i].as_str()] >= 2)
        .collect();
    let retained_labels: Vec<&str> = retained.iter().map(|&i| labels[i].as_str()).collect();
    let mut groups: Vec<&str> = retained_labels.clone();
    groups.sort();
    groups.dedup();
    if groups.len() < 2 {
        return Err(DietNetError::InsufficientGroups(group_col.to_string()));
    }

    let distance = matrix.permuted(&retained).to_distance();
    let n = retained.len();
    let k = groups.len();

    // Group assignment as indices for fast permutation.
    let mut assignment: Vec<usize> = retained_labels
        .iter()
        .map(|label| groups.iter().position(|g| g == label).unwrap_or(0))
        .collect();
    let group_sizes: Vec<usize> = (0..k)
        .map(|g| assignment.iter().filter(|&&a| a == g).count())
        .collect();

    let observed = pseudo_f(&distance, &assignment, &group_sizes, n, k);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut at_least_as_extreme = 0usize;
    for _ in 0..permutations {
        assignment.shuffle(&mut rng);
        let permuted = pseudo_f(&distance, &assignment, &group_sizes, n, k);
        if permuted >= observed {
            at_least_as_extreme += 1;
        }
    }
    let p_value = (at_least_as_extreme + 1) as f64 / (permutations + 1) as f64;

    let f_part = observed * (k as f64 - 1.0);
    let effect_size = f_part / (f_part + (n - k) as f64);

    Ok(PermanovaResult {
        test_statistic: observed,
        p_value,
        permutations,
        sample_size: n,
        groups: k,
        effect_size,
    })
}

/// Pseudo-F from the squared distance matrix: between-group sum of squares
/// over within-group sum of squares, scaled by the degrees of freedom.
fn pseudo_f(
    distance: &[Vec<f64>],
    assignment: &[usize],
    group_sizes: &[usize],
    n: usize,
    k: usize,
) -> f64 {
    let mut ss_total = 0.0;
    let mut ss_within_scaled = vec![0.0; k];

    for i in 0..n {
        for j in (i + 1)..n {
            let sq = distance[i][j] * distance[i][j];
            ss_total += sq;
            if assignment[i] == assignment[j] {
                ss_within_scaled[assignment[i]] += sq;
            }
        }
    }
    ss_total /= n as f64;

    let ss_within: f64 = ss_within_scaled
        .iter()
        .zip(group_sizes)
        .map(|(ss, &size)| ss / size as f64)
        .sum();
    let ss_among = ss_total - ss_within;

    let df_among = (k - 1) as f64;
    let df_within = (n - k) as f64;
    if df_within <= 0.0 || ss_within == 0.0 {
        return f64::INFINITY;
    }
    (ss_among / df_among) / (ss_within / df_within)
}

/// Benjamini-Hochberg adjusted p-values, in the input order. Failed tests
/// must be excluded by the caller before correction, never given placeholder
/// p-values.
pub fn fdr_correct(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut adjusted = vec![0.0; m];
    let mut running_min = 1.0f64;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let candidate = p_values[idx] * m as f64 / (rank + 1) as f64;
        running_min = running_min.min(candidate);
        adjusted[idx] = running_min.min(1.0);
    }
    adjusted
}
