//! Average-linkage hierarchical clustering of the `1 - similarity` distance
//! matrix, used to order samples for heatmap and dendrogram presentation.

use crate::compare::similarity::SimilarityMatrix;

/// One agglomeration step. `left` and `right` are cluster ids: ids below the
/// leaf count are samples, larger ids refer to earlier merges (leaf count +
/// merge index).
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
    pub size: usize,
}

/// Result of clustering: the merge sequence plus the derived left-to-right
/// leaf visiting order.
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    pub n_leaves: usize,
    pub merges: Vec<Merge>,
    pub leaf_order: Vec<usize>,
}

impl Clustering {
    pub fn max_height(&self) -> f64 {
        self.merges.iter().map(|m| m.height).fold(0.0, f64::max)
    }
}

/// Clusters the samples of a similarity matrix. Zero samples is a no-op;
/// a single sample produces the trivial one-leaf order with no merges.
pub fn cluster(matrix: &SimilarityMatrix) -> Clustering {
    let n = matrix.n();
    if n == 0 {
        return Clustering::default();
    }
    if n == 1 {
        return Clustering {
            n_leaves: 1,
            merges: Vec::new(),
            leaf_order: vec![0],
        };
    }

    // Active clusters as (id, size) with a parallel pairwise distance table.
    let mut clusters: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut dists = matrix.to_distance();
    let mut merges = Vec::with_capacity(n - 1);

    while clusters.len() > 1 {
        let (mut best_i, mut best_j) = (0, 1);
        let mut best = f64::INFINITY;
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                if dists[i][j] < best {
                    best = dists[i][j];
                    best_i = i;
                    best_j = j;
                }
            }
        }

        let (left_id, left_size) = clusters[best_i];
        let (right_id, right_size) = clusters[best_j];
        let merged_size = left_size + right_size;
        let merged_id = n + merges.len();

        // Lance-Williams update for average linkage: the distance from any
        // other cluster to the merge is the size-weighted mean of its
        // distances to the two halves.
        let mut new_row = Vec::with_capacity(clusters.len() - 1);
        for k in 0..clusters.len() {
            if k == best_i || k == best_j {
                continue;
            }
            let weighted = (left_size as f64 * dists[best_i][k]
                + right_size as f64 * dists[best_j][k])
                / merged_size as f64;
            new_row.push(weighted);
        }

        merges.push(Merge {
            left: left_id,
            right: right_id,
            height: best,
            size: merged_size,
        });

        // Drop the higher index first so the lower one stays valid.
        remove_index(&mut clusters, &mut dists, best_j);
        remove_index(&mut clusters, &mut dists, best_i);

        clusters.push((merged_id, merged_size));
        for (k, value) in new_row.iter().enumerate() {
            dists[k].push(*value);
        }
        let mut appended = new_row;
        appended.push(0.0);
        dists.push(appended);
    }

    let leaf_order = leaves(n, &merges);
    Clustering {
        n_leaves: n,
        merges,
        leaf_order,
    }
}

fn remove_index(clusters: &mut Vec<(usize, usize)>, dists: &mut Vec<Vec<f64>>, index: usize) {
    clusters.remove(index);
    dists.remove(index);
    for row in dists.iter_mut() {
        row.remove(index);
    }
}

/// Left-to-right leaf order from a depth-first walk of the merge tree.
fn leaves(n: usize, merges: &[Merge]) -> Vec<usize> {
    if merges.is_empty() {
        return (0..n).collect();
    }
    let root = n + merges.len() - 1;
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if id < n {
            order.push(id);
        } else {
            let merge = &merges[id - n];
            // Right first so the left subtree is visited first.
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }
    order
}
