//! Assembly of per-sample node and edge tables.

pub mod edges;
pub mod nodes;

use dietnet_schemas::compound::NodeRow;
use dietnet_schemas::edge::EdgeRow;
use std::collections::BTreeSet;
use tracing::info;

/// Emits the post-build counters the pipeline has always reported: reaction
/// and KO totals, node/edge counts, and nodes per origin category.
pub fn summarize(nodes: &[NodeRow], edges: &[EdgeRow], reaction_count: usize) {
    let unique_kos: BTreeSet<&str> = edges
        .iter()
        .flat_map(|e| e.kos.iter().map(String::as_str))
        .collect();

    info!(reaction_count, "reactions were found");
    info!(ko_count = unique_kos.len(), "KOs mapped to reactions");
    info!(node_count = nodes.len(), "nodes were created");
    info!(edge_count = edges.len(), "edges were created");

    for origin in ["food", "microbe", "both", "none"] {
        let count = nodes
            .iter()
            .filter(|n| n.origin.to_string() == origin)
            .count();
        info!(origin, count, "nodes per origin category");
    }
}
