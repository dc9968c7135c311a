use serde::{Deserialize, Serialize};

/// One row of the edge table: a directed (reactant, product) pair drawn from
/// a single reaction's cross product.
///
/// Multiple reactions connecting the same compound pair produce multiple
/// rows; edges are deliberately not deduplicated so reaction-level
/// provenance survives into the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub compound1: String,
    pub compound2: String,
    pub reaction: String,
    /// Full KO set of the originating reaction, sorted.
    pub kos: Vec<String>,
    /// Deduplicated, sorted, comma-joined taxonomy labels over the edge's
    /// KOs; `None` when organism weighting is off or no KO has taxonomy.
    pub organisms: Option<String>,
    /// Summed abundance over the edge's KOs; `None` when abundance
    /// weighting is off.
    pub abundance: Option<f64>,
}
