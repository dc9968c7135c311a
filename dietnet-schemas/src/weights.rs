use serde::{Deserialize, Serialize};

/// Per-run weighting flags. Weighting is strictly opt-in: when a flag is
/// off the corresponding output field is the NA marker for every row,
/// regardless of what the metadata tables contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Attach summed consumption frequencies to food-linked nodes.
    pub frequency: bool,
    /// Attach summed KO abundances to edges.
    pub abundance: bool,
    /// Attach aggregated taxonomy labels to edges.
    pub organisms: bool,
}
