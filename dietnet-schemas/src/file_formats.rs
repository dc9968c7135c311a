use serde::{Deserialize, Serialize};

/// One row of the food metadata CSV after ingestion: a KEGG-style id (a
/// compound id on the metabolome path, a KO id on the genome path), the food
/// it came from, and the consumption frequency of that food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub kegg_id: String,
    pub name: String,
    pub food_frequency: f64,
}

/// One row of the microbe metadata CSV after selective cleaning. The
/// abundance column name is configurable per run, so the loader resolves it
/// by header before building these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrobeMetaRecord {
    pub ko: String,
    pub taxonomy: Option<String>,
    pub abundance: Option<f64>,
}

/// One row of the comparison manifest CSV: where a sample's edge table
/// lives, what the sample is called, and its grouping labels keyed by
/// grouping-variable column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub path: String,
    pub name: String,
    pub groups: std::collections::HashMap<String, String>,
}
