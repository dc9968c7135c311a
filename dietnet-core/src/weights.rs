//! Weight aggregation: per-KO abundance and taxonomy summaries, and
//! per-compound food-frequency sums.

use crate::error::DietNetError;
use dietnet_schemas::file_formats::{FoodRecord, MicrobeMetaRecord};
use dietnet_schemas::weights::WeightConfig;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// Drops microbe-metadata rows with missing values, but only in the columns
/// the run actually requests. Enabling organism weighting must not discard
/// abundance-complete rows that merely lack taxonomy, and vice versa.
pub fn clean_microbe_meta(
    rows: Vec<MicrobeMetaRecord>,
    config: &WeightConfig,
) -> Vec<MicrobeMetaRecord> {
    let before = rows.len();
    let cleaned: Vec<MicrobeMetaRecord> = rows
        .into_iter()
        .filter(|row| {
            if row.ko.is_empty() {
                return false;
            }
            if config.organisms && row.taxonomy.as_deref().map_or(true, str::is_empty) {
                return false;
            }
            if config.abundance && row.abundance.is_none() {
                return false;
            }
            true
        })
        .collect();
    info!(
        removed = before - cleaned.len(),
        retained = cleaned.len(),
        "NAs have been removed from microbe metadata"
    );
    cleaned
}

/// Per-KO weight summaries. Each map is present only when the corresponding
/// feature flag was on for the run; lookups against an absent map yield
/// `None`, which downstream rendering treats as the NA marker, never zero.
#[derive(Debug, Clone, Default)]
pub struct KoWeights {
    abundance: Option<HashMap<String, f64>>,
    organisms: Option<HashMap<String, String>>,
}

impl KoWeights {
    /// Aggregates cleaned metadata rows: abundance is group-summed per KO;
    /// organisms become the sorted, deduplicated, comma-joined taxonomy
    /// labels per KO.
    pub fn build(rows: &[MicrobeMetaRecord], config: &WeightConfig) -> Self {
        let abundance = config.abundance.then(|| {
            let mut sums: HashMap<String, f64> = HashMap::new();
            for row in rows {
                if let Some(value) = row.abundance {
                    *sums.entry(row.ko.clone()).or_insert(0.0) += value;
                }
            }
            sums
        });

        let organisms = config.organisms.then(|| {
            let mut taxa: HashMap<String, BTreeSet<String>> = HashMap::new();
            for row in rows {
                if let Some(taxonomy) = &row.taxonomy {
                    if !taxonomy.is_empty() {
                        taxa.entry(row.ko.clone())
                            .or_default()
                            .insert(taxonomy.clone());
                    }
                }
            }
            taxa.into_iter()
                .map(|(ko, labels)| (ko, labels.into_iter().collect::<Vec<_>>().join(", ")))
                .collect()
        });

        Self {
            abundance,
            organisms,
        }
    }

    /// Union of taxonomy labels over the given KOs, re-deduplicated and
    /// re-sorted across KO boundaries. `None` when organism weighting is off.
    pub fn edge_organisms(&self, kos: &[String]) -> Option<String> {
        let map = self.organisms.as_ref()?;
        let mut labels = BTreeSet::new();
        for ko in kos {
            if let Some(joined) = map.get(ko) {
                for label in joined.split(", ") {
                    labels.insert(label.to_string());
                }
            }
        }
        Some(labels.into_iter().collect::<Vec<_>>().join(", "))
    }

    /// Summed abundance over the given KOs. `None` when abundance weighting
    /// is off; KOs absent from the map contribute nothing.
    pub fn edge_abundance(&self, kos: &[String]) -> Option<f64> {
        let map = self.abundance.as_ref()?;
        Some(kos.iter().filter_map(|ko| map.get(ko)).sum())
    }

    pub fn ko_abundance(&self, ko: &str) -> Option<f64> {
        self.abundance.as_ref()?.get(ko).copied()
    }

    pub fn ko_organisms(&self, ko: &str) -> Option<&str> {
        self.organisms.as_ref()?.get(ko).map(String::as_str)
    }
}

/// Food records grouped by their KEGG-style id (compound id on the
/// metabolome path, KO id on the genome path).
#[derive(Debug, Clone, Default)]
pub struct FoodIndex {
    by_id: HashMap<String, Vec<FoodRecord>>,
}

impl FoodIndex {
    pub fn new(records: Vec<FoodRecord>) -> Self {
        let mut by_id: HashMap<String, Vec<FoodRecord>> = HashMap::new();
        for record in records {
            by_id.entry(record.kegg_id.clone()).or_default().push(record);
        }
        Self { by_id }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.by_id.keys()
    }

    pub fn records_for(&self, id: &str) -> &[FoodRecord] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All records attached to any of the given ids.
    pub fn records_for_any<'a, I>(&self, ids: I) -> Vec<&FoodRecord>
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter()
            .flat_map(|id| self.records_for(id))
            .collect()
    }
}

/// Unique food names over a record subset, sorted for stable output.
pub fn unique_foods(records: &[&FoodRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
    names.into_iter().map(str::to_string).collect()
}

/// Summed consumption frequency over a record subset, counting each distinct
/// food once. A sum above 100 is a data-integrity violation and fails
/// loudly; it is never clamped.
pub fn food_frequency(compound: &str, records: &[&FoodRecord]) -> Result<f64, DietNetError> {
    let mut seen = BTreeSet::new();
    let mut freq = 0.0;
    for record in records {
        if seen.insert(record.name.as_str()) {
            freq += record.food_frequency;
        }
    }
    if freq > 100.0 {
        return Err(DietNetError::FrequencyTooHigh {
            compound: compound.to_string(),
            freq,
        });
    }
    Ok(freq)
}
