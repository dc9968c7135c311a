//! Loaders for every external input: catalogs, metadata tables, and the
//! comparison manifest. Column presence is validated here, at the ingestion
//! boundary, so the core never has to guess at table shapes.

use anyhow::{Context, Result};
use dietnet_core::error::DietNetError;
use dietnet_schemas::file_formats::{FoodRecord, ManifestRecord, MicrobeMetaRecord};
use dietnet_schemas::reaction::ReactionCatalog;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Default column names in the food metadata CSV.
pub const FOOD_ID_COLUMN: &str = "kegg_id";
pub const FOOD_NAME_COLUMN: &str = "ScientificName";
pub const FOOD_FREQUENCY_COLUMN: &str = "food_frequency";

/// Default column names in the microbe metadata CSV.
pub const KO_COLUMN: &str = "KO";
pub const TAXONOMY_COLUMN: &str = "taxonomy";
pub const DEFAULT_ABUNDANCE_COLUMN: &str = "Abundance_RPKs";

/// Reads the reaction catalog JSON produced by the external predictor.
pub fn load_reaction_catalog(path: &Path) -> Result<ReactionCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reaction catalog: {}", path.display()))?;
    let catalog: ReactionCatalog = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reaction catalog JSON: {}", path.display()))?;
    Ok(catalog)
}

/// Reads the compound catalog JSON. Only the keys (compound ids) are used.
pub fn load_compound_ids(path: &Path) -> Result<BTreeSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read compound catalog: {}", path.display()))?;
    let catalog: HashMap<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse compound catalog JSON: {}", path.display()))?;
    Ok(catalog.into_keys().collect())
}

struct CsvTable {
    path: String,
    headers: Vec<String>,
    records: Vec<csv::StringRecord>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self, DietNetError> {
        let path_str = path.display().to_string();
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
        let headers = reader
            .headers()
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?
            .iter()
            .map(str::to_string)
            .collect();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
        Ok(Self {
            path: path_str,
            headers,
            records,
        })
    }

    fn column(&self, name: &str) -> Result<usize, DietNetError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DietNetError::MissingColumn {
                file: self.path.clone(),
                column: name.to_string(),
                available: self.headers.clone(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Reads the food metadata CSV into records keyed by its KEGG-style id
/// column (compound ids on the metabolome path, KO ids on the genome path).
pub fn load_food_meta(path: &Path) -> Result<Vec<FoodRecord>> {
    let table = CsvTable::read(path)?;
    let id_idx = table.column(FOOD_ID_COLUMN)?;
    let name_idx = table.column(FOOD_NAME_COLUMN)?;
    let freq_idx = table.column(FOOD_FREQUENCY_COLUMN)?;

    let mut records = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let kegg_id = record.get(id_idx).unwrap_or_default().trim();
        if kegg_id.is_empty() {
            continue;
        }
        let frequency: f64 = record
            .get(freq_idx)
            .unwrap_or_default()
            .trim()
            .parse()
            .unwrap_or(0.0);
        records.push(FoodRecord {
            kegg_id: kegg_id.to_string(),
            name: record.get(name_idx).unwrap_or_default().trim().to_string(),
            food_frequency: frequency,
        });
    }
    Ok(records)
}

/// Reads the microbe metadata CSV. The abundance column name is
/// configurable; taxonomy and abundance cells may be missing and are kept
/// as `None` here. Selective cleaning happens in the core against the
/// run's weight flags.
pub fn load_microbe_meta(path: &Path, abundance_column: &str) -> Result<Vec<MicrobeMetaRecord>> {
    let table = CsvTable::read(path)?;
    let ko_idx = table.column(KO_COLUMN)?;
    let taxonomy_idx = table.optional_column(TAXONOMY_COLUMN);
    let abundance_idx = table.column(abundance_column)?;

    let mut records = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let taxonomy = taxonomy_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let abundance = record
            .get(abundance_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok());
        records.push(MicrobeMetaRecord {
            ko: record.get(ko_idx).unwrap_or_default().trim().to_string(),
            taxonomy,
            abundance,
        });
    }
    Ok(records)
}

/// Reads the comparison manifest CSV: per-sample graph paths, unique sample
/// names, and the requested grouping-variable columns.
pub fn load_manifest(
    path: &Path,
    paths_column: &str,
    names_column: &str,
    group_columns: &[String],
) -> Result<Vec<ManifestRecord>> {
    let table = CsvTable::read(path)?;
    let paths_idx = table.column(paths_column)?;
    let names_idx = table.column(names_column)?;
    let group_indices: Vec<(String, usize)> = group_columns
        .iter()
        .map(|col| Ok((col.clone(), table.column(col)?)))
        .collect::<Result<_, DietNetError>>()?;

    let mut records = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let groups: HashMap<String, String> = group_indices
            .iter()
            .filter_map(|(col, idx)| {
                record
                    .get(*idx)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|value| (col.clone(), value.to_string()))
            })
            .collect();
        records.push(ManifestRecord {
            path: record.get(paths_idx).unwrap_or_default().trim().to_string(),
            name: record.get(names_idx).unwrap_or_default().trim().to_string(),
            groups,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_column_names_the_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "food.csv", "id,name\nC1,Apple\n");

        let err = load_food_meta(&path).unwrap_err();
        let message = format!("{}", err.root_cause());
        assert!(message.contains("kegg_id"));
        assert!(message.contains("id"));
    }

    #[test]
    fn food_meta_parses_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "food.csv",
            "kegg_id,ScientificName,food_frequency\nC1,Apple,60\nC1,Banana,40\n",
        );

        let records = load_food_meta(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Apple");
        assert_eq!(records[1].food_frequency, 40.0);
    }

    #[test]
    fn microbe_meta_keeps_missing_values_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "microbe.csv",
            "KO,taxonomy,Abundance_RPKs\nK1,g__Bacteroides,1.5\nK2,,2.0\nK3,g__Prevotella,\n",
        );

        let records = load_microbe_meta(&path, DEFAULT_ABUNDANCE_COLUMN).unwrap();
        assert_eq!(records[0].taxonomy.as_deref(), Some("g__Bacteroides"));
        assert_eq!(records[1].taxonomy, None);
        assert_eq!(records[1].abundance, Some(2.0));
        assert_eq!(records[2].abundance, None);
    }

    #[test]
    fn manifest_collects_group_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "manifest.csv",
            "file_path,sampleID,cohort\na.csv,s1,control\nb.csv,s2,case\n",
        );

        let manifest = load_manifest(
            &path,
            "file_path",
            "sampleID",
            &["cohort".to_string()],
        )
        .unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest[0].name, "s1");
        assert_eq!(manifest[1].groups["cohort"], "case");
    }
}
