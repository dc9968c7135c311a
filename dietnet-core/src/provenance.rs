//! Provenance resolution: assigning exactly one [`Origin`] to every compound.
//!
//! Two interchangeable sources share the [`OriginSource`] contract. The
//! metabolome path classifies compounds by direct membership in the microbial
//! and food compound sets; the genome path reads a precomputed three-way
//! categorical mapper produced by the external predictor.

use crate::error::DietNetError;
use dietnet_schemas::compound::{MapperColor, Origin};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::str::FromStr;

/// Reserved prefix marking non-small-molecule glycan entries. These are
/// excluded from the microbial compound set before classification.
pub const GLYCAN_PREFIX: char = 'G';

/// One origin label per id, regardless of how the labels were derived.
pub trait OriginSource {
    fn origin_of(&self, id: &str) -> Origin;
}

impl OriginSource for BTreeMap<String, Origin> {
    fn origin_of(&self, id: &str) -> Origin {
        self.get(id).copied().unwrap_or(Origin::None)
    }
}

/// Metabolome-path classification: a compound is `microbe` iff present in
/// the microbial compound set, `food` iff present in the food set, `both`
/// iff present in both. Glycan ids are dropped from the microbial set first.
pub fn resolve_metabolome(
    microbe_compounds: &BTreeSet<String>,
    food_compounds: &BTreeSet<String>,
) -> BTreeMap<String, Origin> {
    let microbial: BTreeSet<&String> = microbe_compounds
        .iter()
        .filter(|id| !id.starts_with(GLYCAN_PREFIX))
        .collect();

    let mut origins = BTreeMap::new();
    for id in microbial.iter() {
        let origin = if food_compounds.contains(id.as_str()) {
            Origin::Both
        } else {
            Origin::Microbe
        };
        origins.insert((*id).clone(), origin);
    }
    for id in food_compounds {
        origins.entry(id.clone()).or_insert(Origin::Food);
    }
    origins
}

/// Genome-path origin mapper, loaded from the two-column TSV emitted by the
/// external predictor (`blue` = microbe, `green` = both, `yellow` = food).
#[derive(Debug, Clone, Default)]
pub struct OriginMapper {
    origins: HashMap<String, Origin>,
}

impl OriginMapper {
    /// Builds a mapper from (id, color) rows. An id appearing in more than
    /// one row with conflicting colors is an integrity error and is never
    /// silently resolved.
    pub fn from_rows<I>(rows: I) -> Result<Self, DietNetError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut origins = HashMap::new();
        for (id, color) in rows {
            let mapped = MapperColor::from_str(color.as_str())
                .map_err(|_| DietNetError::UnknownMapperColor {
                    id: id.clone(),
                    color: color.clone(),
                })?
                .origin();
            if let Some(previous) = origins.insert(id.clone(), mapped) {
                if previous != mapped {
                    return Err(DietNetError::AmbiguousMapperEntry(id));
                }
            }
        }
        Ok(Self { origins })
    }

    /// Reads the mapper TSV. The file has no canonical header names, only a
    /// fixed two-column layout: id, then the categorical code.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self, DietNetError> {
        let path_str = path.as_ref().display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(path.as_ref())
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
            let id = record.get(0).unwrap_or_default().to_string();
            let color = record.get(1).unwrap_or_default().to_string();
            if id.is_empty() {
                continue;
            }
            rows.push((id, color));
        }
        Self::from_rows(rows)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Number of mapped ids carrying the given origin.
    pub fn count_origin(&self, origin: Origin) -> usize {
        self.origins.values().filter(|o| **o == origin).count()
    }
}

impl OriginSource for OriginMapper {
    fn origin_of(&self, id: &str) -> Origin {
        self.origins.get(id).copied().unwrap_or(Origin::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn metabolome_classifies_membership() {
        let microbes = set(&["C00001", "C00002"]);
        let foods = set(&["C00002", "C00003"]);
        let origins = resolve_metabolome(&microbes, &foods);

        assert_eq!(origins.origin_of("C00001"), Origin::Microbe);
        assert_eq!(origins.origin_of("C00002"), Origin::Both);
        assert_eq!(origins.origin_of("C00003"), Origin::Food);
        assert_eq!(origins.origin_of("C99999"), Origin::None);
    }

    #[test]
    fn metabolome_excludes_glycans_from_microbial_set() {
        let microbes = set(&["G00001", "C00001"]);
        let foods = set(&["G00001"]);
        let origins = resolve_metabolome(&microbes, &foods);

        // The glycan only survives through the food set.
        assert_eq!(origins.origin_of("G00001"), Origin::Food);
        assert_eq!(origins.origin_of("C00001"), Origin::Microbe);
    }

    #[test]
    fn mapper_colors_follow_the_key() {
        let mapper = OriginMapper::from_rows([
            ("K00001".to_string(), "blue".to_string()),
            ("K00002".to_string(), "green".to_string()),
            ("C00010".to_string(), "yellow".to_string()),
        ])
        .unwrap();

        assert_eq!(mapper.origin_of("K00001"), Origin::Microbe);
        assert_eq!(mapper.origin_of("K00002"), Origin::Both);
        assert_eq!(mapper.origin_of("C00010"), Origin::Food);
        assert_eq!(mapper.origin_of("C00099"), Origin::None);
    }

    #[test]
    fn mapper_counts_entries_per_origin() {
        let mapper = OriginMapper::from_rows([
            ("K00001".to_string(), "blue".to_string()),
            ("K00002".to_string(), "blue".to_string()),
            ("K00003".to_string(), "green".to_string()),
            ("C00010".to_string(), "yellow".to_string()),
        ])
        .unwrap();

        assert_eq!(mapper.len(), 4);
        assert!(!mapper.is_empty());
        assert_eq!(mapper.count_origin(Origin::Microbe), 2);
        assert_eq!(mapper.count_origin(Origin::Both), 1);
        assert_eq!(mapper.count_origin(Origin::Food), 1);
        assert_eq!(mapper.count_origin(Origin::None), 0);
        assert!(OriginMapper::default().is_empty());
    }

    #[test]
    fn mapper_conflicting_rows_are_an_error() {
        let err = OriginMapper::from_rows([
            ("C00010".to_string(), "yellow".to_string()),
            ("C00010".to_string(), "blue".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, DietNetError::AmbiguousMapperEntry(id) if id == "C00010"));
    }

    #[test]
    fn mapper_repeated_identical_rows_are_fine() {
        let mapper = OriginMapper::from_rows([
            ("C00010".to_string(), "yellow".to_string()),
            ("C00010".to_string(), "yellow".to_string()),
        ])
        .unwrap();
        assert_eq!(mapper.origin_of("C00010"), Origin::Food);
    }

    #[test]
    fn mapper_rejects_unknown_colors() {
        let err =
            OriginMapper::from_rows([("C00010".to_string(), "purple".to_string())]).unwrap_err();
        assert!(matches!(err, DietNetError::UnknownMapperColor { .. }));
    }
}
