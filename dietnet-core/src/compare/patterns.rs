//! Per-sample edge tables and the three fixed relationship patterns used to
//! partition them.

use crate::error::DietNetError;
use dietnet_schemas::compound::Origin;
use dietnet_schemas::file_formats::ManifestRecord;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// One edge row as read back from a sample's graph CSV. Only the endpoint
/// origins and the raw KO cell matter for comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdgeRecord {
    pub compound1_origin: Origin,
    pub compound2_origin: Origin,
    pub ko_cell: Option<String>,
}

/// A named edge table for one biological sample.
#[derive(Debug, Clone, Default)]
pub struct SampleGraph {
    pub name: String,
    pub rows: Vec<GraphEdgeRecord>,
}

/// The three relationship patterns, determined solely by an edge's endpoint
/// origins. The origin pairs are mutually exclusive, so an edge lands in at
/// most one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    FoodMicrobe,
    FoodBoth,
    BothBoth,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::FoodMicrobe, Pattern::FoodBoth, Pattern::BothBoth];

    pub fn display_name(&self) -> &'static str {
        match self {
            Pattern::FoodMicrobe => "Food to Microbe",
            Pattern::FoodBoth => "Food to Both",
            Pattern::BothBoth => "Both to Both",
        }
    }

    /// Display name with spaces removed, used in output file names.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Pattern::FoodMicrobe => "FoodtoMicrobe",
            Pattern::FoodBoth => "FoodtoBoth",
            Pattern::BothBoth => "BothtoBoth",
        }
    }

    pub fn matches(&self, origin1: Origin, origin2: Origin) -> bool {
        let expected = match self {
            Pattern::FoodMicrobe => (Origin::Food, Origin::Microbe),
            Pattern::FoodBoth => (Origin::Food, Origin::Both),
            Pattern::BothBoth => (Origin::Both, Origin::Both),
        };
        (origin1, origin2) == expected
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl SampleGraph {
    /// Reads a sample's graph CSV. `compound1_origin` and `compound2_origin`
    /// are required columns; a missing KO column is tolerated (each affected
    /// row degrades to an empty KO set downstream, with a warning here).
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        name: &str,
        ko_column: &str,
    ) -> Result<Self, DietNetError> {
        let path_str = path.as_ref().display().to_string();
        if !path.as_ref().exists() {
            return Err(DietNetError::GraphNotFound {
                name: name.to_string(),
                path: path_str,
            });
        }

        let mut reader = csv::Reader::from_path(path.as_ref())
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?
            .iter()
            .map(str::to_string)
            .collect();

        let index_of = |column: &str| -> Result<usize, DietNetError> {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DietNetError::MissingColumn {
                    file: path_str.clone(),
                    column: column.to_string(),
                    available: headers.clone(),
                })
        };

        let origin1_idx = index_of("compound1_origin")?;
        let origin2_idx = index_of("compound2_origin")?;
        let ko_idx = headers.iter().position(|h| h == ko_column);
        if ko_idx.is_none() {
            warn!(
                sample = name,
                column = ko_column,
                "KO column not found in graph CSV; using empty KO sets"
            );
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
            let origin1 = parse_origin(record.get(origin1_idx).unwrap_or_default());
            let origin2 = parse_origin(record.get(origin2_idx).unwrap_or_default());
            let ko_cell = ko_idx
                .and_then(|idx| record.get(idx))
                .map(str::to_string)
                .filter(|s| !s.is_empty());
            rows.push(GraphEdgeRecord {
                compound1_origin: origin1,
                compound2_origin: origin2,
                ko_cell,
            });
        }

        Ok(Self {
            name: name.to_string(),
            rows,
        })
    }

    /// Edges whose endpoint origins match the pattern, as a new graph with
    /// the same sample name.
    pub fn subset(&self, pattern: Pattern) -> SampleGraph {
        SampleGraph {
            name: self.name.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| pattern.matches(r.compound1_origin, r.compound2_origin))
                .cloned()
                .collect(),
        }
    }
}

fn parse_origin(cell: &str) -> Origin {
    Origin::from_str(cell.trim()).unwrap_or(Origin::None)
}

/// Loads every sample graph named by the manifest, enforcing unique sample
/// names.
pub fn load_graphs(
    manifest: &[ManifestRecord],
    ko_column: &str,
) -> Result<Vec<SampleGraph>, DietNetError> {
    let mut seen = HashSet::new();
    for record in manifest {
        if !seen.insert(record.name.clone()) {
            return Err(DietNetError::DuplicateSampleName(record.name.clone()));
        }
    }

    let mut graphs = Vec::with_capacity(manifest.len());
    for record in manifest {
        graphs.push(SampleGraph::from_csv(
            &record.path,
            &record.name,
            ko_column,
        )?);
    }
    Ok(graphs)
}

/// Partitions every sample's edge table by pattern, preserving sample order.
pub fn subset_graphs(graphs: &[SampleGraph], pattern: Pattern) -> Vec<SampleGraph> {
    graphs.iter().map(|g| g.subset(pattern)).collect()
}
