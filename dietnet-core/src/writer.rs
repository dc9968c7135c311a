//! CSV output for node, edge, and similarity tables.
//!
//! `Option` fields render as the `NA` marker; list-valued fields render in
//! the stringified-list form (`['a', 'b']`) the comparison-side KO parser
//! accepts, so written graphs round-trip.

use crate::compare::similarity::SimilarityMatrix;
use crate::error::DietNetError;
use dietnet_schemas::compound::NodeRow;
use dietnet_schemas::edge::EdgeRow;
use std::fs;
use std::path::Path;

/// Marker written for absent optional values.
pub const NA: &str = "NA";

/// Header used for the edge abundance column when the default abundance
/// input column is in use.
pub const ABUNDANCE_RPKS_HEADER: &str = "abundance_RPKs";

fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}

fn render_opt_number(value: Option<f64>) -> String {
    value.map_or_else(|| NA.to_string(), |v| v.to_string())
}

fn ensure_parent_dir(path: &Path) -> Result<(), DietNetError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| DietNetError::FileIO(parent.display().to_string(), e))?;
        }
    }
    Ok(())
}

fn open_writer(path: &Path) -> Result<csv::Writer<fs::File>, DietNetError> {
    ensure_parent_dir(path)?;
    csv::Writer::from_path(path).map_err(|e| DietNetError::CsvError(path.display().to_string(), e))
}

/// Writes the node table (`c_id, origin, assoc_food, freq`).
pub fn write_nodes<P: AsRef<Path>>(path: P, nodes: &[NodeRow]) -> Result<(), DietNetError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let mut writer = open_writer(path)?;

    writer
        .write_record(["c_id", "origin", "assoc_food", "freq"])
        .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;

    for node in nodes {
        let assoc_food = node
            .assoc_food
            .as_ref()
            .map_or_else(|| NA.to_string(), |foods| render_list(foods));
        let origin = node.origin.to_string();
        let freq = render_opt_number(node.freq);
        writer
            .write_record([
                node.compound.as_str(),
                origin.as_str(),
                assoc_food.as_str(),
                freq.as_str(),
            ])
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
    }

    writer
        .flush()
        .map_err(|e| DietNetError::FileIO(path_str, e))?;
    Ok(())
}

/// Writes the edge table (`compound1, compound2, reaction, KOs, organisms,
/// <abundance_header>`).
pub fn write_edges<P: AsRef<Path>>(
    path: P,
    edges: &[EdgeRow],
    abundance_header: &str,
) -> Result<(), DietNetError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let mut writer = open_writer(path)?;

    writer
        .write_record([
            "compound1",
            "compound2",
            "reaction",
            "KOs",
            "organisms",
            abundance_header,
        ])
        .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;

    for edge in edges {
        let organisms = edge
            .organisms
            .clone()
            .unwrap_or_else(|| NA.to_string());
        let kos = render_list(&edge.kos);
        let abundance = render_opt_number(edge.abundance);
        writer
            .write_record([
                edge.compound1.as_str(),
                edge.compound2.as_str(),
                edge.reaction.as_str(),
                kos.as_str(),
                organisms.as_str(),
                abundance.as_str(),
            ])
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
    }

    writer
        .flush()
        .map_err(|e| DietNetError::FileIO(path_str, e))?;
    Ok(())
}

/// Writes a similarity matrix with sample labels as the header row.
pub fn write_similarity<P: AsRef<Path>>(
    path: P,
    matrix: &SimilarityMatrix,
) -> Result<(), DietNetError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();
    let mut writer = open_writer(path)?;

    writer
        .write_record(&matrix.labels)
        .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
    for row in &matrix.values {
        let rendered: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writer
            .write_record(&rendered)
            .map_err(|e| DietNetError::CsvError(path_str.clone(), e))?;
    }

    writer
        .flush()
        .map_err(|e| DietNetError::FileIO(path_str, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dietnet_schemas::compound::Origin;

    #[test]
    fn node_options_render_as_na() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");

        let nodes = vec![
            NodeRow {
                compound: "C1".to_string(),
                origin: Origin::Microbe,
                assoc_food: None,
                freq: None,
            },
            NodeRow {
                compound: "C2".to_string(),
                origin: Origin::Food,
                assoc_food: Some(vec!["Apple".to_string(), "Banana".to_string()]),
                freq: Some(100.0),
            },
        ];
        write_nodes(&path, &nodes).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "c_id,origin,assoc_food,freq");
        assert_eq!(lines.next().unwrap(), "C1,microbe,NA,NA");
        assert_eq!(lines.next().unwrap(), "C2,food,\"['Apple', 'Banana']\",100");
    }

    #[test]
    fn edge_ko_lists_round_trip_through_the_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.csv");

        let edges = vec![EdgeRow {
            compound1: "C1".to_string(),
            compound2: "C3".to_string(),
            reaction: "rn1".to_string(),
            kos: vec!["K1".to_string(), "K2".to_string()],
            organisms: None,
            abundance: Some(2.5),
        }];
        write_edges(&path, &edges, ABUNDANCE_RPKS_HEADER).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[5], "abundance_RPKs");

        let record = reader.records().next().unwrap().unwrap();
        let parsed = crate::compare::kos::parse_ko_cell(&record[3]);
        assert_eq!(parsed, vec!["K1", "K2"]);
        assert_eq!(&record[4], "NA");
    }

    #[test]
    fn similarity_csv_has_labels_as_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("SimilarityMatrix.csv");

        let matrix = SimilarityMatrix {
            labels: vec!["s1".to_string(), "s2".to_string()],
            values: vec![vec![1.0, 0.2], vec![0.2, 1.0]],
        };
        // Parent directory is created on demand.
        write_similarity(&path, &matrix).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "s1,s2");
        assert_eq!(lines.next().unwrap(), "1,0.2");
    }
}
