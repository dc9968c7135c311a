//! KO extraction: collapsing a pattern's edge rows into one deduplicated,
//! sorted KO list per sample.
//!
//! The KO cell of a graph CSV has appeared in three encodings over the
//! project's history: a JSON-style list (`["K1", "K2"]`), a Python-style
//! stringified list (`['K1', 'K2']`), and a bare comma-joined string
//! (`K1,K2`). Parsing tolerates all three and degrades to an empty set with
//! a warning rather than failing the run.

use crate::compare::patterns::SampleGraph;
use std::collections::BTreeSet;
use tracing::warn;

/// Per-sample KO lists, in manifest order.
pub type SampleKos = Vec<(String, Vec<String>)>;

/// Parses one KO cell into its element list. Empty and NA-marker cells
/// yield an empty list.
pub fn parse_ko_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "NA" || trimmed.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }

    // JSON-shaped lists parse directly.
    if trimmed.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(trimmed) {
            return parsed;
        }
    }

    // Fallback for Python-style lists and bare comma joins: strip the outer
    // brackets and per-element quotes.
    let inner = trimmed.trim_matches(|c| matches!(c, '[' | ']' | '(' | ')' | '{' | '}'));
    if inner.trim().is_empty() {
        warn!(cell = trimmed, "unparseable KO cell; using empty set");
        return Vec::new();
    }
    inner
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Flattens each sample's KO cells into a deduplicated, sorted list.
pub fn get_kos(graphs: &[SampleGraph]) -> SampleKos {
    graphs
        .iter()
        .map(|graph| {
            let mut set = BTreeSet::new();
            for row in &graph.rows {
                if let Some(cell) = &row.ko_cell {
                    set.extend(parse_ko_cell(cell));
                }
            }
            (graph.name.clone(), set.into_iter().collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::patterns::GraphEdgeRecord;
    use dietnet_schemas::compound::Origin;

    #[test]
    fn parses_json_lists() {
        assert_eq!(parse_ko_cell(r#"["K1", "K2"]"#), vec!["K1", "K2"]);
    }

    #[test]
    fn parses_python_style_lists() {
        assert_eq!(parse_ko_cell("['K1', 'K2']"), vec!["K1", "K2"]);
        assert_eq!(parse_ko_cell("['K1']"), vec!["K1"]);
    }

    #[test]
    fn parses_bare_comma_joins() {
        assert_eq!(parse_ko_cell("K1,K2,K3"), vec!["K1", "K2", "K3"]);
        assert_eq!(parse_ko_cell("K1, K2"), vec!["K1", "K2"]);
    }

    #[test]
    fn empty_and_na_cells_yield_empty() {
        assert!(parse_ko_cell("").is_empty());
        assert!(parse_ko_cell("  ").is_empty());
        assert!(parse_ko_cell("[]").is_empty());
        assert!(parse_ko_cell("NA").is_empty());
        assert!(parse_ko_cell("nan").is_empty());
    }

    #[test]
    fn kos_are_deduplicated_and_sorted_per_sample() {
        let graph = SampleGraph {
            name: "sample1".to_string(),
            rows: vec![
                GraphEdgeRecord {
                    compound1_origin: Origin::Food,
                    compound2_origin: Origin::Microbe,
                    ko_cell: Some("['K2', 'K1']".to_string()),
                },
                GraphEdgeRecord {
                    compound1_origin: Origin::Food,
                    compound2_origin: Origin::Microbe,
                    ko_cell: Some("['K1', 'K3']".to_string()),
                },
                GraphEdgeRecord {
                    compound1_origin: Origin::Food,
                    compound2_origin: Origin::Microbe,
                    ko_cell: None,
                },
            ],
        };

        let kos = get_kos(&[graph]);
        assert_eq!(kos.len(), 1);
        assert_eq!(kos[0].0, "sample1");
        assert_eq!(kos[0].1, vec!["K1", "K2", "K3"]);
    }

    #[test]
    fn sample_order_is_preserved() {
        let graphs: Vec<SampleGraph> = ["b", "a", "c"]
            .iter()
            .map(|name| SampleGraph {
                name: name.to_string(),
                rows: Vec::new(),
            })
            .collect();
        let kos = get_kos(&graphs);
        let names: Vec<&str> = kos.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
