//! Edge construction: each qualifying reaction expands its reactant×product
//! cross product into directed edges carrying the reaction's KO set and the
//! configured weights.

use crate::provenance::{OriginMapper, OriginSource};
use crate::weights::KoWeights;
use dietnet_schemas::edge::EdgeRow;
use dietnet_schemas::reaction::ReactionCatalog;
use std::collections::{BTreeMap, BTreeSet};

/// How reaction qualification is decided.
///
/// The metabolome path admits every cataloged reaction. The genome path
/// admits only reactions with at least one KO the mapper classifies as
/// `microbe` or `both`: a reaction carried exclusively by food-origin KOs is
/// food metabolism, not gut microbial metabolism, and must not generate a
/// network edge.
pub enum EdgeStrategy<'a> {
    Metabolome,
    Genome { mapper: &'a OriginMapper },
}

/// Output of a build: the edge table plus, on the genome path, the compounds
/// that were touched only by non-microbial reactions, keyed to the food KOs
/// that touched them. The node builder uses that map for food attribution.
#[derive(Debug, Default)]
pub struct EdgeBuildResult {
    pub edges: Vec<EdgeRow>,
    pub food_linked: BTreeMap<String, BTreeSet<String>>,
}

/// Expands the catalog into edge rows.
///
/// A reactant or product absent from the compound universe silently drops
/// the pair (the compound was never recognized as a node, so no edge may
/// reference it). Edges are not deduplicated across reactions sharing a
/// compound pair; the table has multigraph semantics.
pub fn build_edges(
    reactions: &ReactionCatalog,
    universe: &BTreeSet<String>,
    weights: &KoWeights,
    strategy: &EdgeStrategy<'_>,
) -> EdgeBuildResult {
    let mut result = EdgeBuildResult::default();

    for (rxn_id, reaction) in reactions {
        let kos = reaction.kos();

        let qualifies = match strategy {
            EdgeStrategy::Metabolome => true,
            EdgeStrategy::Genome { mapper } => {
                kos.iter().any(|ko| mapper.origin_of(ko).is_microbial())
            }
        };

        if !qualifies {
            // Food metabolism: remember which food KOs touched which
            // compounds so the node builder can still attribute foods.
            let ko_set: BTreeSet<String> = kos.iter().cloned().collect();
            for compound in reaction.equation.compounds() {
                result
                    .food_linked
                    .entry(compound.clone())
                    .or_default()
                    .extend(ko_set.iter().cloned());
            }
            continue;
        }

        let organisms = weights.edge_organisms(&kos);
        let abundance = weights.edge_abundance(&kos);

        for reactant in reaction.equation.reactants() {
            for product in reaction.equation.products() {
                if !universe.contains(reactant) || !universe.contains(product) {
                    continue;
                }
                result.edges.push(EdgeRow {
                    compound1: reactant.clone(),
                    compound2: product.clone(),
                    reaction: rxn_id.clone(),
                    kos: kos.clone(),
                    organisms: organisms.clone(),
                    abundance,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dietnet_schemas::file_formats::MicrobeMetaRecord;
    use dietnet_schemas::reaction::{Equation, Reaction};
    use dietnet_schemas::weights::WeightConfig;

    fn reaction(reactants: &[&str], products: &[&str], kos: &[&str]) -> Reaction {
        Reaction {
            equation: Equation(
                reactants.iter().map(|s| s.to_string()).collect(),
                products.iter().map(|s| s.to_string()).collect(),
            ),
            orthology: kos.iter().map(|k| vec![k.to_string()]).collect(),
        }
    }

    fn universe(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cross_product_expansion() {
        let mut catalog = ReactionCatalog::new();
        catalog.insert("rn1".to_string(), reaction(&["C1", "C2"], &["C3"], &["K1"]));

        let result = build_edges(
            &catalog,
            &universe(&["C1", "C2", "C3"]),
            &KoWeights::default(),
            &EdgeStrategy::Metabolome,
        );

        assert_eq!(result.edges.len(), 2);
        assert_eq!(result.edges[0].compound1, "C1");
        assert_eq!(result.edges[0].compound2, "C3");
        assert_eq!(result.edges[1].compound1, "C2");
        assert_eq!(result.edges[1].compound2, "C3");
        for edge in &result.edges {
            assert_eq!(edge.reaction, "rn1");
            assert_eq!(edge.kos, vec!["K1".to_string()]);
        }
    }

    #[test]
    fn unknown_compounds_drop_the_pair_silently() {
        let mut catalog = ReactionCatalog::new();
        catalog.insert("rn1".to_string(), reaction(&["C1", "C9"], &["C3"], &["K1"]));

        let result = build_edges(
            &catalog,
            &universe(&["C1", "C3"]),
            &KoWeights::default(),
            &EdgeStrategy::Metabolome,
        );

        // C9 is outside the universe; only C1 -> C3 survives.
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].compound1, "C1");
    }

    #[test]
    fn genome_path_filters_food_only_reactions() {
        let mapper = crate::provenance::OriginMapper::from_rows([
            ("K1".to_string(), "yellow".to_string()),
            ("K2".to_string(), "blue".to_string()),
        ])
        .unwrap();

        let mut catalog = ReactionCatalog::new();
        catalog.insert("rn1".to_string(), reaction(&["C1"], &["C2"], &["K1"]));
        catalog.insert("rn2".to_string(), reaction(&["C2"], &["C3"], &["K2"]));

        let result = build_edges(
            &catalog,
            &universe(&["C1", "C2", "C3"]),
            &KoWeights::default(),
            &EdgeStrategy::Genome { mapper: &mapper },
        );

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].reaction, "rn2");
        // rn1's compounds are recorded as food-linked through K1.
        assert!(result.food_linked["C1"].contains("K1"));
        assert!(result.food_linked["C2"].contains("K1"));
        assert!(!result.food_linked.contains_key("C3"));
    }

    #[test]
    fn weights_off_means_na_even_when_data_exists() {
        let rows = vec![MicrobeMetaRecord {
            ko: "K1".to_string(),
            taxonomy: Some("g__Bacteroides".to_string()),
            abundance: Some(3.0),
        }];
        let weights = KoWeights::build(&rows, &WeightConfig::default());

        let mut catalog = ReactionCatalog::new();
        catalog.insert("rn1".to_string(), reaction(&["C1"], &["C2"], &["K1"]));

        let result = build_edges(
            &catalog,
            &universe(&["C1", "C2"]),
            &weights,
            &EdgeStrategy::Metabolome,
        );
        assert_eq!(result.edges[0].organisms, None);
        assert_eq!(result.edges[0].abundance, None);
    }

    #[test]
    fn edges_are_not_deduplicated_across_reactions() {
        // Two reactions connecting the same pair must keep separate rows so
        // reaction-level provenance survives.
        let mut catalog = ReactionCatalog::new();
        catalog.insert("rn1".to_string(), reaction(&["C1"], &["C2"], &["K1"]));
        catalog.insert("rn2".to_string(), reaction(&["C1"], &["C2"], &["K2"]));

        let result = build_edges(
            &catalog,
            &universe(&["C1", "C2"]),
            &KoWeights::default(),
            &EdgeStrategy::Metabolome,
        );
        assert_eq!(result.edges.len(), 2);
        let reactions: Vec<&str> = result.edges.iter().map(|e| e.reaction.as_str()).collect();
        assert_eq!(reactions, vec!["rn1", "rn2"]);
    }
}
