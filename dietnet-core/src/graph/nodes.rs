//! Node construction: one row per compound in the universe, combining
//! origin, associated foods, and the optional consumption-frequency weight.

use crate::error::DietNetError;
use crate::provenance::OriginSource;
use crate::weights::{food_frequency, unique_foods, FoodIndex};
use dietnet_schemas::compound::NodeRow;
use dietnet_schemas::weights::WeightConfig;
use std::collections::{BTreeMap, BTreeSet};

/// How a compound's food records are found.
///
/// The metabolome path keys food metadata directly by compound id. The
/// genome path keys it by KO and reaches food records through the
/// food-linked KO sets recorded by the edge builder.
pub enum FoodLookup<'a> {
    ByCompound,
    ByKo {
        food_linked: &'a BTreeMap<String, BTreeSet<String>>,
    },
}

/// Builds the node table for every compound in the universe, in sorted id
/// order.
///
/// Food associations are populated only for compounds with a food-linked
/// origin; for those, `assoc_food` is always present (possibly empty) and
/// `freq` is present only when frequency weighting is on. The frequency sum
/// deduplicates by food name and enforces the 100-percent ceiling.
pub fn build_nodes(
    universe: &BTreeSet<String>,
    origins: &dyn OriginSource,
    foods: &FoodIndex,
    lookup: &FoodLookup<'_>,
    config: &WeightConfig,
) -> Result<Vec<NodeRow>, DietNetError> {
    let mut nodes = Vec::with_capacity(universe.len());

    for compound in universe {
        let origin = origins.origin_of(compound);

        let (assoc_food, freq) = if origin.is_food_linked() {
            let records = match lookup {
                FoodLookup::ByCompound => foods.records_for(compound).iter().collect::<Vec<_>>(),
                FoodLookup::ByKo { food_linked } => food_linked
                    .get(compound)
                    .map(|kos| foods.records_for_any(kos.iter()))
                    .unwrap_or_default(),
            };

            let freq = if config.frequency {
                Some(food_frequency(compound, &records)?)
            } else {
                None
            };
            (Some(unique_foods(&records)), freq)
        } else {
            (None, None)
        };

        nodes.push(NodeRow {
            compound: compound.clone(),
            origin,
            assoc_food,
            freq,
        });
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dietnet_schemas::compound::Origin;
    use dietnet_schemas::file_formats::FoodRecord;

    fn food(id: &str, name: &str, freq: f64) -> FoodRecord {
        FoodRecord {
            kegg_id: id.to_string(),
            name: name.to_string(),
            food_frequency: freq,
        }
    }

    fn origins(pairs: &[(&str, Origin)]) -> BTreeMap<String, Origin> {
        pairs
            .iter()
            .map(|(id, origin)| (id.to_string(), *origin))
            .collect()
    }

    fn universe(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn microbe_nodes_carry_no_food_fields() {
        let origins = origins(&[("C1", Origin::Microbe), ("C2", Origin::Food)]);
        let foods = FoodIndex::new(vec![food("C2", "Apple", 60.0)]);

        let nodes = build_nodes(
            &universe(&["C1", "C2"]),
            &origins,
            &foods,
            &FoodLookup::ByCompound,
            &WeightConfig {
                frequency: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(nodes[0].origin, Origin::Microbe);
        assert_eq!(nodes[0].assoc_food, None);
        assert_eq!(nodes[0].freq, None);

        assert_eq!(nodes[1].origin, Origin::Food);
        assert_eq!(nodes[1].assoc_food, Some(vec!["Apple".to_string()]));
        assert_eq!(nodes[1].freq, Some(60.0));
    }

    #[test]
    fn frequency_disabled_leaves_freq_na() {
        let origins = origins(&[("C1", Origin::Both)]);
        let foods = FoodIndex::new(vec![food("C1", "Apple", 60.0)]);

        let nodes = build_nodes(
            &universe(&["C1"]),
            &origins,
            &foods,
            &FoodLookup::ByCompound,
            &WeightConfig::default(),
        )
        .unwrap();

        assert_eq!(nodes[0].assoc_food, Some(vec!["Apple".to_string()]));
        assert_eq!(nodes[0].freq, None);
    }

    #[test]
    fn frequency_deduplicates_foods_reached_via_multiple_kos() {
        // Genome path: two KOs both point at Apple; the food is counted once.
        let origins = origins(&[("C1", Origin::Both)]);
        let foods = FoodIndex::new(vec![
            food("K1", "Apple", 60.0),
            food("K2", "Apple", 60.0),
            food("K2", "Banana", 40.0),
        ]);
        let mut food_linked = BTreeMap::new();
        food_linked.insert(
            "C1".to_string(),
            ["K1".to_string(), "K2".to_string()].into_iter().collect(),
        );

        let nodes = build_nodes(
            &universe(&["C1"]),
            &origins,
            &foods,
            &FoodLookup::ByKo {
                food_linked: &food_linked,
            },
            &WeightConfig {
                frequency: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            nodes[0].assoc_food,
            Some(vec!["Apple".to_string(), "Banana".to_string()])
        );
        assert_eq!(nodes[0].freq, Some(100.0));
    }

    #[test]
    fn frequency_ceiling_propagates_from_builder() {
        let origins = origins(&[("C1", Origin::Food)]);
        let foods = FoodIndex::new(vec![
            food("C1", "Apple", 60.0),
            food("C1", "Banana", 40.0),
            food("C1", "Cherry", 1.0),
        ]);

        let err = build_nodes(
            &universe(&["C1"]),
            &origins,
            &foods,
            &FoodLookup::ByCompound,
            &WeightConfig {
                frequency: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, DietNetError::FrequencyTooHigh { .. }));
    }

    #[test]
    fn unmapped_compounds_are_none_origin() {
        let origins = origins(&[]);
        let foods = FoodIndex::new(vec![]);
        let nodes = build_nodes(
            &universe(&["C1"]),
            &origins,
            &foods,
            &FoodLookup::ByCompound,
            &WeightConfig::default(),
        )
        .unwrap();
        assert_eq!(nodes[0].origin, Origin::None);
        assert_eq!(nodes[0].assoc_food, None);
    }
}
