//! The reaction catalog as produced by the external predictor: a JSON object
//! keyed by reaction id, each entry carrying an `EQUATION` (reactant and
//! product compound-id lists) and an `ORTHOLOGY` (KO annotation rows whose
//! first element is the KO id).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reactant/product pair of compound-id lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation(pub Vec<String>, pub Vec<String>);

impl Equation {
    pub fn reactants(&self) -> &[String] {
        &self.0
    }

    pub fn products(&self) -> &[String] {
        &self.1
    }

    /// All compounds touched by the equation, both sides.
    pub fn compounds(&self) -> impl Iterator<Item = &String> {
        self.0.iter().chain(self.1.iter())
    }
}

/// One reaction entry from the catalog JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(rename = "EQUATION")]
    pub equation: Equation,
    #[serde(rename = "ORTHOLOGY")]
    pub orthology: Vec<Vec<String>>,
}

impl Reaction {
    /// The deduplicated, sorted KO set catalyzing this reaction. Each
    /// orthology row holds the KO id in its first position; rows without one
    /// are skipped.
    pub fn kos(&self) -> Vec<String> {
        let mut kos: Vec<String> = self
            .orthology
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect();
        kos.sort();
        kos.dedup();
        kos
    }
}

/// Full catalog, keyed by reaction id. A `BTreeMap` keeps iteration order
/// deterministic so edge tables are reproducible across runs.
pub type ReactionCatalog = BTreeMap<String, Reaction>;
