//! Compound provenance labels and the node-table record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provenance of a compound: produced by food metabolism, microbial
/// metabolism, both, or neither evidence source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Food,
    Microbe,
    Both,
    None,
}

impl Origin {
    /// Whether a compound with this origin carries food associations.
    pub fn is_food_linked(&self) -> bool {
        matches!(self, Origin::Food | Origin::Both)
    }

    /// Whether this origin counts as gut-microbial for reaction filtering.
    pub fn is_microbial(&self) -> bool {
        matches!(self, Origin::Microbe | Origin::Both)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Origin::Food => "food",
            Origin::Microbe => "microbe",
            Origin::Both => "both",
            Origin::None => "none",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Origin::Food),
            "microbe" => Ok(Origin::Microbe),
            "both" => Ok(Origin::Both),
            "none" => Ok(Origin::None),
            other => Err(format!("unrecognized origin label: '{}'", other)),
        }
    }
}

/// Categorical code used by the origin-mapper TSV produced by the external
/// genome predictor. Gene set 1 must be the microbial KOs when the mapper is
/// generated, so `blue` means microbe and `yellow` means food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperColor {
    Blue,
    Green,
    Yellow,
}

impl MapperColor {
    pub fn origin(&self) -> Origin {
        match self {
            MapperColor::Blue => Origin::Microbe,
            MapperColor::Green => Origin::Both,
            MapperColor::Yellow => Origin::Food,
        }
    }
}

impl FromStr for MapperColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(MapperColor::Blue),
            "green" => Ok(MapperColor::Green),
            "yellow" => Ok(MapperColor::Yellow),
            other => Err(format!("unrecognized mapper color: '{}'", other)),
        }
    }
}

/// One row of the node table: a compound, its origin, and its food
/// associations. `assoc_food` and `freq` are populated only for compounds
/// whose origin is food-linked; `freq` additionally requires frequency
/// weighting to be enabled for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub compound: String,
    pub origin: Origin,
    pub assoc_food: Option<Vec<String>>,
    pub freq: Option<f64>,
}
