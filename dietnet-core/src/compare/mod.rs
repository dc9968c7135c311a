//! Cross-sample comparison: pattern subsetting, KO extraction, Jaccard
//! similarity, hierarchical clustering, and PERMANOVA with FDR correction.

pub mod cluster;
pub mod kos;
pub mod patterns;
pub mod similarity;
pub mod stats;
