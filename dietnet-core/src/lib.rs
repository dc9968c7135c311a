//! Core engines for the DietNet pipeline.
//!
//! `graph` assembles per-sample node and edge tables from food-compound
//! catalogs, microbial metadata, and enzyme-ortholog reaction catalogs.
//! `compare` reduces those tables to per-pattern KO sets and runs the
//! similarity, clustering, and PERMANOVA stages across samples.

pub mod compare;
pub mod error;
pub mod graph;
pub mod provenance;
pub mod weights;
pub mod writer;
