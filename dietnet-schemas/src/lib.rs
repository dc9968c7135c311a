//! Shared record types for the DietNet graph pipelines.
//!
//! Every table that flows between pipeline stages (nodes, edges, food
//! metadata, the comparison manifest) is an explicit record type with a
//! fixed field set; optional fields are real `Option`s rather than a
//! universal NA sentinel.

pub mod compound;
pub mod edge;
pub mod file_formats;
pub mod reaction;
pub mod weights;
