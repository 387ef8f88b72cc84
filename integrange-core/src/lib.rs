//! # Core data model for integrange
//!
//! Typed, immutable collections of genomic intervals ([models::IntervalStore])
//! carrying a reference genome identity and a metadata schema, plus plain
//! metadata [models::Table]s produced by aggregation.
//!
//! ```rust
//! use integrange_core::models::{GenomeInfo, IntervalStore, Schema, SeqnameStyle};
//!
//! let genome = GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc);
//! let store = IntervalStore::empty(genome, Schema::empty()).unwrap();
//! assert!(store.is_empty());
//! ```
pub mod errors;
pub mod models;
pub mod utils;
