//! Range transforms and population statistics for integrange stores.
//!
//! - [resize]: anchored resizing and TSS windows
//! - [resample]: seeded bootstrap populations
//! - [aggregate]: grouped reductions into tables or stores
//! - [sweep] and [enrichment]: threshold sweeps and population ratios
//! - [pipeline]: the DE/DA integration workflow driven by a TOML [config]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use integrange_ranges::config::PipelineConfig;
//! use integrange_ranges::pipeline::run_pipeline;
//!
//! let config = PipelineConfig::try_from(Path::new("pipeline.toml")).unwrap();
//! let outputs = run_pipeline(&config).unwrap();
//! println!("{} genes summarized", outputs.per_gene.len());
//! ```
pub mod aggregate;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod pipeline;
pub mod resample;
pub mod resize;
pub mod sweep;

// re-exports
pub use aggregate::{Predicate, Reducer, Summary, group_reduce, group_reduce_ranges};
pub use enrichment::{Ratio, enrichment, enrichment_ratio};
pub use resample::{bootstrap_resample, tag_original, with_origin};
pub use resize::{Anchor, IntervalResize, anchor_resize, trimmed_tss_windows, tss_windows};
pub use sweep::{sweep_thresholds, threshold_table};
