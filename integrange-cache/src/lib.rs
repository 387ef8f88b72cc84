//! # Dataset cache for integrange
//!
//! Builds a combined dataset from three remote tab-delimited files the first
//! time it is requested and serves it from disk afterwards.
//!
//! ```rust,no_run
//! use integrange_cache::client::DatasetCache;
//! use integrange_cache::dataset::load_recipes;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cache = DatasetCache::builder()
//!     .with_recipes(load_recipes(Path::new("recipes.toml"))?)
//!     .finish()?;
//! let path = cache.fetch_or_build_dataset("atac_rna")?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod consts;
pub mod dataset;
pub mod fetch;
pub mod manifest;
pub mod utils;

pub use client::{DatasetCache, DatasetCacheBuilder};
pub use dataset::{CombinedDataset, DatasetRecipe, DataSource};
pub use fetch::{Fetcher, HttpFetcher};
