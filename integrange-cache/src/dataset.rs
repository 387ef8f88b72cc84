//! Recipes describing a combined dataset, and the dataset itself.

use std::fs::read_to_string;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use integrange_core::models::{GenomeInfo, IntervalStore, Schema, Table};

/// One remote tab-delimited file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DataSource {
    pub url: String,
    /// Columns to read, as `name:type,...`
    pub schema: String,
}

impl DataSource {
    pub fn schema(&self) -> Result<Schema> {
        self.schema
            .parse::<Schema>()
            .with_context(|| format!("Invalid schema for {}", self.url))
    }
}

///
/// How to build a named dataset: feature ranges, a sample sheet and a
/// feature-by-sample count matrix whose rows follow the feature order.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatasetRecipe {
    pub name: String,
    pub genome: GenomeInfo,
    pub features: DataSource,
    pub samples: DataSource,
    pub counts: DataSource,
}

impl DatasetRecipe {
    pub fn sources(&self) -> [&DataSource; 3] {
        [&self.features, &self.samples, &self.counts]
    }
}

#[derive(Deserialize, Serialize, Debug, Default)]
struct RecipeFile {
    #[serde(default)]
    dataset: Vec<DatasetRecipe>,
}

///
/// Read every `[[dataset]]` entry of a TOML recipe file.
///
/// ```toml
/// [[dataset]]
/// name = "atac_rna"
/// genome = { build = "GRCh38", style = "ucsc" }
/// features = { url = "https://example.org/peaks.tsv.gz", schema = "peak_id:str" }
/// samples = { url = "https://example.org/samples.tsv", schema = "sample:str,condition:cat" }
/// counts = { url = "https://example.org/counts.tsv.gz", schema = "S1:int,S2:int" }
/// ```
pub fn load_recipes(path: &Path) -> Result<Vec<DatasetRecipe>> {
    let toml_str = read_to_string(path)
        .with_context(|| format!("Failed to read recipe file {}", path.display()))?;
    let file: RecipeFile = toml::from_str(&toml_str)
        .with_context(|| format!("Failed to parse recipe file {}", path.display()))?;
    Ok(file.dataset)
}

///
/// The three sources of a recipe, parsed and checked against each other.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CombinedDataset {
    pub name: String,
    pub features: IntervalStore,
    pub samples: Table,
    pub counts: Table,
}

impl CombinedDataset {
    ///
    /// Parse fetched bytes into a dataset.
    ///
    /// # Arguments:
    /// - recipe: the recipe the bytes were fetched for
    /// - features, samples, counts: decompressed file contents, in recipe order
    pub fn from_sources(
        recipe: &DatasetRecipe,
        features: &[u8],
        samples: &[u8],
        counts: &[u8],
    ) -> Result<Self> {
        let features = IntervalStore::from_reader(
            Cursor::new(features),
            recipe.genome.clone(),
            recipe.features.schema()?,
        )
        .with_context(|| format!("Failed to parse features from {}", recipe.features.url))?;
        let samples = Table::from_reader(Cursor::new(samples), recipe.samples.schema()?)
            .with_context(|| format!("Failed to parse samples from {}", recipe.samples.url))?;
        let counts = Table::from_reader(Cursor::new(counts), recipe.counts.schema()?)
            .with_context(|| format!("Failed to parse counts from {}", recipe.counts.url))?;

        if counts.len() != features.len() {
            bail!(
                "{} has {} count rows for {} features",
                recipe.name,
                counts.len(),
                features.len()
            );
        }

        Ok(CombinedDataset {
            name: recipe.name.clone(),
            features,
            samples,
            counts,
        })
    }
}
