//! Dataset cache client.
//!
//! This module provides the [`DatasetCache`] type and its builder. A cache
//! holds named recipes; asking for a dataset downloads its three sources
//! once, combines them and keeps the result on disk for later calls.

use std::collections::HashMap;
use std::fs::{File, create_dir_all, remove_file};
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};

use super::consts::{DEFAULT_DATASET_EXT, DEFAULT_DATASET_SUBFOLDER, MANIFEST_FILE};
use super::dataset::{CombinedDataset, DatasetRecipe};
use super::fetch::{Fetcher, HttpFetcher};
use super::manifest::{Manifest, ManifestEntry, write_atomically};
use super::utils::{get_default_cache_folder, maybe_gunzip};

/// Builder for constructing a [`DatasetCache`] with custom configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use integrange_cache::client::DatasetCache;
/// use std::path::PathBuf;
///
/// # fn main() -> anyhow::Result<()> {
/// let cache = DatasetCache::builder()
///     .with_cache_folder(PathBuf::from("/custom/cache"))
///     .finish()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DatasetCacheBuilder {
    cache_folder: Option<PathBuf>,
    fetcher: Option<Box<dyn Fetcher>>,
    recipes: Vec<DatasetRecipe>,
}

impl DatasetCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_folder(mut self, path: PathBuf) -> Self {
        self.cache_folder = Some(path);
        self
    }

    /// Replace the default [`HttpFetcher`].
    pub fn with_fetcher<F: Fetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn with_recipe(mut self, recipe: DatasetRecipe) -> Self {
        self.recipes.push(recipe);
        self
    }

    pub fn with_recipes<I: IntoIterator<Item = DatasetRecipe>>(mut self, recipes: I) -> Self {
        self.recipes.extend(recipes);
        self
    }

    /// Consumes the builder and creates the cache folders.
    pub fn finish(self) -> Result<DatasetCache> {
        let raw_path_to_cache_folder = self.cache_folder.unwrap_or_else(get_default_cache_folder);
        let raw_str_to_cache_folder = raw_path_to_cache_folder.to_string_lossy().into_owned();
        let expanded_str = shellexpand::full(&raw_str_to_cache_folder)
            .unwrap_or_else(|_| raw_str_to_cache_folder.clone().into())
            .into_owned();
        let cache_folder = PathBuf::from(expanded_str);

        let dataset_folder = cache_folder.join(DEFAULT_DATASET_SUBFOLDER);
        create_dir_all(&dataset_folder).with_context(|| {
            format!("Failed to create cache folder {}", dataset_folder.display())
        })?;

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Box::new(HttpFetcher::new()?),
        };
        let recipes = self
            .recipes
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();

        Ok(DatasetCache {
            cache_folder,
            dataset_folder,
            fetcher,
            recipes,
        })
    }
}

/// Download-once cache of combined datasets.
///
/// Layout of the cache folder:
/// - `datasets/<name>.bin`: a bincode-serialized [`CombinedDataset`]
/// - `manifest.json`: one [`ManifestEntry`] per dataset
///
/// # Examples
///
/// ```rust,no_run
/// use integrange_cache::client::DatasetCache;
/// use integrange_cache::dataset::load_recipes;
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let cache = DatasetCache::builder()
///     .with_recipes(load_recipes(Path::new("recipes.toml"))?)
///     .finish()?;
///
/// // downloads on the first call only
/// let path = cache.fetch_or_build_dataset("atac_rna")?;
/// let dataset = cache.load_dataset("atac_rna")?;
/// assert_eq!(path, cache.seek("atac_rna")?);
/// # Ok(())
/// # }
/// ```
pub struct DatasetCache {
    /// Path to the root cache directory
    pub cache_folder: PathBuf,
    dataset_folder: PathBuf,
    fetcher: Box<dyn Fetcher>,
    recipes: HashMap<String, DatasetRecipe>,
}

impl DatasetCache {
    pub fn builder() -> DatasetCacheBuilder {
        DatasetCacheBuilder::default()
    }

    pub fn recipe(&self, name: &str) -> Option<&DatasetRecipe> {
        self.recipes.get(name)
    }

    fn manifest_path(&self) -> PathBuf {
        self.cache_folder.join(MANIFEST_FILE)
    }

    fn dataset_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            bail!("Invalid dataset name: {:?}", name);
        }
        Ok(self
            .dataset_folder
            .join(format!("{}{}", name, DEFAULT_DATASET_EXT)))
    }

    ///
    /// Path of the materialized dataset `name`, building it first if needed.
    ///
    /// On the first call the three recipe sources are fetched, parsed,
    /// combined and written to `datasets/<name>.bin`. Later calls only
    /// return the path. Fetch errors are returned unchanged and leave
    /// nothing behind in the cache.
    pub fn fetch_or_build_dataset(&self, name: &str) -> Result<PathBuf> {
        let path = self.dataset_path(name)?;
        if path.exists() {
            info!("Using cached dataset {} at {}", name, path.display());
            return Ok(path);
        }

        let recipe = self
            .recipe(name)
            .ok_or_else(|| anyhow!("No recipe for dataset {}", name))?;

        let mut raw = Vec::with_capacity(3);
        for source in recipe.sources() {
            info!("Downloading {}", source.url);
            let bytes = self.fetcher.fetch(&source.url)?;
            raw.push(maybe_gunzip(bytes)?);
        }
        let dataset = CombinedDataset::from_sources(recipe, &raw[0], &raw[1], &raw[2])?;
        debug!(
            "Combined {} features, {} samples into {}",
            dataset.features.len(),
            dataset.samples.len(),
            name
        );

        write_atomically(&path, |writer| {
            bincode::serialize_into(writer, &dataset)
                .with_context(|| format!("Failed to serialize dataset {}", name))
        })?;

        let manifest_path = self.manifest_path();
        let mut manifest = Manifest::load(&manifest_path)?;
        manifest.upsert(ManifestEntry {
            name: name.to_string(),
            path: path.clone(),
            sources: recipe.sources().iter().map(|s| s.url.clone()).collect(),
            n_features: dataset.features.len(),
            n_samples: dataset.samples.len(),
        });
        manifest.save(&manifest_path)?;

        info!("Cached dataset {} to {}", name, path.display());
        Ok(path)
    }

    /// Load the dataset `name`, building it first if needed.
    pub fn load_dataset(&self, name: &str) -> Result<CombinedDataset> {
        let path = self.fetch_or_build_dataset(name)?;
        let reader = BufReader::new(File::open(&path)?);
        let dataset = bincode::deserialize_from(reader)
            .with_context(|| format!("Failed to read cached dataset {}", path.display()))?;
        Ok(dataset)
    }

    /// Path of a dataset that is already cached.
    pub fn seek(&self, name: &str) -> Result<PathBuf> {
        let path = self.dataset_path(name)?;
        if path.exists() {
            Ok(path)
        } else {
            Err(anyhow!("{} does not exist in cache", name))
        }
    }

    /// Every dataset recorded in the manifest.
    pub fn list(&self) -> Result<Vec<ManifestEntry>> {
        Ok(Manifest::load(&self.manifest_path())?.datasets)
    }

    /// Delete the cached dataset `name` and its manifest entry.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.dataset_path(name)?;
        let manifest_path = self.manifest_path();
        let mut manifest = Manifest::load(&manifest_path)?;
        let entry = manifest.remove(name);

        if !path.exists() && entry.is_none() {
            bail!("{} does not exist in cache", name);
        }
        if path.exists() {
            remove_file(&path)?;
        }
        manifest.save(&manifest_path)?;
        info!("Removed dataset {} from cache", name);
        Ok(())
    }
}
