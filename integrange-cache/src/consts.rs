//! Constants for the dataset cache: environment variables, folder layout
//! and file names.

/// Environment variable name for setting the cache directory location.
///
/// When set, this overrides the default cache location (`~/.integrange/`).
///
/// # Example
///
/// ```bash
/// export INTEGRANGE_CACHE=/custom/cache/path
/// ```
pub const INTEGRANGE_CACHE_ENV: &str = "INTEGRANGE_CACHE";

/// Folder created in the home directory when no cache folder is configured.
pub const DEFAULT_CACHE_FOLDER_NAME: &str = ".integrange/";

/// Combined datasets live in `<cache_folder>/datasets/`.
pub const DEFAULT_DATASET_SUBFOLDER: &str = "datasets";

pub const DEFAULT_DATASET_EXT: &str = ".bin";

/// Suffix of a dataset that is still being written.
pub const PARTIAL_EXT: &str = ".part";

/// JSON file at the cache root listing every materialized dataset.
pub const MANIFEST_FILE: &str = "manifest.json";
