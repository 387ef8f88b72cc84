use std::env;
use std::io::Read;
use std::path::PathBuf;

use dirs::home_dir;
use flate2::read::MultiGzDecoder;
use tabled::{Table, Tabled};

use super::consts::{DEFAULT_CACHE_FOLDER_NAME, INTEGRANGE_CACHE_ENV};
use super::manifest::ManifestEntry;

#[derive(Tabled)]
pub struct DatasetPrint {
    name: String,
    features: usize,
    samples: usize,
    path: String,
}

/// Get default cache folder from environment variable, if not available then create it in home folder
///
/// # Returns
/// - path to cache folder
pub fn get_default_cache_folder() -> PathBuf {
    if let Ok(val) = env::var(INTEGRANGE_CACHE_ENV) {
        PathBuf::from(val)
    } else {
        let home = env::var("HOME")
            .or_else(|_| {
                home_dir()
                    .map(|p| p.to_string_lossy().into_owned())
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| "/tmp".to_string());

        let mut path = PathBuf::from(home);
        path.push(DEFAULT_CACHE_FOLDER_NAME);
        path
    }
}

/// Bytes of a fetched source, gunzipped when they carry the gzip magic number.
pub fn maybe_gunzip(bytes: Vec<u8>) -> std::io::Result<Vec<u8>> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut out = Vec::new();
        MultiGzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
        Ok(out)
    } else {
        Ok(bytes)
    }
}

pub fn render_entries(entries: &[ManifestEntry]) -> String {
    let rows: Vec<DatasetPrint> = entries
        .iter()
        .map(|e| DatasetPrint {
            name: e.name.clone(),
            features: e.n_features,
            samples: e.n_samples,
            path: e.path.display().to_string(),
        })
        .collect();
    Table::new(rows).to_string()
}

pub fn print_entries(entries: &[ManifestEntry]) {
    println!("{}", render_entries(entries));
}
