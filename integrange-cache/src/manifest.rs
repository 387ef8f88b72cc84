use std::fs::{File, read_to_string, remove_file, rename};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::consts::PARTIAL_EXT;

/// One materialized dataset.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub name: String,
    pub path: PathBuf,
    /// URLs the dataset was built from
    pub sources: Vec<String>,
    pub n_features: usize,
    pub n_samples: usize,
}

/// JSON index of the datasets held in a cache folder.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    pub datasets: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read the manifest at `path`; a missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Manifest::default());
        }
        let json = read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomically(path, |writer| Ok(serde_json::to_writer_pretty(writer, self)?))
    }

    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.datasets.iter().find(|e| e.name == name)
    }

    /// Insert `entry`, replacing any entry with the same name.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        self.datasets.retain(|e| e.name != entry.name);
        self.datasets.push(entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<ManifestEntry> {
        let idx = self.datasets.iter().position(|e| e.name == name)?;
        Some(self.datasets.remove(idx))
    }
}

/// `path` with [PARTIAL_EXT] appended.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(PARTIAL_EXT);
    PathBuf::from(raw)
}

///
/// Write `path` through a sibling [partial_path] file that is renamed into
/// place once `write` succeeds. On failure the partial file is removed and
/// `path` is left untouched.
///
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let partial = partial_path(path);
    let result = File::create(&partial)
        .map_err(anyhow::Error::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|_| Ok(rename(&partial, path)?));
    if result.is_err() && partial.exists() {
        let _ = remove_file(&partial);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(name: &str, n_features: usize) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            path: PathBuf::from(format!("/cache/datasets/{}.bin", name)),
            sources: vec!["https://example.org/a.tsv".to_string()],
            n_features,
            n_samples: 2,
        }
    }

    #[rstest]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        assert_eq!(Manifest::load(&path).unwrap(), Manifest::default());

        let mut manifest = Manifest::default();
        manifest.upsert(entry("a", 1));
        manifest.upsert(entry("b", 2));
        manifest.upsert(entry("a", 5));
        manifest.save(&path).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.datasets.len(), 2);
        assert_eq!(loaded.get("a").unwrap().n_features, 5);
        assert!(!partial_path(&path).exists());
    }

    #[rstest]
    fn test_remove() {
        let mut manifest = Manifest::default();
        manifest.upsert(entry("a", 1));
        assert!(manifest.remove("b").is_none());
        assert_eq!(manifest.remove("a"), Some(entry("a", 1)));
        assert!(manifest.datasets.is_empty());
    }

    #[rstest]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.bin");

        let result = write_atomically(&path, |writer| {
            writer.write_all(b"half a dataset")?;
            anyhow::bail!("serializer gave up")
        });
        assert!(result.is_err());
        assert!(!partial_path(&path).exists());
        assert!(!path.exists());

        write_atomically(&path, |writer| Ok(writer.write_all(b"ok")?)).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ok");
        assert!(!partial_path(&path).exists());
    }

    #[rstest]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/c/datasets/x.bin")),
            PathBuf::from("/c/datasets/x.bin.part")
        );
    }
}
