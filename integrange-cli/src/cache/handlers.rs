use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ArgMatches;

use integrange_cache::client::DatasetCache;
use integrange_cache::dataset::load_recipes;
use integrange_cache::utils::{get_default_cache_folder, print_entries};

use super::cli::{CACHE_FETCH, CACHE_LIST, CACHE_REMOVE, CACHE_SEEK};
use crate::common::required;

/// Execute a `cache` subcommand.
pub fn run_cache(matches: &ArgMatches) -> Result<()> {
    let (subcmd, matches) = matches
        .subcommand()
        .ok_or_else(|| anyhow::anyhow!("A subcommand is required"))?;
    let cache_folder = matches
        .get_one::<String>("cache-folder")
        .map(PathBuf::from)
        .unwrap_or_else(get_default_cache_folder);

    let mut builder = DatasetCache::builder().with_cache_folder(cache_folder);
    if subcmd == CACHE_FETCH {
        let recipes = required(matches, "recipes")?;
        builder = builder.with_recipes(load_recipes(Path::new(recipes))?);
    }
    let cache = builder.finish()?;

    match subcmd {
        CACHE_FETCH => {
            let path = cache.fetch_or_build_dataset(required(matches, "name")?)?;
            println!("{}", path.display());
        }
        CACHE_SEEK => {
            let path = cache.seek(required(matches, "name")?)?;
            println!("{}", path.display());
        }
        CACHE_LIST => {
            let entries = cache.list()?;
            print_entries(&entries);
            println!("Number of datasets: {}", entries.len());
        }
        CACHE_REMOVE => {
            let name = required(matches, "name")?;
            cache.remove(name)?;
            println!("{} removed from cache", name);
        }
        _ => unreachable!("cache subcommand not found"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cli::create_cache_cli;
    use rstest::rstest;

    #[rstest]
    fn test_seek_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().to_str().unwrap();
        let matches = create_cache_cli()
            .try_get_matches_from(["cache", "seek", "-n", "atac_rna", "-f", folder])
            .unwrap();
        assert!(run_cache(&matches).is_err());
    }

    #[rstest]
    fn test_fetch_from_local_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let data = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            format!("file://{}", path.display())
        };
        let features = data("peaks.tsv", "seqnames\tstart\tend\tpeak_id\nchr1\t1\t10\tP1\n");
        let samples = data("samples.tsv", "sample\nS1\n");
        let counts = data("counts.tsv", "S1\n7\n");
        let recipes = dir.path().join("recipes.toml");
        std::fs::write(
            &recipes,
            format!(
                r#"
[[dataset]]
name = "tiny"
genome = {{ build = "GRCh38", style = "ucsc" }}
features = {{ url = "{}", schema = "peak_id:str" }}
samples = {{ url = "{}", schema = "sample:str" }}
counts = {{ url = "{}", schema = "S1:int" }}
"#,
                features, samples, counts
            ),
        )
        .unwrap();

        let folder = dir.path().join("cache");
        let folder = folder.to_str().unwrap();
        let fetch = create_cache_cli()
            .try_get_matches_from([
                "cache",
                "fetch",
                "-n",
                "tiny",
                "-r",
                recipes.to_str().unwrap(),
                "-f",
                folder,
            ])
            .unwrap();
        run_cache(&fetch).unwrap();

        let seek = create_cache_cli()
            .try_get_matches_from(["cache", "seek", "-n", "tiny", "-f", folder])
            .unwrap();
        run_cache(&seek).unwrap();

        let rm = create_cache_cli()
            .try_get_matches_from(["cache", "rm", "-n", "tiny", "-f", folder])
            .unwrap();
        run_cache(&rm).unwrap();
        assert!(run_cache(&seek).is_err());
    }
}
