use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use integrange_ranges::config::PipelineConfig;
use integrange_ranges::pipeline::{self, ENRICHMENT_FILE};
use integrange_ranges::Ratio;

use crate::common::required;

pub fn run_pipeline(matches: &ArgMatches) -> Result<()> {
    let path = required(matches, "config")?;
    let config = PipelineConfig::try_from(Path::new(path))
        .with_context(|| format!("Failed to load pipeline config {}", path))?;

    let outputs = pipeline::run_pipeline(&config)?;

    let n_undefined = outputs
        .enrichment
        .rows()
        .iter()
        .flat_map(|row| row.iter().skip(1))
        .filter(|v| v.as_ref().and_then(|v| v.as_f64()).is_some_and(f64::is_nan))
        .count();
    if n_undefined > 0 {
        eprintln!(
            "{} enrichment values are {} (zero over zero)",
            n_undefined,
            Ratio::Undefined
        );
    }
    eprintln!(
        "Results written to {}",
        config.output_dir.join(ENRICHMENT_FILE).display()
    );
    Ok(())
}
