use anyhow::Result;
use clap::ArgMatches;

use integrange_core::models::{Column, ColumnType, Schema};
use integrange_ranges::enrichment;
use integrange_ranges::resample::ORIGIN_COLUMN;
use integrange_ranges::sweep::{GENE_COUNT_COLUMN, PEAK_COUNT_COLUMN, THRESHOLD_COLUMN};

use crate::common::{OUTPUT_ARG, read_table, required, write_table};

/// Columns read from a sweep table.
pub fn sweep_schema() -> Result<Schema> {
    Ok(Schema::new(vec![
        Column::new(ORIGIN_COLUMN, ColumnType::Categorical),
        Column::new(THRESHOLD_COLUMN, ColumnType::Float),
        Column::new(GENE_COUNT_COLUMN, ColumnType::Float),
        Column::new(PEAK_COUNT_COLUMN, ColumnType::Float),
    ])?)
}

pub fn run_enrichment(matches: &ArgMatches) -> Result<()> {
    let table = read_table(required(matches, "input")?, sweep_schema()?)?;
    let result = enrichment(
        &table,
        required(matches, "target")?,
        required(matches, "background")?,
    )?;
    write_table(&result, matches.get_one::<String>(OUTPUT_ARG))
}
