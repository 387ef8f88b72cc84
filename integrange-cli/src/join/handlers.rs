use anyhow::Result;
use clap::ArgMatches;
use log::info;

use integrange_core::models::{Column, ColumnType, Value};
use integrange_overlaprs::{JoinOptions, StrandMode, count_overlaps, left_join_overlap};

use crate::common::{OUTPUT_ARG, parse_arg, read_store, write_store};

pub const OVERLAP_COUNT_COLUMN: &str = "n_overlaps";

pub fn run_join(matches: &ArgMatches) -> Result<()> {
    let left = read_store(matches, "left", "left-schema")?;
    let right = read_store(matches, "right", "right-schema")?;

    let strand_mode: StrandMode = parse_arg(matches, "strand")?;
    let prefix: String = parse_arg(matches, "prefix")?;
    let options = JoinOptions::default()
        .with_strand_mode(strand_mode)
        .with_prefix(&prefix)
        .with_right_ranges(matches.get_flag("keep-right-ranges"));

    let result = if matches.get_flag("count") {
        let counts = count_overlaps(&left, &right, &options)?;
        left.with_column(
            Column::new(OVERLAP_COUNT_COLUMN, ColumnType::Int),
            counts
                .into_iter()
                .map(|n| Some(Value::Int(n as i64)))
                .collect(),
        )?
    } else {
        left_join_overlap(&left, &right, &options)?
    };
    info!("Joined {} left rows into {} rows", left.len(), result.len());

    write_store(&result, matches.get_one::<String>(OUTPUT_ARG))
}
