use anyhow::Result;
use clap::ArgMatches;

use integrange_ranges::{bootstrap_resample, with_origin};

use crate::common::{OUTPUT_ARG, parse_arg, read_store, write_store};

pub fn run_resample(matches: &ArgMatches) -> Result<()> {
    let store = read_store(matches, "input", "schema")?;
    let size: usize = parse_arg(matches, "size")?;
    let replicates: u32 = parse_arg(matches, "replicates")?;
    let seed: u64 = parse_arg(matches, "seed")?;

    let mut result = bootstrap_resample(&store, size, replicates, seed)?;
    if let Some(label) = matches.get_one::<String>("origin") {
        result = with_origin(&result, label)?;
    }

    write_store(&result, matches.get_one::<String>(OUTPUT_ARG))
}
