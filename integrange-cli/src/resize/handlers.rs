use anyhow::Result;
use clap::ArgMatches;

use integrange_ranges::{Anchor, IntervalResize};

use crate::common::{OUTPUT_ARG, parse_arg, read_store, write_store};

pub fn run_resize(matches: &ArgMatches) -> Result<()> {
    let store = read_store(matches, "input", "schema")?;
    let width: u32 = parse_arg(matches, "width")?;

    let result = if matches.get_flag("tss") {
        store.tss_windows(width)?
    } else {
        let anchor: Anchor = parse_arg(matches, "anchor")?;
        store.anchor_resize(anchor, width)?
    };

    write_store(&result, matches.get_one::<String>(OUTPUT_ARG))
}
