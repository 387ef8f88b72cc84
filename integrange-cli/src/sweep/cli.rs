use clap::{Arg, ArgGroup, Command, arg};

use crate::common::{genome_args, output_arg};

pub const SWEEP_CMD: &str = "sweep";

pub fn create_sweep_cli() -> Command {
    Command::new(SWEEP_CMD)
        .about("Count rows passing |value| > threshold across a range of thresholds.")
        .long_about(
            "Count rows passing |value| > threshold across a range of thresholds.\n\n\
             Without --by the input is treated as joined gene/peak rows and the output \
             is the per-origin gene_count/peak_count table used by `enrichment`.",
        )
        .arg_required_else_help(true)
        .arg(arg!(--input <TSV> "Input interval TSV").required(true))
        .arg(arg!(--schema <SCHEMA> "Metadata columns, as name:type,...").required(false))
        .arg(
            arg!(--value <COLUMN> "Numeric column compared against each threshold")
                .required(false)
                .default_value(integrange_ranges::config::DEFAULT_VALUE_COLUMN),
        )
        .arg(arg!(--thresholds <LIST> "Comma-separated thresholds").required(false))
        .arg(arg!(--grid <GRID> "Evenly spaced thresholds as from:to:by").required(false))
        .group(
            ArgGroup::new("cutoffs")
                .args(["thresholds", "grid"])
                .required(true),
        )
        .arg(arg!(--by <KEYS> "Comma-separated grouping columns").required(false))
        .arg(
            Arg::new("normalize-by")
                .long("normalize-by")
                .requires("by")
                .help("Divide counts by the number of distinct values of this column"),
        )
        .args(genome_args())
        .arg(output_arg())
}
