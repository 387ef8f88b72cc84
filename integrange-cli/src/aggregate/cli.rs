use clap::{Arg, ArgAction, Command, arg};

use crate::common::{genome_args, output_arg};

pub const AGGREGATE_CMD: &str = "aggregate";

pub fn create_aggregate_cli() -> Command {
    Command::new(AGGREGATE_CMD)
        .about("Group rows by key columns and summarize each group.")
        .arg_required_else_help(true)
        .arg(arg!(--input <TSV> "Input interval TSV").required(true))
        .arg(arg!(--schema <SCHEMA> "Metadata columns, as name:type,...").required(false))
        .arg(arg!(--by <KEYS> "Comma-separated grouping columns").required(true))
        .arg(
            Arg::new("summary")
                .long("summary")
                .short('s')
                .action(ArgAction::Append)
                .required(true)
                .help("Summary as [name=]reducer(column), e.g. peaks=count_non_missing(da_padj)"),
        )
        .arg(
            Arg::new("normalize-by")
                .long("normalize-by")
                .help("Divide counts by the number of distinct values of this column"),
        )
        .arg(
            Arg::new("ranges")
                .long("ranges")
                .action(ArgAction::SetTrue)
                .help("Keep the output as intervals; --by must include seqnames, start and end"),
        )
        .args(genome_args())
        .arg(output_arg())
}
