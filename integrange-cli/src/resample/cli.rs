use clap::{Command, arg};

use crate::common::{genome_args, output_arg};

pub const RESAMPLE_CMD: &str = "resample";

pub fn create_resample_cli() -> Command {
    Command::new(RESAMPLE_CMD)
        .about("Draw seeded bootstrap replicates of an interval TSV, tagged by replicate.")
        .arg_required_else_help(true)
        .arg(arg!(--input <TSV> "Input interval TSV").required(true))
        .arg(arg!(--schema <SCHEMA> "Metadata columns, as name:type,...").required(false))
        .arg(arg!(--size <SIZE> "Intervals per replicate").required(true))
        .arg(
            arg!(--replicates <N> "Number of replicates")
                .required(false)
                .default_value("100"),
        )
        .arg(
            arg!(--seed <SEED> "Random seed")
                .required(false)
                .default_value("0"),
        )
        .arg(arg!(--origin <LABEL> "Also add an origin column with this label").required(false))
        .args(genome_args())
        .arg(output_arg())
}
