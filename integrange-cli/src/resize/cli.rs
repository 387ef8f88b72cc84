use clap::{Arg, ArgAction, Command, arg};

use crate::common::{genome_args, output_arg};

pub const RESIZE_CMD: &str = "resize";

pub fn create_resize_cli() -> Command {
    Command::new(RESIZE_CMD)
        .about("Resize intervals to a fixed width around an anchor.")
        .arg_required_else_help(true)
        .arg(arg!(--input <TSV> "Input interval TSV").required(true))
        .arg(arg!(--schema <SCHEMA> "Metadata columns, as name:type,...").required(false))
        .arg(arg!(--width <WIDTH> "Width of every output interval").required(true))
        .arg(
            arg!(--anchor <ANCHOR> "Fixed point: start, end or center")
                .required(false)
                .default_value("center"),
        )
        .arg(
            Arg::new("tss")
                .long("tss")
                .action(ArgAction::SetTrue)
                .conflicts_with("anchor")
                .help("Center the windows on each interval's TSS"),
        )
        .args(genome_args())
        .arg(output_arg())
}
