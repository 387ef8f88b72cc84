use clap::{Arg, ArgAction, Command, arg};

use crate::common::{genome_args, output_arg};

pub const JOIN_CMD: &str = "join";

pub fn create_join_cli() -> Command {
    Command::new(JOIN_CMD)
        .about("Left-join two interval TSVs on overlap; every left row is kept.")
        .arg_required_else_help(true)
        .arg(arg!(--left <TSV> "Left interval TSV").required(true))
        .arg(
            Arg::new("left-schema")
                .long("left-schema")
                .help("Metadata columns of the left TSV, as name:type,..."),
        )
        .arg(arg!(--right <TSV> "Right interval TSV").required(true))
        .arg(
            Arg::new("right-schema")
                .long("right-schema")
                .help("Metadata columns of the right TSV, as name:type,..."),
        )
        .arg(
            arg!(--strand <MODE> "Strand handling: ignore or aware")
                .required(false)
                .default_value("ignore"),
        )
        .arg(
            arg!(--prefix <PREFIX> "Prefix for right columns whose names collide")
                .required(false)
                .default_value(integrange_overlaprs::join::DEFAULT_RIGHT_PREFIX),
        )
        .arg(
            Arg::new("keep-right-ranges")
                .long("keep-right-ranges")
                .action(ArgAction::SetTrue)
                .help("Also emit the coordinates of the matched right interval"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .action(ArgAction::SetTrue)
                .help("Annotate each left interval with its number of overlaps instead of joining"),
        )
        .args(genome_args())
        .arg(output_arg())
}
