use clap::{Command, arg};

use crate::common::output_arg;

pub const ENRICHMENT_CMD: &str = "enrichment";

pub fn create_enrichment_cli() -> Command {
    Command::new(ENRICHMENT_CMD)
        .about("Compare a target population against a background in a sweep table.")
        .arg_required_else_help(true)
        .arg(
            arg!(--input <TSV> "Table with origin, threshold, gene_count and peak_count columns")
                .required(true),
        )
        .arg(
            arg!(--target <LABEL> "Origin of the population of interest")
                .required(false)
                .default_value(integrange_ranges::pipeline::DE_ORIGIN),
        )
        .arg(
            arg!(--background <LABEL> "Origin of the reference population")
                .required(false)
                .default_value(integrange_ranges::pipeline::NOT_DE_ORIGIN),
        )
        .arg(output_arg())
}
