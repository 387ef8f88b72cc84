mod aggregate;
mod cache;
mod common;
mod enrichment;
mod join;
mod pipeline;
mod resample;
mod resize;
mod sweep;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "integrange";
    pub const BIN_NAME: &str = "integrange";
    pub const VERBOSE_ARG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Integrate differential expression and differential accessibility results by genomic overlap.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::VERBOSE_ARG)
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging (-v info, -vv debug)"),
        )
        .subcommand(join::cli::create_join_cli())
        .subcommand(resize::cli::create_resize_cli())
        .subcommand(resample::cli::create_resample_cli())
        .subcommand(aggregate::cli::create_aggregate_cli())
        .subcommand(sweep::cli::create_sweep_cli())
        .subcommand(enrichment::cli::create_enrichment_cli())
        .subcommand(pipeline::cli::create_pipeline_cli())
        .subcommand(cache::cli::create_cache_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    common::init_logger(matches.get_count(consts::VERBOSE_ARG));

    match matches.subcommand() {
        //
        // OVERLAP JOIN
        //
        Some((join::cli::JOIN_CMD, matches)) => {
            join::handlers::run_join(matches)?;
        }

        //
        // RANGE TRANSFORMS
        //
        Some((resize::cli::RESIZE_CMD, matches)) => {
            resize::handlers::run_resize(matches)?;
        }
        Some((resample::cli::RESAMPLE_CMD, matches)) => {
            resample::handlers::run_resample(matches)?;
        }

        //
        // SUMMARIES
        //
        Some((aggregate::cli::AGGREGATE_CMD, matches)) => {
            aggregate::handlers::run_aggregate(matches)?;
        }
        Some((sweep::cli::SWEEP_CMD, matches)) => {
            sweep::handlers::run_sweep(matches)?;
        }
        Some((enrichment::cli::ENRICHMENT_CMD, matches)) => {
            enrichment::handlers::run_enrichment(matches)?;
        }

        //
        // WORKFLOW
        //
        Some((pipeline::cli::PIPELINE_CMD, matches)) => {
            pipeline::handlers::run_pipeline(matches)?;
        }

        //
        // DATASET CACHE
        //
        Some((cache::cli::CACHE_CMD, matches)) => {
            cache::handlers::run_cache(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
