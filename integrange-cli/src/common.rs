use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, arg};
use log::LevelFilter;

use integrange_core::models::{GenomeInfo, IntervalStore, Schema, SeqnameStyle, Table};

pub const GENOME_ARG: &str = "genome";
pub const STYLE_ARG: &str = "style";
pub const OUTPUT_ARG: &str = "output";

pub fn init_logger(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .init();
}

/// `--genome` and `--style`, shared by every command that reads interval TSVs.
pub fn genome_args() -> [Arg; 2] {
    [
        Arg::new(GENOME_ARG)
            .long("genome")
            .default_value("GRCh38")
            .help("Genome build of the inputs"),
        Arg::new(STYLE_ARG)
            .long("style")
            .default_value("ucsc")
            .help("Sequence naming style of the inputs (ucsc or ensembl)"),
    ]
}

pub fn output_arg() -> Arg {
    arg!(--output <OUTPUT> "Output TSV file (default: stdout)").required(false)
}

pub fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| anyhow!("--{} is required", id))
}

/// Parse the value of `id` with [str::parse].
pub fn parse_arg<T>(matches: &ArgMatches, id: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required(matches, id)?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("invalid value {:?} for --{}: {}", raw, id, e))
}

pub fn genome_from(matches: &ArgMatches) -> Result<GenomeInfo> {
    let build = required(matches, GENOME_ARG)?;
    let style: SeqnameStyle = required(matches, STYLE_ARG)?
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    Ok(GenomeInfo::new(build, style))
}

pub fn parse_schema(raw: Option<&String>) -> Result<Schema> {
    match raw {
        Some(raw) => raw
            .parse::<Schema>()
            .with_context(|| format!("Invalid schema {:?}", raw)),
        None => Ok(Schema::empty()),
    }
}

///
/// Read the interval TSV named by `path_arg`, typed by the schema in `schema_arg`.
///
pub fn read_store(matches: &ArgMatches, path_arg: &str, schema_arg: &str) -> Result<IntervalStore> {
    let path = required(matches, path_arg)?;
    let schema = parse_schema(matches.get_one::<String>(schema_arg))?;
    IntervalStore::from_tsv(Path::new(path), genome_from(matches)?, schema)
        .with_context(|| format!("Failed to read intervals from {}", path))
}

pub fn read_table(path: &str, schema: Schema) -> Result<Table> {
    Table::from_tsv(Path::new(path), schema)
        .with_context(|| format!("Failed to read table from {}", path))
}

/// Comma-separated list of column names.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn write_store(store: &IntervalStore, output: Option<&String>) -> Result<()> {
    match output {
        Some(p) => {
            store
                .to_tsv(Path::new(p))
                .with_context(|| format!("Failed to write output to {}", p))?;
            eprintln!("Output written to {}", p);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            store.write_tsv(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

pub fn write_table(table: &Table, output: Option<&String>) -> Result<()> {
    match output {
        Some(p) => {
            table
                .to_tsv(Path::new(p))
                .with_context(|| format!("Failed to write output to {}", p))?;
            eprintln!("Output written to {}", p);
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            table.write_tsv(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
