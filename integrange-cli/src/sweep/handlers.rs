use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use integrange_ranges::sweep::threshold_grid;
use integrange_ranges::{sweep_thresholds, threshold_table};

use crate::common::{OUTPUT_ARG, read_store, required, split_list, write_table};

/// Thresholds from `--thresholds a,b,c` or `--grid from:to:by`.
pub fn parse_thresholds(matches: &ArgMatches) -> Result<Vec<f64>> {
    if let Some(raw) = matches.get_one::<String>("thresholds") {
        return split_list(raw)
            .into_iter()
            .map(|t| {
                t.parse::<f64>()
                    .with_context(|| format!("invalid threshold {:?}", t))
            })
            .collect();
    }
    let raw = required(matches, "grid")?;
    let parts = raw
        .split(':')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid grid {:?}", raw))
        })
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        [from, to, by] if *by > 0.0 && to >= from => Ok(threshold_grid(*from, *to, *by)),
        _ => bail!("--grid must be from:to:by with by > 0 and to >= from, got {:?}", raw),
    }
}

pub fn run_sweep(matches: &ArgMatches) -> Result<()> {
    let store = read_store(matches, "input", "schema")?;
    let value_col = required(matches, "value")?;
    let thresholds = parse_thresholds(matches)?;

    let result = match matches.get_one::<String>("by") {
        Some(by) => sweep_thresholds(
            &store,
            &split_list(by),
            value_col,
            &thresholds,
            matches.get_one::<String>("normalize-by").map(String::as_str),
        )?,
        None => threshold_table(&store, value_col, &thresholds)?,
    };

    write_table(&result, matches.get_one::<String>(OUTPUT_ARG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::cli::create_sweep_cli;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["sweep", "--input", "joined.tsv"];
        argv.extend_from_slice(args);
        create_sweep_cli().try_get_matches_from(argv).unwrap()
    }

    #[rstest]
    #[case(&["--thresholds", "0,0.5,2"], vec![0.0, 0.5, 2.0])]
    #[case(&["--grid", "0:1:0.5"], vec![0.0, 0.5, 1.0])]
    fn test_parse_thresholds(#[case] args: &[&str], #[case] expected: Vec<f64>) {
        assert_eq!(parse_thresholds(&matches(args)).unwrap(), expected);
    }

    #[rstest]
    #[case(&["--thresholds", "0,high"])]
    #[case(&["--grid", "0:1"])]
    #[case(&["--grid", "1:0:0.5"])]
    fn test_parse_thresholds_invalid(#[case] args: &[&str]) {
        assert!(parse_thresholds(&matches(args)).is_err());
    }

    #[rstest]
    fn test_cutoffs_required() {
        let result = create_sweep_cli().try_get_matches_from(["sweep", "--input", "joined.tsv"]);
        assert!(result.is_err());
    }
}
