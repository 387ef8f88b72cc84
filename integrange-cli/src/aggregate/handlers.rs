use anyhow::{Result, anyhow};
use clap::ArgMatches;

use integrange_ranges::{Summary, group_reduce, group_reduce_ranges};

use crate::common::{OUTPUT_ARG, read_store, required, split_list, write_store, write_table};

pub fn parse_summaries(matches: &ArgMatches) -> Result<Vec<Summary>> {
    matches
        .get_many::<String>("summary")
        .into_iter()
        .flatten()
        .map(|raw| raw.parse::<Summary>().map_err(|e| anyhow!(e)))
        .collect()
}

pub fn run_aggregate(matches: &ArgMatches) -> Result<()> {
    let store = read_store(matches, "input", "schema")?;
    let keys = split_list(required(matches, "by")?);
    let summaries = parse_summaries(matches)?;
    let normalize_by = matches.get_one::<String>("normalize-by").map(String::as_str);
    let output = matches.get_one::<String>(OUTPUT_ARG);

    if matches.get_flag("ranges") {
        let result = group_reduce_ranges(&store, &keys, &summaries, normalize_by)?;
        write_store(&result, output)
    } else {
        let result = group_reduce(&store, &keys, &summaries, normalize_by)?;
        write_table(&result, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::cli::create_aggregate_cli;
    use integrange_ranges::Reducer;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parse_summaries() {
        let matches = create_aggregate_cli()
            .try_get_matches_from([
                "aggregate",
                "--input",
                "joined.tsv",
                "--by",
                "gene_id",
                "-s",
                "peaks=count_non_missing(da_padj)",
                "-s",
                "max_abs(da_log2FC)",
            ])
            .unwrap();
        assert_eq!(
            parse_summaries(&matches).unwrap(),
            vec![
                Reducer::CountNonMissing("da_padj".to_string()).named("peaks"),
                Reducer::MaxAbs("da_log2FC".to_string()).into(),
            ]
        );
    }
}
