use fxhash::FxHashSet;
use integrange_core::models::{Column, ColumnType, Schema, Table, Value};
use log::debug;

use crate::aggregate::{GroupSource, Grouping, count_value};
use crate::errors::RangesResult;
use crate::resample::{ORIGIN_COLUMN, RESAMPLE_COLUMN};

pub const THRESHOLD_COLUMN: &str = "threshold";
pub const COUNT_COLUMN: &str = "count";
pub const GENE_ID_COLUMN: &str = "gene_id";
pub const GENE_COUNT_COLUMN: &str = "gene_count";
pub const PEAK_COUNT_COLUMN: &str = "peak_count";

/// Present values of `col` in group `g` whose absolute value exceeds `threshold`.
fn rows_above<'g>(
    grouping: &'g Grouping,
    g: usize,
    col: usize,
    threshold: f64,
) -> impl Iterator<Item = usize> + 'g {
    grouping.groups[g].iter().copied().filter(move |&r| {
        grouping.table.rows()[r][col]
            .as_ref()
            .and_then(Value::as_f64)
            .is_some_and(|v| v.abs() > threshold)
    })
}

///
/// Count, for every group and every threshold, the rows whose `value_col`
/// exceeds the threshold in absolute value.
///
/// The result is long form: the key columns, `threshold`, then `count`.
/// Rows are ordered by group (first appearance) then by threshold in the
/// order given. Counts never increase as the threshold grows.
///
/// # Arguments:
/// - source: rows to count
/// - keys: grouping columns
/// - value_col: numeric column compared against each threshold
/// - thresholds: cut-offs, compared strictly
/// - normalize_by: column whose distinct values divide the counts
pub fn sweep_thresholds<S: GroupSource + ?Sized>(
    source: &S,
    keys: &[&str],
    value_col: &str,
    thresholds: &[f64],
    normalize_by: Option<&str>,
) -> RangesResult<Table> {
    let grouping = Grouping::new(source, keys)?;
    let col = grouping.numeric_column(value_col)?;
    let tag_idx = normalize_by
        .map(|tag| grouping.table.schema().require(tag))
        .transpose()?;

    let mut columns = grouping.key_columns();
    columns.push(Column::new(THRESHOLD_COLUMN, ColumnType::Float));
    columns.push(Column::new(
        COUNT_COLUMN,
        if tag_idx.is_some() {
            ColumnType::Float
        } else {
            ColumnType::Int
        },
    ));
    let schema = Schema::new(columns)?;

    let mut rows = Vec::with_capacity(grouping.groups.len() * thresholds.len());
    for g in 0..grouping.groups.len() {
        let denominator = tag_idx.map(|t| grouping.denominator(g, t));
        let keys = grouping.key_values(g);
        for &t in thresholds {
            let n = rows_above(&grouping, g, col, t).count();
            let mut row = keys.clone();
            row.push(Some(Value::Float(t)));
            row.push(Some(count_value(n, denominator)));
            rows.push(row);
        }
    }
    debug!(
        "Swept {} thresholds over {} groups",
        thresholds.len(),
        grouping.groups.len()
    );

    Ok(Table::new(schema, rows)?)
}

///
/// Per-population gene and peak counts across thresholds.
///
/// `joined` holds one row per gene/peak pair with `origin`, `resample` and
/// `gene_id` columns. For each origin and threshold `t`:
/// - `peak_count` is the number of rows with `|value_col| > t`,
/// - `gene_count` is the number of distinct `(resample, gene_id)` pairs with
///   at least one such row,
///
/// both divided by the number of distinct resample tags of that origin.
pub fn threshold_table<S: GroupSource + ?Sized>(
    joined: &S,
    value_col: &str,
    thresholds: &[f64],
) -> RangesResult<Table> {
    let grouping = Grouping::new(joined, &[ORIGIN_COLUMN])?;
    let col = grouping.numeric_column(value_col)?;
    let schema = grouping.table.schema();
    let tag_idx = schema.require(RESAMPLE_COLUMN)?;
    let gene_idx = schema.require(GENE_ID_COLUMN)?;

    let out_schema = Schema::new(vec![
        Column::new(ORIGIN_COLUMN, ColumnType::Categorical),
        Column::new(THRESHOLD_COLUMN, ColumnType::Float),
        Column::new(GENE_COUNT_COLUMN, ColumnType::Float),
        Column::new(PEAK_COUNT_COLUMN, ColumnType::Float),
    ])?;

    let mut rows = Vec::with_capacity(grouping.groups.len() * thresholds.len());
    for g in 0..grouping.groups.len() {
        let denominator = Some(grouping.denominator(g, tag_idx));
        let origin = grouping.key_values(g).remove(0);
        for &t in thresholds {
            let mut peaks = 0usize;
            let mut genes: FxHashSet<(Option<&Value>, Option<&Value>)> = FxHashSet::default();
            for r in rows_above(&grouping, g, col, t) {
                let row = &grouping.table.rows()[r];
                peaks += 1;
                genes.insert((row[tag_idx].as_ref(), row[gene_idx].as_ref()));
            }
            rows.push(vec![
                origin.clone(),
                Some(Value::Float(t)),
                Some(count_value(genes.len(), denominator)),
                Some(count_value(peaks, denominator)),
            ]);
        }
    }

    Ok(Table::new(out_schema, rows)?)
}

/// Evenly spaced thresholds from `from` to `to` inclusive.
pub fn threshold_grid(from: f64, to: f64, by: f64) -> Vec<f64> {
    if by <= 0.0 || to < from {
        return vec![from];
    }
    let steps = ((to - from) / by + 1e-9).floor() as usize;
    (0..=steps).map(|i| from + by * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use integrange_core::models::record::Record;
    use integrange_core::models::{GenomeInfo, IntervalStore, SeqnameStyle, Strand};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::*;

    fn joined() -> IntervalStore {
        let rows: Vec<(&str, &str, i64, Option<f64>)> = vec![
            ("G1", "de", 0, Some(1.5)),
            ("G1", "de", 0, Some(-0.2)),
            ("G2", "de", 0, None),
            ("G3", "not_de", 1, Some(2.0)),
            ("G3", "not_de", 1, Some(0.7)),
            ("G4", "not_de", 2, Some(0.9)),
            ("G4", "not_de", 2, Some(-3.0)),
        ];
        IntervalStore::new(
            GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc),
            "gene_id:str,origin:cat,resample:int,da_log2FC:float"
                .parse()
                .unwrap(),
            rows.into_iter()
                .map(|(gene, origin, tag, lfc)| {
                    Record::new("chr1", 1, 10, Strand::Plus).with_values(vec![
                        Some(Value::from(gene)),
                        Some(Value::from(origin)),
                        Some(Value::Int(tag)),
                        lfc.map(Value::Float),
                    ])
                })
                .collect(),
        )
        .unwrap()
    }

    fn floats(table: &Table, name: &str) -> Vec<f64> {
        table
            .column(name)
            .unwrap()
            .into_iter()
            .map(|v| v.and_then(Value::as_f64).unwrap())
            .collect()
    }

    #[rstest]
    fn test_sweep_long_form() {
        let table = sweep_thresholds(&joined(), &["gene_id"], "da_log2FC", &[0.0, 1.0], None).unwrap();
        let names: Vec<&str> = table.schema().names().collect();
        assert_eq!(names, vec!["gene_id", "threshold", "count"]);
        assert_eq!(table.len(), 8);
        let counts: Vec<Option<Value>> = table
            .column(COUNT_COLUMN)
            .unwrap()
            .into_iter()
            .map(|v| v.cloned())
            .collect();
        let expected: Vec<Option<Value>> = [2, 1, 0, 0, 2, 1, 2, 1]
            .into_iter()
            .map(|n| Some(Value::Int(n)))
            .collect();
        assert_eq!(counts, expected);
    }

    #[rstest]
    fn test_threshold_table() {
        let table = threshold_table(&joined(), "da_log2FC", &[0.0, 1.0]).unwrap();
        let origins: Vec<Option<Value>> = table
            .column(ORIGIN_COLUMN)
            .unwrap()
            .into_iter()
            .map(|v| v.cloned())
            .collect();
        assert_eq!(
            origins,
            vec![
                Some(Value::from("de")),
                Some(Value::from("de")),
                Some(Value::from("not_de")),
                Some(Value::from("not_de")),
            ]
        );
        // de has one tag; not_de has two
        assert_eq!(floats(&table, GENE_COUNT_COLUMN), vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(floats(&table, PEAK_COUNT_COLUMN), vec![2.0, 1.0, 2.0, 1.0]);
    }

    #[rstest]
    #[case(0.0, 1.0, 0.25, vec![0.0, 0.25, 0.5, 0.75, 1.0])]
    #[case(1.0, 1.0, 0.5, vec![1.0])]
    #[case(0.0, 0.3, 0.1, vec![0.0, 0.1, 0.2, 0.30000000000000004])]
    fn test_threshold_grid(
        #[case] from: f64,
        #[case] to: f64,
        #[case] by: f64,
        #[case] expected: Vec<f64>,
    ) {
        assert_eq!(threshold_grid(from, to, by), expected);
    }

    proptest! {
        #[test]
        fn sweep_counts_never_increase(
            values in proptest::collection::vec(proptest::option::of(-5.0f64..5.0), 0..40),
            raw_thresholds in proptest::collection::vec(0.0f64..6.0, 1..10),
        ) {
            let mut thresholds = raw_thresholds;
            thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let table = Table::new(
                "g:int,x:float".parse().unwrap(),
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| vec![Some(Value::Int((i % 3) as i64)), v.map(Value::Float)])
                    .collect(),
            )
            .unwrap();
            let swept = sweep_thresholds(&table, &["g"], "x", &thresholds, None).unwrap();
            let counts: Vec<i64> = swept
                .column(COUNT_COLUMN)
                .unwrap()
                .into_iter()
                .map(|v| v.and_then(Value::as_i64).unwrap())
                .collect();
            for group in counts.chunks(thresholds.len()) {
                prop_assert!(group.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }
}
