use std::fmt::{self, Display};

use integrange_core::models::{Column, ColumnType, Schema, Table, Value};

use crate::errors::{RangesError, RangesResult};
use crate::resample::ORIGIN_COLUMN;
use crate::sweep::{GENE_COUNT_COLUMN, PEAK_COUNT_COLUMN, THRESHOLD_COLUMN};

pub const GENE_ENRICHMENT_COLUMN: &str = "gene_enrichment";
pub const PEAK_ENRICHMENT_COLUMN: &str = "peak_enrichment";

/// Outcome of dividing a target count by a background count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Finite(f64),
    /// A positive count over an empty background
    Infinite,
    /// Zero over zero
    Undefined,
}

impl Ratio {
    /// Value written to tables: the number itself, `+inf` or `NaN`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Ratio::Finite(v) => *v,
            Ratio::Infinite => f64::INFINITY,
            Ratio::Undefined => f64::NAN,
        }
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{}", v),
            Ratio::Infinite => write!(f, "Inf"),
            Ratio::Undefined => write!(f, "NaN"),
        }
    }
}

/// Divide `target` by `background` without ever panicking or returning a silent zero.
pub fn enrichment_ratio(target: f64, background: f64) -> Ratio {
    if background == 0.0 {
        if target == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Infinite
        }
    } else {
        Ratio::Finite(target / background)
    }
}

/// `(threshold, gene_count, peak_count)` rows of one origin, in table order.
fn population(table: &Table, label: &str) -> RangesResult<Vec<(f64, f64, f64)>> {
    let schema = table.schema();
    let origin = schema.require(ORIGIN_COLUMN)?;
    let threshold = schema.require(THRESHOLD_COLUMN)?;
    let genes = schema.require(GENE_COUNT_COLUMN)?;
    let peaks = schema.require(PEAK_COUNT_COLUMN)?;

    let number = |row: &[Option<Value>], idx: usize| -> RangesResult<f64> {
        row[idx]
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                RangesError::Schema(format!(
                    "`{}` must be present and numeric in every row",
                    schema.columns()[idx].name
                ))
            })
    };

    table
        .rows()
        .iter()
        .filter(|row| row[origin].as_ref().and_then(Value::as_str) == Some(label))
        .map(|row| Ok((number(row, threshold)?, number(row, genes)?, number(row, peaks)?)))
        .collect()
}

///
/// Pair the `target` and `background` populations of a threshold table and
/// compute their gene and peak enrichment at every threshold.
///
/// Thresholds are emitted in the order they first appear, target rows first.
/// A population with no row at some threshold counts as zero there.
///
/// # Arguments:
/// - table: output of [threshold_table](crate::sweep::threshold_table)
/// - target: origin label of the population of interest
/// - background: origin label of the reference population
pub fn enrichment(table: &Table, target: &str, background: &str) -> RangesResult<Table> {
    let target_rows = population(table, target)?;
    let background_rows = population(table, background)?;

    let mut thresholds: Vec<f64> = Vec::new();
    for &(t, _, _) in target_rows.iter().chain(&background_rows) {
        if !thresholds.iter().any(|seen| seen.to_bits() == t.to_bits()) {
            thresholds.push(t);
        }
    }
    let lookup = |rows: &[(f64, f64, f64)], t: f64| -> (f64, f64) {
        rows.iter()
            .find(|(rt, _, _)| rt.to_bits() == t.to_bits())
            .map_or((0.0, 0.0), |&(_, g, p)| (g, p))
    };

    let schema = Schema::new(vec![
        Column::new(THRESHOLD_COLUMN, ColumnType::Float),
        Column::new(GENE_ENRICHMENT_COLUMN, ColumnType::Float),
        Column::new(PEAK_ENRICHMENT_COLUMN, ColumnType::Float),
    ])?;
    let rows = thresholds
        .into_iter()
        .map(|t| {
            let (tg, tp) = lookup(&target_rows, t);
            let (bg, bp) = lookup(&background_rows, t);
            vec![
                Some(Value::Float(t)),
                Some(Value::Float(enrichment_ratio(tg, bg).as_f64())),
                Some(Value::Float(enrichment_ratio(tp, bp).as_f64())),
            ]
        })
        .collect();

    Ok(Table::new(schema, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(10.0, 5.0, Ratio::Finite(2.0))]
    #[case(0.0, 5.0, Ratio::Finite(0.0))]
    #[case(3.0, 0.0, Ratio::Infinite)]
    #[case(0.0, 0.0, Ratio::Undefined)]
    fn test_enrichment_ratio(#[case] target: f64, #[case] background: f64, #[case] expected: Ratio) {
        assert_eq!(enrichment_ratio(target, background), expected);
    }

    #[rstest]
    fn test_ratio_display() {
        assert_eq!(Ratio::Finite(2.0).to_string(), "2");
        assert_eq!(Ratio::Infinite.to_string(), "Inf");
        assert_eq!(Ratio::Undefined.to_string(), "NaN");
    }

    fn sweep_table() -> Table {
        let row = |origin: &str, t: f64, genes: f64, peaks: f64| {
            vec![
                Some(Value::from(origin)),
                Some(Value::Float(t)),
                Some(Value::Float(genes)),
                Some(Value::Float(peaks)),
            ]
        };
        Table::new(
            "origin:cat,threshold:float,gene_count:float,peak_count:float"
                .parse()
                .unwrap(),
            vec![
                row("de", 0.0, 10.0, 12.0),
                row("de", 1.0, 4.0, 0.0),
                row("not_de", 0.0, 5.0, 3.0),
                row("not_de", 1.0, 0.0, 0.0),
                row("not_de", 2.0, 0.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[rstest]
    fn test_enrichment_table() {
        let out = enrichment(&sweep_table(), "de", "not_de").unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.get(0, GENE_ENRICHMENT_COLUMN).unwrap(), Some(&Value::Float(2.0)));
        assert_eq!(out.get(0, PEAK_ENRICHMENT_COLUMN).unwrap(), Some(&Value::Float(4.0)));
        assert_eq!(
            out.get(1, GENE_ENRICHMENT_COLUMN).unwrap(),
            Some(&Value::Float(f64::INFINITY))
        );
        // NaN compares equal to NaN as a Value
        assert_eq!(
            out.get(1, PEAK_ENRICHMENT_COLUMN).unwrap(),
            Some(&Value::Float(f64::NAN))
        );
        assert_eq!(out.get(2, PEAK_ENRICHMENT_COLUMN).unwrap(), Some(&Value::Float(0.0)));
    }

    #[rstest]
    fn test_enrichment_tsv_sentinels() {
        let out = enrichment(&sweep_table(), "de", "not_de").unwrap();
        let mut buf = Vec::new();
        out.write_tsv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "threshold\tgene_enrichment\tpeak_enrichment\n0\t2\t4\n1\tInf\tNaN\n2\tNaN\t0\n"
        );
    }
}
