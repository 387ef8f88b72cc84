use std::collections::HashSet;

use integrange_core::errors::{StoreError, StoreResult};
use integrange_core::models::schema::{END_COLUMN, SEQNAMES_COLUMN, START_COLUMN, STRAND_COLUMN};
use integrange_core::models::{
    Column, ColumnType, IntervalStore, Record, Schema, Strand, Value,
};
use log::{debug, info};

use crate::multi_chrom_overlapper::{IntoMultiChromOverlapper, MultiChromOverlapper};

/// Prefix given to right-hand columns whose names are already taken.
pub const DEFAULT_RIGHT_PREFIX: &str = "right.";

/// How strands take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandMode {
    /// Match regardless of strand.
    #[default]
    Ignore,
    /// Match equal strands; an unstranded interval matches any strand.
    Aware,
}

impl StrandMode {
    #[inline]
    pub fn matches(&self, left: &Strand, right: &Strand) -> bool {
        match self {
            StrandMode::Ignore => true,
            StrandMode::Aware => left.is_compatible(right),
        }
    }
}

impl std::str::FromStr for StrandMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(StrandMode::Ignore),
            "aware" => Ok(StrandMode::Aware),
            other => Err(format!("unknown strand mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOptions {
    pub strand_mode: StrandMode,
    pub prefix: String,
    /// Also emit the right coordinates as `<prefix>seqnames`, `<prefix>start`,
    /// `<prefix>end` and `<prefix>strand`.
    pub keep_right_ranges: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        JoinOptions {
            strand_mode: StrandMode::Ignore,
            prefix: DEFAULT_RIGHT_PREFIX.to_string(),
            keep_right_ranges: false,
        }
    }
}

impl JoinOptions {
    pub fn with_strand_mode(mut self, strand_mode: StrandMode) -> Self {
        self.strand_mode = strand_mode;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_right_ranges(mut self, keep: bool) -> Self {
        self.keep_right_ranges = keep;
        self
    }
}

///
/// Build the output schema of a join: left columns, then right columns,
/// prefixing right names that are already taken.
///
fn joined_schema(left: &Schema, right: &Schema, options: &JoinOptions) -> StoreResult<Schema> {
    let mut taken: HashSet<String> = left.names().map(String::from).collect();
    let mut columns: Vec<Column> = left.columns().to_vec();

    for column in right.columns() {
        let name = if taken.contains(&column.name) {
            let prefixed = format!("{}{}", options.prefix, column.name);
            if taken.contains(&prefixed) {
                return Err(StoreError::Schema(format!(
                    "right column `{}` collides with `{}` even after prefixing",
                    column.name, prefixed
                )));
            }
            prefixed
        } else {
            column.name.clone()
        };
        taken.insert(name.clone());
        columns.push(Column::new(&name, column.dtype));
    }

    if options.keep_right_ranges {
        for (name, dtype) in [
            (SEQNAMES_COLUMN, ColumnType::Categorical),
            (START_COLUMN, ColumnType::Int),
            (END_COLUMN, ColumnType::Int),
            (STRAND_COLUMN, ColumnType::Categorical),
        ] {
            columns.push(Column::new(&format!("{}{}", options.prefix, name), dtype));
        }
    }

    Schema::new(columns)
}

/// Rows of the indexed store matching `query`, ascending.
fn matching_rows(
    index: &MultiChromOverlapper,
    indexed: &IntervalStore,
    query: &Record,
    strand_mode: StrandMode,
) -> Vec<usize> {
    let mut rows = index.find_rows(&query.seqname, query.start, query.end);
    if strand_mode != StrandMode::Ignore {
        rows.retain(|&row| {
            indexed
                .get(row)
                .is_some_and(|r| strand_mode.matches(&query.strand, &r.strand))
        });
    }
    rows
}

fn right_range_values(record: &Record) -> [Option<Value>; 4] {
    [
        Some(Value::Str(record.seqname.clone())),
        Some(Value::Int(record.start as i64)),
        Some(Value::Int(record.end as i64)),
        Some(Value::Str(record.strand.to_string())),
    ]
}

///
/// Left outer join of two stores on closed-interval overlap.
///
/// Every left row appears at least once. Each (left, right) overlapping pair
/// produces one row carrying the left coordinates, the left metadata, then
/// the right metadata. A left row without any match produces one row whose
/// right columns are all missing. Rows come out in left order, and for each
/// left row its matches come out in right-row order.
///
/// # Arguments:
/// - left: store whose rows are all kept
/// - right: store matched against `left`
/// - options: strand handling, collision prefix and whether right coordinates are kept
pub fn left_join_overlap(
    left: &IntervalStore,
    right: &IntervalStore,
    options: &JoinOptions,
) -> StoreResult<IntervalStore> {
    left.genome().check_compatible(right.genome())?;
    let schema = joined_schema(left.schema(), right.schema(), options)?;
    let missing_width = schema.len() - left.schema().len();

    let index = right.to_multi_chrom_overlapper();
    let mut records = Vec::with_capacity(left.len());
    let mut matched = 0usize;

    for l in left {
        let rows = matching_rows(&index, right, l, options.strand_mode);
        if rows.is_empty() {
            let mut values = l.values.clone();
            values.extend(std::iter::repeat_n(None, missing_width));
            records.push(l.clone().with_values(values));
            continue;
        }
        matched += 1;
        for row in rows {
            let Some(r) = right.get(row) else { continue };
            let mut values = Vec::with_capacity(schema.len());
            values.extend(l.values.iter().cloned());
            values.extend(r.values.iter().cloned());
            if options.keep_right_ranges {
                values.extend(right_range_values(r));
            }
            records.push(l.clone().with_values(values));
        }
    }

    debug!(
        "{} of {} left intervals matched, {} joined rows",
        matched,
        left.len(),
        records.len()
    );
    info!("Joined {} intervals against {}", left.len(), right.len());

    IntervalStore::new(left.genome().clone(), schema, records)
}

///
/// Count the right intervals overlapping each left interval, under the same
/// matching rules as [left_join_overlap].
///
pub fn count_overlaps(
    left: &IntervalStore,
    right: &IntervalStore,
    options: &JoinOptions,
) -> StoreResult<Vec<usize>> {
    left.genome().check_compatible(right.genome())?;
    let index = right.to_multi_chrom_overlapper();
    Ok(left
        .iter()
        .map(|l| match options.strand_mode {
            StrandMode::Ignore => index.count(&l.seqname, l.start, l.end),
            StrandMode::Aware => matching_rows(&index, right, l, options.strand_mode).len(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use integrange_core::models::{GenomeInfo, SeqnameStyle};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::*;

    #[fixture]
    fn genome() -> GenomeInfo {
        GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc)
    }

    fn genes(genome: &GenomeInfo) -> IntervalStore {
        IntervalStore::new(
            genome.clone(),
            "gene_id:str,score:float".parse().unwrap(),
            vec![
                Record::new("chr1", 100, 200, Strand::Plus)
                    .with_values(vec![Some(Value::from("G1")), Some(Value::from(2.0))]),
                Record::new("chr1", 500, 600, Strand::Minus)
                    .with_values(vec![Some(Value::from("G2")), Some(Value::from(-3.0))]),
            ],
        )
        .unwrap()
    }

    fn peaks(genome: &GenomeInfo) -> IntervalStore {
        IntervalStore::new(
            genome.clone(),
            "peak_id:str,score:float".parse().unwrap(),
            vec![
                Record::new("chr1", 190, 250, Strand::Minus)
                    .with_values(vec![Some(Value::from("P2")), Some(Value::from(0.5))]),
                Record::new("chr1", 150, 160, Strand::Plus)
                    .with_values(vec![Some(Value::from("P1")), Some(Value::from(1.5))]),
                Record::new("chr2", 100, 200, Strand::Plus)
                    .with_values(vec![Some(Value::from("P3")), None]),
            ],
        )
        .unwrap()
    }

    fn column(store: &IntervalStore, name: &str) -> Vec<Option<Value>> {
        store
            .column_values(name)
            .unwrap()
            .into_iter()
            .map(|v| v.cloned())
            .collect()
    }

    #[rstest]
    fn test_left_join_keeps_unmatched(genome: GenomeInfo) {
        let joined =
            left_join_overlap(&genes(&genome), &peaks(&genome), &JoinOptions::default()).unwrap();

        let names: Vec<&str> = joined.schema().names().collect();
        assert_eq!(names, vec!["gene_id", "score", "peak_id", "right.score"]);
        assert_eq!(joined.len(), 3);
        assert_eq!(
            column(&joined, "gene_id"),
            vec![Some(Value::from("G1")), Some(Value::from("G1")), Some(Value::from("G2"))]
        );
        // right-row order, not start order
        assert_eq!(
            column(&joined, "peak_id"),
            vec![Some(Value::from("P2")), Some(Value::from("P1")), None]
        );
        assert_eq!(joined.get(2).unwrap().start, 500);
    }

    #[rstest]
    fn test_strand_aware(genome: GenomeInfo) {
        let options = JoinOptions::default().with_strand_mode(StrandMode::Aware);
        let joined = left_join_overlap(&genes(&genome), &peaks(&genome), &options).unwrap();
        assert_eq!(
            column(&joined, "peak_id"),
            vec![Some(Value::from("P1")), None]
        );
        assert_eq!(
            count_overlaps(&genes(&genome), &peaks(&genome), &options).unwrap(),
            vec![1, 0]
        );
    }

    #[rstest]
    fn test_unstranded_matches_any(genome: GenomeInfo) {
        let left = IntervalStore::new(
            genome.clone(),
            Schema::empty(),
            vec![Record::new("chr1", 10, 20, Strand::Unstranded)],
        )
        .unwrap();
        let right = IntervalStore::new(
            genome,
            Schema::empty(),
            vec![
                Record::new("chr1", 15, 15, Strand::Plus),
                Record::new("chr1", 20, 30, Strand::Minus),
            ],
        )
        .unwrap();
        let options = JoinOptions::default().with_strand_mode(StrandMode::Aware);
        assert_eq!(count_overlaps(&left, &right, &options).unwrap(), vec![2]);
    }

    #[rstest]
    fn test_keep_right_ranges(genome: GenomeInfo) {
        let options = JoinOptions::default()
            .with_prefix("peak.")
            .with_right_ranges(true);
        let joined = left_join_overlap(&genes(&genome), &peaks(&genome), &options).unwrap();
        assert!(joined.schema().contains("peak.score"));
        assert_eq!(
            column(&joined, "peak.start"),
            vec![Some(Value::Int(190)), Some(Value::Int(150)), None]
        );
    }

    #[rstest]
    fn test_prefixed_collision_is_an_error(genome: GenomeInfo) {
        let left = IntervalStore::empty(genome.clone(), "x:int,right.x:int".parse().unwrap())
            .unwrap();
        let right = IntervalStore::empty(genome, "x:int".parse().unwrap()).unwrap();
        let result = left_join_overlap(&left, &right, &JoinOptions::default());
        assert!(matches!(result, Err(StoreError::Schema(_))));
    }

    #[rstest]
    #[case(GenomeInfo::new("GRCh37", SeqnameStyle::Ucsc))]
    #[case(GenomeInfo::new("GRCh38", SeqnameStyle::Ensembl))]
    fn test_genome_mismatch(genome: GenomeInfo, #[case] other: GenomeInfo) {
        let result = left_join_overlap(&genes(&genome), &peaks(&other), &JoinOptions::default());
        assert!(matches!(result, Err(StoreError::GenomeMismatch { .. })));
    }

    fn arb_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
        proptest::collection::vec(
            (
                prop_oneof![Just("chr1"), Just("chr2")],
                0u32..1000,
                0u32..100,
                prop_oneof![Just(Strand::Plus), Just(Strand::Minus), Just(Strand::Unstranded)],
            )
                .prop_map(|(chr, s, w, strand)| Record::new(chr, s, s + w, strand)),
            0..max,
        )
    }

    proptest! {
        #[test]
        fn join_keeps_every_left_row(
            left in arb_records(30),
            right in arb_records(30),
            aware in any::<bool>(),
        ) {
            let genome = GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc);
            let left = IntervalStore::new(genome.clone(), Schema::empty(), left).unwrap();
            let right = IntervalStore::new(genome, Schema::empty(), right).unwrap();
            let mode = if aware { StrandMode::Aware } else { StrandMode::Ignore };
            let options = JoinOptions::default().with_strand_mode(mode);

            let joined = left_join_overlap(&left, &right, &options).unwrap();
            let counts = count_overlaps(&left, &right, &options).unwrap();

            prop_assert!(joined.len() >= left.len());
            let expected: usize = counts.iter().map(|&c| c.max(1)).sum();
            prop_assert_eq!(joined.len(), expected);
        }
    }
}
