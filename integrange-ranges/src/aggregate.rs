//! Grouped aggregation over stores and tables.
//!
//! Rows are grouped by equal key values (missing equals missing) and groups
//! are emitted in order of first appearance.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::str::FromStr;

use fxhash::{FxHashMap, FxHashSet};
use integrange_core::errors::StoreResult;
use integrange_core::models::schema::{END_COLUMN, SEQNAMES_COLUMN, START_COLUMN, STRAND_COLUMN};
use integrange_core::models::{
    Column, ColumnType, IntervalStore, Record, Schema, Strand, Table, Value,
};
use log::debug;

use crate::errors::{RangesError, RangesResult};

/// A test on a numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    AbsGreaterThan(f64),
    GreaterThan(f64),
    LessThan(f64),
}

impl Predicate {
    #[inline]
    pub fn test(&self, value: f64) -> bool {
        match *self {
            Predicate::AbsGreaterThan(t) => value.abs() > t,
            Predicate::GreaterThan(t) => value > t,
            Predicate::LessThan(t) => value < t,
        }
    }
}

/// A per-group summary of one column. Missing values never count and never
/// enter a maximum.
#[derive(Debug, Clone, PartialEq)]
pub enum Reducer {
    CountNonMissing(String),
    CountDistinct(String),
    /// Largest absolute value, missing when the group has no values.
    MaxAbs(String),
    CountWhere(String, Predicate),
}

impl Reducer {
    pub fn column(&self) -> &str {
        match self {
            Reducer::CountNonMissing(c)
            | Reducer::CountDistinct(c)
            | Reducer::MaxAbs(c)
            | Reducer::CountWhere(c, _) => c,
        }
    }

    pub fn is_count(&self) -> bool {
        !matches!(self, Reducer::MaxAbs(_))
    }

    /// Give the reducer an output column name.
    pub fn named(self, name: &str) -> Summary {
        Summary {
            name: name.to_string(),
            reducer: self,
        }
    }
}

impl Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reducer::CountNonMissing(c) => write!(f, "count_non_missing_{}", c),
            Reducer::CountDistinct(c) => write!(f, "count_distinct_{}", c),
            Reducer::MaxAbs(c) => write!(f, "max_abs_{}", c),
            Reducer::CountWhere(c, _) => write!(f, "count_where_{}", c),
        }
    }
}

/// A reducer together with the name of the column it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub name: String,
    pub reducer: Reducer,
}

impl From<Reducer> for Summary {
    fn from(reducer: Reducer) -> Self {
        Summary {
            name: reducer.to_string(),
            reducer,
        }
    }
}

impl Predicate {
    fn parse(op: &str, threshold: &str) -> Result<Self, String> {
        let t: f64 = threshold
            .trim()
            .parse()
            .map_err(|_| format!("invalid threshold: {}", threshold))?;
        match op.trim() {
            "abs_gt" => Ok(Predicate::AbsGreaterThan(t)),
            "gt" => Ok(Predicate::GreaterThan(t)),
            "lt" => Ok(Predicate::LessThan(t)),
            other => Err(format!("unknown predicate: {}", other)),
        }
    }
}

impl FromStr for Summary {
    type Err = String;

    ///
    /// Parse `[name=]reducer(column[,op,threshold])`, for example
    /// `peak_count=count_non_missing(da_padj)` or `count_where(lfc,abs_gt,1)`.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, call) = match s.split_once('=') {
            Some((name, call)) => (Some(name.trim()), call.trim()),
            None => (None, s.trim()),
        };
        let (func, rest) = call
            .split_once('(')
            .ok_or_else(|| format!("expected `reducer(column)`, found {:?}", call))?;
        let args: Vec<&str> = rest
            .strip_suffix(')')
            .ok_or_else(|| format!("missing `)` in {:?}", call))?
            .split(',')
            .map(str::trim)
            .collect();

        let column = args[0].to_string();
        if column.is_empty() {
            return Err(format!("missing column in {:?}", call));
        }
        let reducer = match (func.trim(), args.len()) {
            ("count_non_missing", 1) => Reducer::CountNonMissing(column),
            ("count_distinct", 1) => Reducer::CountDistinct(column),
            ("max_abs", 1) => Reducer::MaxAbs(column),
            ("count_where", 3) => Reducer::CountWhere(column, Predicate::parse(args[1], args[2])?),
            (other, n) => return Err(format!("unknown reducer {}/{}", other, n)),
        };
        Ok(match name {
            Some(name) if !name.is_empty() => reducer.named(name),
            _ => reducer.into(),
        })
    }
}

/// Anything that can be viewed as a [Table] for grouping.
pub trait GroupSource {
    fn as_table(&self) -> StoreResult<Cow<'_, Table>>;
}

impl GroupSource for Table {
    fn as_table(&self) -> StoreResult<Cow<'_, Table>> {
        Ok(Cow::Borrowed(self))
    }
}

impl GroupSource for IntervalStore {
    /// Coordinates become the leading `seqnames`, `start`, `end` and `strand` columns.
    fn as_table(&self) -> StoreResult<Cow<'_, Table>> {
        Ok(Cow::Owned(self.to_table()?))
    }
}

/// Rows of a table partitioned into groups of equal keys.
pub(crate) struct Grouping<'a> {
    pub table: Cow<'a, Table>,
    pub key_idx: Vec<usize>,
    pub groups: Vec<Vec<usize>>,
}

impl<'a> Grouping<'a> {
    pub fn new<S: GroupSource + ?Sized>(source: &'a S, keys: &[&str]) -> RangesResult<Self> {
        let table = source.as_table()?;
        let key_idx = keys
            .iter()
            .map(|k| table.schema().require(k))
            .collect::<StoreResult<Vec<_>>>()?;

        let mut lookup: FxHashMap<Vec<Option<Value>>, usize> = FxHashMap::default();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, row) in table.rows().iter().enumerate() {
            let key: Vec<Option<Value>> = key_idx.iter().map(|&k| row[k].clone()).collect();
            let next = groups.len();
            let g = *lookup.entry(key).or_insert(next);
            if g == next {
                groups.push(Vec::new());
            }
            groups[g].push(i);
        }
        debug!("{} rows fell into {} groups", table.len(), groups.len());

        Ok(Grouping {
            table,
            key_idx,
            groups,
        })
    }

    pub fn key_columns(&self) -> Vec<Column> {
        self.key_idx
            .iter()
            .map(|&k| self.table.schema().columns()[k].clone())
            .collect()
    }

    /// Key values of group `g`, taken from its first row.
    pub fn key_values(&self, g: usize) -> Vec<Option<Value>> {
        let first = &self.table.rows()[self.groups[g][0]];
        self.key_idx.iter().map(|&k| first[k].clone()).collect()
    }

    pub fn values(&self, g: usize, col: usize) -> impl Iterator<Item = &Value> {
        self.groups[g]
            .iter()
            .filter_map(move |&r| self.table.rows()[r][col].as_ref())
    }

    /// Distinct present values of `col` in group `g`, or 1 when there are none.
    pub fn denominator(&self, g: usize, col: usize) -> usize {
        let distinct: FxHashSet<&Value> = self.values(g, col).collect();
        distinct.len().max(1)
    }

    pub fn numeric_column(&self, name: &str) -> RangesResult<usize> {
        let idx = self.table.schema().require(name)?;
        match self.table.schema().columns()[idx].dtype {
            ColumnType::Int | ColumnType::Float => Ok(idx),
            other => Err(RangesError::Schema(format!(
                "column `{}` is {}, expected a numeric column",
                name, other
            ))),
        }
    }
}

/// Turn a count into an output value, normalized when a denominator is given.
pub(crate) fn count_value(count: usize, denominator: Option<usize>) -> Value {
    match denominator {
        Some(d) => Value::Float(count as f64 / d as f64),
        None => Value::Int(count as i64),
    }
}

fn reduce_group(grouping: &Grouping, g: usize, col: usize, reducer: &Reducer) -> ReducedValue {
    match reducer {
        Reducer::CountNonMissing(_) => ReducedValue::Count(grouping.values(g, col).count()),
        Reducer::CountDistinct(_) => {
            let distinct: FxHashSet<&Value> = grouping.values(g, col).collect();
            ReducedValue::Count(distinct.len())
        }
        Reducer::MaxAbs(_) => ReducedValue::Max(
            grouping
                .values(g, col)
                .filter_map(Value::as_f64)
                .map(f64::abs)
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v)))),
        ),
        Reducer::CountWhere(_, predicate) => ReducedValue::Count(
            grouping
                .values(g, col)
                .filter_map(Value::as_f64)
                .filter(|v| predicate.test(*v))
                .count(),
        ),
    }
}

enum ReducedValue {
    Count(usize),
    Max(Option<f64>),
}

/// Output schema columns and per-group values for a set of summaries.
fn summarize(
    grouping: &Grouping,
    summaries: &[Summary],
    normalize_by: Option<&str>,
) -> RangesResult<(Vec<Column>, Vec<Vec<Option<Value>>>)> {
    let tag_idx = normalize_by
        .map(|tag| grouping.table.schema().require(tag))
        .transpose()?;

    let mut columns = Vec::with_capacity(summaries.len());
    let mut col_idx = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let idx = match summary.reducer {
            Reducer::MaxAbs(_) | Reducer::CountWhere(..) => {
                grouping.numeric_column(summary.reducer.column())?
            }
            _ => grouping.table.schema().require(summary.reducer.column())?,
        };
        col_idx.push(idx);
        let dtype = match (&summary.reducer, tag_idx) {
            (Reducer::MaxAbs(_), _) | (_, Some(_)) => ColumnType::Float,
            _ => ColumnType::Int,
        };
        columns.push(Column::new(&summary.name, dtype));
    }

    let rows = (0..grouping.groups.len())
        .map(|g| {
            let denominator = tag_idx.map(|t| grouping.denominator(g, t));
            summaries
                .iter()
                .zip(&col_idx)
                .map(|(summary, &col)| match reduce_group(grouping, g, col, &summary.reducer) {
                    ReducedValue::Count(n) => Some(count_value(n, denominator)),
                    ReducedValue::Max(m) => m.map(Value::Float),
                })
                .collect()
        })
        .collect();

    Ok((columns, rows))
}

///
/// Group rows by `keys` and compute one value per summary for each group.
///
/// Counts are integers unless `normalize_by` names a column, in which case
/// every count is divided by the number of distinct values of that column in
/// the group (1 when the column is entirely missing) and becomes a float.
/// Output rows follow the first appearance of each group, key columns first.
///
/// # Arguments:
/// - source: a [Table] or an [IntervalStore] (whose coordinates can be keys)
/// - keys: grouping column names
/// - summaries: reducers with their output names
/// - normalize_by: column whose distinct values divide the counts
pub fn group_reduce<S: GroupSource + ?Sized>(
    source: &S,
    keys: &[&str],
    summaries: &[Summary],
    normalize_by: Option<&str>,
) -> RangesResult<Table> {
    let grouping = Grouping::new(source, keys)?;
    let (summary_columns, summary_rows) = summarize(&grouping, summaries, normalize_by)?;

    let mut columns = grouping.key_columns();
    columns.extend(summary_columns);
    let schema = Schema::new(columns)?;

    let rows = summary_rows
        .into_iter()
        .enumerate()
        .map(|(g, values)| {
            let mut row = grouping.key_values(g);
            row.extend(values);
            row
        })
        .collect();

    Ok(Table::new(schema, rows)?)
}

///
/// [group_reduce] that keeps genomic coordinates, returning a store.
///
/// `keys` must include `seqnames`, `start` and `end`. The strand comes from
/// the key when `strand` is one; otherwise it must be the same for every row
/// of a group.
pub fn group_reduce_ranges(
    store: &IntervalStore,
    keys: &[&str],
    summaries: &[Summary],
    normalize_by: Option<&str>,
) -> RangesResult<IntervalStore> {
    for required in [SEQNAMES_COLUMN, START_COLUMN, END_COLUMN] {
        if !keys.contains(&required) {
            return Err(RangesError::Schema(format!(
                "grouping into ranges needs `{}` among the keys",
                required
            )));
        }
    }

    let grouping = Grouping::new(store, keys)?;
    let (summary_columns, summary_rows) = summarize(&grouping, summaries, normalize_by)?;

    // metadata keys, in key order
    let meta_keys: Vec<(usize, Column)> = keys
        .iter()
        .enumerate()
        .filter(|(_, k)| !Schema::is_coordinate(k))
        .map(|(i, _)| (i, grouping.key_columns()[i].clone()))
        .collect();
    let mut columns: Vec<Column> = meta_keys.iter().map(|(_, c)| c.clone()).collect();
    columns.extend(summary_columns);
    let schema = Schema::new(columns)?;

    let strand_in_keys = keys.contains(&STRAND_COLUMN);
    let mut records = Vec::with_capacity(grouping.groups.len());
    for (g, values) in summary_rows.into_iter().enumerate() {
        let rows = &grouping.groups[g];
        let first = store
            .get(rows[0])
            .ok_or_else(|| RangesError::Schema(format!("row {} out of bounds", rows[0])))?;
        let strand: Strand = first.strand;
        if !strand_in_keys
            && rows
                .iter()
                .filter_map(|&r| store.get(r))
                .any(|r| r.strand != strand)
        {
            return Err(RangesError::Schema(format!(
                "group at {} mixes strands; add `strand` to the keys",
                first
            )));
        }

        let key_values = grouping.key_values(g);
        let mut meta: Vec<Option<Value>> =
            meta_keys.iter().map(|(i, _)| key_values[*i].clone()).collect();
        meta.extend(values);
        records.push(Record::new(&first.seqname, first.start, first.end, strand).with_values(meta));
    }

    Ok(IntervalStore::new(store.genome().clone(), schema, records)?)
}
