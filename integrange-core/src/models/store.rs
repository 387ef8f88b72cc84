use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use log::debug;

use crate::errors::{StoreError, StoreResult};
use crate::models::genome::{GenomeInfo, SeqnameStyle};
use crate::models::record::Record;
use crate::models::schema::{
    Column, END_COLUMN, SEQNAMES_COLUMN, START_COLUMN, STRAND_COLUMN, Schema,
};
use crate::models::strand::Strand;
use crate::models::table::Table;
use crate::models::value::{ColumnType, Value};
use crate::utils::{get_dynamic_reader, get_dynamic_writer, split_tsv_line};

///
/// IntervalStore struct, an ordered collection of genomic intervals that
/// share one reference genome and one metadata schema.
///
/// Stores are immutable values: every transform returns a new store.
///
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntervalStore {
    genome: GenomeInfo,
    schema: Schema,
    records: Vec<Record>,
}

impl IntervalStore {
    ///
    /// Create a new [IntervalStore], validating every record against the schema.
    ///
    /// # Arguments:
    /// - genome: reference genome identity of all records
    /// - schema: metadata columns; coordinate names are not allowed
    /// - records: intervals with one value per schema column
    pub fn new(genome: GenomeInfo, schema: Schema, records: Vec<Record>) -> StoreResult<Self> {
        schema.check_no_reserved()?;
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.start > record.end {
                    return Err(StoreError::InvalidInterval(record.to_string()));
                }
                record.values = schema.coerce_row(record.values)?;
                Ok(record)
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(IntervalStore {
            genome,
            schema,
            records,
        })
    }

    pub fn empty(genome: GenomeInfo, schema: Schema) -> StoreResult<Self> {
        IntervalStore::new(genome, schema, Vec::new())
    }

    pub fn genome(&self) -> &GenomeInfo {
        &self.genome
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, row: usize) -> Option<&Record> {
        self.records.get(row)
    }

    /// Value of `column` at `row`; `Ok(None)` when missing.
    pub fn value(&self, row: usize, column: &str) -> StoreResult<Option<&Value>> {
        let idx = self.schema.require(column)?;
        let record = self
            .records
            .get(row)
            .ok_or_else(|| StoreError::Schema(format!("row {} out of bounds", row)))?;
        Ok(record.values[idx].as_ref())
    }

    pub fn column_values(&self, column: &str) -> StoreResult<Vec<Option<&Value>>> {
        let idx = self.schema.require(column)?;
        Ok(self.records.iter().map(|r| r[idx].as_ref()).collect())
    }

    /// Return a new store with one extra column.
    pub fn with_column(&self, column: Column, values: Vec<Option<Value>>) -> StoreResult<Self> {
        if values.len() != self.records.len() {
            return Err(StoreError::Schema(format!(
                "column `{}` has {} values for {} records",
                column.name,
                values.len(),
                self.records.len()
            )));
        }
        let schema = self.schema.with_column(column)?;
        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(r, v)| {
                let mut record = r.clone();
                record.values.push(v);
                record
            })
            .collect();
        IntervalStore::new(self.genome.clone(), schema, records)
    }

    /// Return a new store with one extra column holding `value` on every row.
    pub fn with_constant_column(&self, column: Column, value: Value) -> StoreResult<Self> {
        let values = vec![Some(value); self.records.len()];
        self.with_column(column, values)
    }

    ///
    /// Return a new store with the coordinates replaced row by row.
    ///
    /// Sequence names, strands and metadata are kept.
    pub fn with_ranges(&self, ranges: Vec<(u32, u32)>) -> StoreResult<Self> {
        if ranges.len() != self.records.len() {
            return Err(StoreError::Schema(format!(
                "{} ranges supplied for {} records",
                ranges.len(),
                self.records.len()
            )));
        }
        let records = self
            .records
            .iter()
            .zip(ranges)
            .map(|(r, (start, end))| Record {
                start,
                end,
                ..r.clone()
            })
            .collect();
        IntervalStore::new(self.genome.clone(), self.schema.clone(), records)
    }

    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        IntervalStore {
            genome: self.genome.clone(),
            schema: self.schema.clone(),
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Rows at the given positions, in the given order. Out-of-range positions are skipped.
    pub fn take(&self, rows: &[usize]) -> Self {
        IntervalStore {
            genome: self.genome.clone(),
            schema: self.schema.clone(),
            records: rows
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Append the rows of `other`; genome and schema must match exactly.
    pub fn concat(&self, other: &IntervalStore) -> StoreResult<Self> {
        self.genome.check_compatible(&other.genome)?;
        if self.schema != other.schema {
            return Err(StoreError::Schema(format!(
                "cannot concatenate stores with schemas [{}] and [{}]",
                self.schema, other.schema
            )));
        }
        let mut records = self.records.clone();
        records.extend(other.records.iter().cloned());
        Ok(IntervalStore {
            genome: self.genome.clone(),
            schema: self.schema.clone(),
            records,
        })
    }

    /// Rows sorted by (seqname, start, end, strand); ties keep insertion order.
    pub fn sorted(&self) -> Self {
        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            a.seqname
                .cmp(&b.seqname)
                .then(a.start.cmp(&b.start))
                .then(a.end.cmp(&b.end))
                .then(a.strand.cmp(&b.strand))
        });
        IntervalStore {
            genome: self.genome.clone(),
            schema: self.schema.clone(),
            records,
        }
    }

    ///
    /// Rename every sequence into another naming style.
    ///
    /// This is the only way a store's [SeqnameStyle] changes.
    pub fn restyle(&self, style: SeqnameStyle) -> Self {
        let from = self.genome.style;
        let records = self
            .records
            .iter()
            .map(|r| Record {
                seqname: from.convert(&r.seqname, style),
                ..r.clone()
            })
            .collect();
        IntervalStore {
            genome: GenomeInfo::new(&self.genome.build, style),
            schema: self.schema.clone(),
            records,
        }
    }

    ///
    /// Convert into a [Table] whose first columns are the coordinates.
    ///
    pub fn to_table(&self) -> StoreResult<Table> {
        let mut columns = vec![
            Column::new(SEQNAMES_COLUMN, ColumnType::Categorical),
            Column::new(START_COLUMN, ColumnType::Int),
            Column::new(END_COLUMN, ColumnType::Int),
            Column::new(STRAND_COLUMN, ColumnType::Categorical),
        ];
        columns.extend(self.schema.columns().iter().cloned());
        let schema = Schema::new(columns)?;
        let rows = self
            .records
            .iter()
            .map(|r| {
                let mut row = vec![
                    Some(Value::Str(r.seqname.clone())),
                    Some(Value::Int(r.start as i64)),
                    Some(Value::Int(r.end as i64)),
                    Some(Value::Str(r.strand.to_string())),
                ];
                row.extend(r.values.iter().cloned());
                row
            })
            .collect();
        Table::new(schema, rows)
    }

    ///
    /// Read a store from a tab-delimited file with a header line.
    ///
    /// The header must name `seqnames`, `start` and `end`; `strand` is
    /// optional (missing means unstranded). Every schema column must be
    /// present in the header; other columns are ignored.
    ///
    /// # Arguments:
    /// - path: path to a `.tsv` or `.tsv.gz` file
    /// - genome: genome identity assigned to the store
    /// - schema: declared metadata columns
    pub fn from_tsv<P: AsRef<Path>>(
        path: P,
        genome: GenomeInfo,
        schema: Schema,
    ) -> StoreResult<Self> {
        let reader = get_dynamic_reader(path.as_ref())?;
        let store = IntervalStore::from_reader(reader, genome, schema)?;
        debug!(
            "Read {} intervals from {}",
            store.len(),
            path.as_ref().display()
        );
        Ok(store)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        genome: GenomeInfo,
        schema: Schema,
    ) -> StoreResult<Self> {
        let mut lines = reader.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return IntervalStore::empty(genome, schema),
            }
        };
        let header = header.trim_start_matches('#').to_string();
        let positions: HashMap<&str, usize> = split_tsv_line(&header)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();

        let required = |name: &str| -> StoreResult<usize> {
            positions.get(name).copied().ok_or_else(|| StoreError::Parse {
                line: 1,
                msg: format!("header is missing the `{}` column", name),
            })
        };
        let seq_idx = required(SEQNAMES_COLUMN)?;
        let start_idx = required(START_COLUMN)?;
        let end_idx = required(END_COLUMN)?;
        let strand_idx = positions.get(STRAND_COLUMN).copied();
        let value_idx = schema
            .names()
            .map(|name| {
                positions
                    .get(name)
                    .copied()
                    .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let mut records = Vec::new();
        for (i, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 1;
            let fields = split_tsv_line(&line);
            let field = |idx: usize| -> StoreResult<&str> {
                fields.get(idx).copied().ok_or_else(|| StoreError::Parse {
                    line: line_no,
                    msg: format!("expected at least {} fields, found {}", idx + 1, fields.len()),
                })
            };
            let parse_pos = |idx: usize, what: &str| -> StoreResult<u32> {
                let raw = field(idx)?;
                raw.trim().parse::<u32>().map_err(|_| StoreError::Parse {
                    line: line_no,
                    msg: format!("invalid {} position: {:?}", what, raw),
                })
            };

            let strand = match strand_idx {
                Some(idx) => field(idx)?
                    .trim()
                    .parse::<Strand>()
                    .map_err(|msg| StoreError::Parse { line: line_no, msg })?,
                None => Strand::Unstranded,
            };
            let values = schema
                .columns()
                .iter()
                .zip(&value_idx)
                .map(|(column, &idx)| {
                    Value::parse(field(idx)?, column.dtype).map_err(|msg| StoreError::Parse {
                        line: line_no,
                        msg: format!("column `{}`: {}", column.name, msg),
                    })
                })
                .collect::<StoreResult<Vec<_>>>()?;

            records.push(Record {
                seqname: field(seq_idx)?.trim().to_string(),
                start: parse_pos(start_idx, "start")?,
                end: parse_pos(end_idx, "end")?,
                strand,
                values,
            });
        }

        IntervalStore::new(genome, schema, records)
    }

    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut header = vec![SEQNAMES_COLUMN, START_COLUMN, END_COLUMN, STRAND_COLUMN];
        header.extend(self.schema.names());
        writeln!(writer, "{}", header.join("\t"))?;
        for record in &self.records {
            writeln!(writer, "{}", record.as_string())?;
        }
        Ok(())
    }

    ///
    /// Write the store as TSV. Gzipped when the path ends in `.gz`.
    ///
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = get_dynamic_writer(path.as_ref())?;
        self.write_tsv(&mut writer)?;
        writer.flush()
    }
}

impl<'a> IntoIterator for &'a IntervalStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
