use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::models::schema::Schema;
use crate::models::value::{Value, format_field};
use crate::utils::{get_dynamic_reader, get_dynamic_writer, split_tsv_line};

///
/// Table struct, metadata rows without genomic coordinates. Aggregations
/// and threshold sweeps produce tables.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// Build a table, validating every row against `schema`.
    pub fn new(schema: Schema, rows: Vec<Vec<Option<Value>>>) -> StoreResult<Self> {
        let rows = rows
            .into_iter()
            .map(|row| schema.coerce_row(row))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Table { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: &str) -> StoreResult<Option<&Value>> {
        let idx = self.schema.require(column)?;
        let row = self
            .rows
            .get(row)
            .ok_or_else(|| StoreError::Schema(format!("row {} out of bounds", row)))?;
        Ok(row[idx].as_ref())
    }

    pub fn column(&self, column: &str) -> StoreResult<Vec<Option<&Value>>> {
        let idx = self.schema.require(column)?;
        Ok(self.rows.iter().map(|r| r[idx].as_ref()).collect())
    }

    /// Rows whose `column` equals `value`.
    pub fn filter_eq(&self, column: &str, value: &Value) -> StoreResult<Table> {
        let idx = self.schema.require(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|r| r[idx].as_ref() == Some(value))
            .cloned()
            .collect();
        Ok(Table {
            schema: self.schema.clone(),
            rows,
        })
    }

    ///
    /// Read a table from TSV with a header line. Columns are matched to the
    /// schema by name; header columns outside the schema are ignored.
    ///
    pub fn from_reader<R: BufRead>(reader: R, schema: Schema) -> StoreResult<Self> {
        let mut lines = reader.lines().enumerate();
        let header = match lines.next() {
            Some((_, line)) => line?,
            None => return Table::new(schema, Vec::new()),
        };
        let positions: HashMap<&str, usize> = split_tsv_line(&header)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        let idx = schema
            .names()
            .map(|name| {
                positions
                    .get(name)
                    .copied()
                    .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let mut rows = Vec::new();
        for (i, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_tsv_line(&line);
            let row = schema
                .columns()
                .iter()
                .zip(&idx)
                .map(|(column, &pos)| {
                    let raw = fields.get(pos).copied().ok_or_else(|| StoreError::Parse {
                        line: i + 1,
                        msg: format!("missing field for column `{}`", column.name),
                    })?;
                    Value::parse(raw, column.dtype).map_err(|msg| StoreError::Parse {
                        line: i + 1,
                        msg: format!("column `{}`: {}", column.name, msg),
                    })
                })
                .collect::<StoreResult<Vec<_>>>()?;
            rows.push(row);
        }
        Table::new(schema, rows)
    }

    pub fn from_tsv<P: AsRef<Path>>(path: P, schema: Schema) -> StoreResult<Self> {
        let reader = get_dynamic_reader(path.as_ref())?;
        Table::from_reader(reader, schema)
    }

    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let header: Vec<&str> = self.schema.names().collect();
        writeln!(writer, "{}", header.join("\t"))?;
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|v| format_field(v.as_ref())).collect();
            writeln!(writer, "{}", fields.join("\t"))?;
        }
        Ok(())
    }

    ///
    /// Write the table as TSV with a header line. Gzipped when the path ends in `.gz`.
    ///
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = get_dynamic_writer(path.as_ref())?;
        self.write_tsv(&mut writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn table() -> Table {
        let schema: Schema = "origin:cat,count:float".parse().unwrap();
        Table::new(
            schema,
            vec![
                vec![Some(Value::from("de")), Some(Value::Int(3))],
                vec![Some(Value::from("not_de")), None],
            ],
        )
        .unwrap()
    }

    #[rstest]
    fn test_rows_are_coerced() {
        let t = table();
        assert_eq!(t.get(0, "count").unwrap(), Some(&Value::Float(3.0)));
        assert_eq!(t.get(1, "count").unwrap(), None);
    }

    #[rstest]
    fn test_rejects_wrong_arity() {
        let schema: Schema = "a:int".parse().unwrap();
        assert!(Table::new(schema, vec![vec![]]).is_err());
    }

    #[rstest]
    fn test_filter_eq() {
        let t = table().filter_eq("origin", &Value::from("de")).unwrap();
        assert_eq!(t.len(), 1);
    }

    #[rstest]
    fn test_from_reader() {
        let tsv = "sample\tcondition\tdepth\nS1\tctrl\t100\nS2\ttreated\tNA\n";
        let schema: Schema = "depth:int,sample:str".parse().unwrap();
        let t = Table::from_reader(std::io::Cursor::new(tsv), schema).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0, "depth").unwrap(), Some(&Value::Int(100)));
        assert_eq!(t.get(1, "sample").unwrap(), Some(&Value::from("S2")));
        assert_eq!(t.get(1, "depth").unwrap(), None);
    }

    #[rstest]
    fn test_from_reader_bad_value() {
        let tsv = "depth\nlots\n";
        let result = Table::from_reader(std::io::Cursor::new(tsv), "depth:int".parse().unwrap());
        assert!(matches!(result, Err(StoreError::Parse { line: 2, .. })));
    }

    #[rstest]
    fn test_ratio_sentinels_survive_read_back() {
        let schema: Schema = "threshold:float,gene_enrichment:float".parse().unwrap();
        let t = Table::new(
            schema.clone(),
            vec![
                vec![Some(Value::Float(0.0)), Some(Value::Float(f64::NAN))],
                vec![Some(Value::Float(1.0)), Some(Value::Float(f64::INFINITY))],
                vec![Some(Value::Float(2.0)), None],
            ],
        )
        .unwrap();
        let mut buf = Vec::new();
        t.write_tsv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "threshold\tgene_enrichment\n0\tNaN\n1\tInf\n2\tNA\n"
        );

        let back = Table::from_reader(std::io::Cursor::new(buf), schema).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.get(0, "gene_enrichment").unwrap(), Some(&Value::Float(f64::NAN)));
        assert_eq!(back.get(2, "gene_enrichment").unwrap(), None);
    }

    #[rstest]
    fn test_write_tsv() {
        let mut buf = Vec::new();
        table().write_tsv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "origin\tcount\nde\t3\nnot_de\tNA\n"
        );
    }
}
