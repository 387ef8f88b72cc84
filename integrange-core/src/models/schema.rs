use std::collections::HashSet;
use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::models::value::{ColumnType, Value};

/// Coordinate column names. They are carried by every record and cannot be
/// declared as metadata columns of an interval store.
pub const SEQNAMES_COLUMN: &str = "seqnames";
pub const START_COLUMN: &str = "start";
pub const END_COLUMN: &str = "end";
pub const STRAND_COLUMN: &str = "strand";
pub const WIDTH_COLUMN: &str = "width";

pub const RESERVED_COLUMNS: [&str; 5] = [
    SEQNAMES_COLUMN,
    START_COLUMN,
    END_COLUMN,
    STRAND_COLUMN,
    WIDTH_COLUMN,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
}

impl Column {
    pub fn new(name: &str, dtype: ColumnType) -> Self {
        Column {
            name: name.to_string(),
            dtype,
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.dtype)
    }
}

///
/// Ordered, typed list of columns shared by every row of a store or table.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> StoreResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(StoreError::Schema(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }
        Ok(Schema { columns })
    }

    /// Whether `name` is one of the per-record coordinate fields.
    pub fn is_coordinate(name: &str) -> bool {
        matches!(
            name,
            SEQNAMES_COLUMN | START_COLUMN | END_COLUMN | STRAND_COLUMN
        )
    }

    pub fn empty() -> Self {
        Schema::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Like [`Schema::index_of`] but fails with [`StoreError::UnknownColumn`].
    pub fn require(&self, name: &str) -> StoreResult<usize> {
        self.index_of(name)
            .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))
    }

    pub fn dtype(&self, name: &str) -> Option<ColumnType> {
        self.index_of(name).map(|i| self.columns[i].dtype)
    }

    /// Return a new schema with `column` appended.
    pub fn with_column(&self, column: Column) -> StoreResult<Schema> {
        let mut columns = self.columns.clone();
        columns.push(column);
        Schema::new(columns)
    }

    /// Fails if any column uses a coordinate name.
    pub fn check_no_reserved(&self) -> StoreResult<()> {
        match self
            .columns
            .iter()
            .find(|c| RESERVED_COLUMNS.contains(&c.name.as_str()))
        {
            Some(c) => Err(StoreError::Schema(format!(
                "`{}` is a coordinate column and cannot be used as a metadata column",
                c.name
            ))),
            None => Ok(()),
        }
    }

    ///
    /// Validate a value against the column at `idx`.
    ///
    /// Integers are widened into float columns; every other mismatch is a
    /// [`StoreError::ColumnType`].
    pub fn coerce(&self, idx: usize, value: Option<Value>) -> StoreResult<Option<Value>> {
        let column = &self.columns[idx];
        match value {
            None => Ok(None),
            Some(Value::Int(i)) if column.dtype == ColumnType::Float => {
                Ok(Some(Value::Float(i as f64)))
            }
            Some(v) if v.matches(column.dtype) => Ok(Some(v)),
            Some(v) => Err(StoreError::ColumnType {
                column: column.name.clone(),
                expected: column.dtype.to_string(),
                found: v.type_name().to_string(),
            }),
        }
    }

    /// Validate and coerce a whole row in place.
    pub fn coerce_row(&self, row: Vec<Option<Value>>) -> StoreResult<Vec<Option<Value>>> {
        if row.len() != self.columns.len() {
            return Err(StoreError::Schema(format!(
                "row has {} values but the schema has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        row.into_iter()
            .enumerate()
            .map(|(i, v)| self.coerce(i, v))
            .collect()
    }
}

impl FromStr for Schema {
    type Err = StoreError;

    ///
    /// Parse a schema of the form `gene_id:str,de_log2FC:float`.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut columns = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, dtype) = part.split_once(':').ok_or_else(|| {
                StoreError::Schema(format!("expected `name:type`, found {:?}", part))
            })?;
            let dtype = dtype.trim().parse::<ColumnType>().map_err(StoreError::Schema)?;
            columns.push(Column::new(name.trim(), dtype));
        }
        Schema::new(columns)
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
