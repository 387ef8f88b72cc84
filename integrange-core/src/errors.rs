use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Genome mismatch: {left} vs {right}")]
    GenomeMismatch { left: String, right: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column `{column}` expects {expected}, found {found}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Invalid interval {0}: start must not exceed end")]
    InvalidInterval(String),

    #[error("Error parsing line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
