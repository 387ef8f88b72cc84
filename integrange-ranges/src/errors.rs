use integrange_core::errors::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RangesError {
    #[error("Invalid width {0}: widths must be at least 1")]
    InvalidWidth(u32),

    #[error("Cannot draw {requested} intervals without replacement from {available}")]
    SampleSize { requested: usize, available: usize },

    #[error("Coordinate out of range resizing {interval} to width {width}")]
    CoordinateOutOfRange { interval: String, width: u32 },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid pipeline config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type RangesResult<T> = std::result::Result<T, RangesError>;
