#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A record component began but could not be completed from the bytes
    /// available.
    #[error("truncated at offset {offset}: needed {needed} bytes, got {got}")]
    Truncated {
        offset: u64,
        needed: usize,
        got: usize,
    },

    #[error("table has no column {0:?}")]
    MissingColumn(String),

    #[error("invalid value {value:?} in column {column:?}")]
    InvalidValue { column: String, value: String },

    #[error("invalid table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
