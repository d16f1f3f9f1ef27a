use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("key not found in hash table")]
    NotFound,
    #[error("no free slot along the probe sequence of a table with capacity {capacity}")]
    TableFull { capacity: usize },
    #[error("capacity must be greater than zero, got {0}")]
    InvalidCapacity(usize),
    #[error("load factor must be in the open interval (0, 1), got {0}")]
    InvalidLoadFactor(f64),
    #[error("invalid collision resolver: {0}")]
    InvalidResolver(String),
    #[error("cannot grow the table to {requested} slots")]
    CapacityOverflow { requested: usize },
}

pub type Result<T> = std::result::Result<T, TableError>;
