use crate::error::{Result, TableError};
use crate::probe::CollisionResolver;

pub const DEFAULT_CAPACITY: usize = 5;
pub const DEFAULT_LOAD_FACTOR: f64 = 0.7;

/// Construction parameters for a [`HashTable`](crate::hash_table::HashTable).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    /// The table doubles before an insertion would push the load above this.
    pub load_factor: f64,
    pub resolver: CollisionResolver,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            resolver: CollisionResolver::default(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_resolver(mut self, resolver: impl Into<CollisionResolver>) -> Self {
        self.resolver = resolver.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(TableError::InvalidCapacity(self.initial_capacity));
        }
        // written this way so that NaN is rejected too
        if !(self.load_factor > 0.0 && self.load_factor < 1.0) {
            return Err(TableError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }
}
