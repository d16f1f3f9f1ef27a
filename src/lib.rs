pub mod config;
pub mod error;
pub mod hash_table;
pub mod logger;
pub mod probe;
pub mod slot;

pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use error::{Result, TableError};
pub use hash_table::{DefaultHashBuilder, HashTable, Iter, KeyIterator};
pub use probe::{CollisionResolver, LinearProbe, ProbeSequence, QuadraticProbe};
pub use slot::{Slot, SlotState};
