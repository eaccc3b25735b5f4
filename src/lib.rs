//! A separately chained hash table from integer keys to integer values, using
//! multiplicative hashing and a bucket array that doubles when half full and
//! halves when an eighth full.
//!
//! ```
//! use chaining_table::HashTable;
//!
//! let mut table = HashTable::new();
//! table.insert(15, 20).unwrap();
//!
//! assert_eq!(Some(20), table.get(15));
//! assert_eq!(Some(20), table.remove(15));
//! assert_eq!(None, table.get(15));
//! ```

mod error;
mod hash_table;
mod linked_list;
mod multiplicative_hasher;

pub use error::TableError;
pub use hash_table::{BucketIter, DuplicatePolicy, HashTable, DEFAULT_CAPACITY, MIN_CAPACITY};
pub use multiplicative_hasher::{MultiplicativeHasher, GOLDEN_RATIO_FRACTION};

/// Keys stored in the table.
pub type Key = i64;

/// Values stored in the table.
pub type Value = i64;

/// Installs env_logger once for the whole test binary. `RUST_LOG` overrides
/// the level.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
