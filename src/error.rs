use std::collections::TryReserveError;

use thiserror::Error;

/// Failures surfaced by the table. A missing key is never one of these.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Capacity {requested} is below the minimum of {minimum} buckets")]
    CapacityTooSmall { requested: usize, minimum: usize },
    #[error("Failed to allocate table storage: {0}")]
    Allocation(#[from] TryReserveError),
}
