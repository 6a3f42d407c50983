use thiserror::Error;

/// Why a reorder request did not take effect.
///
/// Every variant leaves the store exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError<E> {
    /// Checked position arithmetic would have overflowed `i64`.
    #[error("position arithmetic overflowed")]
    Overflow,
    /// No free position between the neighbors, even after a rebalance.
    #[error("no free position between the neighbors after rebalancing")]
    NoSpace,
    /// Missing neighbors, unknown record ids, or neighbors out of order.
    #[error("invalid reorder arguments")]
    InvalidArguments,
    /// The configured gap is not a positive integer.
    #[error("gap must be positive, got {0}")]
    InvalidGap(i64),
    #[error("store operation failed")]
    Store(#[source] E),
}

/// Errors reported by [`crate::MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    #[error("no record with the given id")]
    UnknownRecord,
    #[error("a record with the given id already exists")]
    DuplicateRecord,
    #[error("position {0} is already taken")]
    PositionTaken(i64),
    #[error("the same record was written twice in one transaction")]
    DuplicateWrite,
    #[error("the transaction was rejected")]
    CommitRejected,
}
