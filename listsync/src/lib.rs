//! Change-set diffing and gap-based order maintenance for live, reorderable lists.
//!
//! For adapter-level utilities (snapshot retention, selection, drag handling), see the
//! `listsync-adapter` crate.
//!
//! This crate focuses on the two algorithms a list view over a mutable record collection needs:
//!
//! - [`diff`]: turns two identity snapshots into the minimal range-based
//!   insert/remove/change operations for a list widget, collapsing a single-item move into one
//!   [`DisplayOp::ItemMoved`].
//! - [`OrderMaintainer`]: persists a total order with sparse `i64` position keys, so moving a
//!   record rewrites one position instead of renumbering the collection, and rebalances only
//!   when the space between two neighbors runs out.
//!
//! It is UI- and storage-agnostic. The host is expected to provide:
//! - a [`PositionStore`] (sorted reads, lookups by id, atomic batched writes)
//! - change notifications carrying the new identity order
//! - a list widget that consumes [`DisplayOp`]s
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod diff;
mod error;
mod key;
mod options;
mod order;
mod store;
mod types;


pub use diff::{Chunk, Delta, DeltaKind, deltas, diff, diff_with};
pub use error::{MemoryStoreError, OrderError};
pub use key::RecordKey;
pub use options::{DEFAULT_GAP, DiffOptions, MoveDetection, OrderOptions};
pub use order::{OrderMaintainer, OrderState};
pub use store::{ChangeCallback, MemoryStore, PositionStore, SubscriptionId};
pub use types::{DisplayOp, PositionWrite, Record};
