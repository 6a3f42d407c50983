//! Adapter utilities for the `listsync` crate.
//!
//! The `listsync` crate is UI- and storage-agnostic and focuses on the diff and ordering
//! algorithms. This crate provides the small, framework-neutral glue a list view needs on top:
//!
//! - Snapshot retention, so every change notification is diffed against what is on screen
//! - Multi-selection by row index, reported as display operations
//! - Translating a drag gesture into a reorder through an `OrderMaintainer`
//!
//! This crate is intentionally framework-agnostic (no bindings to any widget toolkit).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod adapter;
mod drag;
mod selection;


pub use adapter::{ListAdapter, SelectionCallback};
pub use selection::SelectionState;
