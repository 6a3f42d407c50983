/// A record as seen by the ordering core: its identity and its position key.
///
/// Records are owned by the store. The core only reads them and asks the store to rewrite
/// `position`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record<K> {
    pub id: K,
    /// Display order key. Strictly increasing with display order, not contiguous.
    pub position: i64,
}

impl<K> Record<K> {
    pub fn new(id: K, position: i64) -> Self {
        Self { id, position }
    }
}

/// A single position rewrite inside a store transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionWrite<K> {
    pub id: K,
    pub position: i64,
}

impl<K> PositionWrite<K> {
    pub fn new(id: K, position: i64) -> Self {
        Self { id, position }
    }
}

/// An incremental update for a list widget.
///
/// Indexes refer to the list as it is at the moment the operation is applied, so a batch must
/// be applied in the order it was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayOp {
    RangeInserted { start: usize, count: usize },
    RangeRemoved { start: usize, count: usize },
    /// Rows whose identity changed in place; the row count is unchanged.
    RangeChanged { start: usize, count: usize },
    ItemMoved { from: usize, to: usize },
    /// Nothing about the previous rows can be reused.
    DataSetChanged,
}
