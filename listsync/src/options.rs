/// Default spacing between adjacent position keys after initial numbering or a rebalance.
pub const DEFAULT_GAP: i64 = 100;

/// Which delete/insert pairs the diff collapses into a single [`crate::DisplayOp::ItemMoved`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveDetection {
    /// Always report range operations.
    Off,
    /// Collapse a single-item relocation only when the item moved by exactly one slot.
    ///
    /// This matches what a drag gesture produces on every hop. Longer relocations are reported
    /// as a removal plus an insertion.
    #[default]
    Adjacent,
    /// Collapse a single-item relocation regardless of distance.
    Any,
}

/// Configuration for [`crate::diff_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffOptions {
    pub move_detection: MoveDetection,
    /// The new snapshot comes from a different query (a table/query switch), so nothing in
    /// the old snapshot can be reused and the result is a single `DataSetChanged`.
    ///
    /// Leave this unset when a legitimately empty list is simply being refilled.
    pub fresh_subscription: bool,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_move_detection(mut self, move_detection: MoveDetection) -> Self {
        self.move_detection = move_detection;
        self
    }

    pub fn with_fresh_subscription(mut self, fresh_subscription: bool) -> Self {
        self.fresh_subscription = fresh_subscription;
        self
    }
}

/// Configuration for [`crate::OrderMaintainer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderOptions {
    /// Spacing between adjacent position keys. Must be positive.
    ///
    /// Larger gaps make rebalances rarer at the cost of faster position growth at the ends of
    /// the list.
    pub gap: i64,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self { gap: DEFAULT_GAP }
    }
}

impl OrderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap(mut self, gap: i64) -> Self {
        self.gap = gap;
        self
    }
}
