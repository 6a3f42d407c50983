use listsync::{OrderError, OrderMaintainer, PositionStore, RecordKey};

use crate::ListAdapter;

impl<K: RecordKey> ListAdapter<K> {
    /// Call this while a drag gesture hovers the row at `dragging_index` over `target_index`.
    ///
    /// Both indexes refer to the snapshot on screen. Neighbors swap positions directly. Longer
    /// hops move the dragged record in front of the target when dragging up and behind it when
    /// dragging down.
    ///
    /// The snapshot is left alone: the store's change notification (or a call to
    /// [`ListAdapter::sync_from`]) brings the move back as an `ItemMoved`.
    pub fn on_move<S>(
        &self,
        maintainer: &mut OrderMaintainer<S>,
        dragging_index: usize,
        target_index: usize,
    ) -> Result<(), OrderError<S::Error>>
    where
        S: PositionStore<Key = K>,
    {
        if dragging_index == target_index {
            return Ok(());
        }
        let (Some(dragging), Some(target)) = (
            self.ids.get(dragging_index),
            self.ids.get(target_index),
        ) else {
            return Err(OrderError::InvalidArguments);
        };

        if dragging_index.abs_diff(target_index) == 1 {
            maintainer.swap_adjacent(dragging, target)
        } else if dragging_index > target_index {
            maintainer.move_to_before(dragging, target)
        } else {
            maintainer.move_to_after(dragging, target)
        }
    }
}
