use alloc::vec::Vec;

use listsync::{DisplayOp, RecordKey};

use crate::ListAdapter;

/// A restorable snapshot of a [`ListAdapter`]'s selection, e.g. for persisting UI state across
/// a restart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionState {
    /// Selected row indexes, ascending.
    pub selected: Vec<usize>,
}

/// Selection by row index.
///
/// Every mutator returns the `RangeChanged` operations for the rows whose selected state
/// changed, so the list widget can redraw just those rows. Out-of-range indexes are ignored.
impl<K: RecordKey> ListAdapter<K> {
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected row indexes, ascending.
    pub fn selected_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// Identities of the selected rows, in display order.
    pub fn selected_ids(&self) -> impl Iterator<Item = &K> + '_ {
        self.selected.iter().filter_map(|&i| self.ids.get(i))
    }

    pub fn set_selected(&mut self, selected: bool, index: usize) -> Vec<DisplayOp> {
        if index >= self.ids.len() || selected == self.selected.contains(&index) {
            return Vec::new();
        }
        if selected {
            self.selected.insert(index);
            self.last_selected = Some(index);
        } else {
            self.selected.remove(&index);
            self.last_selected = None;
        }
        self.notify_selection_changed();
        changed_runs([index])
    }

    pub fn toggle_selected(&mut self, index: usize) -> Vec<DisplayOp> {
        let selected = !self.selected.contains(&index);
        self.set_selected(selected, index)
    }

    /// Extends the selection from the last selected row to `index` (shift-click).
    ///
    /// Tapping a selected row deselects it. Without an anchor (nothing selected yet, or the last
    /// tap deselected a row) this selects `index` alone and makes it the anchor. A completed
    /// extension consumes the anchor.
    pub fn extend_selection_to(&mut self, index: usize) -> Vec<DisplayOp> {
        if index >= self.ids.len() {
            return Vec::new();
        }
        if self.selected.contains(&index) {
            return self.set_selected(false, index);
        }
        let Some(anchor) = self.last_selected.take() else {
            return self.set_selected(true, index);
        };

        let range = if anchor < index {
            anchor + 1..index + 1
        } else {
            index..anchor
        };
        let newly: Vec<usize> = range.filter(|&i| self.selected.insert(i)).collect();
        if newly.is_empty() {
            return Vec::new();
        }
        self.notify_selection_changed();
        changed_runs(newly)
    }

    pub fn select_all(&mut self) -> Vec<DisplayOp> {
        let newly: Vec<usize> = (0..self.ids.len())
            .filter(|&i| self.selected.insert(i))
            .collect();
        if newly.is_empty() {
            return Vec::new();
        }
        self.notify_selection_changed();
        changed_runs(newly)
    }

    /// Deselects every row, returning the redraws of the rows that were selected.
    pub fn clear_selections(&mut self) -> Vec<DisplayOp> {
        self.last_selected = None;
        if self.selected.is_empty() {
            return Vec::new();
        }
        let previous = core::mem::take(&mut self.selected);
        self.notify_selection_changed();
        changed_runs(previous)
    }

    pub fn selection_state(&self) -> SelectionState {
        SelectionState {
            selected: self.selected.iter().copied().collect(),
        }
    }

    /// Replaces the selection with `state`, dropping indexes past the end of the list.
    pub fn restore_selection_state(&mut self, state: &SelectionState) -> Vec<DisplayOp> {
        let len = self.ids.len();
        let restored = state.selected.iter().copied().filter(|&i| i < len).collect();
        let previous = core::mem::replace(&mut self.selected, restored);
        self.last_selected = None;

        let changed: Vec<usize> = previous
            .symmetric_difference(&self.selected)
            .copied()
            .collect();
        if changed.is_empty() {
            return Vec::new();
        }
        self.notify_selection_changed();
        changed_runs(changed)
    }
}

/// Coalesces ascending row indexes into `RangeChanged` runs.
fn changed_runs(indexes: impl IntoIterator<Item = usize>) -> Vec<DisplayOp> {
    let mut ops = Vec::new();
    let mut run: Option<(usize, usize)> = None;
    for i in indexes {
        run = match run {
            Some((start, count)) if start + count == i => Some((start, count + 1)),
            Some((start, count)) => {
                ops.push(DisplayOp::RangeChanged { start, count });
                Some((i, 1))
            }
            None => Some((i, 1)),
        };
    }
    if let Some((start, count)) = run {
        ops.push(DisplayOp::RangeChanged { start, count });
    }
    ops
}
