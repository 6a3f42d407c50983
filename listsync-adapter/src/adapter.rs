use alloc::collections::BTreeSet;
use alloc::sync::Arc;
use alloc::vec::Vec;

use listsync::{DiffOptions, DisplayOp, PositionStore, RecordKey};

/// A callback fired after the selection changed, with the new number of selected rows.
pub type SelectionCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// A framework-neutral list adapter that keeps the identity snapshot currently on screen.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_results_changed` (or `sync_from`) when the underlying collection reports a change
/// - `replace_results` when the list switches to a different query
/// - the selection methods on user input
///
/// Every method that affects what is on screen returns the [`DisplayOp`]s the list widget must
/// apply, in order.
#[derive(Clone)]
pub struct ListAdapter<K> {
    pub(crate) ids: Vec<K>,
    options: DiffOptions,
    pub(crate) selected: BTreeSet<usize>,
    pub(crate) last_selected: Option<usize>,
    on_selection_change: Option<SelectionCallback>,
}

impl<K: RecordKey> Default for ListAdapter<K> {
    fn default() -> Self {
        Self::new(DiffOptions::default())
    }
}

impl<K: RecordKey> ListAdapter<K> {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            ids: Vec::new(),
            // Per call, not per adapter.
            options: options.with_fresh_subscription(false),
            selected: BTreeSet::new(),
            last_selected: None,
            on_selection_change: None,
        }
    }

    /// Creates an adapter that already shows `ids`, e.g. after the host rendered them itself.
    pub fn with_snapshot(ids: Vec<K>, options: DiffOptions) -> Self {
        let mut adapter = Self::new(options);
        adapter.ids = ids;
        adapter
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DiffOptions) {
        self.options = options.with_fresh_subscription(false);
    }

    pub fn set_on_selection_change(&mut self, f: Option<impl Fn(usize) + Send + Sync + 'static>) {
        self.on_selection_change = f.map(|f| Arc::new(f) as _);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The identity snapshot currently on screen.
    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    pub fn id_at(&self, index: usize) -> Option<&K> {
        self.ids.get(index)
    }

    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.iter().position(|k| k == id)
    }

    /// Call this when the underlying collection changed.
    ///
    /// Selections are cleared first, since row indexes are about to shift. The returned batch
    /// holds the redraws of the previously selected rows followed by the diff against the
    /// retained snapshot; `new_ids` becomes the retained snapshot.
    pub fn on_results_changed(&mut self, new_ids: Vec<K>) -> Vec<DisplayOp> {
        let mut ops = self.clear_selections();
        ops.extend(listsync::diff_with(&self.ids, &new_ids, &self.options));
        self.ids = new_ids;
        ops
    }

    /// Call this when the list switches to a different query or table.
    ///
    /// Nothing on screen can be reused, so the result is a single `DataSetChanged` (unless the
    /// list was and stays empty). Selections are dropped without redraws.
    pub fn replace_results(&mut self, new_ids: Vec<K>) -> Vec<DisplayOp> {
        self.drop_selection();
        let options = self.options.with_fresh_subscription(true);
        let ops = listsync::diff_with(&self.ids, &new_ids, &options);
        self.ids = new_ids;
        ops
    }

    /// Detaches the adapter from its results, leaving an empty list.
    pub fn close(&mut self) -> Vec<DisplayOp> {
        self.replace_results(Vec::new())
    }

    /// Reads the current identity order from `store` and applies it as a change notification.
    pub fn sync_from<S>(&mut self, store: &S) -> Result<Vec<DisplayOp>, S::Error>
    where
        S: PositionStore<Key = K>,
    {
        let ids = store.identities()?;
        Ok(self.on_results_changed(ids))
    }

    pub(crate) fn notify_selection_changed(&self) {
        if let Some(cb) = &self.on_selection_change {
            cb(self.selected.len());
        }
    }

    fn drop_selection(&mut self) {
        let had_selection = !self.selected.is_empty();
        self.selected.clear();
        self.last_selected = None;
        if had_selection {
            self.notify_selection_changed();
        }
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for ListAdapter<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListAdapter")
            .field("ids", &self.ids)
            .field("options", &self.options)
            .field("selected", &self.selected)
            .field("last_selected", &self.last_selected)
            .finish_non_exhaustive()
    }
}
