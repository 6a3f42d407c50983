use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Bound;

use crate::key::KeyMap;
use crate::{MemoryStoreError, PositionWrite, Record, RecordKey};

/// The minimal contract the ordering core needs from a record store.
///
/// Reads must be identity-stable and sorted by `position`. Writes go through
/// [`PositionStore::run_in_transaction`], which must apply every write or none of them.
///
/// The lookup helpers have default implementations on top of
/// [`PositionStore::read_sorted_by_position`]; stores with an index on `position` should
/// override them.
pub trait PositionStore {
    type Key: RecordKey;
    type Error: core::error::Error + 'static;

    /// Reads every record, sorted by ascending `position`.
    fn read_sorted_by_position(&self) -> Result<Vec<Record<Self::Key>>, Self::Error>;

    fn find_by_identity(&self, id: &Self::Key) -> Result<Option<Record<Self::Key>>, Self::Error>;

    /// Applies all writes atomically.
    fn run_in_transaction(
        &mut self,
        writes: Vec<PositionWrite<Self::Key>>,
    ) -> Result<(), Self::Error>;

    fn find_by_position(&self, position: i64) -> Result<Option<Record<Self::Key>>, Self::Error> {
        Ok(self
            .read_sorted_by_position()?
            .into_iter()
            .find(|r| r.position == position))
    }

    /// The record with the greatest position strictly below `position`.
    fn neighbor_before(&self, position: i64) -> Result<Option<Record<Self::Key>>, Self::Error> {
        Ok(self
            .read_sorted_by_position()?
            .into_iter()
            .take_while(|r| r.position < position)
            .last())
    }

    /// The record with the smallest position strictly above `position`.
    fn neighbor_after(&self, position: i64) -> Result<Option<Record<Self::Key>>, Self::Error> {
        Ok(self
            .read_sorted_by_position()?
            .into_iter()
            .find(|r| r.position > position))
    }

    /// The record with the greatest position.
    fn last_record(&self) -> Result<Option<Record<Self::Key>>, Self::Error> {
        Ok(self.read_sorted_by_position()?.pop())
    }

    /// The current identity order.
    fn identities(&self) -> Result<Vec<Self::Key>, Self::Error> {
        Ok(self
            .read_sorted_by_position()?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }
}

/// A callback fired after each committed change, with the new identity order.
pub type ChangeCallback<K> = Arc<dyn Fn(&[K]) + Send + Sync>;

/// Handle returned by [`MemoryStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An in-memory [`PositionStore`] with a position index and change notifications.
///
/// Positions are unique: every mutation that would put two records on the same position is
/// rejected as a whole.
#[derive(Clone)]
pub struct MemoryStore<K> {
    positions: KeyMap<K, i64>,
    order: BTreeMap<i64, K>,
    subscribers: Vec<(SubscriptionId, ChangeCallback<K>)>,
    next_subscription: u64,
    reject_next_commit: bool,
    commits: u64,
}

impl<K: RecordKey> Default for MemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RecordKey> MemoryStore<K> {
    pub fn new() -> Self {
        Self {
            positions: KeyMap::new(),
            order: BTreeMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            reject_next_commit: false,
            commits: 0,
        }
    }

    /// Builds a store holding `ids` in order, spaced `gap` apart starting at 0.
    pub fn from_ids(
        ids: impl IntoIterator<Item = K>,
        gap: i64,
    ) -> Result<Self, MemoryStoreError> {
        let mut store = Self::new();
        let mut position = 0i64;
        for id in ids {
            store.place(id, position)?;
            position = position.saturating_add(gap);
        }
        Ok(store)
    }

    pub fn from_records(
        records: impl IntoIterator<Item = Record<K>>,
    ) -> Result<Self, MemoryStoreError> {
        let mut store = Self::new();
        for record in records {
            store.place(record.id, record.position)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position_of(&self, id: &K) -> Option<i64> {
        self.positions.get(id).copied()
    }

    /// Number of committed mutations (inserts, removals and transactions).
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Iterates over the records in position order without allocating.
    pub fn for_each_record(&self, mut f: impl FnMut(&K, i64)) {
        for (&position, id) in &self.order {
            f(id, position);
        }
    }

    pub fn insert(&mut self, id: K, position: i64) -> Result<(), MemoryStoreError> {
        self.place(id, position)?;
        self.committed();
        Ok(())
    }

    pub fn remove(&mut self, id: &K) -> Option<Record<K>> {
        let position = self.positions.remove(id)?;
        let id = self.order.remove(&position)?;
        self.committed();
        Some(Record::new(id, position))
    }

    /// Makes the next transaction fail without applying any of its writes.
    pub fn reject_next_commit(&mut self) {
        self.reject_next_commit = true;
    }

    /// Registers `f` to be called with the new identity order after every committed change.
    pub fn subscribe(&mut self, f: impl Fn(&[K]) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push((id, Arc::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    fn place(&mut self, id: K, position: i64) -> Result<(), MemoryStoreError> {
        if self.positions.contains_key(&id) {
            return Err(MemoryStoreError::DuplicateRecord);
        }
        if self.order.contains_key(&position) {
            return Err(MemoryStoreError::PositionTaken(position));
        }
        self.positions.insert(id.clone(), position);
        self.order.insert(position, id);
        Ok(())
    }

    fn committed(&mut self) {
        self.commits = self.commits.wrapping_add(1);
        if self.subscribers.is_empty() {
            return;
        }
        let ids: Vec<K> = self.order.values().cloned().collect();
        for (_, f) in &self.subscribers {
            f(&ids);
        }
    }

    fn apply(&mut self, writes: &[PositionWrite<K>]) -> Result<(), MemoryStoreError> {
        let mut previous = Vec::with_capacity(writes.len());
        let mut seen = KeyMap::new();
        for w in writes {
            let Some(&position) = self.positions.get(&w.id) else {
                return Err(MemoryStoreError::UnknownRecord);
            };
            if seen.insert(w.id.clone(), ()).is_some() {
                return Err(MemoryStoreError::DuplicateWrite);
            }
            previous.push(position);
        }

        // Detach every written record first so that exchanges do not collide with themselves.
        for position in &previous {
            self.order.remove(position);
        }
        for (placed, w) in writes.iter().enumerate() {
            if self.order.contains_key(&w.position) {
                for undo in &writes[..placed] {
                    self.order.remove(&undo.position);
                }
                for (w, &position) in writes.iter().zip(&previous) {
                    self.order.insert(position, w.id.clone());
                }
                return Err(MemoryStoreError::PositionTaken(w.position));
            }
            self.order.insert(w.position, w.id.clone());
        }
        for w in writes {
            self.positions.insert(w.id.clone(), w.position);
        }
        Ok(())
    }
}

impl<K: RecordKey> PositionStore for MemoryStore<K> {
    type Key = K;
    type Error = MemoryStoreError;

    fn read_sorted_by_position(&self) -> Result<Vec<Record<K>>, MemoryStoreError> {
        Ok(self
            .order
            .iter()
            .map(|(&position, id)| Record::new(id.clone(), position))
            .collect())
    }

    fn find_by_identity(&self, id: &K) -> Result<Option<Record<K>>, MemoryStoreError> {
        Ok(self
            .positions
            .get(id)
            .map(|&position| Record::new(id.clone(), position)))
    }

    fn run_in_transaction(
        &mut self,
        writes: Vec<PositionWrite<K>>,
    ) -> Result<(), MemoryStoreError> {
        if core::mem::take(&mut self.reject_next_commit) {
            return Err(MemoryStoreError::CommitRejected);
        }
        if writes.is_empty() {
            return Ok(());
        }
        self.apply(&writes)?;
        self.committed();
        Ok(())
    }

    fn find_by_position(&self, position: i64) -> Result<Option<Record<K>>, MemoryStoreError> {
        Ok(self
            .order
            .get(&position)
            .map(|id| Record::new(id.clone(), position)))
    }

    fn neighbor_before(&self, position: i64) -> Result<Option<Record<K>>, MemoryStoreError> {
        Ok(self
            .order
            .range(..position)
            .next_back()
            .map(|(&p, id)| Record::new(id.clone(), p)))
    }

    fn neighbor_after(&self, position: i64) -> Result<Option<Record<K>>, MemoryStoreError> {
        Ok(self
            .order
            .range((Bound::Excluded(position), Bound::Unbounded))
            .next()
            .map(|(&p, id)| Record::new(id.clone(), p)))
    }

    fn last_record(&self) -> Result<Option<Record<K>>, MemoryStoreError> {
        Ok(self
            .order
            .last_key_value()
            .map(|(&p, id)| Record::new(id.clone(), p)))
    }

    fn identities(&self) -> Result<Vec<K>, MemoryStoreError> {
        Ok(self.order.values().cloned().collect())
    }
}

impl<K: fmt::Debug> fmt::Debug for MemoryStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("order", &self.order)
            .field("subscribers", &self.subscribers.len())
            .field("commits", &self.commits)
            .finish_non_exhaustive()
    }
}
