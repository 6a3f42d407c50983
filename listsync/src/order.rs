use alloc::vec;
use alloc::vec::Vec;

use crate::{OrderError, OrderOptions, PositionStore, PositionWrite, Record};

/// Mutable bookkeeping owned by an [`OrderMaintainer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderState {
    /// Position handed to the next appended record.
    pub next_position: i64,
    /// Number of completed rebalances.
    pub rebalances: u64,
}

type OrderResult<T, S> = Result<T, OrderError<<S as PositionStore>::Error>>;

/// Maintains a total order over the records of a [`PositionStore`] using sparse position keys.
///
/// Moving a record rewrites only that record's position, picked halfway between its new
/// neighbors. When two neighbors leave no room in between, the move is retried once against the
/// renumbered layout a `rebalance` would produce, and the renumbering and the move commit
/// together.
///
/// Every mutation runs as exactly one store transaction. When a method returns an error, no
/// position has changed.
#[derive(Clone, Debug)]
pub struct OrderMaintainer<S> {
    store: S,
    options: OrderOptions,
    state: OrderState,
}

impl<S: PositionStore> OrderMaintainer<S> {
    pub fn new(store: S, options: OrderOptions) -> OrderResult<Self, S> {
        if options.gap <= 0 {
            lwarn!(gap = options.gap, "OrderMaintainer::new: non-positive gap");
            return Err(OrderError::InvalidGap(options.gap));
        }
        let next_position = match store.last_record().map_err(OrderError::Store)? {
            Some(last) => last.position.saturating_add(options.gap),
            None => 0,
        };
        ldebug!(gap = options.gap, next_position, "OrderMaintainer::new");
        Ok(Self {
            store,
            options,
            state: OrderState {
                next_position,
                rebalances: 0,
            },
        })
    }

    pub fn options(&self) -> &OrderOptions {
        &self.options
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn rebalance_count(&self) -> u64 {
        self.state.rebalances
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the position for a record about to be appended at the end of the list, and
    /// advances the append counter by one gap.
    ///
    /// If the tail of the list has run into `i64::MAX`, the collection is rebalanced first.
    pub fn next_append_position(&mut self) -> OrderResult<i64, S> {
        let mut position = self.state.next_position;
        if let Some(last) = self.store.last_record().map_err(OrderError::Store)? {
            if last.position >= position {
                position = match last.position.checked_add(self.options.gap) {
                    Some(p) => p,
                    None => {
                        self.rebalance()?;
                        self.state.next_position
                    }
                };
            }
        }
        self.state.next_position = position.saturating_add(self.options.gap);
        Ok(position)
    }

    /// Moves `moving` so that it sits between `left` and `right`.
    ///
    /// `left` and `right` must be adjacent in the current order; this is not verified. Passing
    /// only `left` places `moving` one gap after it (use this for the last record), passing only
    /// `right` places it one gap before it (for the first record).
    ///
    /// Moving a record next to itself is a no-op.
    pub fn move_to_between(
        &mut self,
        moving: &S::Key,
        left: Option<&S::Key>,
        right: Option<&S::Key>,
    ) -> OrderResult<(), S> {
        if left.is_none() && right.is_none() {
            lwarn!("move_to_between: no neighbor given");
            return Err(OrderError::InvalidArguments);
        }
        if left == Some(moving) || right == Some(moving) {
            return Ok(());
        }
        if self.record(moving)?.is_none() {
            lwarn!("move_to_between: unknown record");
            return Err(OrderError::InvalidArguments);
        }

        let target = match self.free_position_between(moving, left, right)? {
            Some(target) => target,
            None => return self.rebalance_and_move(moving, left, right),
        };

        self.commit(vec![PositionWrite::new(moving.clone(), target)])?;
        if target >= self.state.next_position {
            self.state.next_position = target.saturating_add(self.options.gap);
        }
        ltrace!(target, "move_to_between");
        Ok(())
    }

    /// Retries a move against the renumbered layout and commits the renumbering together with
    /// the move. Nothing is written when even the renumbered layout has no room.
    fn rebalance_and_move(
        &mut self,
        moving: &S::Key,
        left: Option<&S::Key>,
        right: Option<&S::Key>,
    ) -> OrderResult<(), S> {
        let (plan, next_position) = self.renumbered()?;
        let planned = |id: Option<&S::Key>| -> OrderResult<Option<i64>, S> {
            let Some(id) = id else {
                return Ok(None);
            };
            match plan.iter().find(|(record, _)| &record.id == id) {
                Some(&(_, position)) => Ok(Some(position)),
                None => Err(OrderError::InvalidArguments),
            }
        };

        let target = target_between(planned(left)?, planned(right)?, self.options.gap)?
            .filter(|&target| {
                !plan
                    .iter()
                    .any(|(record, position)| *position == target && &record.id != moving)
            });
        let Some(target) = target else {
            lwarn!(gap = self.options.gap, "move_to_between: no space after rebalance");
            return Err(OrderError::NoSpace);
        };

        let mut writes: Vec<_> = plan
            .into_iter()
            .filter(|(record, position)| &record.id != moving && record.position != *position)
            .map(|(record, position)| PositionWrite::new(record.id, position))
            .collect();
        writes.push(PositionWrite::new(moving.clone(), target));
        ldebug!(
            rewrites = writes.len(),
            target,
            gap = self.options.gap,
            "move_to_between: rebalance"
        );

        self.commit(writes)?;
        self.state.next_position = next_position.max(target.saturating_add(self.options.gap));
        self.state.rebalances = self.state.rebalances.saturating_add(1);
        Ok(())
    }

    /// Moves `moving` directly in front of `target`.
    pub fn move_to_before(&mut self, moving: &S::Key, target: &S::Key) -> OrderResult<(), S> {
        if moving == target {
            return Ok(());
        }
        let Some(anchor) = self.record(target)? else {
            lwarn!("move_to_before: unknown target");
            return Err(OrderError::InvalidArguments);
        };
        let before = self
            .store
            .neighbor_before(anchor.position)
            .map_err(OrderError::Store)?;
        self.move_to_between(moving, before.as_ref().map(|r| &r.id), Some(target))
    }

    /// Moves `moving` directly behind `target`.
    pub fn move_to_after(&mut self, moving: &S::Key, target: &S::Key) -> OrderResult<(), S> {
        if moving == target {
            return Ok(());
        }
        let Some(anchor) = self.record(target)? else {
            lwarn!("move_to_after: unknown target");
            return Err(OrderError::InvalidArguments);
        };
        let after = self
            .store
            .neighbor_after(anchor.position)
            .map_err(OrderError::Store)?;
        self.move_to_between(moving, Some(target), after.as_ref().map(|r| &r.id))
    }

    /// Exchanges the positions of two records. Never rebalances.
    pub fn swap_adjacent(&mut self, a: &S::Key, b: &S::Key) -> OrderResult<(), S> {
        if a == b {
            return Ok(());
        }
        let (Some(ra), Some(rb)) = (self.record(a)?, self.record(b)?) else {
            lwarn!("swap_adjacent: unknown record");
            return Err(OrderError::InvalidArguments);
        };
        self.commit(vec![
            PositionWrite::new(ra.id, rb.position),
            PositionWrite::new(rb.id, ra.position),
        ])?;
        ltrace!(a = ra.position, b = rb.position, "swap_adjacent");
        Ok(())
    }

    /// Renumbers every record to `index * gap`, keeping the current order.
    ///
    /// This is the only O(n) operation. The move methods call it on their own when they run out
    /// of space; calling it directly is only needed after repairing a store by hand.
    pub fn rebalance(&mut self) -> OrderResult<(), S> {
        let (plan, next_position) = self.renumbered()?;
        let records = plan.len();
        let writes: Vec<_> = plan
            .into_iter()
            .filter(|(record, position)| record.position != *position)
            .map(|(record, position)| PositionWrite::new(record.id, position))
            .collect();
        ldebug!(
            records,
            rewrites = writes.len(),
            gap = self.options.gap,
            "rebalance"
        );

        self.commit(writes)?;
        self.state.next_position = next_position;
        self.state.rebalances = self.state.rebalances.saturating_add(1);
        Ok(())
    }

    /// Every record in order, paired with its position after a rebalance, plus the append
    /// position that follows them. Reads the whole store before anything is written.
    fn renumbered(&self) -> OrderResult<(Vec<(Record<S::Key>, i64)>, i64), S> {
        let snapshot = self
            .store
            .read_sorted_by_position()
            .map_err(OrderError::Store)?;
        let next_position = self.slot(snapshot.len())?;
        let plan = snapshot
            .into_iter()
            .enumerate()
            .map(|(index, record)| Ok((record, self.slot(index)?)))
            .collect::<OrderResult<Vec<_>, S>>()?;
        Ok((plan, next_position))
    }

    fn record(&self, id: &S::Key) -> OrderResult<Option<Record<S::Key>>, S> {
        self.store.find_by_identity(id).map_err(OrderError::Store)
    }

    fn slot(&self, index: usize) -> OrderResult<i64, S> {
        i64::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(self.options.gap))
            .ok_or_else(|| {
                lwarn!(index, gap = self.options.gap, "rebalance: position overflow");
                OrderError::Overflow
            })
    }

    fn commit(&mut self, writes: Vec<PositionWrite<S::Key>>) -> OrderResult<(), S> {
        if writes.is_empty() {
            return Ok(());
        }
        self.store
            .run_in_transaction(writes)
            .map_err(OrderError::Store)
    }

    /// Computes the target position for `moving` and checks that nobody else holds it.
    ///
    /// `Ok(None)` means the neighbors leave no room and a rebalance is needed.
    fn free_position_between(
        &self,
        moving: &S::Key,
        left: Option<&S::Key>,
        right: Option<&S::Key>,
    ) -> OrderResult<Option<i64>, S> {
        let left = self.neighbor(left)?;
        let right = self.neighbor(right)?;
        let Some(target) = target_between(left, right, self.options.gap)? else {
            return Ok(None);
        };

        match self
            .store
            .find_by_position(target)
            .map_err(OrderError::Store)?
        {
            Some(other) if &other.id != moving => Ok(None),
            _ => Ok(Some(target)),
        }
    }

    fn neighbor(&self, id: Option<&S::Key>) -> OrderResult<Option<i64>, S> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.record(id)? {
            Some(r) => Ok(Some(r.position)),
            None => {
                lwarn!("move_to_between: unknown neighbor");
                Err(OrderError::InvalidArguments)
            }
        }
    }
}

/// The position `gap` after `left`, `gap` before `right`, or the midpoint between both.
///
/// `Ok(None)` when no integer lies strictly between the two neighbors.
fn target_between<E>(
    left: Option<i64>,
    right: Option<i64>,
    gap: i64,
) -> Result<Option<i64>, OrderError<E>> {
    match (left, right) {
        (Some(l), Some(r)) => {
            if l >= r {
                lwarn!(left = l, right = r, "move_to_between: neighbors out of order");
                return Err(OrderError::InvalidArguments);
            }
            let mid = floor_mean(l, r);
            Ok((mid > l).then_some(mid))
        }
        (None, Some(r)) => r.checked_sub(gap).map(Some).ok_or_else(|| {
            lwarn!(right = r, gap, "move_to_between: position underflow");
            OrderError::Overflow
        }),
        (Some(l), None) => l.checked_add(gap).map(Some).ok_or_else(|| {
            lwarn!(left = l, gap, "move_to_between: position overflow");
            OrderError::Overflow
        }),
        (None, None) => Err(OrderError::InvalidArguments),
    }
}

/// `floor((a + b) / 2)` without intermediate overflow.
///
/// Shared bits plus half the differing bits; the shift is arithmetic, so the result rounds
/// toward negative infinity.
pub(crate) fn floor_mean(a: i64, b: i64) -> i64 {
    (a & b) + ((a ^ b) >> 1)
}
