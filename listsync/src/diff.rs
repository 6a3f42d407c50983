//! Change-set diffing between two identity snapshots.
//!
//! The edit script is computed with Myers' O(ND) algorithm over whole identities, in space
//! linear in the input length. Consecutive
//! edits between two matched identities form one [`Delta`], and the deltas are then turned into
//! [`DisplayOp`]s that can be applied to a list one after another.

use alloc::vec;
use alloc::vec::Vec;

use crate::{DiffOptions, DisplayOp, MoveDetection};

/// The kind of difference a [`Delta`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaKind {
    /// Only the revised side is non-empty.
    Insert,
    /// Only the original side is non-empty.
    Delete,
    /// Both sides are non-empty: the original span was substituted by the revised one.
    Change,
}

/// A span of one snapshot, borrowed from the diffed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a, K> {
    /// Index of the first identity of the span within its snapshot.
    ///
    /// For an empty span this is the index the span would start at.
    pub position: usize,
    pub ids: &'a [K],
}

impl<K> Chunk<'_, K> {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One contiguous difference between the original and the revised snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delta<'a, K> {
    pub original: Chunk<'a, K>,
    pub revised: Chunk<'a, K>,
}

impl<K> Delta<'_, K> {
    pub fn kind(&self) -> DeltaKind {
        match (self.original.is_empty(), self.revised.is_empty()) {
            (true, _) => DeltaKind::Insert,
            (false, true) => DeltaKind::Delete,
            (false, false) => DeltaKind::Change,
        }
    }
}

/// Computes the display operations that turn a list showing `old` into one showing `new`,
/// using [`DiffOptions::default`].
///
/// The caller keeps `new` around as the `old` of the next call.
pub fn diff<K: PartialEq>(old: &[K], new: &[K]) -> Vec<DisplayOp> {
    diff_with(old, new, &DiffOptions::default())
}

/// Same as [`diff`], with explicit options.
///
/// Operations are ordered from the end of the list toward the start, so each index is valid
/// against the list as it stands when that operation is applied.
pub fn diff_with<K: PartialEq>(old: &[K], new: &[K], options: &DiffOptions) -> Vec<DisplayOp> {
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if options.fresh_subscription {
        ltrace!(old = old.len(), new = new.len(), "diff: fresh subscription reset");
        return vec![DisplayOp::DataSetChanged];
    }

    let deltas = deltas(old, new);
    if let Some(op) = collapse_move(&deltas, options.move_detection) {
        ltrace!(old = old.len(), new = new.len(), "diff: single move");
        return vec![op];
    }

    let mut ops = Vec::with_capacity(deltas.len());
    for delta in deltas.iter().rev() {
        emit_delta(delta, &mut ops);
    }
    ltrace!(
        old = old.len(),
        new = new.len(),
        deltas = deltas.len(),
        ops = ops.len(),
        "diff"
    );
    ops
}

/// Computes the raw edit script between `old` and `new`.
///
/// Deltas are returned in ascending order and never overlap. Among the minimal scripts, the one
/// that deletes before it inserts is chosen, which makes the result deterministic. Inputs more
/// than a few dozen edits apart are first split at a middle snake; the same preference then
/// applies inside each part.
pub fn deltas<'a, K: PartialEq>(old: &'a [K], new: &'a [K]) -> Vec<Delta<'a, K>> {
    let matches = common_subsequence(old, new);

    let mut out = Vec::new();
    let (mut o, mut n) = (0usize, 0usize);
    for (x, y) in matches.into_iter().chain(core::iter::once((old.len(), new.len()))) {
        if x > o || y > n {
            out.push(Delta {
                original: Chunk {
                    position: o,
                    ids: &old[o..x],
                },
                revised: Chunk {
                    position: n,
                    ids: &new[n..y],
                },
            });
        }
        o = x + 1;
        n = y + 1;
    }
    out
}

fn collapse_move<K: PartialEq>(deltas: &[Delta<'_, K>], mode: MoveDetection) -> Option<DisplayOp> {
    if mode == MoveDetection::Off {
        return None;
    }
    let (removed, inserted) = match deltas {
        [a, b] => match (a.kind(), b.kind()) {
            (DeltaKind::Delete, DeltaKind::Insert) => (a, b),
            (DeltaKind::Insert, DeltaKind::Delete) => (b, a),
            _ => return None,
        },
        _ => return None,
    };
    let ([gone], [came]) = (removed.original.ids, inserted.revised.ids) else {
        return None;
    };
    if gone != came {
        return None;
    }

    let from = removed.original.position;
    let to = inserted.revised.position;
    if mode == MoveDetection::Adjacent && from.abs_diff(to) != 1 {
        return None;
    }
    Some(DisplayOp::ItemMoved { from, to })
}

fn emit_delta<K>(delta: &Delta<'_, K>, ops: &mut Vec<DisplayOp>) {
    let start = delta.original.position;
    let removed = delta.original.len();
    let inserted = delta.revised.len();
    match delta.kind() {
        DeltaKind::Insert => ops.push(DisplayOp::RangeInserted {
            start,
            count: inserted,
        }),
        DeltaKind::Delete => ops.push(DisplayOp::RangeRemoved {
            start,
            count: removed,
        }),
        DeltaKind::Change => {
            let common = removed.min(inserted);
            ops.push(DisplayOp::RangeChanged {
                start,
                count: common,
            });
            if removed > common {
                ops.push(DisplayOp::RangeRemoved {
                    start: start + common,
                    count: removed - common,
                });
            } else if inserted > common {
                ops.push(DisplayOp::RangeInserted {
                    start: start + common,
                    count: inserted - common,
                });
            }
        }
    }
}

// Marks a diagonal that no path of the current length can reach inside the edit grid.
const UNREACHED: isize = -1;

// Edit distance up to which the whole search trace is kept. Sub-problems needing more edits are
// first split at a middle snake, so memory stays linear in the input length.
const TRACE_LIMIT: usize = 64;

/// Returns the matched `(old_index, new_index)` pairs of a longest common subsequence, in
/// ascending order.
fn common_subsequence<K: PartialEq>(old: &[K], new: &[K]) -> Vec<(usize, usize)> {
    common_subsequence_bounded(old, new, TRACE_LIMIT)
}

/// [`common_subsequence`] with an explicit trace limit (never below 2).
pub(crate) fn common_subsequence_bounded<K: PartialEq>(
    old: &[K],
    new: &[K],
    trace_limit: usize,
) -> Vec<(usize, usize)> {
    let mut matches = Vec::new();
    collect_matches(old, new, (0, 0), trace_limit.max(2), &mut matches);
    matches
}

fn collect_matches<K: PartialEq>(
    old: &[K],
    new: &[K],
    origin: (usize, usize),
    trace_limit: usize,
    out: &mut Vec<(usize, usize)>,
) {
    let (x0, y0) = origin;
    if let Some(found) = traced_matches(old, new, trace_limit) {
        out.extend(found.into_iter().map(|(x, y)| (x0 + x, y0 + y)));
        return;
    }

    // More than `trace_limit` (>= 2) edits: trim the common ends and split the rest.
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    out.extend((0..prefix).map(|i| (x0 + i, y0 + i)));

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];
    if !old_mid.is_empty() && !new_mid.is_empty() {
        let (bx, by) = (x0 + prefix, y0 + prefix);
        match middle_snake(old_mid, new_mid) {
            Some((x, y)) => {
                collect_matches(&old_mid[..x], &new_mid[..y], (bx, by), trace_limit, out);
                collect_matches(&old_mid[x..], &new_mid[y..], (bx + x, by + y), trace_limit, out);
            }
            None => debug_assert!(false, "no middle snake ({}x{})", old_mid.len(), new_mid.len()),
        }
    }

    let (sx, sy) = (x0 + old.len() - suffix, y0 + new.len() - suffix);
    out.extend((0..suffix).map(|i| (sx + i, sy + i)));
}

/// Runs the greedy forward search, keeping every frontier, and backtracks the matches.
///
/// Returns `None` when more than `limit` edits are needed.
fn traced_matches<K: PartialEq>(old: &[K], new: &[K], limit: usize) -> Option<Vec<(usize, usize)>> {
    let n = old.len() as isize;
    let m = new.len() as isize;

    // `trace[d][i]` is the furthest x reached on diagonal `k = 2i - d` by a path with `d` edits.
    let mut trace: Vec<Vec<isize>> = Vec::new();
    'search: for d in 0..=(n + m) {
        if d as usize > limit {
            return None;
        }
        let mut row = vec![UNREACHED; (d + 1) as usize];
        for i in 0..=d {
            let k = 2 * i - d;
            let start = if d == 0 {
                0
            } else {
                match step(&trace[(d - 1) as usize], d, i, n, m) {
                    Some((x, _)) => x,
                    None => continue,
                }
            };
            let mut x = start;
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            row[i as usize] = x;
            if x >= n && y >= m {
                trace.push(row);
                break 'search;
            }
        }
        trace.push(row);
    }

    let mut matches = Vec::new();
    let (mut x, mut y) = (n, m);
    for d in (0..trace.len() as isize).rev() {
        if d == 0 {
            while x > 0 && y > 0 {
                x -= 1;
                y -= 1;
                matches.push((x as usize, y as usize));
            }
            break;
        }
        let k = x - y;
        let i = (k + d) / 2;
        let Some((mid_x, inserted)) = step(&trace[(d - 1) as usize], d, i, n, m) else {
            debug_assert!(false, "diff backtrack left the edit grid (d={d}, k={k})");
            break;
        };
        let mid_y = mid_x - k;
        while x > mid_x && y > mid_y {
            x -= 1;
            y -= 1;
            matches.push((x as usize, y as usize));
        }
        if inserted {
            y = mid_y - 1;
        } else {
            x = mid_x - 1;
        }
    }
    matches.reverse();
    Some(matches)
}

/// Picks the edit that extends a `(d - 1)`-path onto diagonal `k = 2i - d`.
///
/// Returns the x coordinate right after the edit and whether the edit was an insertion. The
/// insertion wins whenever it reaches at least as far, so on backtracking the deletions of a
/// run end up in front of its insertions.
fn step(prev: &[isize], d: isize, i: isize, n: isize, m: isize) -> Option<(isize, bool)> {
    let k = 2 * i - d;
    // Insertion: come down from diagonal k + 1 (stored at index i of the previous row).
    let down = (i < d)
        .then(|| prev[i as usize])
        .filter(|&x| x != UNREACHED && x - (k + 1) < m);
    // Deletion: come right from diagonal k - 1 (stored at index i - 1).
    let right = (i > 0)
        .then(|| prev[(i - 1) as usize])
        .filter(|&x| x != UNREACHED && x < n)
        .map(|x| x + 1);

    match (down, right) {
        (Some(dx), Some(rx)) if dx >= rx => Some((dx, true)),
        (_, Some(rx)) => Some((rx, false)),
        (Some(dx), None) => Some((dx, true)),
        (None, None) => None,
    }
}

/// Searches from both corners at once until the frontiers meet, and returns the point where
/// the middle snake of an optimal path starts.
///
/// Only two frontiers are kept. Both inputs must be non-empty.
fn middle_snake<K: PartialEq>(old: &[K], new: &[K]) -> Option<(usize, usize)> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let delta = n - m;
    let odd = delta & 1 == 1;
    let max_d = (n + m + 1) / 2;
    let offset = max_d + 1;
    let slot = |k: isize| (k + offset) as usize;

    // Forward frontier over `old`/`new`, backward frontier over both reversed.
    let mut fwd = vec![UNREACHED; (2 * offset + 1) as usize];
    let mut bwd = vec![UNREACHED; (2 * offset + 1) as usize];

    for d in 0..=max_d {
        for k in (-d..=d).step_by(2) {
            let Some(start) = frontier_step(&fwd, offset, d, k, n, m) else {
                fwd[slot(k)] = UNREACHED;
                continue;
            };
            let (mut x, mut y) = (start, start - k);
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            fwd[slot(k)] = x;

            // The backward diagonal covering forward diagonal `k`.
            let kb = delta - k;
            if odd && kb.abs() < d {
                let xb = bwd[slot(kb)];
                if xb != UNREACHED && x + xb >= n {
                    return Some((start as usize, (start - k) as usize));
                }
            }
        }

        for k in (-d..=d).step_by(2) {
            let Some(start) = frontier_step(&bwd, offset, d, k, n, m) else {
                bwd[slot(k)] = UNREACHED;
                continue;
            };
            let (mut x, mut y) = (start, start - k);
            while x < n && y < m && old[(n - 1 - x) as usize] == new[(m - 1 - y) as usize] {
                x += 1;
                y += 1;
            }
            bwd[slot(k)] = x;

            let kf = delta - k;
            if !odd && kf.abs() <= d {
                let xf = fwd[slot(kf)];
                if xf != UNREACHED && x + xf >= n {
                    return Some(((n - x) as usize, (m - y) as usize));
                }
            }
        }
    }
    None
}

/// The x reached on diagonal `k` by one more edit from a full-width frontier, with the same
/// preference as [`step`].
fn frontier_step(
    v: &[isize],
    offset: isize,
    d: isize,
    k: isize,
    n: isize,
    m: isize,
) -> Option<isize> {
    if d == 0 {
        return Some(0);
    }
    let at = |k: isize| v[(k + offset) as usize];
    let down = (k < d)
        .then(|| at(k + 1))
        .filter(|&x| x != UNREACHED && x - (k + 1) < m);
    let right = (k > -d)
        .then(|| at(k - 1))
        .filter(|&x| x != UNREACHED && x < n)
        .map(|x| x + 1);

    match (down, right) {
        (Some(dx), Some(rx)) if dx >= rx => Some(dx),
        (_, Some(rx)) => Some(rx),
        (down, None) => down,
    }
}
