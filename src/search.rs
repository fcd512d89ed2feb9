//! Adaptive binary search with positional hysteresis (C7, spec §4.7).
//!
//! The vector remembers the outcome of its last search in `bottom` and a
//! drift estimator `balance`. A search that starts near the previous key
//! expands outward from `bottom` in geometric doubling steps rather than
//! bisecting the whole range, which pays off for callers that probe nearby
//! keys repeatedly (e.g. `add_ordered` appending a near-sorted stream).
//! `balance`/`bottom` mutate on every call, so this is not a pure accessor
//! and runs under the primitive lock like every other mutating op.

use core::cmp::Ordering;

use crate::lock::Priority;
use crate::vector::DynVec;

/// Outcome of an adaptive/monobound search: the key's position if present,
/// or the index at which it would need to be inserted to keep the sequence
/// ordered (spec §4.7 step 5 — this doubles as `add_ordered`'s lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// The key was found at this logical index.
    Found(usize),
    /// The key is absent; this is where it belongs to keep order.
    Insertion(usize),
}

impl SearchResult {
    /// The index this result carries, whichever variant it is.
    pub fn index(self) -> usize {
        match self {
            SearchResult::Found(i) | SearchResult::Insertion(i) => i,
        }
    }

    /// Whether the key was actually present.
    pub fn is_found(self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
}

/// Below this balance, or above this size, fall back to a plain monobound
/// search instead of trusting the positional hysteresis (spec §4.7 step 1).
const BALANCE_CEILING: usize = 32;
const ADAPTIVE_MIN_SIZE: usize = 64;

impl<T> DynVec<T> {
    /// `bsearch(cmp, key)` (spec §4.7): adaptive binary search with
    /// positional memory.
    pub fn bsearch_by<F>(&mut self, mut cmp: F) -> SearchResult
    where
        F: FnMut(&T) -> Ordering,
    {
        let _g = self.lock(Priority::Primitive);
        let size = self.len();
        if size == 0 {
            self.balance = 0;
            self.bottom = 0;
            return SearchResult::Insertion(0);
        }

        let use_monobound = self.balance >= BALANCE_CEILING || size <= ADAPTIVE_MIN_SIZE;
        let result = if use_monobound {
            self.monobound(0, size, &mut cmp)
        } else {
            self.adaptive(size, &mut cmp)
        };

        let new_bottom = result.index().min(size.saturating_sub(1));
        let drift = new_bottom.abs_diff(self.bottom);
        self.balance = drift;
        self.bottom = new_bottom;
        result
    }

    fn compare_at(&self, logical: usize, cmp: &mut impl FnMut(&T) -> Ordering) -> Ordering {
        let physical = self.physical_index(logical);
        let item = unsafe { self.backend.get(physical) };
        cmp(item)
    }

    /// Plain binary search over `[lo, hi)`, "monobound" in the sense that it
    /// tracks a single shrinking bound rather than independent `lo`/`hi`
    /// cursors that can desync.
    fn monobound(&self, lo: usize, hi: usize, cmp: &mut impl FnMut(&T) -> Ordering) -> SearchResult {
        let mut lo = lo;
        let mut hi = hi;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.compare_at(mid, cmp) {
                Ordering::Equal => return SearchResult::Found(mid),
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
            }
        }
        SearchResult::Insertion(lo)
    }

    /// Expands outward from `bottom` in doubling steps (spec §4.7 step 2),
    /// then finalizes with a monobound search inside the bracketing window
    /// (step 3).
    fn adaptive(&self, size: usize, cmp: &mut impl FnMut(&T) -> Ordering) -> SearchResult {
        let start = self.bottom.min(size - 1);
        let order_at_start = self.compare_at(start, cmp);
        if order_at_start == Ordering::Equal {
            return SearchResult::Found(start);
        }

        let mut step = 1usize;
        if order_at_start == Ordering::Greater {
            // Key is less than data[start]: expand leftward.
            let mut lo = start;
            loop {
                if lo == 0 {
                    return self.monobound(0, start, cmp);
                }
                let probe = lo.saturating_sub(step);
                match self.compare_at(probe, cmp) {
                    Ordering::Equal => return SearchResult::Found(probe),
                    Ordering::Greater => {
                        lo = probe;
                        step = step.saturating_mul(2).max(1);
                        if probe == 0 {
                            return self.monobound(0, lo, cmp);
                        }
                    }
                    Ordering::Less => return self.monobound(probe + 1, lo, cmp),
                }
            }
        } else {
            // Key is greater than data[start]: expand rightward.
            let mut hi = start;
            loop {
                if hi + 1 >= size {
                    return self.monobound(hi + 1, size, cmp);
                }
                let probe = (hi + step).min(size - 1);
                match self.compare_at(probe, cmp) {
                    Ordering::Equal => return SearchResult::Found(probe),
                    Ordering::Less => {
                        hi = probe;
                        step = step.saturating_mul(2).max(1);
                        if probe + 1 >= size {
                            return self.monobound(hi + 1, size, cmp);
                        }
                    }
                    Ordering::Greater => return self.monobound(hi + 1, probe, cmp),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Elem;

    fn sorted(vals: &[i32]) -> DynVec<i32> {
        let mut d = DynVec::new(8).unwrap();
        for &x in vals {
            d.push(Elem::Value(x)).unwrap();
        }
        d
    }

    #[test]
    fn finds_present_key() {
        let mut d = sorted(&[1, 2, 3, 5, 8, 9]);
        let found = d.bsearch_by(|x| x.cmp(&8));
        assert_eq!(found, SearchResult::Found(4));
    }

    #[test]
    fn reports_insertion_point_for_absent_key() {
        let mut d = sorted(&[1, 2, 3, 5, 8, 9]);
        let got = d.bsearch_by(|x| x.cmp(&4));
        assert_eq!(got, SearchResult::Insertion(3));
    }

    #[test]
    fn adaptive_path_matches_monobound_on_large_sorted_range() {
        let vals: alloc::vec::Vec<i32> = (0..200).map(|x| x * 2).collect();
        let mut d = sorted(&vals);
        for &target in &[0, 50, 200, 398, 399] {
            let got = d.bsearch_by(|x| x.cmp(&target));
            if target % 2 == 0 && target <= 398 {
                assert!(got.is_found(), "expected {target} to be found");
            } else {
                assert!(!got.is_found());
            }
        }
    }

    #[test]
    fn empty_vector_reports_insertion_zero() {
        let mut d: DynVec<i32> = DynVec::new(4).unwrap();
        let got = d.bsearch_by(|x| x.cmp(&1));
        assert_eq!(got, SearchResult::Insertion(0));
    }
}
