//! Sort (C7, spec §4.7): a three-way-partition quicksort over live logical
//! indices. Elements equal to the pivot are pushed to both ends of the
//! current sub-range during partitioning and swapped into the middle at the
//! end, so duplicate-heavy inputs keep their comparisons minimal and avoid
//! the classic two-way-partition O(n^2) degenerate case. Recursion only
//! descends into the two strictly-less/strictly-greater sub-ranges.

use core::cmp::Ordering;

use crate::lock::Priority;
use crate::vector::DynVec;

impl<T> DynVec<T> {
    /// Sorts the live range in place using `cmp`. Runs under the primitive
    /// lock for the whole call, matching every other single-pass C5/C6
    /// operation (the comparator itself must not try to re-enter the
    /// vector).
    pub fn sort_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let _g = self.lock(Priority::Primitive);
        let size = self.len();
        if size < 2 {
            return;
        }
        self.quicksort(0, size - 1, &mut cmp);
    }

    fn quicksort<F>(&mut self, lo: usize, hi: usize, cmp: &mut F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if lo >= hi {
            return;
        }
        // Small ranges: a plain insertion sort is cheaper than recursing
        // through the three-way partition machinery.
        if hi - lo < 12 {
            self.insertion_sort(lo, hi, cmp);
            return;
        }

        let (lt, gt) = self.three_way_partition(lo, hi, cmp);
        if lt > lo {
            self.quicksort(lo, lt - 1, cmp);
        }
        if gt < hi {
            self.quicksort(gt + 1, hi, cmp);
        }
    }

    /// Dutch-national-flag partition: after this call, `[lo, lt)` holds
    /// elements `< pivot`, `[lt, gt]` holds elements `== pivot`, and `(gt,
    /// hi]` holds elements `> pivot`. Returns `(lt, gt)`.
    fn three_way_partition<F>(&mut self, lo: usize, hi: usize, cmp: &mut F) -> (usize, usize)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let pivot_index = lo + (hi - lo) / 2;
        self.swap_physical(lo, pivot_index);

        let mut lt = lo;
        let mut gt = hi;
        let mut i = lo + 1;

        while i <= gt {
            let ord = {
                let pi = self.physical_index(i);
                let pl = self.physical_index(lt);
                let a = unsafe { self.backend.get(pi) };
                let b = unsafe { self.backend.get(pl) };
                cmp(a, b)
            };
            match ord {
                Ordering::Less => {
                    self.swap_physical(lt, i);
                    lt += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    self.swap_physical(i, gt);
                    if gt == 0 {
                        break;
                    }
                    gt -= 1;
                }
                Ordering::Equal => {
                    i += 1;
                }
            }
        }
        (lt, gt)
    }

    fn insertion_sort<F>(&mut self, lo: usize, hi: usize, cmp: &mut F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut i = lo + 1;
        while i <= hi {
            let mut j = i;
            while j > lo {
                let ord = {
                    let pj = self.physical_index(j);
                    let pjm1 = self.physical_index(j - 1);
                    let a = unsafe { self.backend.get(pj) };
                    let b = unsafe { self.backend.get(pjm1) };
                    cmp(a, b)
                };
                if ord == Ordering::Less {
                    self.swap_physical(j - 1, j);
                    j -= 1;
                } else {
                    break;
                }
            }
            i += 1;
        }
    }

    fn swap_physical(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let pi = self.physical_index(i);
        let pj = self.physical_index(j);
        unsafe { self.backend.swap_slots(pi, pj) };
    }
}
