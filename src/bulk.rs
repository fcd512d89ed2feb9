//! Bulk ops (C8, spec §4.8): ordered insert, apply/apply-if, cross-vector
//! copy/insert-range/move-range, and merge. These are "composite"
//! operations (priority 2): they lock `self` once at that tier and then
//! call primitive-tier helpers, which see `1 < 2` and no-op on the already-
//! held lock (spec §4.2).
//!
//! Per spec §9's two resolved Open Questions: `copy`/`insert_range` use the
//! half-open interval `[s2, s2+e2)`, and `move_range` deletes the source
//! range with a single `delete_at` call rather than a per-element loop.

use core::cmp::Ordering;
use core::mem;

use crate::error::{Result, VectorError};
use crate::lock::Priority;
use crate::slot::Elem;
use crate::vector::{DynVec, OverflowMode};

impl<T> DynVec<T> {
    fn check_data_size<U>(&self, other: &DynVec<U>) -> Result<()> {
        self.ensure_live()?;
        other.ensure_live()?;
        let expected = mem::size_of::<T>();
        let found = mem::size_of::<U>();
        if expected != found {
            return Err(VectorError::DataSizeMismatch { expected, found });
        }
        Ok(())
    }

    /// `add-ordered(v, value, cmp)` (spec §4.8): append if the vector is
    /// empty or the value sorts after the current last element; otherwise
    /// locate the insertion point via the adaptive binary search and splice
    /// it in.
    pub fn add_ordered<F>(&mut self, elem: Elem<T>, mut cmp: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
        T: Clone,
    {
        let _g = self.lock(Priority::Composite);
        self.ensure_live()?;
        let size = self.len();
        if size == 0 {
            return self.push_back(elem);
        }

        let value_for_cmp = self.peek_value(&elem);
        let last = self.get(size - 1)?.clone();
        if cmp(&value_for_cmp, &last) == Ordering::Greater {
            return self.push_back(elem);
        }

        let idx = self
            .bsearch_by(|candidate| cmp(candidate, &value_for_cmp))
            .index();
        self.insert_at(elem, idx, OverflowMode::Strict)
    }

    /// Clones the value inside `elem` for comparator use without consuming
    /// it — `Elem::Ref` already points at data the caller owns, so cloning
    /// its pointee is cheap and leaves the original intact either way.
    fn peek_value(&self, elem: &Elem<T>) -> T
    where
        T: Clone,
    {
        match elem {
            Elem::Value(v) => v.clone(),
            Elem::Ref(p) => unsafe { (**p).clone() },
        }
    }

    /// `apply(v, f)` (spec §4.8): invoke `f` on each live element tail-first.
    pub fn apply<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut T),
    {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        let size = self.len();
        for i in (0..size).rev() {
            let physical = self.physical_index(i);
            let item = unsafe { self.backend.get_mut(physical) };
            f(item);
        }
        Ok(())
    }

    /// `apply-range(v, f, x, y)` (spec §4.8): invoke `f` on `[x, y)`,
    /// forward.
    pub fn apply_range<F>(&mut self, x: usize, y: usize, mut f: F) -> Result<()>
    where
        F: FnMut(&mut T),
    {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        let size = self.len();
        if x > y || y > size {
            return Err(VectorError::IndexOutOfBounds { index: y, len: size });
        }
        for i in x..y {
            let physical = self.physical_index(i);
            let item = unsafe { self.backend.get_mut(physical) };
            f(item);
        }
        Ok(())
    }

    /// `apply-if(v1, v2, f, pred)` (spec §4.8): requires `len(v1) <=
    /// len(v2)`. For each `i < len(v1)`, if `pred(v1[i], v2[i])`, apply
    /// `f(v1[i])`.
    pub fn apply_if<F, P>(&mut self, other: &DynVec<T>, mut pred: P, mut f: F) -> Result<()>
    where
        F: FnMut(&mut T),
        P: FnMut(&T, &T) -> bool,
    {
        let _g = self.lock(Priority::Composite);
        self.ensure_live()?;
        other.ensure_live()?;
        if self.len() > other.len() {
            return Err(VectorError::IndexOutOfBounds {
                index: self.len(),
                len: other.len(),
            });
        }
        for i in 0..self.len() {
            let other_physical = other.physical_index(i);
            let other_item = unsafe { other.backend.get(other_physical) };
            let self_physical = self.physical_index(i);
            let matches = {
                let self_item = unsafe { self.backend.get(self_physical) };
                pred(self_item, other_item)
            };
            if matches {
                let self_item = unsafe { self.backend.get_mut(self_physical) };
                f(self_item);
            }
        }
        Ok(())
    }

    /// `copy(v1, v2, s2, e2)` (spec §4.8): append `v2[s2..e2)` (or `s2..` if
    /// `e2 == 0`, meaning "to the end of `v2`") to `self`, cloning each
    /// element — `v2` keeps its originals. Growing the tail reuses the same
    /// `ensure_back_room` path as a single-element push, just called once
    /// per appended element.
    pub fn copy_from(&mut self, other: &DynVec<T>, s2: usize, e2: usize) -> Result<()>
    where
        T: Clone,
    {
        let _g = self.lock(Priority::Composite);
        self.copy_from_inner(other, s2, e2)
    }

    /// The append loop behind `copy_from`, factored out so `move_range_from`
    /// can call it without re-acquiring `self`'s composite lock (spec §4.2:
    /// a composite holds `self` once and calls only primitive-tier helpers
    /// from then on, the same way `merge`'s drain loop calls `push_back`
    /// rather than another composite).
    fn copy_from_inner(&mut self, other: &DynVec<T>, s2: usize, e2: usize) -> Result<()>
    where
        T: Clone,
    {
        self.check_data_size(other)?;
        let e2 = if e2 == 0 { other.len() } else { e2 };
        if s2 > e2 || e2 > other.len() {
            return Err(VectorError::IndexOutOfBounds { index: e2, len: other.len() });
        }
        for i in s2..e2 {
            let physical = other.physical_index(i);
            let value = unsafe { other.backend.get(physical) }.clone();
            self.push_back(Elem::Value(value))?;
        }
        Ok(())
    }

    /// `insert-range(v1, v2, s2, e2, s1)` (spec §4.8, half-open `[s2,
    /// s2+e2)` per the resolved Open Question): insert `v2[s2..s2+e2)` into
    /// `self` at position `s1`, one element at a time.
    pub fn insert_range_from(&mut self, other: &DynVec<T>, s2: usize, e2: usize, s1: usize) -> Result<()>
    where
        T: Clone,
    {
        let _g = self.lock(Priority::Composite);
        self.check_data_size(other)?;
        let end = s2 + e2;
        if end > other.len() {
            return Err(VectorError::IndexOutOfBounds { index: end, len: other.len() });
        }
        for (offset, i) in (s2..end).enumerate() {
            let physical = other.physical_index(i);
            let value = unsafe { other.backend.get(physical) }.clone();
            self.insert_at(Elem::Value(value), s1 + offset, OverflowMode::Strict)?;
        }
        Ok(())
    }

    /// `move-range(v1, v2, s2, e2)` (spec §4.8): copy `v2[s2..s2+e2)` onto
    /// the end of `self`, then remove that whole range from `v2` with a
    /// single `delete_at` call (the resolved Open Question — not the
    /// source's per-element loop, which skips alternating elements).
    pub fn move_range_from(&mut self, other: &mut DynVec<T>, s2: usize, e2: usize) -> Result<()>
    where
        T: Clone,
    {
        let _g = self.lock(Priority::Composite);
        self.check_data_size(other)?;
        let end = s2 + e2;
        if end > other.len() || e2 == 0 {
            return Err(VectorError::IndexOutOfBounds { index: end, len: other.len() });
        }
        // Calls the non-locking append loop directly: `self` is already
        // held at `Composite` for this whole call, and going through the
        // public `copy_from` would re-acquire that same priority on `self`
        // (2 >= 2 is not a no-op under the admission rule) and release it
        // early when its guard drops.
        self.copy_from_inner(other, s2, end)?;
        other.delete_at(s2, e2 - 1)
    }

    /// `merge(v1, v2)` (spec §4.8): append all of `v2` onto `self` and
    /// consume `v2` — ownership of every element transfers, so nothing is
    /// wiped or dropped on the way. Any further operation on `v2` after this
    /// call fails with `VectorError::UndefinedVector` (spec §8 scenario 6).
    pub fn merge(&mut self, other: &mut DynVec<T>) -> Result<()> {
        let _g = self.lock(Priority::Composite);
        self.check_data_size(other)?;
        let drained = other.mark_consumed()?;
        for elem in drained {
            self.push_back(elem)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Elem;

    fn filled(vals: &[i32]) -> DynVec<i32> {
        let mut d = DynVec::new(8).unwrap();
        for &x in vals {
            d.push(Elem::Value(x)).unwrap();
        }
        d
    }

    fn contents(d: &DynVec<i32>) -> alloc::vec::Vec<i32> {
        (0..d.len()).map(|i| *d.get(i).unwrap()).collect()
    }

    #[test]
    fn add_ordered_appends_when_sorted_tail() {
        let mut d = filled(&[1, 2, 3]);
        d.add_ordered(Elem::Value(4), |a, b| a.cmp(b)).unwrap();
        assert_eq!(contents(&d), alloc::vec![1, 2, 3, 4]);
    }

    #[test]
    fn add_ordered_splices_into_middle() {
        let mut d = filled(&[1, 2, 5, 8]);
        d.add_ordered(Elem::Value(4), |a, b| a.cmp(b)).unwrap();
        assert_eq!(contents(&d), alloc::vec![1, 2, 4, 5, 8]);
    }

    #[test]
    fn apply_runs_tail_first() {
        let mut d = filled(&[1, 2, 3]);
        let mut order = alloc::vec::Vec::new();
        d.apply(|x| order.push(*x)).unwrap();
        assert_eq!(order, alloc::vec![3, 2, 1]);
    }

    #[test]
    fn apply_if_only_touches_matching_pairs() {
        let mut v1 = filled(&[1, 2, 3]);
        let v2 = filled(&[10, 2, 30]);
        v1.apply_if(&v2, |a, b| a == b, |a| *a *= 100).unwrap();
        assert_eq!(contents(&v1), alloc::vec![1, 200, 3]);
    }

    #[test]
    fn copy_appends_clones_and_leaves_source_intact() {
        let mut v1 = filled(&[1, 2]);
        let v2 = filled(&[10, 20, 30]);
        v1.copy_from(&v2, 1, 0).unwrap();
        assert_eq!(contents(&v1), alloc::vec![1, 2, 20, 30]);
        assert_eq!(contents(&v2), alloc::vec![10, 20, 30]);
    }

    #[test]
    fn insert_range_splices_subset_at_position() {
        let mut v1 = filled(&[1, 2, 3]);
        let v2 = filled(&[10, 20, 30, 40]);
        v1.insert_range_from(&v2, 1, 2, 1).unwrap();
        assert_eq!(contents(&v1), alloc::vec![1, 20, 30, 2, 3]);
    }

    #[test]
    fn move_range_removes_from_source() {
        let mut v1 = filled(&[1]);
        let mut v2 = filled(&[10, 20, 30, 40]);
        v1.move_range_from(&mut v2, 1, 2).unwrap();
        assert_eq!(contents(&v1), alloc::vec![1, 20, 30]);
        assert_eq!(contents(&v2), alloc::vec![10, 40]);
    }

    #[test]
    fn merge_concatenates_and_consumes_source() {
        let mut v1 = filled(&[1, 2, 3]);
        let mut v2 = filled(&[4, 5, 6]);
        v1.merge(&mut v2).unwrap();
        assert_eq!(contents(&v1), alloc::vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(v2.push(Elem::Value(7)), Err(VectorError::UndefinedVector)));
    }
}
