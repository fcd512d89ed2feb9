//! Structural ops (C6, spec §4.6): swap, swap-range, rotate-left,
//! rotate-right. All operate on live logical indices and run under the
//! primitive-tier lock.

use crate::error::{Result, VectorError};
use crate::lock::Priority;
use crate::vector::DynVec;

impl<T> DynVec<T> {
    /// `swap(v, i, j)`: exchange two slot handles in O(1).
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.check_bounds(i)?;
        self.check_bounds(j)?;
        let pi = self.physical_index(i);
        let pj = self.physical_index(j);
        unsafe { self.backend.swap_slots(pi, pj) };
        Ok(())
    }

    /// `swap-range(v, s1, e1, s2)`: pairwise swap `[s1, e1]` with the range
    /// starting at `s2`. The two ranges must not overlap: `s2 >= s1 + (e1 -
    /// s1) + 1`, i.e. `s2 > e1` (spec's inclusive-endpoint convention).
    pub fn swap_range(&mut self, s1: usize, e1: usize, s2: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        if e1 < s1 {
            return Err(VectorError::IndexOutOfBounds { index: e1, len: self.len() });
        }
        let len = e1 - s1 + 1;
        let size = self.len();
        if e1 >= size || s2 + len > size {
            return Err(VectorError::IndexOutOfBounds {
                index: (s2 + len).max(e1),
                len: size,
            });
        }
        if s2 <= e1 {
            return Err(VectorError::IndexOutOfBounds { index: s2, len: size });
        }

        for k in 0..len {
            let pi = self.physical_index(s1 + k);
            let pj = self.physical_index(s2 + k);
            unsafe { self.backend.swap_slots(pi, pj) };
        }
        Ok(())
    }

    /// `rotate-left(v, k)`: cyclically shift the live range left by `k`.
    pub fn rotate_left(&mut self, k: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        let size = self.len();
        if size == 0 {
            return Ok(());
        }
        let k = k % size;
        if k == 0 {
            return Ok(());
        }
        if self.circular {
            return self.rotate_circular(k, true);
        }
        let begin = self.begin;
        unsafe { self.backend.rotate_left_range(begin, size, k)? };
        Ok(())
    }

    /// `rotate-right(v, k)`: symmetric to [`DynVec::rotate_left`].
    pub fn rotate_right(&mut self, k: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        let size = self.len();
        if size == 0 {
            return Ok(());
        }
        let k = k % size;
        if k == 0 {
            return Ok(());
        }
        if self.circular {
            return self.rotate_circular(size - k, true);
        }
        let begin = self.begin;
        unsafe { self.backend.rotate_right_range(begin, size, k)? };
        Ok(())
    }

    /// Circular vectors may wrap physically, so a plain contiguous
    /// `rotate_left_range` over `[begin, begin+size)` is unsafe to use
    /// directly. Fall back to a swap-based rotation through the logical
    /// (modulo-addressed) index space; `O(size)` either way.
    fn rotate_circular(&mut self, k: usize, _left: bool) -> Result<()> {
        let size = self.len();
        let gcd = gcd(k, size);
        for start in 0..gcd {
            let mut prev = start;
            let mut j = (start + k) % size;
            while j != start {
                let p_prev = self.physical_index(prev);
                let p_j = self.physical_index(j);
                unsafe { self.backend.swap_slots(p_prev, p_j) };
                prev = j;
                j = (j + k) % size;
            }
        }
        Ok(())
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Elem;
    use crate::vector::VectorBuilder;

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
    fn swap_exchanges_two_slots() {
        let mut d = filled(&[1, 2, 3, 4]);
        d.swap(0, 3).unwrap();
        assert_eq!(contents(&d), alloc::vec![4, 2, 3, 1]);
    }

    #[test]
    fn rotate_left_then_right_is_identity() {
        let mut d = filled(&[1, 2, 3, 4, 5, 6]);
        d.rotate_left(2).unwrap();
        assert_eq!(contents(&d), alloc::vec![3, 4, 5, 6, 1, 2]);
        d.rotate_right(2).unwrap();
        assert_eq!(contents(&d), alloc::vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn rotate_left_single_step() {
        let mut d = filled(&[1, 2, 3, 4]);
        d.rotate_left(1).unwrap();
        assert_eq!(contents(&d), alloc::vec![2, 3, 4, 1]);
    }

    #[test]
    fn swap_range_rejects_overlap() {
        let mut d = filled(&[1, 2, 3, 4, 5]);
        assert!(d.swap_range(0, 2, 2).is_err());
        d.swap_range(0, 1, 3).unwrap();
        assert_eq!(contents(&d), alloc::vec![4, 5, 3, 1, 2]);
    }

    #[test]
    fn rotate_on_circular_vector() {
        let mut d: DynVec<i32> = VectorBuilder::new().circular().build(5).unwrap();
        for x in 1..=4 {
            d.push(Elem::Value(x)).unwrap();
        }
        assert_eq!(contents(&d), alloc::vec![1, 2, 3, 4]);
        d.rotate_left(1).unwrap();
        assert_eq!(contents(&d), alloc::vec![2, 3, 4, 1]);
    }
}
