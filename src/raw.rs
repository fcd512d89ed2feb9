//! Memory primitives and the capacity engine (C1 + C4, spec §4.1/§4.4).
//!
//! `RawBuf<S>` owns a single contiguous allocation of `cap_left + cap_right`
//! slots of type `S` (either a full element `T`, for the by-value backend,
//! or a borrowed handle `*mut T`, for the by-reference backend — see
//! `backend.rs`). It knows nothing about element lifecycles; it only ever
//! moves `S` values around as opaque bytes and grows or shrinks the
//! allocation. Dropping a `RawBuf` frees the allocation without running any
//! destructors on the slots it held — the owning `DynVec` is responsible for
//! tearing down live elements first.

use alloc::alloc::{alloc, dealloc, handle_alloc_error, realloc, Layout};
use core::mem;
use core::ptr::{self, NonNull};

use crate::error::{Result, VectorError};

/// Copies `count` slots from `src` to `dst`. The ranges must not overlap —
/// used when relocating into a freshly allocated buffer.
#[inline]
pub(crate) unsafe fn element_move<S>(dst: *mut S, src: *const S, count: usize) {
    ptr::copy_nonoverlapping(src, dst, count);
}

/// Copies `count` slots from `src` to `dst`. The ranges may overlap — used
/// to open or close a gap within a live range.
#[inline]
pub(crate) unsafe fn element_shift<S>(dst: *mut S, src: *const S, count: usize) {
    ptr::copy(src, dst, count);
}

fn layout_for<S>(cap: usize) -> Result<Layout> {
    Layout::array::<S>(cap).map_err(|_| VectorError::OutOfMemory)
}

/// Which side of the buffer a growth/shrink operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A contiguous allocation of `cap_left + cap_right` slots, with no notion
/// of which slots are "live" — that half-open range is tracked by the
/// owning `DynVec` as `[begin, end)`.
pub(crate) struct RawBuf<S> {
    ptr: NonNull<S>,
    cap_left: usize,
    cap_right: usize,
}

unsafe impl<S: Send> Send for RawBuf<S> {}
unsafe impl<S: Sync> Sync for RawBuf<S> {}

impl<S> RawBuf<S> {
    fn is_zst() -> bool {
        mem::size_of::<S>() == 0
    }

    /// Allocates an uninitialized buffer of `cap_left + cap_right` slots.
    pub(crate) fn new(cap_left: usize, cap_right: usize) -> Result<Self> {
        if Self::is_zst() {
            return Ok(RawBuf {
                ptr: NonNull::dangling(),
                cap_left,
                cap_right,
            });
        }

        let total = cap_left
            .checked_add(cap_right)
            .ok_or(VectorError::OutOfMemory)?;
        let ptr = if total == 0 {
            NonNull::dangling()
        } else {
            let layout = layout_for::<S>(total)?;
            let raw = unsafe { alloc(layout) };
            match NonNull::new(raw as *mut S) {
                Some(p) => p,
                None => handle_alloc_error(layout),
            }
        };

        Ok(RawBuf {
            ptr,
            cap_left,
            cap_right,
        })
    }

    pub(crate) fn cap_left(&self) -> usize {
        self.cap_left
    }

    pub(crate) fn cap_right(&self) -> usize {
        self.cap_right
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cap_left + self.cap_right
    }

    #[inline]
    pub(crate) unsafe fn slot_ptr(&self, index: usize) -> *mut S {
        self.ptr.as_ptr().add(index)
    }

    pub(crate) fn as_ptr(&self) -> *const S {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut S {
        self.ptr.as_ptr()
    }

    /// Doubles the given side. Left growth always recenters into a fresh
    /// allocation (the live range's absolute offset changes); right growth
    /// reallocates in place (the live range's absolute offset is unchanged).
    ///
    /// `begin`/`end` are rewritten in place to reflect the new layout.
    pub(crate) fn grow(&mut self, side: Side, begin: &mut usize, end: &mut usize) -> Result<()> {
        match side {
            Side::Left => {
                let new_cap_left = double_capacity(self.cap_left);
                self.recenter(new_cap_left, self.cap_right, begin, end)
            }
            Side::Right => {
                let new_cap_right = double_capacity(self.cap_right);
                self.resize_in_place(self.cap_left, new_cap_right)
            }
        }
    }

    /// Halves the given side, subject to the two floors from spec §4.4
    /// (never below `floor_total / 2` on that side, never below
    /// `size_floor / 2`). Returns `Ok(())` without changing anything if no
    /// side-local floor would be respected by halving.
    pub(crate) fn shrink_side(
        &mut self,
        side: Side,
        init_capacity_half: usize,
        size_half: usize,
        begin: &mut usize,
        end: &mut usize,
    ) -> Result<()> {
        let floor = init_capacity_half.max(size_half).max(1);
        match side {
            Side::Left => {
                let new_cap_left = (self.cap_left / 2).max(floor);
                if new_cap_left >= self.cap_left {
                    return Ok(());
                }
                self.recenter(new_cap_left, self.cap_right, begin, end)
            }
            Side::Right => {
                let new_cap_right = (self.cap_right / 2).max(floor);
                if new_cap_right >= self.cap_right {
                    return Ok(());
                }
                self.resize_in_place(self.cap_left, new_cap_right)
            }
        }
    }

    /// Explicit `shrink()`: compress to `target_left + target_right`,
    /// recentering the live range into the new left padding.
    pub(crate) fn shrink_to(
        &mut self,
        target_left: usize,
        target_right: usize,
        begin: &mut usize,
        end: &mut usize,
    ) -> Result<()> {
        self.recenter(target_left, target_right, begin, end)
    }

    /// Allocates a fresh buffer of `new_cap_left + new_cap_right` slots,
    /// places the live range at offset `new_cap_left`, copies the live
    /// slots across, frees the old buffer, and rewrites `begin`/`end`.
    fn recenter(
        &mut self,
        new_cap_left: usize,
        new_cap_right: usize,
        begin: &mut usize,
        end: &mut usize,
    ) -> Result<()> {
        let live = *end - *begin;
        let mut fresh = RawBuf::new(new_cap_left, new_cap_right)?;

        if live > 0 {
            unsafe {
                element_move(fresh.slot_ptr(new_cap_left), self.slot_ptr(*begin), live);
            }
        }

        self.dealloc_current();
        self.ptr = fresh.ptr;
        self.cap_left = fresh.cap_left;
        self.cap_right = fresh.cap_right;
        // `fresh` must not free the buffer we just adopted.
        fresh.ptr = NonNull::dangling();
        fresh.cap_left = 0;
        fresh.cap_right = 0;

        *end = new_cap_left + live;
        *begin = new_cap_left;
        Ok(())
    }

    /// Reallocates the existing buffer to `new_cap_left + new_cap_right`
    /// without moving the live range's absolute offset. Valid only when the
    /// live range's offset does not change (right-side growth/shrink).
    fn resize_in_place(&mut self, new_cap_left: usize, new_cap_right: usize) -> Result<()> {
        debug_assert_eq!(new_cap_left, self.cap_left, "resize_in_place must not move begin");

        if Self::is_zst() {
            self.cap_left = new_cap_left;
            self.cap_right = new_cap_right;
            return Ok(());
        }

        let new_total = new_cap_left
            .checked_add(new_cap_right)
            .ok_or(VectorError::OutOfMemory)?;
        let old_total = self.capacity();

        let new_ptr = if old_total == 0 {
            if new_total == 0 {
                self.ptr.as_ptr()
            } else {
                let layout = layout_for::<S>(new_total)?;
                let raw = unsafe { alloc(layout) };
                if raw.is_null() {
                    handle_alloc_error(layout);
                }
                raw as *mut S
            }
        } else if new_total == 0 {
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout_for::<S>(old_total)?) };
            NonNull::dangling().as_ptr()
        } else {
            let old_layout = layout_for::<S>(old_total)?;
            let new_layout = layout_for::<S>(new_total)?;
            let raw = unsafe {
                realloc(
                    self.ptr.as_ptr() as *mut u8,
                    old_layout,
                    new_layout.size(),
                )
            };
            if raw.is_null() {
                handle_alloc_error(new_layout);
            }
            raw as *mut S
        };

        self.ptr = NonNull::new(new_ptr).unwrap_or(NonNull::dangling());
        self.cap_left = new_cap_left;
        self.cap_right = new_cap_right;
        Ok(())
    }

    fn dealloc_current(&mut self) {
        if Self::is_zst() {
            return;
        }
        let total = self.capacity();
        if total == 0 {
            return;
        }
        if let Ok(layout) = layout_for::<S>(total) {
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<S> Drop for RawBuf<S> {
    fn drop(&mut self) {
        self.dealloc_current();
    }
}

/// Geometric growth: doubles, with an 8-slot floor so tiny vectors don't
/// reallocate on every single insert (mirrors the amortized-growth rationale
/// spec §4.4 gives for bidirectional headroom).
fn double_capacity(current: usize) -> usize {
    if current == 0 {
        8
    } else {
        current.saturating_mul(2)
    }
}

/// Cyclically shifts `len` slots starting at `ptr` left by `k` (C6,
/// `rotate-left`). `k == 1` uses a single temporary instead of a scratch
/// allocation, per spec §4.6.
pub(crate) unsafe fn rotate_left_slots<S>(ptr: *mut S, len: usize, k: usize) -> Result<()> {
    if k == 0 || k == len || len == 0 {
        return Ok(());
    }
    if k == 1 {
        let tmp = ptr::read(ptr);
        element_shift(ptr, ptr.add(1), len - 1);
        ptr::write(ptr.add(len - 1), tmp);
        return Ok(());
    }
    let mut scratch = RawBuf::<S>::new(0, k)?;
    element_move(scratch.slot_ptr(0), ptr, k);
    element_shift(ptr, ptr.add(k), len - k);
    element_move(ptr.add(len - k), scratch.slot_ptr(0), k);
    Ok(())
}

/// Symmetric to [`rotate_left_slots`].
pub(crate) unsafe fn rotate_right_slots<S>(ptr: *mut S, len: usize, k: usize) -> Result<()> {
    if k == 0 || k == len || len == 0 {
        return Ok(());
    }
    if k == 1 {
        let tmp = ptr::read(ptr.add(len - 1));
        element_shift(ptr.add(1), ptr, len - 1);
        ptr::write(ptr, tmp);
        return Ok(());
    }
    let mut scratch = RawBuf::<S>::new(0, k)?;
    element_move(scratch.slot_ptr(0), ptr.add(len - k), k);
    element_shift(ptr.add(k), ptr, len - k);
    element_move(ptr, scratch.slot_ptr(0), k);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};

    #[test]
    fn grow_left_recenters_and_preserves_contents() {
        let mut buf: RawBuf<i32> = RawBuf::new(1, 4).unwrap();
        unsafe {
            ptr::write(buf.slot_ptr(0), 42);
        }
        let mut begin = 0usize;
        let mut end = 1usize;

        buf.grow(Side::Left, &mut begin, &mut end).unwrap();
        assert!(buf.cap_left() >= 2);
        assert_eq!(end - begin, 1);
        unsafe {
            assert_eq!(ptr::read(buf.slot_ptr(begin)), 42);
        }
    }

    #[test]
    fn grow_right_keeps_begin_fixed() {
        let mut buf: RawBuf<i32> = RawBuf::new(1, 1).unwrap();
        unsafe {
            ptr::write(buf.slot_ptr(1), 7);
        }
        let mut begin = 1usize;
        let mut end = 2usize;

        buf.grow(Side::Right, &mut begin, &mut end).unwrap();
        assert_eq!(begin, 1);
        assert_eq!(end, 2);
        assert!(buf.cap_right() >= 2);
        unsafe {
            assert_eq!(ptr::read(buf.slot_ptr(1)), 7);
        }
    }

    #[test]
    fn rotate_left_matches_manual_shift() {
        let mut buf: RawBuf<i32> = RawBuf::new(0, 6).unwrap();
        for (i, v) in [1, 2, 3, 4, 5, 6].into_iter().enumerate() {
            unsafe { ptr::write(buf.slot_ptr(i), v) };
        }
        unsafe { rotate_left_slots(buf.as_mut_ptr(), 6, 2).unwrap() };
        let got: Vec<i32> = (0..6).map(|i| unsafe { ptr::read(buf.slot_ptr(i)) }).collect();
        assert_eq!(got, vec![3, 4, 5, 6, 1, 2]);
    }

    #[test]
    fn rotate_right_single_temporary_path() {
        let mut buf: RawBuf<i32> = RawBuf::new(0, 4).unwrap();
        for (i, v) in [1, 2, 3, 4].into_iter().enumerate() {
            unsafe { ptr::write(buf.slot_ptr(i), v) };
        }
        unsafe { rotate_right_slots(buf.as_mut_ptr(), 4, 1).unwrap() };
        let got: Vec<i32> = (0..4).map(|i| unsafe { ptr::read(buf.slot_ptr(i)) }).collect();
        assert_eq!(got, vec![4, 1, 2, 3]);
    }

    #[test]
    fn zero_sized_type_never_allocates() {
        let mut buf: RawBuf<()> = RawBuf::new(1, 1).unwrap();
        let mut begin = 1usize;
        let mut end = 1usize;
        buf.grow(Side::Left, &mut begin, &mut end).unwrap();
        assert!(buf.cap_left() >= 2);
    }
}
