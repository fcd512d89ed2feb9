//! Slot discipline (C3, spec §4.3) and the by-value/by-reference backend
//! split (Design Notes §9, resolved in SPEC_FULL.md §3).
//!
//! A `Backend<T>` is either `Owned` (slots hold `T` inline; the vector
//! allocates and frees element storage) or `Borrowed` (slots hold `*mut T`;
//! the vector never allocates or frees the pointee). Both share the same
//! capacity engine (`RawBuf<S>`, generic over the slot representation `S`).

use core::mem;
use core::ptr;

use crate::error::Result;
use crate::raw::{self, RawBuf, Side};

/// Caller-supplied secure-wipe callback: `(item, size) -> ()`.
pub type WipeFn = fn(*mut u8, usize);

/// Zeroes `len` bytes at `ptr`, or invokes `custom` if installed — the
/// single wipe-dispatch point used by every removal/overwrite path (C1).
pub(crate) fn dispatch_wipe(ptr: *mut u8, len: usize, custom: Option<WipeFn>) {
    if len == 0 {
        return;
    }
    match custom {
        Some(f) => f(ptr, len),
        None => unsafe { ptr::write_bytes(ptr, 0, len) },
    }
}

/// A value moving across the public API: either the element itself
/// (by-value vectors) or a borrowed handle to a caller-owned element
/// (by-reference vectors). Which variant is valid depends on the vector's
/// backend, checked at the call site.
pub enum Elem<T> {
    /// An owned element, for by-value vectors.
    Value(T),
    /// A pointer to a caller-owned element, for by-reference vectors.
    Ref(*mut T),
}

impl<T> From<T> for Elem<T> {
    fn from(value: T) -> Self {
        Elem::Value(value)
    }
}

impl<T> Elem<T> {
    pub(crate) fn is_value(&self) -> bool {
        matches!(self, Elem::Value(_))
    }
}

/// Whichever of the two element-storage disciplines a vector was
/// constructed with.
pub(crate) enum Backend<T> {
    Owned(RawBuf<T>),
    Borrowed(RawBuf<*mut T>),
}

impl<T> Backend<T> {
    pub(crate) fn new(owned: bool, cap_left: usize, cap_right: usize) -> Result<Self> {
        if owned {
            Ok(Backend::Owned(RawBuf::new(cap_left, cap_right)?))
        } else {
            Ok(Backend::Borrowed(RawBuf::new(cap_left, cap_right)?))
        }
    }

    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Backend::Owned(_))
    }

    pub(crate) fn capacity(&self) -> usize {
        match self {
            Backend::Owned(b) => b.capacity(),
            Backend::Borrowed(b) => b.capacity(),
        }
    }

    pub(crate) fn cap_left(&self) -> usize {
        match self {
            Backend::Owned(b) => b.cap_left(),
            Backend::Borrowed(b) => b.cap_left(),
        }
    }

    pub(crate) fn cap_right(&self) -> usize {
        match self {
            Backend::Owned(b) => b.cap_right(),
            Backend::Borrowed(b) => b.cap_right(),
        }
    }

    pub(crate) fn grow(&mut self, side: Side, begin: &mut usize, end: &mut usize) -> Result<()> {
        match self {
            Backend::Owned(b) => b.grow(side, begin, end),
            Backend::Borrowed(b) => b.grow(side, begin, end),
        }
    }

    pub(crate) fn shrink_side(
        &mut self,
        side: Side,
        init_capacity_half: usize,
        size_half: usize,
        begin: &mut usize,
        end: &mut usize,
    ) -> Result<()> {
        match self {
            Backend::Owned(b) => b.shrink_side(side, init_capacity_half, size_half, begin, end),
            Backend::Borrowed(b) => b.shrink_side(side, init_capacity_half, size_half, begin, end),
        }
    }

    pub(crate) fn shrink_to(
        &mut self,
        target_left: usize,
        target_right: usize,
        begin: &mut usize,
        end: &mut usize,
    ) -> Result<()> {
        match self {
            Backend::Owned(b) => b.shrink_to(target_left, target_right, begin, end),
            Backend::Borrowed(b) => b.shrink_to(target_left, target_right, begin, end),
        }
    }

    /// # Safety
    /// `index` must be a live, initialized slot.
    pub(crate) unsafe fn get(&self, index: usize) -> &T {
        match self {
            Backend::Owned(b) => &*b.slot_ptr(index),
            Backend::Borrowed(b) => &*(*b.slot_ptr(index)),
        }
    }

    /// # Safety
    /// `index` must be a live, initialized slot.
    pub(crate) unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        match self {
            Backend::Owned(b) => &mut *b.slot_ptr(index),
            Backend::Borrowed(b) => &mut *(*b.slot_ptr(index)),
        }
    }

    /// Writes a brand-new value into a previously vacant slot. Does not
    /// drop/wipe any prior contents — callers must only use this for slots
    /// that are not currently live (a freshly opened gap or grown headroom).
    ///
    /// # Safety
    /// `index` must be vacant (not part of the live range, or a gap just
    /// opened by a shift).
    pub(crate) unsafe fn install(&mut self, index: usize, elem: Elem<T>) {
        match (self, elem) {
            (Backend::Owned(b), Elem::Value(v)) => ptr::write(b.slot_ptr(index), v),
            (Backend::Borrowed(b), Elem::Ref(p)) => ptr::write(b.slot_ptr(index), p),
            _ => panic!("Elem variant does not match vector backend"),
        }
    }

    /// Removes the live value at `index`, handing ownership to the caller.
    /// If `secure_wipe` is set, the vacated bytes are scrubbed immediately
    /// after the value (or, for borrowed slots, the pointee) is read out.
    ///
    /// # Safety
    /// `index` must be a live, initialized slot.
    pub(crate) unsafe fn take(
        &mut self,
        index: usize,
        secure_wipe: bool,
        custom: Option<WipeFn>,
    ) -> Elem<T> {
        match self {
            Backend::Owned(b) => {
                let slot = b.slot_ptr(index);
                let value = ptr::read(slot);
                if secure_wipe {
                    dispatch_wipe(slot as *mut u8, mem::size_of::<T>(), custom);
                }
                Elem::Value(value)
            }
            Backend::Borrowed(b) => {
                let slot = b.slot_ptr(index);
                let p = ptr::read(slot);
                if secure_wipe && !p.is_null() {
                    dispatch_wipe(p as *mut u8, mem::size_of::<T>(), custom);
                }
                Elem::Ref(p)
            }
        }
    }

    /// Overwrites the live value at `index` with `elem` without changing
    /// vector size (C5 `put-at`). The previous contents are properly
    /// dropped (owned slots) or simply replaced (borrowed slots), honoring
    /// secure-wipe on the outgoing bytes first.
    ///
    /// # Safety
    /// `index` must be a live, initialized slot.
    pub(crate) unsafe fn overwrite(
        &mut self,
        index: usize,
        elem: Elem<T>,
        secure_wipe: bool,
        custom: Option<WipeFn>,
    ) {
        match (self, elem) {
            (Backend::Owned(b), Elem::Value(v)) => {
                let slot = b.slot_ptr(index);
                if secure_wipe {
                    dispatch_wipe(slot as *mut u8, mem::size_of::<T>(), custom);
                }
                ptr::drop_in_place(slot);
                ptr::write(slot, v);
            }
            (Backend::Borrowed(b), Elem::Ref(p)) => {
                let slot = b.slot_ptr(index);
                let old = ptr::read(slot);
                if secure_wipe && !old.is_null() {
                    dispatch_wipe(old as *mut u8, mem::size_of::<T>(), custom);
                }
                ptr::write(slot, p);
            }
            _ => panic!("Elem variant does not match vector backend"),
        }
    }

    /// Drops (owned) or simply discards (borrowed, never drops the pointee)
    /// the live value at `index` without returning it, optionally wiping
    /// first. Used by `delete-at`, which frees a contiguous run instead of
    /// handing each element back to the caller.
    ///
    /// # Safety
    /// `index` must be a live, initialized slot.
    pub(crate) unsafe fn drop_slot(&mut self, index: usize, secure_wipe: bool, custom: Option<WipeFn>) {
        match self {
            Backend::Owned(b) => {
                let slot = b.slot_ptr(index);
                if secure_wipe {
                    dispatch_wipe(slot as *mut u8, mem::size_of::<T>(), custom);
                }
                ptr::drop_in_place(slot);
            }
            Backend::Borrowed(b) => {
                let slot = b.slot_ptr(index);
                let p = ptr::read(slot);
                if secure_wipe && !p.is_null() {
                    dispatch_wipe(p as *mut u8, mem::size_of::<T>(), custom);
                }
            }
        }
    }

    /// Aliasing-safe shift of `count` slots from `src` to `dst` within this
    /// backend's own buffer (opening/closing a gap).
    ///
    /// # Safety
    /// `dst..dst+count` and `src..src+count` must both be within the
    /// allocated buffer.
    pub(crate) unsafe fn shift_within(&mut self, dst: usize, src: usize, count: usize) {
        if count == 0 || dst == src {
            return;
        }
        match self {
            Backend::Owned(b) => raw::element_shift(b.slot_ptr(dst), b.slot_ptr(src), count),
            Backend::Borrowed(b) => raw::element_shift(b.slot_ptr(dst), b.slot_ptr(src), count),
        }
    }

    /// Relocates `count` live slots from `other` into `self` by raw bit
    /// transfer — no `Clone` bound, because ownership moves rather than
    /// duplicates. Used by `move-range` (C8), which follows this with a
    /// no-drop removal of the same range from `other` (the bits now belong
    /// to `self`; running `other`'s destructors on them would double-free).
    ///
    /// # Safety
    /// `dst..dst+count` in `self` and `src..src+count` in `other` must be
    /// within their respective allocated buffers, and `other`'s slots must
    /// be initialized. The caller must ensure `other`'s slots are never
    /// dropped or read again after this call.
    pub(crate) unsafe fn relocate_range_from(
        &mut self,
        dst: usize,
        other: &Backend<T>,
        src: usize,
        count: usize,
    ) {
        if count == 0 {
            return;
        }
        match (self, other) {
            (Backend::Owned(d), Backend::Owned(s)) => {
                raw::element_move(d.slot_ptr(dst), s.slot_ptr(src), count);
            }
            (Backend::Borrowed(d), Backend::Borrowed(s)) => {
                raw::element_move(d.slot_ptr(dst), s.slot_ptr(src), count);
            }
            _ => panic!("relocate_range_from requires matching backends"),
        }
    }

    /// Duplicates `count` live slots from `other` into `self` (C8 `copy`):
    /// owned backends clone each element (`other` keeps its originals);
    /// borrowed backends duplicate the pointer itself, which is always
    /// cheap since neither vector owns the pointee.
    ///
    /// # Safety
    /// `dst..dst+count` in `self` and `src..src+count` in `other` must be
    /// within their respective allocated buffers, and `other`'s slots must
    /// be initialized.
    pub(crate) unsafe fn clone_range_from(
        &mut self,
        dst: usize,
        other: &Backend<T>,
        src: usize,
        count: usize,
    ) where
        T: Clone,
    {
        if count == 0 {
            return;
        }
        match (self, other) {
            (Backend::Owned(d), Backend::Owned(s)) => {
                for i in 0..count {
                    let value = (*s.slot_ptr(src + i)).clone();
                    ptr::write(d.slot_ptr(dst + i), value);
                }
            }
            (Backend::Borrowed(d), Backend::Borrowed(s)) => {
                raw::element_move(d.slot_ptr(dst), s.slot_ptr(src), count);
            }
            _ => panic!("clone_range_from requires matching backends"),
        }
    }

    /// Swaps two live slots in place (C6 `swap`).
    ///
    /// # Safety
    /// Both indices must be live slots.
    pub(crate) unsafe fn swap_slots(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        match self {
            Backend::Owned(b) => ptr::swap(b.slot_ptr(i), b.slot_ptr(j)),
            Backend::Borrowed(b) => ptr::swap(b.slot_ptr(i), b.slot_ptr(j)),
        }
    }

    /// # Safety
    /// `[begin, begin+count)` must be within the allocated buffer.
    pub(crate) unsafe fn rotate_left_range(&mut self, begin: usize, count: usize, k: usize) -> Result<()> {
        match self {
            Backend::Owned(b) => raw::rotate_left_slots(b.slot_ptr(begin), count, k),
            Backend::Borrowed(b) => raw::rotate_left_slots(b.slot_ptr(begin), count, k),
        }
    }

    /// # Safety
    /// `[begin, begin+count)` must be within the allocated buffer.
    pub(crate) unsafe fn rotate_right_range(&mut self, begin: usize, count: usize, k: usize) -> Result<()> {
        match self {
            Backend::Owned(b) => raw::rotate_right_slots(b.slot_ptr(begin), count, k),
            Backend::Borrowed(b) => raw::rotate_right_slots(b.slot_ptr(begin), count, k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_install_take_round_trips() {
        let mut backend: Backend<i32> = Backend::new(true, 1, 4).unwrap();
        unsafe {
            backend.install(1, Elem::Value(42));
            let out = backend.take(1, false, None);
            match out {
                Elem::Value(v) => assert_eq!(v, 42),
                _ => panic!("expected Value"),
            }
        }
    }

    #[test]
    fn borrowed_install_take_returns_same_pointer() {
        let mut external = 7i32;
        let mut backend: Backend<i32> = Backend::new(false, 1, 4).unwrap();
        unsafe {
            backend.install(1, Elem::Ref(&mut external as *mut i32));
            let out = backend.take(1, false, None);
            match out {
                Elem::Ref(p) => assert_eq!(p, &mut external as *mut i32),
                _ => panic!("expected Ref"),
            }
        }
    }

    #[test]
    fn secure_wipe_zeroes_owned_slot_after_take() {
        let mut backend: Backend<[u8; 4]> = Backend::new(true, 1, 4).unwrap();
        unsafe {
            backend.install(1, Elem::Value([1, 2, 3, 4]));
            let _ = backend.take(1, true, None);
            if let Backend::Owned(b) = &backend {
                let bytes = &*(b.slot_ptr(1) as *const [u8; 4]);
                assert_eq!(*bytes, [0, 0, 0, 0]);
            }
        }
    }

    #[test]
    fn secure_wipe_scrubs_through_borrowed_pointer() {
        let mut external = [9u8, 9, 9, 9];
        let mut backend: Backend<[u8; 4]> = Backend::new(false, 1, 4).unwrap();
        unsafe {
            backend.install(1, Elem::Ref(&mut external as *mut [u8; 4]));
            let _ = backend.take(1, true, None);
        }
        assert_eq!(external, [0, 0, 0, 0]);
    }
}
