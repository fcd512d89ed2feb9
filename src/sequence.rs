//! Sequence operations (C5, spec §4.5): insert/remove/put/delete at an
//! arbitrary index, at the head, or at the tail, plus circular-mode index
//! folding and the shrink trigger that follows a non-circular removal.

use crate::error::{Result, VectorError};
use crate::lock::Priority;
use crate::raw::Side;
use crate::slot::{Backend, Elem};
use crate::vector::{DynVec, OverflowMode};

impl<T> DynVec<T> {
    /// Maps a logical index in `[0, len())` to its physical slot index.
    ///
    /// Non-circular vectors are a plain contiguous window: physical index is
    /// `begin + i`. Circular vectors address the fixed `capacity()` buffer
    /// modulo its own size; `circular_next` is the running count of every
    /// element ever pushed, so `circular_next - len` is the (possibly
    /// wrapped) physical offset of the oldest live element.
    pub(crate) fn physical_index(&self, i: usize) -> usize {
        if self.circular {
            let cap = self.backend.capacity().max(1);
            let len = self.end - self.begin;
            let begin_abs = self.circular_next.wrapping_sub(len) % cap;
            (begin_abs + i) % cap
        } else {
            self.begin + i
        }
    }

    fn ensure_front_room(&mut self) -> Result<()> {
        if self.begin == 0 || self.backend.cap_left() == 1 {
            let before = self.backend.capacity();
            self.backend.grow(Side::Left, &mut self.begin, &mut self.end)?;
            tracing::debug!(before, after = self.backend.capacity(), side = "left", "grew capacity");
        }
        Ok(())
    }

    fn ensure_back_room(&mut self) -> Result<()> {
        if self.end >= self.backend.capacity() {
            let before = self.backend.capacity();
            self.backend.grow(Side::Right, &mut self.begin, &mut self.end)?;
            tracing::debug!(before, after = self.backend.capacity(), side = "right", "grew capacity");
        }
        Ok(())
    }

    fn maybe_shrink(&mut self, side: Side) -> Result<()> {
        if self.circular {
            return Ok(());
        }
        let size = self.len();
        let capacity = self.backend.capacity();
        if size.checked_mul(4).map(|n| n < capacity).unwrap_or(false) {
            let init_half = self.init_capacity / 2;
            let size_half = size / 2;
            let before = capacity;
            self.backend
                .shrink_side(side, init_half, size_half, &mut self.begin, &mut self.end)?;
            tracing::debug!(before, after = self.backend.capacity(), ?side, "shrank capacity");
        }
        Ok(())
    }

    /// Rebuilds the backend into a fresh allocation of the same capacity,
    /// via `relocate`, instead of shifting slots in place. Used by the
    /// interior-shift paths of `insert_at`/`remove_at`/`delete_at` when
    /// `full_reentrant` is set (spec §4.5 "full-reentrancy mode"): a reader
    /// holding the old `&Backend` (behind the lock's prior critical section)
    /// never observes a partially-shifted buffer, because the swap is a
    /// single pointer-sized write.
    fn reentrant_rebuild<F>(&mut self, relocate: F) -> Result<()>
    where
        F: FnOnce(&Backend<T>, &mut Backend<T>),
    {
        let cap_left = self.backend.cap_left();
        let cap_right = self.backend.cap_right();
        let is_owned = self.backend.is_owned();
        let mut fresh = Backend::<T>::new(is_owned, cap_left, cap_right)?;
        relocate(&self.backend, &mut fresh);
        self.backend = fresh;
        Ok(())
    }

    /// `insert-at(v, value, i, mode)` (spec §4.5). Circular vectors delegate
    /// entirely to the rotating-cursor overwrite described in §6 "circular":
    /// every insertion advances `circular_next` and, once the window is
    /// full, overwrites the oldest live element.
    pub fn insert_at(&mut self, elem: Elem<T>, i: usize, mode: OverflowMode) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.check_corruption()?;

        if self.circular {
            return self.circular_insert(elem);
        }

        let size = self.len();
        let i = if i > size {
            match mode {
                OverflowMode::AppendOnOverflow => size.saturating_sub(1),
                OverflowMode::Strict => {
                    return Err(VectorError::IndexOutOfBounds { index: i, len: size })
                }
            }
        } else {
            i
        };

        if i == 0 {
            self.ensure_front_room()?;
            self.begin -= 1;
            unsafe { self.backend.install(self.begin, elem) };
        } else if i == size {
            self.ensure_back_room()?;
            unsafe { self.backend.install(self.end, elem) };
            self.end += 1;
        } else {
            self.ensure_back_room()?;
            let begin = self.begin;
            let dst = begin + i;
            let tail = size - i;
            if self.full_reentrant {
                self.reentrant_rebuild(move |old, fresh| unsafe {
                    fresh.relocate_range_from(begin, old, begin, i);
                    fresh.install(dst, elem);
                    fresh.relocate_range_from(dst + 1, old, dst, tail);
                })?;
            } else {
                unsafe { self.backend.shift_within(dst + 1, dst, size - i) };
                unsafe { self.backend.install(dst, elem) };
            }
            self.end += 1;
        }
        Ok(())
    }

    fn circular_insert(&mut self, elem: Elem<T>) -> Result<()> {
        let cap = self.backend.capacity();
        if cap == 0 {
            return Err(VectorError::OutOfMemory);
        }
        let window = self.circular_window();
        let pos = self.circular_next % cap;
        let size = self.end - self.begin;
        if size >= window {
            // The window is already full: this push evicts the current
            // oldest element. Its physical slot is always exactly one step
            // behind `pos` in the ring (capacity is `window + 1`), so the
            // eviction is dropped explicitly here rather than waiting for a
            // future `install` to land on that same slot — which would
            // otherwise leave it initialized-but-unreachable (never visited
            // by `Drop`/`clear`'s `0..len()` scan) for up to one more push.
            let evicted = self.physical_index(0);
            unsafe { self.backend.drop_slot(evicted, self.secure_wipe, self.wipe_fn) };
            unsafe { self.backend.install(pos, elem) };
        } else {
            unsafe { self.backend.install(pos, elem) };
            self.end += 1;
        }
        self.circular_next = self.circular_next.wrapping_add(1);
        tracing::trace!(pos, "circular overwrite");
        Ok(())
    }

    /// `remove-at(v, i, mode)` (spec §4.5). Returns the removed element to
    /// the caller: a by-value vector hands over the owned `T`; a
    /// by-reference vector hands back the borrowed pointer it never owned.
    pub fn remove_at(&mut self, i: usize, mode: OverflowMode) -> Result<Elem<T>> {
        let _g = self.lock(Priority::Primitive);
        self.check_corruption()?;

        let size = self.len();
        if size == 0 {
            return Err(VectorError::VectorEmpty);
        }

        let i = if i >= size {
            match mode {
                OverflowMode::AppendOnOverflow => size - 1,
                OverflowMode::Strict => {
                    return Err(VectorError::IndexOutOfBounds { index: i, len: size })
                }
            }
        } else {
            i
        };

        let physical = self.physical_index(i);
        let elem = unsafe { self.backend.take(physical, self.secure_wipe, self.wipe_fn) };

        if self.circular {
            // Closing the gap shifts the remainder down by a physical slot,
            // same as the non-circular path. That leaves the tail physical
            // slot holding a bitwise duplicate of its new neighbor — harmless
            // for a `Borrowed` backend (duplicating a pointer is free), but
            // for an `Owned` backend the duplicated slot and the slot it
            // duplicates both look like live values of the same `T`. Rolling
            // the write cursor back by one retires that tail slot from the
            // live window instead of leaving it double-counted: the next
            // push reclaims it with a plain `install`, and `Drop`/`clear`
            // never see it at all.
            if i + 1 < size {
                for j in i..size - 1 {
                    let src = self.physical_index(j + 1);
                    let dst = self.physical_index(j);
                    unsafe { self.backend.shift_within(dst, src, 1) };
                }
            }
            self.circular_next = self.circular_next.wrapping_sub(1);
            self.end -= 1;
            return Ok(elem);
        }

        if i == 0 {
            self.begin += 1;
        } else {
            let begin = self.begin;
            let src = begin + i + 1;
            let count = self.end - src;
            if self.full_reentrant {
                self.reentrant_rebuild(move |old, fresh| unsafe {
                    fresh.relocate_range_from(begin, old, begin, i);
                    fresh.relocate_range_from(begin + i, old, src, count);
                })?;
            } else if count > 0 {
                unsafe { self.backend.shift_within(self.begin + i, src, count) };
            }
            self.end -= 1;
        }

        if self.begin == self.end {
            // Edge case (a): collapse to empty at whichever endpoint moved
            // last; both already agree, nothing further to normalize.
        }

        let side = if i == 0 { Side::Left } else { Side::Right };
        self.maybe_shrink(side)?;
        Ok(elem)
    }

    /// `put-at(v, value, i)` (spec §4.5): overwrite without changing size.
    /// Circular vectors fold `i` modulo the live window; non-circular
    /// vectors fail strictly out of range (there is no overflow mode for
    /// `put_at` in the spec's signature).
    pub fn put_at(&mut self, elem: Elem<T>, i: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.check_corruption()?;
        let size = self.len();
        if size == 0 {
            return Err(VectorError::VectorEmpty);
        }
        let idx = if self.circular { i % size } else { i };
        if idx >= size {
            return Err(VectorError::IndexOutOfBounds { index: i, len: size });
        }
        let physical = self.physical_index(idx);
        unsafe { self.backend.overwrite(physical, elem, self.secure_wipe, self.wipe_fn) };
        Ok(())
    }

    /// `delete-at(v, start, offset)` (spec §4.5): removes `offset + 1`
    /// contiguous elements starting at `start`, freeing (and wiping, if
    /// enabled) each one, then shifting the tail down.
    pub fn delete_at(&mut self, start: usize, offset: usize) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.check_corruption()?;
        let size = self.len();
        let count = offset + 1;
        if start >= size || count > size - start {
            return Err(VectorError::IndexOutOfBounds {
                index: start + offset,
                len: size,
            });
        }

        for k in 0..count {
            let physical = self.physical_index(start + k);
            unsafe { self.backend.drop_slot(physical, self.secure_wipe, self.wipe_fn) };
        }

        if self.circular {
            // Same tail-duplication hazard as `remove_at`'s circular branch:
            // closing the gap leaves `count` physical slots at the tail
            // bitwise-duplicating slots still inside the live window. Rolling
            // the write cursor back by `count` retires them from the window
            // instead of leaving them live-and-unreachable.
            let remaining = size - start - count;
            for j in start..start + remaining {
                let src = self.physical_index(j + count);
                let dst = self.physical_index(j);
                unsafe { self.backend.shift_within(dst, src, 1) };
            }
            self.circular_next = self.circular_next.wrapping_sub(count);
            self.end -= count;
            return Ok(());
        }

        let begin = self.begin;
        let src = begin + start + count;
        let tail_count = self.end - src;
        if self.full_reentrant {
            self.reentrant_rebuild(move |old, fresh| unsafe {
                fresh.relocate_range_from(begin, old, begin, start);
                fresh.relocate_range_from(begin + start, old, src, tail_count);
            })?;
        } else if tail_count > 0 {
            unsafe { self.backend.shift_within(self.begin + start, src, tail_count) };
        }
        self.end -= count;

        let side = if start == 0 { Side::Left } else { Side::Right };
        self.maybe_shrink(side)?;
        Ok(())
    }

    fn check_corruption(&self) -> Result<()> {
        self.ensure_live()?;
        if self.begin > self.end {
            return Err(VectorError::VectorCorrupted {
                begin: self.begin,
                end: self.end,
            });
        }
        Ok(())
    }

    // --- Thin aliases onto the primitives above (spec §1: "push vs add
    // being aliases for insert at tail" are out of scope to specify
    // independently, multiplexed onto the same internal primitive). ---

    /// Insert at the tail. Alias: [`DynVec::add`].
    pub fn push_back(&mut self, elem: Elem<T>) -> Result<()> {
        let len = self.len();
        self.insert_at(elem, len, OverflowMode::Strict)
    }

    /// Alias for [`DynVec::push_back`].
    pub fn push(&mut self, elem: Elem<T>) -> Result<()> {
        self.push_back(elem)
    }

    /// Alias for [`DynVec::push_back`].
    pub fn add(&mut self, elem: Elem<T>) -> Result<()> {
        self.push_back(elem)
    }

    /// Insert at the head.
    pub fn push_front(&mut self, elem: Elem<T>) -> Result<()> {
        self.insert_at(elem, 0, OverflowMode::Strict)
    }

    /// Remove and return the tail element. Alias: [`DynVec::pop`].
    pub fn pop_back(&mut self) -> Result<Elem<T>> {
        let _g = self.lock(Priority::Primitive);
        self.ensure_live()?;
        let len = self.len();
        drop(_g);
        if len == 0 {
            return Err(VectorError::VectorEmpty);
        }
        self.remove_at(len - 1, OverflowMode::Strict)
    }

    /// Alias for [`DynVec::pop_back`].
    pub fn pop(&mut self) -> Result<Elem<T>> {
        self.pop_back()
    }

    /// Remove and return the head element.
    pub fn pop_front(&mut self) -> Result<Elem<T>> {
        self.remove_at(0, OverflowMode::Strict)
    }
}
