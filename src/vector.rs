//! The `DynVec<T>` data model (spec §3) and its constructors.

use core::mem;

use crate::error::{Result, VectorError};
use crate::lock::{mark_subsystem_initialized, Priority, PriorityLock};
use crate::slot::{Backend, Elem, WipeFn};

/// How an out-of-range index is handled by `insert_at`/`remove_at`
/// (`put_at` takes no mode: it folds circular indices modulo the live
/// window and fails strictly otherwise, per spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowMode {
    /// Out-of-range indices are coerced to the tail instead of failing.
    AppendOnOverflow,
    /// Out-of-range indices fail with `IndexOutOfBounds`.
    Strict,
}

/// Builds a `DynVec` with one or more of the construction-time properties
/// from spec §6 (by-reference, secure-wipe, circular, plus the supplemented
/// full-reentrant mode). There is no external config source to layer here —
/// this is the entire "configuration surface" of the crate.
pub struct VectorBuilder {
    by_reference: bool,
    secure_wipe: bool,
    circular: bool,
    full_reentrant: bool,
    wipe_fn: Option<WipeFn>,
}

impl VectorBuilder {
    /// Starts from the all-defaults configuration: by-value, no wipe, linear.
    pub fn new() -> Self {
        VectorBuilder {
            by_reference: false,
            secure_wipe: false,
            circular: false,
            full_reentrant: false,
            wipe_fn: None,
        }
    }

    /// Slots store borrowed pointers instead of owned elements.
    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    /// Zero element bytes before freeing or overwriting a slot.
    pub fn secure_wipe(mut self) -> Self {
        self.secure_wipe = true;
        self
    }

    /// Fixed capacity, modulo-indexed, insertions overwrite the oldest slot.
    pub fn circular(mut self) -> Self {
        self.circular = true;
        self
    }

    /// Interior shifts rebuild into a fresh buffer instead of in place.
    pub fn full_reentrant(mut self) -> Self {
        self.full_reentrant = true;
        self
    }

    /// Installs a custom wipe callback, implying `secure_wipe()`.
    pub fn custom_wipe(mut self, f: WipeFn) -> Self {
        self.secure_wipe = true;
        self.wipe_fn = Some(f);
        self
    }

    /// Builds the configured vector with the given initial capacity.
    pub fn build<T>(self, init_capacity: usize) -> Result<DynVec<T>> {
        DynVec::build(init_capacity, self)
    }
}

impl Default for VectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bidirectional-growth dynamic array (spec §3 "vector").
///
/// Construction picks a storage discipline: by default elements are owned
/// (`T` values live inline in the buffer); [`VectorBuilder::by_reference`]
/// switches to borrowed handles (`*mut T`) that the vector never frees.
pub struct DynVec<T> {
    pub(crate) backend: Backend<T>,
    pub(crate) begin: usize,
    pub(crate) end: usize,
    #[allow(dead_code)] // retained for parity with the data model; clear() is the only reader
    pub(crate) prev_end: usize,
    pub(crate) init_capacity: usize,
    pub(crate) circular: bool,
    pub(crate) circular_next: usize,
    pub(crate) full_reentrant: bool,
    pub(crate) secure_wipe: bool,
    pub(crate) wipe_fn: Option<WipeFn>,
    pub(crate) balance: usize,
    pub(crate) bottom: usize,
    pub(crate) lock: PriorityLock,
    /// Set by [`DynVec::merge`] on its source argument (spec §8 scenario 6:
    /// "subsequent operations on v2 fail with undefined-vector").
    pub(crate) consumed: bool,
}

impl<T> DynVec<T> {
    /// A plain by-value vector with the given initial capacity.
    pub fn new(init_capacity: usize) -> Result<Self> {
        VectorBuilder::new().build(init_capacity)
    }

    /// Alias for [`DynVec::new`], matching the common `Vec`-style name.
    pub fn with_capacity(init_capacity: usize) -> Result<Self> {
        Self::new(init_capacity)
    }

    fn build(init_capacity: usize, opts: VectorBuilder) -> Result<Self> {
        mark_subsystem_initialized();

        let init_capacity = init_capacity.max(1);
        let (cap_left, cap_right) = if opts.circular {
            // One extra slot beyond the usable window, per the modulo
            // scheme in §4.5/§6.
            (0, init_capacity)
        } else {
            // A one-slot centering offset, split evenly, mirroring the
            // post-`clear()` layout invariant (spec §3 invariant 5).
            let half = (init_capacity / 2).max(1);
            (half, init_capacity - half + 1)
        };

        let backend = Backend::<T>::new(!opts.by_reference, cap_left, cap_right)?;
        let begin = if opts.circular { 0 } else { cap_left };

        Ok(DynVec {
            backend,
            begin,
            end: begin,
            prev_end: begin,
            init_capacity,
            circular: opts.circular,
            circular_next: 0,
            full_reentrant: opts.full_reentrant,
            secure_wipe: opts.secure_wipe,
            wipe_fn: opts.wipe_fn,
            balance: 0,
            bottom: 0,
            lock: PriorityLock::new(),
            consumed: false,
        })
    }

    /// Number of live elements, `end - begin`.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Whether no elements are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical capacity, `cap_left + cap_right`.
    pub fn capacity(&self) -> usize {
        self.backend.capacity()
    }

    /// Capacity requested at construction; the shrink floor.
    pub fn init_capacity(&self) -> usize {
        self.init_capacity
    }

    /// Byte size of one element when stored by value (spec §3 `data_size`).
    pub fn data_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Whether this vector stores borrowed pointers instead of owned elements.
    pub fn is_by_reference(&self) -> bool {
        !self.backend.is_owned()
    }

    /// Whether this vector is a fixed-capacity, modulo-indexed ring.
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Installs (or replaces) the custom secure-wipe callback and turns the
    /// secure-wipe property on.
    pub fn set_wipe_fn(&mut self, f: WipeFn) {
        self.secure_wipe = true;
        self.wipe_fn = Some(f);
    }

    /// The number of usable slots in a circular vector (`capacity - 1`);
    /// meaningless for non-circular vectors.
    pub(crate) fn circular_window(&self) -> usize {
        self.capacity().saturating_sub(1).max(1)
    }

    fn check_invariants(&self) -> Result<()> {
        if self.consumed {
            return Err(VectorError::UndefinedVector);
        }
        if self.begin > self.end {
            return Err(VectorError::VectorCorrupted {
                begin: self.begin,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Entry check for operations (sort, search, rotate, bulk) that don't
    /// already route through [`DynVec::check_bounds`] or the sequence ops'
    /// own `check_corruption`.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        self.check_invariants()
    }

    pub(crate) fn check_bounds(&self, index: usize) -> Result<()> {
        self.check_invariants()?;
        if index >= self.len() {
            return Err(VectorError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Acquires the priority lock for the duration of one public operation.
    pub(crate) fn lock(&self, priority: Priority) -> crate::lock::LockGuard<'_> {
        self.lock.acquire(priority)
    }

    /// Reads the element at logical index `i` (spec `get`).
    pub fn get(&self, i: usize) -> Result<&T> {
        let _g = self.lock(Priority::Primitive);
        self.check_bounds(i)?;
        let physical = self.physical_index(i);
        Ok(unsafe { self.backend.get(physical) })
    }

    /// Mutable access to the element at logical index `i`.
    pub fn get_mut(&mut self, i: usize) -> Result<&mut T> {
        let _g = self.lock(Priority::Primitive);
        self.check_bounds(i)?;
        let physical = self.physical_index(i);
        Ok(unsafe { self.backend.get_mut(physical) })
    }

    /// Explicit `shrink()` (spec §4.4): compresses the buffer to
    /// `max(init_capacity, size + 2)`, distributing the remainder evenly
    /// between left and right padding. A no-op on circular vectors, whose
    /// capacity is fixed by construction.
    pub fn shrink(&mut self) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        self.check_invariants()?;
        if self.circular {
            return Ok(());
        }
        let size = self.len();
        let target_total = self.init_capacity.max(size + 2);
        let target_left = target_total / 2;
        let target_right = target_total - target_left;
        self.backend
            .shrink_to(target_left, target_right, &mut self.begin, &mut self.end)?;
        Ok(())
    }

    /// Empties the vector, dropping (and optionally wiping) every live
    /// element, and recenters `begin == end == 1` per invariant 5.
    ///
    /// Circular vectors are unaffected by `clear` beyond dropping elements:
    /// their geometry is fixed by construction.
    pub fn clear(&mut self) -> Result<()> {
        let _g = self.lock(Priority::Primitive);
        for i in 0..self.len() {
            let physical = self.physical_index(i);
            unsafe {
                self.backend.drop_slot(physical, self.secure_wipe, self.wipe_fn);
            }
        }
        self.prev_end = self.end;
        if self.circular {
            self.circular_next = 0;
        } else {
            self.begin = 1;
            self.end = 1;
        }
        Ok(())
    }
}

impl<T> Drop for DynVec<T> {
    fn drop(&mut self) {
        for i in 0..self.len() {
            let physical = self.physical_index(i);
            unsafe {
                self.backend.drop_slot(physical, self.secure_wipe, self.wipe_fn);
            }
        }
    }
}

/// `DynVec`s that have been folded into another vector via `merge` are left
/// logically empty and flagged so further use fails predictably rather than
/// silently operating on an empty husk.
impl<T> DynVec<T> {
    pub(crate) fn mark_consumed(&mut self) -> Result<Vec<Elem<T>>> {
        // `merge` drains every live element without dropping/wiping them —
        // ownership has moved to the target vector.
        let mut out = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let physical = self.physical_index(i);
            out.push(unsafe { self.backend.take(physical, false, None) });
        }
        self.begin = 0;
        self.end = 0;
        self.consumed = true;
        Ok(out)
    }
}

use alloc::vec::Vec;
