//! `flexvec` — a bidirectional-growth dynamic array.
//!
//! A [`DynVec<T>`] grows amortized O(1) at both the front and the back,
//! optionally runs in a fixed-capacity circular mode, optionally wipes
//! element memory securely on removal, and can store elements either by
//! value or by reference (borrowed pointer). Every public operation is
//! wrapped in a three-tier priority lock (see [`lock`]) so composite
//! operations can nest their own primitive calls without deadlocking or
//! spuriously releasing a user-held lock.
//!
//! See `DESIGN.md` in the repository for the grounding of each module.

#![no_std]
#![warn(missing_docs)]
#![allow(clippy::missing_safety_doc)]

extern crate alloc;

mod bulk;
mod error;
mod lock;
mod raw;
mod search;
mod sequence;
mod slot;
mod sort;
mod structural;
mod vector;

pub use error::{Result, VectorError};
pub use lock::{global_locking_enabled, set_global_locking_enabled, subsystem_initialized, Priority};
pub use search::SearchResult;
pub use slot::{Elem, WipeFn};
pub use vector::{DynVec, OverflowMode, VectorBuilder};
