//! Fractional-index ordering for user-sorted lists.
//!
//! # Responsibility
//! - Allocate sortable string keys so insert/append/move touch one item only.
//! - Detect the single displaced item after a drag-and-drop reorder.
//!
//! # Invariants
//! - Keys compare with plain byte-wise `str` ordering (SQLite `BINARY`).
//! - Keys only end in `0` through the `a0` start suffix; no produced key is
//!   the bare prefix of such a key, so neighbours always leave room.
//! - Functions here are total: malformed input degrades, it never errors.

pub mod key;
pub mod reorder;

pub use key::{generate_key_between, next_key, DEFAULT_START_KEY};
pub use reorder::{apply_reorder, find_moved_index, Orderable};
