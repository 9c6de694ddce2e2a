//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Drive the ordering engine for create (append) and drag-reorder flows.
//!
//! # Invariants
//! - A reorder request must name every item of the list exactly once.
//! - A reorder persists at most one changed order key.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub mod object_service;
pub mod property_service;

/// Why a requested order could not be matched to stored items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ArrangeError<K> {
    LengthMismatch { expected: usize, actual: usize },
    Unknown(K),
    Duplicate(K),
}

/// Rearranges `items` to follow `ordered`, which must be a permutation of
/// the items' keys.
pub(crate) fn arrange_in_order<T, K, F>(
    items: Vec<T>,
    ordered: &[K],
    key_of: F,
) -> Result<Vec<T>, ArrangeError<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    if items.len() != ordered.len() {
        return Err(ArrangeError::LengthMismatch {
            expected: items.len(),
            actual: ordered.len(),
        });
    }

    let mut seen = HashSet::with_capacity(ordered.len());
    if let Some(duplicate) = ordered.iter().find(|key| !seen.insert(*key)) {
        return Err(ArrangeError::Duplicate(duplicate.clone()));
    }

    let mut by_key: HashMap<K, T> = items.into_iter().map(|item| (key_of(&item), item)).collect();
    ordered
        .iter()
        .map(|key| {
            by_key
                .remove(key)
                .ok_or_else(|| ArrangeError::Unknown(key.clone()))
        })
        .collect()
}
