//! Single-move reorder detection and key reassignment.
//!
//! # Responsibility
//! - Define the `Orderable` capability shared by sortable entities.
//! - Rewrite exactly one key after a drag-and-drop move.
//!
//! # Invariants
//! - At most one item's key is mutated per `apply_reorder` call.
//! - Input that does not look like a single move is left untouched.

use super::key::generate_key_between;
use log::{debug, warn};

/// Entity carrying a mutable, optional order key.
pub trait Orderable {
    /// Current order key, if one has been assigned.
    fn order(&self) -> Option<&str>;
    /// Replaces the order key.
    fn set_order(&mut self, order: String);
}

impl<T: Orderable + ?Sized> Orderable for &mut T {
    fn order(&self) -> Option<&str> {
        (**self).order()
    }

    fn set_order(&mut self, order: String) {
        (**self).set_order(order);
    }
}

/// Assigns a new key to the one item that moved.
///
/// `items` must already be in the desired final order while still carrying
/// the keys of the previous order. Returns the index of the re-keyed item,
/// or `None` when nothing was changed.
///
/// Missing keys are read as empty strings. When no single displaced item
/// can be identified (several items moved, duplicate keys out of place),
/// nothing is rewritten and the caller keeps its previous persisted order.
pub fn apply_reorder<T: Orderable>(items: &mut [T]) -> Option<usize> {
    if items.len() < 2 {
        return None;
    }

    let orders: Vec<&str> = items.iter().map(|item| item.order().unwrap_or("")).collect();
    if is_strictly_increasing(&orders) {
        debug!(
            "event=reorder_apply module=ordering status=skip reason=already_ordered len={}",
            orders.len()
        );
        return None;
    }

    let Some(moved) = find_moved_index(&orders) else {
        warn!(
            "event=reorder_apply module=ordering status=skip reason=no_single_move len={}",
            orders.len()
        );
        return None;
    };

    let before = moved.checked_sub(1).map(|index| orders[index]);
    let after = orders.get(moved + 1).copied();
    let new_key = generate_key_between(before, after);
    items[moved].set_order(new_key);

    debug!(
        "event=reorder_apply module=ordering status=ok moved_index={} len={}",
        moved,
        items.len()
    );
    Some(moved)
}

/// Finds the first index whose removal leaves the rest in non-decreasing order.
pub fn find_moved_index<S: AsRef<str>>(orders: &[S]) -> Option<usize> {
    (0..orders.len()).find(|&candidate| {
        let mut remaining = orders
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != candidate)
            .map(|(_, order)| order.as_ref());
        let Some(mut previous) = remaining.next() else {
            return true;
        };
        remaining.all(|current| {
            let sorted = previous <= current;
            previous = current;
            sorted
        })
    })
}

fn is_strictly_increasing(orders: &[&str]) -> bool {
    orders.windows(2).all(|pair| pair[0] < pair[1])
}

#[cfg(test)]
mod tests {
    use super::{apply_reorder, find_moved_index, is_strictly_increasing, Orderable};

    #[derive(Debug)]
    struct Item(Option<String>);

    impl Orderable for Item {
        fn order(&self) -> Option<&str> {
            self.0.as_deref()
        }

        fn set_order(&mut self, order: String) {
            self.0 = Some(order);
        }
    }

    fn items(keys: &[&str]) -> Vec<Item> {
        keys.iter().map(|key| Item(Some((*key).to_string()))).collect()
    }

    #[test]
    fn strictly_increasing_rejects_ties() {
        assert!(is_strictly_increasing(&["a0", "a1"]));
        assert!(!is_strictly_increasing(&["a0", "a0"]));
        assert!(is_strictly_increasing(&[]));
    }

    #[test]
    fn find_moved_index_prefers_first_candidate() {
        // Swapping two neighbours: removing either one sorts the rest.
        assert_eq!(find_moved_index(&["a1", "a0"]), Some(0));
        assert_eq!(find_moved_index(&["a2", "a0", "a1"]), Some(0));
        assert_eq!(find_moved_index(&["a1", "a2", "a0"]), Some(2));
        assert_eq!(find_moved_index(&["a0", "a3", "a1", "a2"]), Some(1));
    }

    #[test]
    fn find_moved_index_rejects_multi_moves() {
        assert_eq!(find_moved_index(&["a3", "a2", "a1", "a0"]), None);
    }

    #[test]
    fn find_moved_index_tolerates_ties_in_remainder() {
        assert_eq!(find_moved_index(&["b", "a", "a"]), Some(0));
    }

    #[test]
    fn unkeyed_tail_item_is_keyed_after_its_neighbour() {
        let mut list = vec![
            Item(Some("a0".to_string())),
            Item(Some("a1".to_string())),
            Item(None),
        ];

        let moved = apply_reorder(&mut list);

        assert_eq!(moved, Some(2));
        let key = list[2].0.clone().expect("moved item should be keyed");
        assert!(key.as_str() > "a1");
        assert_eq!(list[0].0.as_deref(), Some("a0"));
        assert_eq!(list[1].0.as_deref(), Some("a1"));
    }

    #[test]
    fn reorder_through_mutable_references() {
        let mut first = Item(Some("a0".to_string()));
        let mut second = Item(Some("a1".to_string()));
        let mut refs = vec![&mut second, &mut first];

        assert_eq!(apply_reorder(&mut refs), Some(0));
        assert!(second.0.as_deref().expect("keyed") < "a0");
        assert_eq!(first.0.as_deref(), Some("a0"));
    }

    #[test]
    fn degenerate_input_is_left_untouched() {
        let mut list = items(&["a3", "a2", "a1", "a0"]);
        assert_eq!(apply_reorder(&mut list), None);
        let keys: Vec<_> = list.iter().map(|item| item.0.clone()).collect();
        assert_eq!(
            keys,
            vec![
                Some("a3".to_string()),
                Some("a2".to_string()),
                Some("a1".to_string()),
                Some("a0".to_string()),
            ]
        );
    }
}
