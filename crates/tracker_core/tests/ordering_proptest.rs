//! Property-based tests for order keys and single-move reorders.

use proptest::prelude::*;
use tracker_core::{apply_reorder, generate_key_between, Orderable};

#[derive(Clone, Debug)]
struct Slot {
    id: usize,
    order: Option<String>,
}

impl Orderable for Slot {
    fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    fn set_order(&mut self, order: String) {
        self.order = Some(order);
    }
}

/// Builds a sorted key list by inserting at the given relative positions.
fn keys_from_inserts(positions: &[f64]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for pos_pct in positions {
        let index = ((*pos_pct * keys.len() as f64) as usize).min(keys.len());
        let lower = index.checked_sub(1).map(|i| keys[i].as_str());
        let upper = keys.get(index).map(String::as_str);
        let key = generate_key_between(lower, upper);
        keys.insert(index, key);
    }
    keys
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every insert lands strictly between its neighbours.
    #[test]
    fn inserts_land_strictly_between_neighbours(
        positions in prop::collection::vec(0.0..=1.0f64, 1..80),
    ) {
        let mut keys: Vec<String> = Vec::new();
        for pos_pct in &positions {
            let index = ((*pos_pct * keys.len() as f64) as usize).min(keys.len());
            let lower = index.checked_sub(1).map(|i| keys[i].clone());
            let upper = keys.get(index).cloned();
            let key = generate_key_between(lower.as_deref(), upper.as_deref());

            prop_assert!(!key.is_empty());
            if let Some(lower) = &lower {
                prop_assert!(lower.as_str() < key.as_str(), "{} < {}", lower, key);
            }
            if let Some(upper) = &upper {
                prop_assert!(key.as_str() < upper.as_str(), "{} < {}", key, upper);
            }
            keys.insert(index, key);
        }

        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Keys only use the base-62 alphabet.
    #[test]
    fn keys_stay_inside_alphabet(
        positions in prop::collection::vec(0.0..=1.0f64, 1..60),
    ) {
        for key in keys_from_inserts(&positions) {
            prop_assert!(key.chars().all(|c| c.is_ascii_alphanumeric()), "{}", key);
        }
    }

    /// A single drag-and-drop move rewrites exactly one key and restores
    /// ascending order.
    #[test]
    fn single_move_rekeys_one_item(
        positions in prop::collection::vec(0.0..=1.0f64, 2..30),
        from_pct in 0.0..1.0f64,
        to_pct in 0.0..1.0f64,
    ) {
        let keys = keys_from_inserts(&positions);
        let mut slots: Vec<Slot> = keys
            .iter()
            .enumerate()
            .map(|(id, key)| Slot { id, order: Some(key.clone()) })
            .collect();

        let from = ((from_pct * slots.len() as f64) as usize).min(slots.len() - 1);
        let to = ((to_pct * slots.len() as f64) as usize).min(slots.len() - 1);
        let moved = slots.remove(from);
        slots.insert(to, moved);

        let before: Vec<Option<String>> = slots.iter().map(|slot| slot.order.clone()).collect();
        let result = apply_reorder(&mut slots);

        let changed = slots
            .iter()
            .zip(&before)
            .filter(|(slot, old)| &slot.order != *old)
            .count();
        if from == to {
            prop_assert_eq!(result, None);
            prop_assert_eq!(changed, 0);
        } else {
            prop_assert!(result.is_some());
            prop_assert_eq!(changed, 1);
        }

        let orders: Vec<&str> = slots.iter().filter_map(|slot| slot.order.as_deref()).collect();
        prop_assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));

        let ids: Vec<usize> = slots.iter().map(|slot| slot.id).collect();
        let mut sorted_ids = ids.clone();
        sorted_ids.sort_unstable();
        prop_assert_eq!(sorted_ids, (0..keys.len()).collect::<Vec<_>>());
    }
}
