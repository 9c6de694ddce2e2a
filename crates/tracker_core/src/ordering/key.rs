//! Order key generation over a base-62 alphabet.
//!
//! # Responsibility
//! - Produce the shortest key sorting strictly between two optional bounds.
//! - Provide append-at-end keys for newly created list items.
//!
//! # Invariants
//! - Alphabet order equals ASCII order, so `str` comparison is list order.
//! - Output is deterministic for the same bounds.
//! - Inverted or equal bounds fall back to "key after lower"; see
//!   `generate_key_between`.

use super::reorder::Orderable;
use log::warn;

/// Base-62 digit set: `0-9`, `A-Z`, `a-z`.
const DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: usize = DIGITS.len();
const FIRST_DIGIT: char = '0';
const LAST_DIGIT: char = 'z';
/// Appended when a key ending in `z` has to grow.
const MIDDLE_DIGIT: char = 'V';

/// Key assigned to the first item of an empty list.
pub const DEFAULT_START_KEY: &str = "a0";

/// Returns a key that sorts strictly between `lower` and `upper`.
///
/// `None` means "start of list" for `lower` and "end of list" for `upper`.
///
/// # Contract
/// - `lower < result < upper` when `lower < upper` (absent bounds act as
///   empty strings) and both bounds only use alphabet symbols.
/// - Inverted or equal bounds return `key_after(lower)`. That result can
///   sort after `upper`; the fallback is kept because persisted keys were
///   assigned this way.
pub fn generate_key_between(lower: Option<&str>, upper: Option<&str>) -> String {
    let a = lower.unwrap_or("");
    let b = upper.unwrap_or("");

    if a.is_empty() && b.is_empty() {
        return DEFAULT_START_KEY.to_string();
    }
    if a.is_empty() {
        return key_before(b);
    }
    if b.is_empty() {
        return key_after(a);
    }
    if a >= b {
        warn!(
            "event=order_key_fallback module=ordering status=skip reason=inverted_bounds lower_len={} upper_len={}",
            a.len(),
            b.len()
        );
        return key_after(a);
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let mut result = String::with_capacity(a_chars.len() + 1);

    let mut i = 0;
    while i < a_chars.len() && i < b_chars.len() {
        let ca = a_chars[i];
        let cb = b_chars[i];
        if ca == cb {
            result.push(ca);
            i += 1;
            continue;
        }

        let ia = digit_index(ca).unwrap_or(0) as isize;
        let ib = digit_index(cb).unwrap_or(BASE) as isize;
        let gap = ib - ia;
        if gap > 1 {
            result.push(digit_at((ia + gap / 2) as usize));
            return result;
        }
        if gap == 1 {
            // No symbol fits between adjacent digits; extend the lower side.
            result.push(ca);
            let rest: String = a_chars[i + 1..].iter().collect();
            result.push_str(&key_after(&rest));
            return result;
        }
        result.push(ca);
        i += 1;
    }

    if i < b_chars.len() {
        // Lower bound is a prefix of upper bound.
        let cb = b_chars[i];
        let ib = digit_index(cb).unwrap_or(0);
        if ib > 0 {
            result.push(digit_at(ib / 2));
            avoid_floor_suffix(&mut result);
            return result;
        }
        result.push(cb);
        let rest: String = b_chars[i + 1..].iter().collect();
        result.push_str(&key_before(&rest));
        return result;
    }

    key_after(a)
}

/// Returns the key for a new item appended after every existing item.
///
/// Items without a key are ignored. An empty list yields `DEFAULT_START_KEY`.
pub fn next_key<T: Orderable>(items: &[T]) -> String {
    let last = items.iter().filter_map(Orderable::order).max();
    generate_key_between(last, None)
}

/// Smallest-effort key sorting after `key`.
pub(crate) fn key_after(key: &str) -> String {
    let Some(last) = key.chars().last() else {
        return DEFAULT_START_KEY.to_string();
    };

    let mut result: String = key.to_string();
    match digit_index(last) {
        Some(idx) if idx < BASE - 1 => {
            let step = ((BASE - 1 - idx) / 2).max(1);
            result.pop();
            result.push(digit_at(idx + step));
        }
        _ => result.push(MIDDLE_DIGIT),
    }
    result
}

/// Smallest-effort key sorting before `key`.
pub(crate) fn key_before(key: &str) -> String {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return LAST_DIGIT.to_string();
    };

    match digit_index(first) {
        Some(idx) if idx > 0 => {
            let tail_len = chars.count();
            let mut result = String::with_capacity(tail_len + 2);
            result.push(digit_at(idx / 2));
            result.extend(std::iter::repeat(LAST_DIGIT).take(tail_len));
            avoid_floor_suffix(&mut result);
            result
        }
        _ => {
            let mut result = String::with_capacity(key.len() + 1);
            result.push(first);
            result.push_str(&key_before(chars.as_str()));
            result
        }
    }
}

/// No key sorts between `k` and `k + "0"`; pad such results with `z`.
fn avoid_floor_suffix(key: &mut String) {
    if key.ends_with(FIRST_DIGIT) {
        key.push(LAST_DIGIT);
    }
}

fn digit_index(c: char) -> Option<usize> {
    if !c.is_ascii() {
        return None;
    }
    DIGITS.iter().position(|&d| d == c as u8)
}

fn digit_at(index: usize) -> char {
    char::from(DIGITS[index])
}

#[cfg(test)]
mod tests {
    use super::{
        digit_index, generate_key_between, key_after, key_before, DEFAULT_START_KEY, DIGITS,
    };

    #[test]
    fn alphabet_is_ascii_sorted() {
        assert!(DIGITS.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(digit_index('0'), Some(0));
        assert_eq!(digit_index('z'), Some(61));
        assert_eq!(digit_index('-'), None);
        assert_eq!(digit_index('é'), None);
    }

    #[test]
    fn both_bounds_absent_yields_default_start() {
        assert_eq!(generate_key_between(None, None), DEFAULT_START_KEY);
        assert_eq!(generate_key_between(Some(""), Some("")), DEFAULT_START_KEY);
    }

    #[test]
    fn key_after_moves_last_digit_towards_top() {
        assert_eq!(key_after(""), "a0");
        assert_eq!(key_after("a0"), "aU");
        assert_eq!(key_after("ay"), "az");
        assert_eq!(key_after("az"), "azV");
    }

    #[test]
    fn key_before_halves_first_digit_and_pads() {
        assert_eq!(key_before(""), "z");
        assert_eq!(key_before("a0"), "Iz");
        assert_eq!(key_before("2"), "1");
        assert_eq!(key_before("1"), "0z");
        assert_eq!(key_before("0z"), "0U");
    }

    #[test]
    fn midpoint_is_used_when_digits_are_far_apart() {
        assert_eq!(generate_key_between(Some("a0"), Some("aU")), "aF");
        assert_eq!(generate_key_between(Some("A"), Some("C")), "B");
    }

    #[test]
    fn adjacent_digits_extend_the_lower_key() {
        assert_eq!(generate_key_between(Some("a0"), Some("a1")), "a0a0");
        assert_eq!(generate_key_between(Some("a0z"), Some("a1")), "a0zV");
        assert_eq!(generate_key_between(Some("a0y"), Some("a1")), "a0z");
    }

    #[test]
    fn start_suffix_from_adjacent_digits_leaves_room_on_both_sides() {
        let key = generate_key_between(Some("A"), Some("B"));
        assert_eq!(key, "Aa0");
        assert_eq!(generate_key_between(Some("A"), Some(&key)), "AI");
        assert_eq!(generate_key_between(Some(&key), Some("B")), "AaU");
    }

    #[test]
    fn lower_prefix_of_upper_inserts_below_next_upper_digit() {
        assert_eq!(generate_key_between(Some("a"), Some("aU")), "aF");
        assert_eq!(generate_key_between(Some("a"), Some("a1")), "a0z");
        assert_eq!(generate_key_between(Some("a"), Some("a0V")), "a0F");
    }

    #[test]
    fn inverted_bounds_fall_back_to_key_after_lower() {
        assert_eq!(generate_key_between(Some("b0"), Some("a0")), key_after("b0"));
        assert_eq!(generate_key_between(Some("a0"), Some("a0")), key_after("a0"));
    }
}
