//! Canonical ordering of station identifiers.
//!
//! Identifiers that parse as integers come first, in numeric order; the
//! rest follow in lexical order. Numeric ties (`"012"` vs `"12"`) fall
//! back to lexical order so every listing is deterministic.

use std::cmp::Ordering;
use std::collections::HashSet;

/// Sort key for a station identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StationKey<'a> {
    Numeric(i64, &'a str),
    Text(&'a str),
}

impl<'a> StationKey<'a> {
    fn of(id: &'a str) -> Self {
        match id.trim().parse::<i64>() {
            Ok(n) => StationKey::Numeric(n, id),
            Err(_) => StationKey::Text(id),
        }
    }
}

/// Compare two station identifiers by the canonical ordering.
pub fn compare_stations(a: &str, b: &str) -> Ordering {
    StationKey::of(a).cmp(&StationKey::of(b))
}

/// Sort identifiers in place by the canonical ordering.
pub fn sort_stations<S: AsRef<str>>(stations: &mut [S]) {
    stations.sort_by(|a, b| compare_stations(a.as_ref(), b.as_ref()));
}

/// De-duplicate identifiers, keeping the first occurrence of each.
pub fn dedup_preserving_order<S: AsRef<str>>(stations: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    stations
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// De-duplicate identifiers and return them in canonical order.
pub fn sorted_unique<S: AsRef<str>>(stations: &[S]) -> Vec<String> {
    let mut unique = dedup_preserving_order(stations);
    sort_stations(&mut unique);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_before_text() {
        let mut ids = vec!["abc", "10", "B2", "2"];
        sort_stations(&mut ids);
        assert_eq!(ids, ["2", "10", "B2", "abc"]);
    }

    #[test]
    fn numeric_order_not_lexical() {
        let mut ids = vec!["100", "9", "25"];
        sort_stations(&mut ids);
        assert_eq!(ids, ["9", "25", "100"]);
    }

    #[test]
    fn negative_and_signed_numbers() {
        let mut ids = vec!["5", "-3", "+4"];
        sort_stations(&mut ids);
        assert_eq!(ids, ["-3", "+4", "5"]);
    }

    #[test]
    fn numeric_ties_break_lexically() {
        let mut ids = vec!["12", "012"];
        sort_stations(&mut ids);
        assert_eq!(ids, ["012", "12"]);
    }

    #[test]
    fn overflowing_number_is_text() {
        let mut ids = vec!["99999999999999999999", "1"];
        sort_stations(&mut ids);
        assert_eq!(ids, ["1", "99999999999999999999"]);
        assert_eq!(compare_stations("99999999999999999999", "A"), Ordering::Less);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let ids = ["456", "123", "456", "abc", "123"];
        assert_eq!(dedup_preserving_order(&ids), ["456", "123", "abc"]);
    }

    #[test]
    fn sorted_unique_dedups_and_sorts() {
        let ids = ["456", "x", "123", "456"];
        assert_eq!(sorted_unique(&ids), ["123", "456", "x"]);
    }

    #[test]
    fn empty_input() {
        let ids: [&str; 0] = [];
        assert!(sorted_unique(&ids).is_empty());
        assert!(dedup_preserving_order(&ids).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn station_id() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u32..100_000).prop_map(|n| n.to_string()),
            "[A-Z][A-Z0-9]{0,5}",
        ]
    }

    proptest! {
        /// Every numeric identifier precedes every non-numeric one
        #[test]
        fn numeric_prefix(ids in prop::collection::vec(station_id(), 0..40)) {
            let sorted = sorted_unique(&ids);
            let first_text = sorted
                .iter()
                .position(|s| s.parse::<i64>().is_err())
                .unwrap_or(sorted.len());
            prop_assert!(sorted[first_text..].iter().all(|s| s.parse::<i64>().is_err()));
        }

        /// Numeric identifiers are in ascending numeric order
        #[test]
        fn numeric_ascending(ids in prop::collection::vec(station_id(), 0..40)) {
            let numbers: Vec<i64> = sorted_unique(&ids)
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            prop_assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
        }

        /// Sorting is insensitive to input order
        #[test]
        fn order_independent(ids in prop::collection::vec(station_id(), 0..40)) {
            let mut reversed = ids.clone();
            reversed.reverse();
            prop_assert_eq!(sorted_unique(&ids), sorted_unique(&reversed));
        }

        /// De-duplication never loses an identifier
        #[test]
        fn dedup_complete(ids in prop::collection::vec(station_id(), 0..40)) {
            let unique = dedup_preserving_order(&ids);
            prop_assert!(ids.iter().all(|id| unique.contains(id)));
            let set: HashSet<&String> = unique.iter().collect();
            prop_assert_eq!(set.len(), unique.len());
        }
    }
}
