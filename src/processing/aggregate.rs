//! Aggregation folds for grouped cells.
//!
//! A group's accumulator starts as the raw value of its first row (not `aggregate(0, v)`);
//! every later row in the group is combined into it in row order.

use std::hash::Hash;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::config::Aggregation;

impl Aggregation {
    /// Combine the running accumulator of a group with the next value.
    ///
    /// - `Sum`: `acc + value`
    /// - `Avg`: `(acc + value) / 2`, a running pairwise average. For three or more rows this is
    ///   not the arithmetic mean; dashboards built on this output rely on the existing numbers.
    /// - `Count`: `acc + 1`, ignoring `value`. The first row contributes its raw value.
    /// - `Max` / `Min`: pairwise, `NaN` if either side is `NaN`.
    pub fn combine(self, acc: f64, value: f64) -> f64 {
        match self {
            Aggregation::Sum => acc + value,
            Aggregation::Avg => (acc + value) / 2.0,
            Aggregation::Count => acc + 1.0,
            Aggregation::Max => nan_propagating(acc, value, f64::max),
            Aggregation::Min => nan_propagating(acc, value, f64::min),
        }
    }
}

fn nan_propagating(a: f64, b: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        pick(a, b)
    }
}

/// Fold `value` into the cell for `key`, inserting it as-is when the key is new.
pub(crate) fn fold_into<K: Hash + Eq>(
    cells: &mut IndexMap<K, f64>,
    key: K,
    value: f64,
    aggregation: Aggregation,
) {
    match cells.entry(key) {
        Entry::Occupied(mut e) => {
            let acc = e.get_mut();
            *acc = aggregation.combine(*acc, value);
        }
        Entry::Vacant(e) => {
            e.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::fold_into;
    use crate::config::Aggregation;

    fn fold_all(values: &[f64], aggregation: Aggregation) -> f64 {
        let mut cells = IndexMap::new();
        for v in values {
            fold_into(&mut cells, "k", *v, aggregation);
        }
        cells["k"]
    }

    #[test]
    fn single_row_group_keeps_raw_value_for_every_aggregation() {
        for agg in [
            Aggregation::Sum,
            Aggregation::Avg,
            Aggregation::Count,
            Aggregation::Max,
            Aggregation::Min,
        ] {
            assert_eq!(fold_all(&[7.0], agg), 7.0, "{agg:?}");
        }
    }

    #[test]
    fn sum_max_min_fold_left_to_right() {
        let values = [4.0, 10.0, 1.0];
        assert_eq!(fold_all(&values, Aggregation::Sum), 15.0);
        assert_eq!(fold_all(&values, Aggregation::Max), 10.0);
        assert_eq!(fold_all(&values, Aggregation::Min), 1.0);
    }

    #[test]
    fn avg_is_a_running_pairwise_average_known_quirk() {
        // ((2 + 4) / 2 + 12) / 2 = 7.5, whereas the arithmetic mean would be 6.
        assert_eq!(fold_all(&[2.0, 4.0, 12.0], Aggregation::Avg), 7.5);
        assert_eq!(fold_all(&[2.0, 4.0], Aggregation::Avg), 3.0);
    }

    #[test]
    fn count_starts_from_first_raw_value_known_quirk() {
        // 10 (first value) + 1 + 1
        assert_eq!(fold_all(&[10.0, 99.0, 5.0], Aggregation::Count), 12.0);
    }

    #[test]
    fn max_and_min_propagate_nan() {
        assert!(fold_all(&[1.0, f64::NAN], Aggregation::Max).is_nan());
        assert!(fold_all(&[f64::NAN, 1.0], Aggregation::Min).is_nan());
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut cells = IndexMap::new();
        fold_into(&mut cells, "b", 1.0, Aggregation::Sum);
        fold_into(&mut cells, "a", 2.0, Aggregation::Sum);
        fold_into(&mut cells, "b", 3.0, Aggregation::Sum);
        assert_eq!(
            cells.into_iter().collect::<Vec<_>>(),
            vec![("b", 4.0), ("a", 2.0)]
        );
    }
}
