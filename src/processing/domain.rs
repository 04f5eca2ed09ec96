//! Ordered distinct-value domains.

use indexmap::IndexMap;

use crate::types::Value;

/// Hashable identity of a cell for grouping.
///
/// Numbers compare by value regardless of storage (`Int64(1)` and `Float64(1.0)` are one key),
/// all `NaN`s are one key and `-0` equals `0`. Absent cells and `Null` are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey<'a> {
    Absent,
    Null,
    Number(u64),
    Bool(bool),
    Text(&'a str),
}

impl<'a> GroupKey<'a> {
    pub(crate) fn of(cell: Option<&'a Value>) -> Self {
        match cell {
            None | Some(Value::Absent) => GroupKey::Absent,
            Some(Value::Null) => GroupKey::Null,
            Some(Value::Int64(v)) => GroupKey::number(*v as f64),
            Some(Value::Float64(v)) => GroupKey::number(*v),
            Some(Value::Bool(b)) => GroupKey::Bool(*b),
            Some(Value::Utf8(s)) => GroupKey::Text(s),
        }
    }

    fn number(v: f64) -> Self {
        let canonical = if v.is_nan() {
            f64::NAN
        } else if v == 0.0 {
            0.0
        } else {
            v
        };
        GroupKey::Number(canonical.to_bits())
    }
}

/// Distinct cell values in first-occurrence order, with stable indexes.
#[derive(Debug, Default)]
pub(crate) struct Domain<'a> {
    entries: IndexMap<GroupKey<'a>, Option<&'a Value>>,
}

impl<'a> Domain<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `cell` and return its domain index. A value seen before keeps its first index.
    pub(crate) fn insert(&mut self, cell: Option<&'a Value>) -> usize {
        let entry = self.entries.entry(GroupKey::of(cell));
        let idx = entry.index();
        entry.or_insert(cell);
        idx
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The first-seen value of every entry; absent cells surface as [`Value::Null`], so an
    /// absent and a null entry can both render as `null`.
    pub(crate) fn values(&self) -> Vec<Value> {
        self.entries
            .values()
            .map(|cell| match cell {
                Some(v) if !v.is_absent() => (*v).clone(),
                _ => Value::Null,
            })
            .collect()
    }
}
