//! Ordering of query results.
//!
//! Keys are compared with the same kind-aware rules as predicates. Records
//! missing a key sort after every record that has it, in both directions.
//! Sorting is stable, so ties keep the order in which the log scanned them.

use crate::path::FieldPath;
use crate::predicate::total_order;
use crate::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// One ordering key: a field path and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub path: FieldPath,
    pub direction: Direction,
}

impl OrderSpec {
    pub fn ascending(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Descending,
        }
    }

    /// Compare two payloads on this key.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (self.path.resolve(a), self.path.resolve(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = total_order(x, y);
                match self.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            }
        }
    }

    /// Whether `a` sorts strictly before `b` on this key.
    pub fn less(&self, a: &Value, b: &Value) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        write!(f, "order by {} {}", self.path, dir)
    }
}

/// Compare two payloads on a list of keys, first key primary.
pub fn compare(a: &Value, b: &Value, order: &[OrderSpec]) -> Ordering {
    order
        .iter()
        .map(|spec| spec.compare(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable in-place sort of records by their payloads.
pub fn sort_records(records: &mut [Record], order: &[OrderSpec]) {
    if order.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare(&a.payload, &b.payload, order));
}
