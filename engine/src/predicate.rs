//! Leaf predicates and kind-aware value comparison.

use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
        };
        f.write_str(symbol)
    }
}

/// Value kinds, in the order used to rank values of different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Bool,
    Number,
    String,
    List,
    Object,
}

impl Kind {
    /// Kind of a JSON value. `null` has no kind: it counts as absent.
    pub fn of(value: &Value) -> Option<Kind> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Kind::Bool),
            Value::Number(_) => Some(Kind::Number),
            Value::String(_) => Some(Kind::String),
            Value::Array(_) => Some(Kind::List),
            Value::Object(_) => Some(Kind::Object),
        }
    }
}

/// A single `(path, operator, literal)` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub path: FieldPath,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub fn new(path: impl Into<FieldPath>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluate against a record payload.
    ///
    /// An absent field matches no operator, `Ne` included.
    pub fn matches(&self, payload: &Value) -> bool {
        match self.path.resolve(payload) {
            Some(field) => apply(self.op, field, &self.value),
            None => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.op, self.value)
    }
}

fn apply(op: Op, field: &Value, literal: &Value) -> bool {
    match op {
        Op::Eq => values_equal(field, literal),
        Op::Ne => Kind::of(field).is_some()
            && Kind::of(field) == Kind::of(literal)
            && !values_equal(field, literal),
        Op::Gt => compare_values(field, literal) == Some(Ordering::Greater),
        Op::Ge => matches!(
            compare_values(field, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Op::Lt => compare_values(field, literal) == Some(Ordering::Less),
        Op::Le => matches!(
            compare_values(field, literal),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Kind-aware equality.
///
/// Numbers compare by value whatever their representation, so `100` equals
/// `100.0`. Lists and objects compare structurally. Mismatched kinds and
/// `null` are never equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        _ => false,
    }
}

/// Kind-aware ordering between two values of the same scalar kind.
///
/// Returns `None` for mismatched kinds, for lists and objects, and for `null`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Some(compare_numbers(x, y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order over all present values, used for sorting.
///
/// Values of one scalar kind use [`compare_values`]; different kinds rank
/// bool < number < string < list < object. Lists and objects tie with
/// their own kind.
pub fn total_order(a: &Value, b: &Value) -> Ordering {
    match (Kind::of(a), Kind::of(b)) {
        (Some(ka), Some(kb)) if ka != kb => ka.cmp(&kb),
        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

/// Compare two numbers by their exact value.
///
/// Integers never pass through `f64`, so the result is a total order even
/// past 2^53 and `-0.0` equals `0.0`.
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_integer_float(x, float(b)),
        (None, Some(y)) => compare_integer_float(y, float(a)).reverse(),
        (None, None) => {
            let (x, y) = (float(a), float(b));
            x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
        }
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn compare_integer_float(int: i128, float: f64) -> Ordering {
    if float.is_nan() {
        return Ordering::Less;
    }
    // Saturating cast: infinities and huge floats land past every i64/u64.
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&float).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}
