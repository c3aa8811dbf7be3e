//! Query expressions and the fluent query builder.
//!
//! A [`Query`] is an immutable expression tree of predicates combined with
//! AND / OR / NOT, plus an optional list of ordering keys:
//!
//! ```rust
//! use tome_engine::Query;
//!
//! let query = Query::where_field("author")
//!     .eq("Author1")
//!     .and("meta.total_reads")
//!     .ge(100)
//!     .order_by_desc("meta.total_reads");
//! ```
//!
//! ## Grouping
//!
//! The tree grows from left to right, one builder call at a time:
//!
//! - `.and` on a query whose root is an AND adds one more conjunct to that
//!   same level, and `.or` does the same for an OR root.
//! - Switching combinator wraps everything built so far as the first
//!   operand of a new node. `A.or(B).and(C)` is `(A or B) and C`, while
//!   `A.and(B).or(C)` is `(A and B) or C`.
//! - The argument of `.or` is always a single operand, even if it is an OR
//!   itself. Its ordering keys are ignored.
//!
//! A query without conditions matches every record.

use crate::path::FieldPath;
use crate::predicate::{Op, Predicate};
use crate::sort::{Direction, OrderSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Node of a query expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "args", rename_all = "lowercase")]
pub enum Expr {
    Predicate(Predicate),
    And(Vec<Arc<Expr>>),
    Or(Vec<Arc<Expr>>),
    Not(Arc<Expr>),
}

impl Expr {
    /// Evaluate against a record payload.
    pub fn evaluate(&self, payload: &Value) -> bool {
        match self {
            Expr::Predicate(predicate) => predicate.matches(payload),
            Expr::And(operands) => operands.iter().all(|e| e.evaluate(payload)),
            Expr::Or(operands) => operands.iter().any(|e| e.evaluate(payload)),
            Expr::Not(operand) => !operand.evaluate(payload),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, operands: &[Arc<Expr>], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{operand}")?;
            }
            f.write_str(")")
        }

        match self {
            Expr::Predicate(predicate) => write!(f, "{predicate}"),
            Expr::And(operands) => join(f, operands, " and "),
            Expr::Or(operands) => join(f, operands, " or "),
            Expr::Not(operand) => write!(f, "not {operand}"),
        }
    }
}

/// A query: an optional condition tree plus ordering keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    condition: Option<Arc<Expr>>,
    order: Vec<OrderSpec>,
}

impl Query {
    /// A query that matches every record, in scan order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query with a condition on `path`.
    pub fn where_field(path: impl Into<FieldPath>) -> Criterion {
        Criterion {
            base: Query::new(),
            path: path.into(),
            join: Join::And,
        }
    }

    /// Add a condition on `path`, ANDed with everything built so far.
    pub fn and(self, path: impl Into<FieldPath>) -> Criterion {
        Criterion {
            base: self,
            path: path.into(),
            join: Join::And,
        }
    }

    /// OR this query with `other`.
    pub fn or(self, other: Query) -> Query {
        let condition = match (self.condition, other.condition) {
            // An unconditional side matches everything.
            (None, _) | (_, None) => None,
            (Some(left), Some(right)) => Some(Arc::new(grow(left, right, Join::Or))),
        };
        Query {
            condition,
            order: self.order,
        }
    }

    /// Negate the condition built so far. Negating an empty query yields a
    /// query that matches nothing.
    pub fn not(self) -> Query {
        let negated = match self.condition {
            Some(expr) => Expr::Not(expr),
            None => Expr::Not(Arc::new(Expr::And(Vec::new()))),
        };
        Query {
            condition: Some(Arc::new(negated)),
            order: self.order,
        }
    }

    /// Append an ascending ordering key.
    pub fn order_by(self, path: impl Into<FieldPath>) -> Query {
        self.push_order(path.into(), Direction::Ascending)
    }

    /// Append a descending ordering key.
    pub fn order_by_desc(self, path: impl Into<FieldPath>) -> Query {
        self.push_order(path.into(), Direction::Descending)
    }

    fn push_order(mut self, path: FieldPath, direction: Direction) -> Query {
        self.order.push(OrderSpec { path, direction });
        self
    }

    /// The condition tree, `None` when the query matches everything.
    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_deref()
    }

    /// Ordering keys, primary key first.
    pub fn order(&self) -> &[OrderSpec] {
        &self.order
    }

    /// Evaluate the condition against a record payload.
    pub fn matches(&self, payload: &Value) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |expr| expr.evaluate(payload))
    }

    fn with_predicate(self, predicate: Predicate, join: Join) -> Query {
        let leaf = Arc::new(Expr::Predicate(predicate));
        let condition = match self.condition {
            None => leaf,
            Some(existing) => Arc::new(grow(existing, leaf, join)),
        };
        Query {
            condition: Some(condition),
            order: self.order,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(expr) => write!(f, "{expr}")?,
            None => f.write_str("*")?,
        }
        for spec in &self.order {
            write!(f, " {spec}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    And,
    Or,
}

/// Attach `right` to `left` under `join`, flattening into `left` when it is
/// already a node of the same combinator.
fn grow(left: Arc<Expr>, right: Arc<Expr>, join: Join) -> Expr {
    match (join, left.as_ref()) {
        (Join::And, Expr::And(operands)) => {
            let mut operands = operands.clone();
            operands.push(right);
            Expr::And(operands)
        }
        (Join::Or, Expr::Or(operands)) => {
            let mut operands = operands.clone();
            operands.push(right);
            Expr::Or(operands)
        }
        (Join::And, _) => Expr::And(vec![left, right]),
        (Join::Or, _) => Expr::Or(vec![left, right]),
    }
}

/// A pending condition on a field, completed by choosing an operator.
#[derive(Debug, Clone)]
#[must_use = "a criterion does nothing until an operator is applied"]
pub struct Criterion {
    base: Query,
    path: FieldPath,
    join: Join,
}

impl Criterion {
    /// Complete the condition with an arbitrary operator.
    pub fn op(self, op: Op, value: impl Into<Value>) -> Query {
        let predicate = Predicate {
            path: self.path,
            op,
            value: value.into(),
        };
        self.base.with_predicate(predicate, self.join)
    }

    pub fn eq(self, value: impl Into<Value>) -> Query {
        self.op(Op::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Query {
        self.op(Op::Ne, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Query {
        self.op(Op::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Query {
        self.op(Op::Ge, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Query {
        self.op(Op::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Query {
        self.op(Op::Le, value)
    }
}
