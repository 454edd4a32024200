//! Declarative row filters.
//!
//! A [`FilterSpec`] names columns; a [`CompiledFilter`] has resolved
//! those names to column indices against a member's metadata and can
//! test decoded rows. Conditions chain with AND/OR connectors and are
//! evaluated left to right without precedence, so
//! `a AND b OR c` reads `(a AND b) OR c`.

use crate::error::{Result, XportError};
use crate::types::{Member, Value, normalize_name};

/// Comparison operator of one filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Membership in a value list.
    In,
    NotIn,
    /// Substring match on character values.
    Contains,
}

/// A literal a condition compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Num(f64),
    Str(String),
    /// Value list for `In`/`NotIn`.
    List(Vec<FilterValue>),
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// How the next condition combines with the result so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// One column comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub value: FilterValue,
}

impl Condition {
    #[must_use]
    pub fn new(column: impl Into<String>, op: CompareOp, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

/// An unresolved filter: conditions joined by connectors.
///
/// ```
/// use xport_core::filter::{CompareOp, Condition, FilterSpec};
///
/// let spec = FilterSpec::new(Condition::new("POP", CompareOp::Eq, "max"))
///     .and(Condition::new("SAMPLE", CompareOp::Ge, 3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    conditions: Vec<Condition>,
    connectors: Vec<Connector>,
}

impl FilterSpec {
    #[must_use]
    pub fn new(first: Condition) -> Self {
        Self {
            conditions: vec![first],
            connectors: Vec::new(),
        }
    }

    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.connectors.push(Connector::And);
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn or(mut self, condition: Condition) -> Self {
        self.connectors.push(Connector::Or);
        self.conditions.push(condition);
        self
    }
}

/// A filter whose columns have been resolved to positions within the
/// member's declared column order. Tests array-shaped rows.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    tests: Vec<(usize, CompareOp, FilterValue)>,
    connectors: Vec<Connector>,
}

impl CompiledFilter {
    /// Resolve a spec's column names against a member, ignoring case.
    ///
    /// # Errors
    /// `InvalidFilter` naming the first column the member lacks.
    pub fn compile(spec: &FilterSpec, member: &Member) -> Result<Self> {
        let mut tests = Vec::with_capacity(spec.conditions.len());
        for condition in &spec.conditions {
            let wanted = normalize_name(&condition.column);
            let index = member
                .variable_order
                .iter()
                .position(|name| normalize_name(name) == wanted)
                .ok_or_else(|| {
                    XportError::invalid_filter(format!(
                        "filter column not in dataset: {}",
                        condition.column
                    ))
                })?;
            tests.push((index, condition.op, condition.value.clone()));
        }
        Ok(Self {
            tests,
            connectors: spec.connectors.clone(),
        })
    }

    /// Test one fully decoded row in declared column order.
    #[must_use]
    pub fn matches(&self, row: &[Value]) -> bool {
        let mut tests = self.tests.iter();
        let Some((index, op, literal)) = tests.next() else {
            return true;
        };
        let mut accepted = test_value(row.get(*index), *op, literal);
        for (connector, (index, op, literal)) in self.connectors.iter().zip(tests) {
            let hit = test_value(row.get(*index), *op, literal);
            accepted = match connector {
                Connector::And => accepted && hit,
                Connector::Or => accepted || hit,
            };
        }
        accepted
    }
}

/// Compare one cell against a literal.
///
/// String comparisons ignore case. Missing values fail every positive
/// comparison and pass the negated ones (`Ne`, `NotIn`).
fn test_value(value: Option<&Value>, op: CompareOp, literal: &FilterValue) -> bool {
    let Some(value) = value else {
        return false;
    };
    match op {
        CompareOp::Eq => equals(value, literal),
        CompareOp::Ne => !equals(value, literal),
        CompareOp::Lt => ordering(value, literal).is_some_and(|o| o.is_lt()),
        CompareOp::Le => ordering(value, literal).is_some_and(|o| o.is_le()),
        CompareOp::Gt => ordering(value, literal).is_some_and(|o| o.is_gt()),
        CompareOp::Ge => ordering(value, literal).is_some_and(|o| o.is_ge()),
        CompareOp::In => in_list(value, literal),
        CompareOp::NotIn => !in_list(value, literal),
        CompareOp::Contains => match (value, literal) {
            (Value::Char(text), FilterValue::Str(needle)) => text
                .to_uppercase()
                .contains(&needle.to_uppercase()),
            _ => false,
        },
    }
}

fn equals(value: &Value, literal: &FilterValue) -> bool {
    match (value, literal) {
        (Value::Num(a), FilterValue::Num(b)) => a == b,
        (Value::Char(a), FilterValue::Str(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

fn ordering(value: &Value, literal: &FilterValue) -> Option<std::cmp::Ordering> {
    match (value, literal) {
        (Value::Num(a), FilterValue::Num(b)) => a.partial_cmp(b),
        (Value::Char(a), FilterValue::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn in_list(value: &Value, literal: &FilterValue) -> bool {
    match literal {
        FilterValue::List(items) => items.iter().any(|item| equals(value, item)),
        single => equals(value, single),
    }
}
