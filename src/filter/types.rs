use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

/// Comparison carried by a filter predicate.
///
/// `Other` keeps an unrecognised bracket suffix verbatim; the store decides
/// what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive equality. Only built internally, never from a query string.
    IEq,
    Other(String),
}

impl FilterOp {
    /// Map a bracket suffix (`unidades[gte]`) to an operator.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "gte" => FilterOp::Gte,
            "gt" => FilterOp::Gt,
            "lte" => FilterOp::Lte,
            "lt" => FilterOp::Lt,
            other => FilterOp::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Gt => "$gt",
            FilterOp::Gte => "$gte",
            FilterOp::Lt => "$lt",
            FilterOp::Lte => "$lte",
            FilterOp::IEq => "$ieq",
            FilterOp::Other(op) => op,
        }
    }

    /// Whether `actual.cmp(expected)` satisfies this operator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq | FilterOp::IEq => ordering == Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Other(_) => false,
        }
    }

    pub fn to_sql(&self) -> Option<&'static str> {
        match self {
            FilterOp::Eq | FilterOp::IEq => Some("="),
            FilterOp::Gt => Some(">"),
            FilterOp::Gte => Some(">="),
            FilterOp::Lt => Some("<"),
            FilterOp::Lte => Some("<="),
            FilterOp::Other(_) => None,
        }
    }
}

/// One `{field: {op: value}}` condition. Predicates on a query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self { field: field.into(), op, value: value.into() }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Typed reading of the raw value: a JSON number or boolean when the text
    /// is one, `None` for anything that must be compared as text.
    pub fn typed_value(&self) -> Option<Value> {
        serde_json::from_str::<Value>(self.value.trim())
            .ok()
            .filter(|v| v.is_number() || v.is_boolean())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Which attributes of each document are returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Everything except these fields.
    Exclude(Vec<String>),
    /// Only these fields (plus the identifier).
    Include(Vec<String>),
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Exclude(vec![])
    }
}

/// Page number and size resolved from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Rows before this page, capped at the largest `bigint`.
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
