//! Parsed query representation

use std::cmp::Ordering;
use std::fmt;

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    /// Resolves an upper-cased function name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUM" => Some(AggregateFunc::Sum),
            "COUNT" => Some(AggregateFunc::Count),
            "AVG" => Some(AggregateFunc::Avg),
            "MIN" => Some(AggregateFunc::Min),
            "MAX" => Some(AggregateFunc::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument of an aggregate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateArg {
    Column(String),
    /// `COUNT(*)`
    Star,
}

impl AggregateArg {
    pub fn column(&self) -> Option<&str> {
        match self {
            AggregateArg::Column(name) => Some(name),
            AggregateArg::Star => None,
        }
    }
}

impl fmt::Display for AggregateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateArg::Column(name) => f.write_str(name),
            AggregateArg::Star => f.write_str("*"),
        }
    }
}

/// One aggregate call in the select list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCall {
    pub func: AggregateFunc,
    pub arg: AggregateArg,
}

impl AggregateCall {
    pub fn new(func: AggregateFunc, arg: AggregateArg) -> Self {
        Self { func, arg }
    }

    /// Output label, e.g. `SUM(price)`
    pub fn label(&self) -> String {
        format!("{}({})", self.func, self.arg)
    }
}

/// One item of the select list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// Plain projected column
    Column(String),
    /// `*`: every column in storage order
    Wildcard,
    Aggregate(AggregateCall),
}

/// Comparison operators.
///
/// Variant order is the predicate scan order: the parser picks the first
/// operator in `SCAN_ORDER` that occurs anywhere in the clause, so `!=` and
/// `>=` win over the `=` they contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Ge,
    Le,
    Ne,
    Eq,
    Gt,
    Lt,
}

impl CompareOp {
    pub const SCAN_ORDER: [CompareOp; 6] = [
        CompareOp::Ge,
        CompareOp::Le,
        CompareOp::Ne,
        CompareOp::Eq,
        CompareOp::Gt,
        CompareOp::Lt,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Ne => "!=",
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
        }
    }

    /// Applies the operator to the result of comparing a cell with the
    /// literal. `None` (unordered, e.g. NaN) only satisfies `!=`.
    pub fn matches(&self, ordering: Option<Ordering>) -> bool {
        match self {
            CompareOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            CompareOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Ne => ordering != Some(Ordering::Equal),
            CompareOp::Eq => ordering == Some(Ordering::Equal),
            CompareOp::Gt => ordering == Some(Ordering::Greater),
            CompareOp::Lt => ordering == Some(Ordering::Less),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The single WHERE comparison. The literal stays raw until the column's
/// type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub literal: String,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.literal)
    }
}

/// A parsed `SELECT ... FROM ... [WHERE ...]` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub items: Vec<SelectItem>,
    /// Accepted but not validated
    pub table: String,
    pub predicate: Option<Predicate>,
}

impl ParsedQuery {
    pub fn aggregates(&self) -> impl Iterator<Item = &AggregateCall> {
        self.items.iter().filter_map(|item| match item {
            SelectItem::Aggregate(call) => Some(call),
            _ => None,
        })
    }

    /// Aggregate calls with repeats dropped, first occurrence kept
    pub fn distinct_aggregates(&self) -> Vec<&AggregateCall> {
        let mut calls: Vec<&AggregateCall> = Vec::new();
        for call in self.aggregates() {
            if !calls.contains(&call) {
                calls.push(call);
            }
        }
        calls
    }

    pub fn has_aggregates(&self) -> bool {
        self.aggregates().next().is_some()
    }

    /// Returns whether any plain column or `*` is selected
    pub fn has_projections(&self) -> bool {
        self.items
            .iter()
            .any(|item| !matches!(item, SelectItem::Aggregate(_)))
    }

    pub fn has_wildcard(&self) -> bool {
        self.items.iter().any(|item| matches!(item, SelectItem::Wildcard))
    }

    /// Columns named explicitly by projections, aggregate arguments and the
    /// predicate, first occurrence first. `*` is not expanded.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let projected = self.items.iter().filter_map(|item| match item {
            SelectItem::Column(name) => Some(name.as_str()),
            SelectItem::Aggregate(call) => call.arg.column(),
            SelectItem::Wildcard => None,
        });
        let filtered = self.predicate.iter().map(|p| p.column.as_str());

        for name in projected.chain(filtered) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
