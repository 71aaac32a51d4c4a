//! Static description of a query

use serde::Serialize;

use crate::errors::{ColumnarError, ColumnarResult};

use super::ast::{AggregateCall, ParsedQuery, SelectItem};
use super::parser::parse_query;

/// Predicate as shown by `explain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicatePlan {
    pub column: String,
    pub op: String,
    pub literal: String,
}

/// What a query will do, computed without touching storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    pub table: String,
    /// Projected columns; `*` stays unexpanded
    pub projection: Vec<String>,
    /// Aggregate labels in select-list order
    pub aggregates: Vec<String>,
    pub predicate: Option<PredicatePlan>,
    /// Columns fetched from storage (all of them if `*` is selected)
    pub needed_columns: Vec<String>,
    pub reads_all_columns: bool,
}

impl ExplainPlan {
    pub fn from_query(query: &ParsedQuery) -> Self {
        let projection = query
            .items
            .iter()
            .filter_map(|item| match item {
                SelectItem::Column(name) => Some(name.clone()),
                SelectItem::Wildcard => Some("*".to_string()),
                SelectItem::Aggregate(_) => None,
            })
            .collect();

        Self {
            table: query.table.clone(),
            projection,
            aggregates: query
                .distinct_aggregates()
                .into_iter()
                .map(AggregateCall::label)
                .collect(),
            predicate: query.predicate.as_ref().map(|p| PredicatePlan {
                column: p.column.clone(),
                op: p.op.symbol().to_string(),
                literal: p.literal.clone(),
            }),
            needed_columns: query
                .referenced_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            reads_all_columns: query.has_wildcard(),
        }
    }
}

/// Rejects select lists the executor cannot evaluate
pub(crate) fn check_shape(query: &ParsedQuery) -> ColumnarResult<()> {
    if query.has_aggregates() && query.has_projections() {
        return Err(ColumnarError::QuerySyntax(
            "cannot mix aggregates with plain columns".into(),
        ));
    }
    Ok(())
}

/// Parses and describes `text`.
///
/// # Errors
///
/// Any error `parse_query` raises, plus `QuerySyntax` for a select list
/// mixing aggregates and plain columns.
pub fn explain(text: &str) -> ColumnarResult<ExplainPlan> {
    let query = parse_query(text)?;
    check_shape(&query)?;
    Ok(ExplainPlan::from_query(&query))
}
