//! Query engine
//!
//! Execution flow:
//! 1. Parse the statement and check the select list shape
//! 2. Resolve every referenced column against the source
//! 3. Fetch each needed column once
//! 4. Evaluate the predicate into surviving row indices
//! 5. Compute aggregates, or emit one row per surviving index

use std::borrow::Cow;
use std::time::Instant;

use crate::codec::{ColumnType, Value};
use crate::errors::{ColumnarError, ColumnarResult};
use crate::observability::Logger;

use super::aggregate;
use super::ast::{AggregateArg, ParsedQuery, SelectItem};
use super::explain::check_shape;
use super::filter::{cast_literal, cell_at, matching_rows, select_rows};
use super::parser::parse_query;
use super::result::Row;
use super::source::{ColumnCache, ColumnSource};

/// Runs queries against one column source
pub struct QueryEngine<'a, S: ColumnSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ColumnSource + ?Sized> QueryEngine<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Parses and executes one statement.
    ///
    /// Returns one row per matching record in storage order, or a single
    /// row of aggregates.
    pub fn execute(&self, text: &str) -> ColumnarResult<Vec<Row>> {
        let query = parse_query(text)?;
        self.execute_parsed(&query)
    }

    /// Executes an already parsed statement
    pub fn execute_parsed(&self, query: &ParsedQuery) -> ColumnarResult<Vec<Row>> {
        let started = Instant::now();
        check_shape(query)?;

        let projection = self.expand_projection(query);
        let mut needed: Vec<&str> = projection.iter().map(String::as_str).collect();
        for name in query.referenced_columns() {
            if !needed.contains(&name) {
                needed.push(name);
            }
        }
        for name in &needed {
            self.resolve_type(name)?;
        }

        let mut cache = ColumnCache::new(self.source);
        for name in &needed {
            cache.load(name)?;
        }

        let surviving: Option<Vec<usize>> = match &query.predicate {
            Some(predicate) => {
                let column_type = self.resolve_type(&predicate.column)?;
                let literal = cast_literal(&predicate.literal, column_type)?;
                let cells = cache.column(&predicate.column)?;
                Some(matching_rows(cells, predicate.op, &literal))
            }
            None => None,
        };

        let rows = if query.has_aggregates() {
            vec![self.aggregate_row(query, &cache, surviving.as_deref())?]
        } else {
            let row_count = match needed.first() {
                Some(name) => cache.column(name)?.len(),
                None => self.source.num_rows() as usize,
            };
            let columns = projection
                .iter()
                .map(|name| cache.column(name))
                .collect::<ColumnarResult<Vec<_>>>()?;

            let indices: Box<dyn Iterator<Item = usize>> = match &surviving {
                Some(rows) => Box::new(rows.iter().copied()),
                None => Box::new(0..row_count),
            };
            indices
                .map(|idx| -> ColumnarResult<Row> {
                    let mut row = Row::with_capacity(projection.len());
                    for (name, cells) in projection.iter().zip(&columns) {
                        row.push(name.clone(), cell_at(cells, idx)?);
                    }
                    Ok(row)
                })
                .collect::<ColumnarResult<Vec<Row>>>()?
        };

        Logger::info(
            "QUERY_EXECUTED",
            &[
                ("table", &query.table),
                ("rows_returned", &rows.len().to_string()),
                ("columns_read", &cache.len().to_string()),
                ("filtered", if query.predicate.is_some() { "true" } else { "false" }),
                ("duration_us", &started.elapsed().as_micros().to_string()),
            ],
        );
        Ok(rows)
    }

    /// Plain projections with `*` expanded, duplicates dropped
    fn expand_projection(&self, query: &ParsedQuery) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for item in &query.items {
            let expanded = match item {
                SelectItem::Column(name) => vec![name.clone()],
                SelectItem::Wildcard => self.source.column_names(),
                SelectItem::Aggregate(_) => continue,
            };
            for name in expanded {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn resolve_type(&self, name: &str) -> ColumnarResult<ColumnType> {
        self.source
            .column_type(name)
            .ok_or_else(|| ColumnarError::ColumnNotFound(name.to_string()))
    }

    fn aggregate_row(
        &self,
        query: &ParsedQuery,
        cache: &ColumnCache<'_, S>,
        surviving: Option<&[usize]>,
    ) -> ColumnarResult<Row> {
        let mut row = Row::new();
        for call in query.distinct_aggregates() {
            let value = match &call.arg {
                AggregateArg::Star => {
                    let count = match surviving {
                        Some(rows) => rows.len() as u64,
                        None => self.source.num_rows(),
                    };
                    Value::Int(count as i64)
                }
                AggregateArg::Column(name) => {
                    let cells = cache.column(name)?;
                    let values: Cow<'_, [Value]> = match surviving {
                        Some(rows) => Cow::Owned(select_rows(cells, rows)?),
                        None => Cow::Borrowed(cells),
                    };
                    aggregate::compute(call.func, self.resolve_type(name)?, &values)?
                }
            };
            row.push(call.label(), value);
        }
        Ok(row)
    }
}
