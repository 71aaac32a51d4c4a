//! Restricted SQL over columnar artifacts
//!
//! Grammar (keywords are case-insensitive):
//! ```text
//! SELECT item [, item]* FROM table [WHERE column op literal]
//! item := column | * | FUNC(column) | COUNT(*)
//! FUNC := SUM | COUNT | AVG | MIN | MAX
//! op   := >= | <= | != | = | > | <
//! ```
//!
//! Only the columns a query references are read, each once.

mod aggregate;
mod ast;
mod engine;
mod explain;
mod filter;
mod parser;
mod result;
mod source;

pub use aggregate::compute as compute_aggregate;
pub use ast::{AggregateArg, AggregateCall, AggregateFunc, CompareOp, ParsedQuery, Predicate, SelectItem};
pub use engine::QueryEngine;
pub use explain::{explain, ExplainPlan, PredicatePlan};
pub use filter::cast_literal;
pub use parser::parse_query;
pub use result::Row;
pub use source::ColumnSource;
