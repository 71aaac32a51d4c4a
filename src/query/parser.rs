//! Query text parser
//!
//! Clause splitting is keyword based: the statement is cut at the first
//! whitespace-delimited `FROM`, then at the first whitespace-delimited
//! `WHERE`. There is no tokenizer and no nesting.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{ColumnarError, ColumnarResult};

use super::ast::{AggregateArg, AggregateCall, AggregateFunc, CompareOp, ParsedQuery, Predicate, SelectItem};

static SELECT_RE: OnceLock<Regex> = OnceLock::new();
static FROM_RE: OnceLock<Regex> = OnceLock::new();
static WHERE_RE: OnceLock<Regex> = OnceLock::new();
static AGGREGATE_RE: OnceLock<Regex> = OnceLock::new();

fn keyword_regex(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn select_re() -> &'static Regex {
    keyword_regex(&SELECT_RE, r"(?is)^\s*SELECT(?:\s+|$)")
}

fn from_re() -> &'static Regex {
    keyword_regex(&FROM_RE, r"(?i)(?:^|\s)FROM(?:\s|$)")
}

fn where_re() -> &'static Regex {
    keyword_regex(&WHERE_RE, r"(?i)(?:^|\s)WHERE(?:\s|$)")
}

fn aggregate_re() -> &'static Regex {
    keyword_regex(
        &AGGREGATE_RE,
        r"^(?P<func>[A-Za-z_][A-Za-z0-9_]*)\s*\(\s*(?P<arg>[^()]*?)\s*\)$",
    )
}

/// Parses one `SELECT` statement.
///
/// A single trailing `;` is tolerated.
///
/// # Errors
///
/// - `QuerySyntax` for a missing `SELECT`/`FROM`, empty select items, an
///   empty `FROM` target, or a malformed predicate
/// - `UnsupportedAggregate` for a call to an unknown function
pub fn parse_query(text: &str) -> ColumnarResult<ParsedQuery> {
    let text = text.trim();
    let text = text.strip_suffix(';').unwrap_or(text).trim_end();

    let select = select_re()
        .find(text)
        .ok_or_else(|| ColumnarError::QuerySyntax("query must start with SELECT".into()))?;
    let rest = &text[select.end()..];

    let from = from_re()
        .find(rest)
        .ok_or_else(|| ColumnarError::QuerySyntax("missing FROM clause".into()))?;
    let select_list = &rest[..from.start()];
    let after_from = &rest[from.end()..];

    let (target, where_clause) = match where_re().find(after_from) {
        Some(m) => (&after_from[..m.start()], Some(&after_from[m.end()..])),
        None => (after_from, None),
    };

    let table = target.trim();
    if table.is_empty() {
        return Err(ColumnarError::QuerySyntax("missing FROM target".into()));
    }
    if table.split_whitespace().count() > 1 {
        return Err(ColumnarError::QuerySyntax(format!(
            "unexpected tokens after FROM target: '{}'",
            table
        )));
    }

    let items = parse_select_list(select_list)?;
    let predicate = where_clause.map(parse_predicate).transpose()?;

    Ok(ParsedQuery {
        items,
        table: table.to_string(),
        predicate,
    })
}

fn parse_select_list(list: &str) -> ColumnarResult<Vec<SelectItem>> {
    if list.trim().is_empty() {
        return Err(ColumnarError::QuerySyntax("empty select list".into()));
    }
    list.split(',').map(parse_select_item).collect()
}

fn parse_select_item(raw: &str) -> ColumnarResult<SelectItem> {
    let item = raw.trim();
    if item.is_empty() {
        return Err(ColumnarError::QuerySyntax("empty select item".into()));
    }
    if item == "*" {
        return Ok(SelectItem::Wildcard);
    }

    if let Some(caps) = aggregate_re().captures(item) {
        let name = caps["func"].to_ascii_uppercase();
        let func = AggregateFunc::from_name(&name)
            .ok_or_else(|| ColumnarError::UnsupportedAggregate(format!("unknown function {}", name)))?;
        let arg = match &caps["arg"] {
            "" => {
                return Err(ColumnarError::QuerySyntax(format!("{}() needs an argument", name)));
            }
            "*" if func == AggregateFunc::Count => AggregateArg::Star,
            "*" => {
                return Err(ColumnarError::QuerySyntax(format!("{}(*) is not supported", name)));
            }
            column => AggregateArg::Column(column.to_string()),
        };
        return Ok(SelectItem::Aggregate(AggregateCall::new(func, arg)));
    }

    if item.contains('(') || item.contains(')') {
        return Err(ColumnarError::QuerySyntax(format!("malformed select item '{}'", item)));
    }
    Ok(SelectItem::Column(item.to_string()))
}

/// Splits `column op literal` at the first operator from
/// [`CompareOp::SCAN_ORDER`] found anywhere in the clause.
fn parse_predicate(clause: &str) -> ColumnarResult<Predicate> {
    let clause = clause.trim();
    if clause.is_empty() {
        return Err(ColumnarError::QuerySyntax("empty WHERE clause".into()));
    }

    let (op, pos) = CompareOp::SCAN_ORDER
        .iter()
        .find_map(|op| clause.find(op.symbol()).map(|pos| (*op, pos)))
        .ok_or_else(|| {
            ColumnarError::QuerySyntax(format!("no comparison operator in '{}'", clause))
        })?;

    let column = clause[..pos].trim();
    let literal = clause[pos + op.symbol().len()..].trim();
    if column.is_empty() {
        return Err(ColumnarError::QuerySyntax(format!("predicate '{}' has no column", clause)));
    }
    if literal.is_empty() {
        return Err(ColumnarError::QuerySyntax(format!("predicate '{}' has no value", clause)));
    }

    Ok(Predicate {
        column: column.to_string(),
        op,
        literal: literal.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error(text: &str) {
        match parse_query(text) {
            Err(ColumnarError::QuerySyntax(_)) => {}
            other => panic!("expected syntax error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_parse_projection_with_filter() {
        let q = parse_query("SELECT name, age FROM people WHERE age > 35").unwrap();
        assert_eq!(
            q.items,
            vec![SelectItem::Column("name".into()), SelectItem::Column("age".into())]
        );
        assert_eq!(q.table, "people");
        assert_eq!(
            q.predicate,
            Some(Predicate {
                column: "age".into(),
                op: CompareOp::Gt,
                literal: "35".into(),
            })
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let q = parse_query("select id from t where id <= 2").unwrap();
        assert_eq!(q.items, vec![SelectItem::Column("id".into())]);
        assert_eq!(q.predicate.unwrap().op, CompareOp::Le);
    }

    #[test]
    fn test_trailing_semicolon_and_whitespace() {
        let q = parse_query("  SELECT *\n FROM t ;  ").unwrap();
        assert_eq!(q.items, vec![SelectItem::Wildcard]);
        assert!(q.predicate.is_none());
    }

    #[test]
    fn test_compound_operator_wins_over_equals() {
        let q = parse_query("SELECT a FROM t WHERE a != 3").unwrap();
        assert_eq!(q.predicate.unwrap().op, CompareOp::Ne);

        let q = parse_query("SELECT a FROM t WHERE a >= 3").unwrap();
        let p = q.predicate.unwrap();
        assert_eq!(p.op, CompareOp::Ge);
        assert_eq!(p.literal, "3");
    }

    #[test]
    fn test_operator_without_spaces() {
        let q = parse_query("SELECT a FROM t WHERE dept='Sales'").unwrap();
        let p = q.predicate.unwrap();
        assert_eq!(p.column, "dept");
        assert_eq!(p.op, CompareOp::Eq);
        assert_eq!(p.literal, "'Sales'");
    }

    #[test]
    fn test_aggregates() {
        let q = parse_query("SELECT count(x), SUM( x ), Avg(x), MIN(x), MAX(x) FROM t").unwrap();
        let labels: Vec<_> = q.aggregates().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["COUNT(x)", "SUM(x)", "AVG(x)", "MIN(x)", "MAX(x)"]);
        assert!(!q.has_projections());
    }

    #[test]
    fn test_count_star() {
        let q = parse_query("SELECT COUNT(*) FROM t").unwrap();
        assert_eq!(
            q.items,
            vec![SelectItem::Aggregate(AggregateCall::new(AggregateFunc::Count, AggregateArg::Star))]
        );
        syntax_error("SELECT SUM(*) FROM t");
    }

    #[test]
    fn test_unknown_function() {
        let err = parse_query("SELECT MEDIAN(x) FROM t").unwrap_err();
        assert!(matches!(err, ColumnarError::UnsupportedAggregate(_)));
    }

    #[test]
    fn test_structural_errors() {
        syntax_error("name FROM t");
        syntax_error("SELECT name");
        syntax_error("SELECT FROM t");
        syntax_error("SELECT name FROM");
        syntax_error("SELECT name, FROM t");
        syntax_error("SELECT name FROM WHERE a = 1");
        syntax_error("SELECT name FROM t u");
        syntax_error("SELECT SUM() FROM t");
        syntax_error("SELECT f(x FROM t");
    }

    #[test]
    fn test_predicate_errors() {
        syntax_error("SELECT a FROM t WHERE");
        syntax_error("SELECT a FROM t WHERE a 3");
        syntax_error("SELECT a FROM t WHERE = 3");
        syntax_error("SELECT a FROM t WHERE a >");
    }

    #[test]
    fn test_keyword_inside_identifier_is_not_split() {
        let q = parse_query("SELECT fromage FROM wherehouse").unwrap();
        assert_eq!(q.items, vec![SelectItem::Column("fromage".into())]);
        assert_eq!(q.table, "wherehouse");
    }
}
