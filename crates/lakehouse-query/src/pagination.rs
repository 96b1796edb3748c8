//! Rewrites a SELECT statement into a single OFFSET/FETCH page.
//!
//! The trailing `ORDER BY` is found with a regular expression, not a parser.
//! The first `order by` in the text is assumed to be the outer one and
//! everything from there to the end of the statement is treated as the
//! ordering clause. A statement whose subquery carries its own `ORDER BY` is
//! therefore split at the subquery.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Ordering used when the statement has none; OFFSET/FETCH requires one
pub const DEFAULT_ORDER_BY: &str = "ORDER BY (SELECT NULL)";

static ORDER_BY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)order\s+by[\s\S]*$").expect("ORDER BY pattern is valid"));

/// Split a statement into its body and its trailing ORDER BY clause, if any.
///
/// The body is trimmed; the clause is returned verbatim apart from trailing
/// whitespace.
pub fn split_order_by(sql: &str) -> (&str, Option<&str>) {
    match ORDER_BY_RE.find(sql) {
        Some(m) => (sql[..m.start()].trim(), Some(m.as_str().trim_end())),
        None => (sql.trim(), None),
    }
}

/// Wrap `sql` in a `base_query` CTE and select one page from it.
///
/// `page` is 1-indexed. Callers are expected to pass values already
/// normalized through [`crate::PageRequest`].
pub fn build_paginated_sql(sql: &str, page: u64, page_size: u64) -> String {
    let (body, order_by) = split_order_by(sql);
    let order_by = order_by.unwrap_or(DEFAULT_ORDER_BY);
    let offset = page.saturating_sub(1).saturating_mul(page_size);

    let paginated = format!(
        "WITH base_query AS (\n    {body}\n)\nSELECT * FROM base_query\n{order_by}\nOFFSET {offset} ROWS FETCH NEXT {page_size} ROWS ONLY;"
    );

    trace!("Rewrote query '{}' -> '{}'", sql, paginated);
    paginated
}
