//! SQL text helpers: identifier quoting, idempotent `CREATE TABLE`, and
//! multi-row `INSERT OR IGNORE` generation.

use crate::error::{Result, SqliteError};

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rewrites a stored `CREATE [VIRTUAL] TABLE` statement so that replaying it
/// is a no-op when the table already exists.
///
/// Keywords are matched case-insensitively with any whitespace between
/// them. A statement that already says `IF NOT EXISTS` is returned as-is.
///
/// # Errors
///
/// Returns [`SqliteError::UnsupportedDdl`] if the text does not start with
/// `CREATE TABLE` or `CREATE VIRTUAL TABLE`.
///
/// # Examples
///
/// ```
/// use dbmerge_sqlite::idempotent_create;
///
/// let sql = idempotent_create("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
/// assert_eq!(sql, "CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY)");
/// ```
pub fn idempotent_create(statement: &str) -> Result<String> {
    let unsupported = || SqliteError::UnsupportedDdl(statement.to_string());

    let rest = statement.trim_start();
    let rest = strip_keyword(rest, "CREATE").ok_or_else(unsupported)?;
    let rest = strip_keyword(rest, "VIRTUAL").unwrap_or(rest);
    let after_table = strip_keyword(rest, "TABLE").ok_or_else(unsupported)?;

    if strip_keyword(after_table, "IF")
        .and_then(|r| strip_keyword(r, "NOT"))
        .and_then(|r| strip_keyword(r, "EXISTS"))
        .is_some()
    {
        return Ok(statement.to_string());
    }

    let head_len = statement.len() - after_table.len();
    let head = statement[..head_len].trim_end();
    Ok(format!("{head} IF NOT EXISTS {after_table}"))
}

/// If `text` starts with `keyword` (case-insensitive) followed by whitespace
/// or a non-identifier character, returns the remainder with leading
/// whitespace removed.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        _ => Some(rest.trim_start()),
    }
}

/// Builds `INSERT OR IGNORE INTO "table" ("c1", ...) VALUES (?, ...), ...`
/// for `rows` rows.
pub(crate) fn insert_or_ignore_sql(table: &str, columns: &[String], rows: usize) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![placeholders.as_str(); rows].join(", ");
    format!(
        "INSERT OR IGNORE INTO {} ({column_list}) VALUES {values}",
        quote_ident(table)
    )
}
