//! Dialect generator contract.
//!
//! Default method bodies follow PostgreSQL; other dialects override what
//! differs and return [`RenderError::Unsupported`] for what they cannot
//! express.

use crate::ast::{
    BinaryOp, CastType, JoinKind, JsonPath, LockMode, MathFunc, SetOperation, TableAlias,
};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::Dialect;

/// Wrap `name` in `open`/`close`, doubling any embedded `close`.
pub fn quote_with(name: &str, open: char, close: char) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(open);
    for c in name.chars() {
        if c == close {
            quoted.push(close);
        }
        quoted.push(c);
    }
    quoted.push(close);
    quoted
}

/// Where a row lock is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockClause {
    /// Appended to the statement (`FOR UPDATE`).
    Suffix(String),
    /// Attached to the FROM table (`WITH (UPDLOCK, ROWLOCK)`).
    TableHint(String),
}

/// How INSERT/UPDATE/DELETE report affected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningStyle {
    /// Trailing `RETURNING …`
    Returning,
    /// `OUTPUT INSERTED.… / DELETED.…`
    Output,
    Unsupported,
}

/// How INSERT conflicts are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// `ON CONFLICT (…) DO NOTHING | DO UPDATE SET …`
    OnConflict,
    /// `INSERT IGNORE` / `ON DUPLICATE KEY UPDATE …`
    OnDuplicateKey,
    Unsupported,
}

/// Trait for dialect-specific SQL generation.
pub trait SqlGenerator {
    fn dialect(&self) -> Dialect;

    /// Quote an identifier (table, column or output alias).
    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"', '"')
    }

    fn named_placeholder(&self, name: &str) -> String {
        format!(":{}", name)
    }

    /// Positional placeholder for the `index`-th distinct parameter.
    fn numbered_placeholder(&self, index: usize) -> RenderResult<String>;

    /// `"users" u`
    fn table_with_alias(&self, table: &str, alias: TableAlias) -> String {
        format!("{} {}", table, alias)
    }

    /// Pagination suffix. `ordered` tells whether an ORDER BY was emitted.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }

    fn lock_clause(&self, mode: LockMode) -> RenderResult<LockClause> {
        use crate::ast::{LockStrength, LockWait};
        let mut sql = match mode.strength {
            LockStrength::Update => String::from(" FOR UPDATE"),
            LockStrength::Share => String::from(" FOR SHARE"),
        };
        match mode.wait {
            LockWait::Wait => {}
            LockWait::NoWait => sql.push_str(" NOWAIT"),
            LockWait::SkipLocked => sql.push_str(" SKIP LOCKED"),
        }
        Ok(LockClause::Suffix(sql))
    }

    /// Membership test against one array-valued parameter.
    fn in_array(&self, col: &str, placeholder: &str) -> String;

    fn not_in_array(&self, col: &str, placeholder: &str) -> String;

    /// Case-insensitive LIKE; emulated with LOWER() unless overridden.
    fn ilike(&self, col: &str, placeholder: &str, negated: bool) -> String {
        let not = if negated { "NOT " } else { "" };
        format!("LOWER({}) {}LIKE LOWER({})", col, not, placeholder)
    }

    /// JSON path access on an already-rendered column.
    fn json_access(&self, _col: &str, _path: &JsonPath) -> RenderResult<String> {
        Err(RenderError::unsupported(self.dialect(), "JSON path access"))
    }

    /// `left op right` for arithmetic, concatenation and vector operators.
    fn binary_expr(&self, left: &str, op: BinaryOp, right: &str) -> RenderResult<String> {
        if op.is_vector() {
            return Err(RenderError::unsupported(
                self.dialect(),
                format!("vector operator {}", op),
            ));
        }
        Ok(format!("{} {} {}", left, op, right))
    }

    /// `FUNC(col[, arg])`
    fn math_call(&self, func: MathFunc, col: &str, arg: Option<&str>) -> String {
        match arg {
            Some(arg) => format!("{}({}, {})", func, col, arg),
            None => format!("{}({})", func, col),
        }
    }

    fn cast_type(&self, ty: CastType) -> RenderResult<&'static str>;

    fn supports_distinct_on(&self) -> bool {
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Native `AGG(…) FILTER (WHERE …)`; otherwise the argument is rewritten
    /// to a CASE expression.
    fn supports_aggregate_filter(&self) -> bool {
        false
    }

    fn supports_join(&self, _kind: JoinKind) -> bool {
        true
    }

    fn supports_set_operation(&self, _op: SetOperation) -> bool {
        true
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Returning
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::OnConflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_with_doubles_closing_char() {
        assert_eq!(quote_with("users", '"', '"'), "\"users\"");
        assert_eq!(quote_with("we\"ird", '"', '"'), "\"we\"\"ird\"");
        assert_eq!(quote_with("a]b", '[', ']'), "[a]]b]");
        assert_eq!(quote_with("a`b", '`', '`'), "`a``b`");
    }
}
