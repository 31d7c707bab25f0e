use crate::ast::{CastType, LockMode, SetOperation};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::traits::{LockClause, SqlGenerator};
use crate::transpiler::Dialect;

pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn numbered_placeholder(&self, index: usize) -> RenderResult<String> {
        Ok(format!("?{}", index))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!(" LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!(" LIMIT {}", l),
            (None, Some(o)) => format!(" LIMIT -1 OFFSET {}", o),
            (None, None) => String::new(),
        }
    }

    fn in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} IN (SELECT value FROM json_each({}))", col, placeholder)
    }

    fn not_in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} NOT IN (SELECT value FROM json_each({}))", col, placeholder)
    }

    fn lock_clause(&self, _mode: LockMode) -> RenderResult<LockClause> {
        Err(RenderError::unsupported(Dialect::SQLite, "row locking"))
    }

    fn cast_type(&self, ty: CastType) -> RenderResult<&'static str> {
        match ty {
            CastType::Text | CastType::Date | CastType::Timestamp | CastType::Uuid => Ok("TEXT"),
            CastType::Integer | CastType::BigInt | CastType::Boolean => Ok("INTEGER"),
            CastType::Numeric => Ok("NUMERIC"),
            CastType::Double => Ok("REAL"),
            CastType::Json => Err(RenderError::unsupported(Dialect::SQLite, "CAST to json")),
        }
    }

    fn supports_aggregate_filter(&self) -> bool {
        true
    }

    fn supports_set_operation(&self, op: SetOperation) -> bool {
        !matches!(op, SetOperation::IntersectAll | SetOperation::ExceptAll)
    }
}
