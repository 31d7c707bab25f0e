use crate::ast::{BinaryOp, CastType, JoinKind, JsonPath, JsonSegment};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::traits::{ReturningStyle, SqlGenerator, UpsertStyle, quote_with};
use crate::transpiler::Dialect;

pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '`', '`')
    }

    fn numbered_placeholder(&self, _index: usize) -> RenderResult<String> {
        // `?` is positional per occurrence, so a repeated name cannot map to one slot
        Err(RenderError::unsupported(
            Dialect::MySQL,
            "numbered placeholders",
        ))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!(" LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!(" LIMIT {}", l),
            // MySQL has no OFFSET without LIMIT
            (None, Some(o)) => format!(" LIMIT {} OFFSET {}", u64::MAX, o),
            (None, None) => String::new(),
        }
    }

    // the parameter is bound as a JSON array
    fn in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} MEMBER OF(CAST({} AS JSON))", col, placeholder)
    }

    fn not_in_array(&self, col: &str, placeholder: &str) -> String {
        format!("NOT ({} MEMBER OF(CAST({} AS JSON)))", col, placeholder)
    }

    fn json_access(&self, col: &str, path: &JsonPath) -> RenderResult<String> {
        let mut json_path = String::from("$");
        for segment in path.segments() {
            match segment {
                JsonSegment::Key(key) => {
                    json_path.push('.');
                    // backslash is an escape inside MySQL string literals
                    let escaped = key.as_str().replace('\\', "\\\\").replace('\'', "''");
                    json_path.push_str(&escaped);
                }
                JsonSegment::Index(index) => json_path.push_str(&format!("[{}]", index)),
            }
        }
        let op = if path.is_text() { "->>" } else { "->" };
        Ok(format!("{}{}'{}'", col, op, json_path))
    }

    fn binary_expr(&self, left: &str, op: BinaryOp, right: &str) -> RenderResult<String> {
        match op {
            BinaryOp::Concat => Ok(format!("CONCAT({}, {})", left, right)),
            op if op.is_vector() => Err(RenderError::unsupported(
                Dialect::MySQL,
                format!("vector operator {}", op),
            )),
            op => Ok(format!("{} {} {}", left, op, right)),
        }
    }

    fn cast_type(&self, ty: CastType) -> RenderResult<&'static str> {
        match ty {
            CastType::Text => Ok("CHAR"),
            CastType::Integer | CastType::BigInt => Ok("SIGNED"),
            CastType::Numeric => Ok("DECIMAL(65, 30)"),
            CastType::Double => Ok("DOUBLE"),
            CastType::Date => Ok("DATE"),
            CastType::Timestamp => Ok("DATETIME"),
            CastType::Json => Ok("JSON"),
            CastType::Uuid => Ok("CHAR(36)"),
            CastType::Boolean => Err(RenderError::unsupported(
                Dialect::MySQL,
                "CAST to boolean",
            )),
        }
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        kind != JoinKind::Full
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Unsupported
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::OnDuplicateKey
    }
}
