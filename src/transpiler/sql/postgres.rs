use crate::ast::{BinaryOp, CastType, JsonPath, JsonSegment};
use crate::error::RenderResult;
use crate::transpiler::Dialect;
use crate::transpiler::traits::SqlGenerator;

pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn numbered_placeholder(&self, index: usize) -> RenderResult<String> {
        Ok(format!("${}", index))
    }

    fn in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} = ANY({})", col, placeholder)
    }

    fn not_in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} != ALL({})", col, placeholder)
    }

    fn ilike(&self, col: &str, placeholder: &str, negated: bool) -> String {
        let op = if negated { "NOT ILIKE" } else { "ILIKE" };
        format!("{} {} {}", col, op, placeholder)
    }

    fn json_access(&self, col: &str, path: &JsonPath) -> RenderResult<String> {
        let mut sql = col.to_string();
        let last = path.segments().len().saturating_sub(1);
        for (i, segment) in path.segments().iter().enumerate() {
            // -> keeps jsonb, ->> extracts text on the final hop
            let op = if i == last && path.is_text() { "->>" } else { "->" };
            match segment {
                JsonSegment::Key(key) => {
                    sql.push_str(&format!("{}'{}'", op, key.as_str().replace('\'', "''")))
                }
                JsonSegment::Index(index) => sql.push_str(&format!("{}{}", op, index)),
            }
        }
        Ok(sql)
    }

    fn binary_expr(&self, left: &str, op: BinaryOp, right: &str) -> RenderResult<String> {
        Ok(format!("{} {} {}", left, op, right))
    }

    fn cast_type(&self, ty: CastType) -> RenderResult<&'static str> {
        Ok(match ty {
            CastType::Text => "TEXT",
            CastType::Integer => "INTEGER",
            CastType::BigInt => "BIGINT",
            CastType::Numeric => "NUMERIC",
            CastType::Double => "DOUBLE PRECISION",
            CastType::Boolean => "BOOLEAN",
            CastType::Date => "DATE",
            CastType::Timestamp => "TIMESTAMP",
            CastType::Json => "JSONB",
            CastType::Uuid => "UUID",
        })
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }

    fn supports_aggregate_filter(&self) -> bool {
        true
    }
}
