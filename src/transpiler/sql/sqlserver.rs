use crate::ast::{BinaryOp, CastType, LockMode, LockStrength, LockWait, MathFunc, SetOperation};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::traits::{LockClause, ReturningStyle, SqlGenerator, UpsertStyle, quote_with};
use crate::transpiler::Dialect;

pub struct SqlServerGenerator;

impl SqlGenerator for SqlServerGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '[', ']')
    }

    fn named_placeholder(&self, name: &str) -> String {
        format!("@{}", name)
    }

    fn numbered_placeholder(&self, index: usize) -> RenderResult<String> {
        Ok(format!("@p{}", index))
    }

    fn in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} IN (SELECT value FROM OPENJSON({}))", col, placeholder)
    }

    fn not_in_array(&self, col: &str, placeholder: &str) -> String {
        format!("{} NOT IN (SELECT value FROM OPENJSON({}))", col, placeholder)
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, ordered: bool) -> String {
        if limit.is_none() && offset.is_none() {
            return String::new();
        }
        // OFFSET/FETCH is only valid after ORDER BY
        let mut sql = String::new();
        if !ordered {
            sql.push_str(" ORDER BY (SELECT NULL)");
        }
        sql.push_str(&format!(" OFFSET {} ROWS", offset.unwrap_or(0)));
        if let Some(n) = limit {
            sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", n));
        }
        sql
    }

    fn lock_clause(&self, mode: LockMode) -> RenderResult<LockClause> {
        let mut hints = vec![
            match mode.strength {
                LockStrength::Update => "UPDLOCK",
                LockStrength::Share => "HOLDLOCK",
            },
            "ROWLOCK",
        ];
        match mode.wait {
            LockWait::Wait => {}
            LockWait::NoWait => hints.push("NOWAIT"),
            LockWait::SkipLocked => hints.push("READPAST"),
        }
        Ok(LockClause::TableHint(format!("WITH ({})", hints.join(", "))))
    }

    fn binary_expr(&self, left: &str, op: BinaryOp, right: &str) -> RenderResult<String> {
        match op {
            BinaryOp::Concat => Ok(format!("{} + {}", left, right)),
            op if op.is_vector() => Err(RenderError::unsupported(
                Dialect::SqlServer,
                format!("vector operator {}", op),
            )),
            op => Ok(format!("{} {} {}", left, op, right)),
        }
    }

    fn math_call(&self, func: MathFunc, col: &str, arg: Option<&str>) -> String {
        match (func, arg) {
            (MathFunc::Ceil, _) => format!("CEILING({})", col),
            // ROUND needs an explicit length
            (MathFunc::Round, None) => format!("ROUND({}, 0)", col),
            (func, Some(arg)) => format!("{}({}, {})", func, col, arg),
            (func, None) => format!("{}({})", func, col),
        }
    }

    fn cast_type(&self, ty: CastType) -> RenderResult<&'static str> {
        match ty {
            CastType::Text => Ok("NVARCHAR(MAX)"),
            CastType::Integer => Ok("INT"),
            CastType::BigInt => Ok("BIGINT"),
            CastType::Numeric => Ok("DECIMAL(38, 10)"),
            CastType::Double => Ok("FLOAT"),
            CastType::Boolean => Ok("BIT"),
            CastType::Date => Ok("DATE"),
            CastType::Timestamp => Ok("DATETIME2"),
            CastType::Uuid => Ok("UNIQUEIDENTIFIER"),
            CastType::Json => Err(RenderError::unsupported(
                Dialect::SqlServer,
                "CAST to json",
            )),
        }
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_set_operation(&self, op: SetOperation) -> bool {
        !matches!(op, SetOperation::IntersectAll | SetOperation::ExceptAll)
    }

    fn returning_style(&self) -> ReturningStyle {
        ReturningStyle::Output
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::Unsupported
    }
}
