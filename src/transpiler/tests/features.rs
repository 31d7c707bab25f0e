//! Expression features: windows, JSON paths, vector operators, math,
//! COALESCE/NULLIF, subquery comparisons and compound queries.

use super::{f, p, t};
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::RenderError;
use crate::transpiler::{Dialect, ToSql};

fn sql(query: &Query, dialect: Dialect) -> String {
    query.to_sql_with_dialect(dialect).unwrap().sql
}

#[test]
fn test_row_number_over_partition() {
    let over = WindowSpec::new()
        .partition_by(f("user_id"))
        .order_by(OrderBy::desc(f("created_at")));
    let rn = Expr::Window(WindowExpr::row_number(over)).alias("rn").unwrap();
    let query = Query::select(t("orders")).field(f("id")).field(rn);
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT \"id\", ROW_NUMBER() OVER (PARTITION BY \"user_id\" ORDER BY \"created_at\" DESC) AS \"rn\" FROM \"orders\""
    );
}

#[test]
fn test_running_total_with_frame() {
    let over = WindowSpec::new()
        .order_by(OrderBy::asc(f("created_at")))
        .frame(Frame::rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow));
    let running = Expr::Window(WindowExpr::aggregate(
        AggregateKind::Sum,
        Some(f("total")),
        over,
    ))
    .alias("running_total")
    .unwrap();
    let query = Query::select(t("orders")).field(running);
    assert_eq!(
        sql(&query, Dialect::SQLite),
        "SELECT SUM(\"total\") OVER (ORDER BY \"created_at\" ASC ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) AS \"running_total\" FROM \"orders\""
    );
}

#[test]
fn test_lag_with_default_spells_offset() {
    let over = WindowSpec::new().order_by(OrderBy::asc(f("created_at")));
    let prev = WindowExpr::lag(f("total"), over).with_default(p("fallback"));
    let query = Query::select(t("orders")).field(Expr::Window(prev));
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT LAG(\"total\", 1, :fallback) OVER (ORDER BY \"created_at\" ASC) FROM \"orders\""
    );
}

#[test]
fn test_ntile_and_empty_over() {
    let query = Query::select(t("users"))
        .field(Expr::Window(WindowExpr::ntile(p("buckets"), WindowSpec::new())));
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT NTILE(:buckets) OVER () FROM \"users\""
    );
}

#[test]
fn test_invalid_frame() {
    let over = WindowSpec::new().frame(Frame::rows(
        FrameBound::CurrentRow,
        FrameBound::Preceding(2),
    ));
    let query = Query::select(t("orders")).field(Expr::Window(WindowExpr::aggregate(
        AggregateKind::Avg,
        Some(f("total")),
        over,
    )));
    assert!(matches!(
        query.to_sql(),
        Err(RenderError::InvalidFrame(_))
    ));
}

#[test]
fn test_ranking_function_rejects_field() {
    let window = WindowExpr::rank(WindowSpec::new()).with_field(f("id"));
    let query = Query::select(t("users")).field(Expr::Window(window));
    assert!(matches!(
        query.to_sql(),
        Err(RenderError::UnexpectedOperand { .. })
    ));
}

fn city() -> Field {
    let path = JsonPath::key("address")
        .unwrap()
        .then_key("city")
        .unwrap()
        .as_text();
    f("profile").json(path)
}

#[test]
fn test_json_path_access() {
    let query = Query::select(t("users"))
        .field(city())
        .filter(eq(city(), p("city")));
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT \"profile\"->'address'->>'city' FROM \"users\" WHERE \"profile\"->'address'->>'city' = :city"
    );
    assert_eq!(
        sql(&query, Dialect::MySQL),
        "SELECT `profile`->>'$.address.city' FROM `users` WHERE `profile`->>'$.address.city' = :city"
    );
}

#[test]
fn test_json_path_rejected_everywhere_on_sqlite() {
    let queries = vec![
        Query::select(t("users")).field(city()),
        Query::select(t("users")).filter(eq(city(), p("city"))),
        Query::select(t("users")).order_by(OrderBy::asc(city())),
        Query::select(t("users"))
            .field(f("id"))
            .group_by(vec![city()]),
        Query::select(t("users")).field(Expr::cast(city(), CastType::Text)),
        Query::delete(t("users")).returning(vec![city()]),
    ];
    for query in &queries {
        for dialect in [Dialect::SQLite, Dialect::SqlServer] {
            assert!(
                matches!(
                    query.to_sql_with_dialect(dialect),
                    Err(RenderError::Unsupported { .. })
                ),
                "{dialect} accepted {query:?}"
            );
        }
    }
}

#[test]
fn test_vector_distance_ordering() {
    let query = Query::select(t("users"))
        .field(f("id"))
        .order_by(OrderBy::asc(Expr::binary(
            f("embedding"),
            BinaryOp::CosineDistance,
            p("target"),
        )))
        .limit(5);
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT \"id\" FROM \"users\" ORDER BY \"embedding\" <=> :target ASC LIMIT 5"
    );
    for dialect in [Dialect::MySQL, Dialect::SQLite, Dialect::SqlServer] {
        assert!(matches!(
            query.to_sql_with_dialect(dialect),
            Err(RenderError::Unsupported { .. })
        ));
    }
}

#[test]
fn test_concat_per_dialect() {
    let label = Expr::binary(f("username"), BinaryOp::Concat, p("suffix"));
    let query = Query::select(t("users")).field(label);
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT \"username\" || :suffix FROM \"users\""
    );
    assert_eq!(
        sql(&query, Dialect::MySQL),
        "SELECT CONCAT(`username`, :suffix) FROM `users`"
    );
    assert_eq!(
        sql(&query, Dialect::SqlServer),
        "SELECT [username] + @suffix FROM [users]"
    );
}

#[test]
fn test_math_functions() {
    let query = Query::select(t("products"))
        .field(Expr::Math(MathExpr::round(f("price"), Some(p("digits")))))
        .field(Expr::Math(MathExpr::new(MathFunc::Ceil, f("price"))));
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT ROUND(\"price\", :digits), CEIL(\"price\") FROM \"products\""
    );
    assert_eq!(
        sql(&query, Dialect::SqlServer),
        "SELECT ROUND([price], @digits), CEILING([price]) FROM [products]"
    );

    let bare = Query::select(t("products")).field(Expr::Math(MathExpr::round(f("price"), None)));
    assert_eq!(sql(&bare, Dialect::SqlServer), "SELECT ROUND([price], 0) FROM [products]");
}

#[test]
fn test_coalesce_and_nullif() {
    let name = Expr::coalesce(vec![f("username").into(), f("email").into(), p("anon").into()])
        .unwrap()
        .alias("display")
        .unwrap();
    let score = Expr::nullif(f("score"), p("zero"));
    let query = Query::select(t("users")).field(name).field(score);
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT COALESCE(\"username\", \"email\", :anon) AS \"display\", NULLIF(\"score\", :zero) FROM \"users\""
    );
}

#[test]
fn test_count_distinct() {
    let query = Query::select(t("orders")).field(Expr::count_distinct(f("user_id")));
    assert_eq!(
        sql(&query, Dialect::MySQL),
        "SELECT COUNT(DISTINCT `user_id`) FROM `orders`"
    );
}

#[test]
fn test_scalar_subquery_comparison() {
    let avg = Query::select(t("orders")).field(Expr::avg(f("total")));
    let query = Query::select(t("orders"))
        .field(f("id"))
        .filter(Condition::subquery(Some(f("total")), Operator::Gt, avg).unwrap());
    assert_eq!(
        sql(&query, Dialect::Postgres),
        "SELECT \"id\" FROM \"orders\" WHERE \"total\" > (SELECT AVG(\"total\") FROM \"orders\")"
    );
}

#[test]
fn test_between_and_expression_condition() {
    let query = Query::select(t("orders"))
        .filter(Condition::between(f("total"), p("lo"), p("hi")))
        .filter(
            Condition::expression(
                Expr::binary(f("total"), BinaryOp::Mul, p("rate")),
                Operator::Gte,
                p("threshold"),
            )
            .unwrap(),
        );
    let rendered = query.to_sql().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT * FROM \"orders\" WHERE \"total\" BETWEEN :lo AND :hi AND \"total\" * :rate >= :threshold"
    );
    assert_eq!(rendered.params, vec!["lo", "hi", "rate", "threshold"]);
}

#[test]
fn test_compound_with_ordering() {
    let recent = Query::select(t("users"))
        .field(f("email"))
        .filter(gt(f("created_at"), p("since")));
    let admins = Query::select(t("users"))
        .field(f("email"))
        .filter(eq(f("role"), p("role")));
    let compound = CompoundQuery::new(recent)
        .union_all(admins)
        .order_by(OrderBy::asc(f("email")))
        .limit(50);
    assert_eq!(
        compound.to_sql().unwrap().sql,
        "SELECT \"email\" FROM \"users\" WHERE \"created_at\" > :since UNION ALL SELECT \"email\" FROM \"users\" WHERE \"role\" = :role ORDER BY \"email\" ASC LIMIT 50"
    );
}

#[test]
fn test_compound_operand_rules() {
    let a = Query::select(t("users")).field(f("email"));
    let b = Query::select(t("users")).field(f("email")).limit(3);
    assert_eq!(
        CompoundQuery::new(a.clone()).union(b).to_sql().unwrap_err(),
        RenderError::InvalidCompoundOperand {
            index: 1,
            reason: "LIMIT/OFFSET belong to the compound query"
        }
    );
    assert!(matches!(
        CompoundQuery::new(a).to_sql(),
        Err(RenderError::MissingOperand { .. })
    ));
}

#[test]
fn test_statement_dispatch() {
    let statement = Statement::from(Query::count(t("orders")));
    assert_eq!(
        statement.to_sql().unwrap().sql,
        "SELECT COUNT(*) FROM \"orders\""
    );
}
