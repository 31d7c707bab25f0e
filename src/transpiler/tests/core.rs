//! Core statement tests (SELECT, INSERT, UPDATE, DELETE, COUNT) on PostgreSQL.

use super::{f, p, t};
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::RenderError;
use crate::transpiler::ToSql;

#[test]
fn test_select_fields_with_filter() {
    let query = Query::select(t("users"))
        .field(f("id"))
        .field(f("username"))
        .filter(eq(f("active"), p("is_active")));
    let rendered = query.to_sql().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT \"id\", \"username\" FROM \"users\" WHERE \"active\" = :is_active"
    );
    assert_eq!(rendered.params, vec!["is_active"]);
}

#[test]
fn test_select_star_when_no_projection() {
    let rendered = Query::select(t("users")).to_sql().unwrap();
    assert_eq!(rendered.sql, "SELECT * FROM \"users\"");
    assert!(rendered.params.is_empty());
}

#[test]
fn test_in_uses_array_idiom() {
    let query = Query::select(t("users")).filter(is_in(f("age"), p("ages")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT * FROM \"users\" WHERE \"age\" = ANY(:ages)"
    );

    let query = Query::select(t("users")).filter(not_in(f("role"), p("roles")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT * FROM \"users\" WHERE \"role\" != ALL(:roles)"
    );
}

#[test]
fn test_filters_accumulate_with_and() {
    let query = Query::select(t("users"))
        .filter(eq(f("active"), p("active")))
        .filter(gte(f("age"), p("min_age")))
        .filter(Condition::is_not_null(f("email")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT * FROM \"users\" WHERE \"active\" = :active AND \"age\" >= :min_age AND \"email\" IS NOT NULL"
    );
}

#[test]
fn test_order_limit_offset() {
    let query = Query::select(t("users"))
        .field(f("id"))
        .order_by(OrderBy::desc(f("created_at")))
        .order_by(OrderBy::asc(f("id")))
        .limit(10)
        .offset(20);
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT \"id\" FROM \"users\" ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_distinct() {
    let query = Query::select(t("orders")).field(f("status")).distinct();
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT DISTINCT \"status\" FROM \"orders\""
    );
}

#[test]
fn test_distinct_on() {
    let query = Query::select(t("orders"))
        .distinct_on(vec![f("user_id")])
        .field(f("user_id"))
        .field(f("total"))
        .order_by(OrderBy::asc(f("user_id")))
        .order_by(OrderBy::desc(f("created_at")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT DISTINCT ON (\"user_id\") \"user_id\", \"total\" FROM \"orders\" ORDER BY \"user_id\" ASC, \"created_at\" DESC"
    );
}

#[test]
fn test_distinct_and_distinct_on_conflict() {
    let query = Query::select(t("orders"))
        .distinct()
        .distinct_on(vec![f("user_id")]);
    assert_eq!(query.to_sql().unwrap_err(), RenderError::ConflictingDistinct);
}

#[test]
fn test_joins_with_aliases() {
    let users = t("users").aliased('u').unwrap();
    let orders = t("orders").aliased('o').unwrap();
    let on = Condition::compare_fields(
        f("id").qualified(&users),
        Operator::Eq,
        f("user_id").qualified(&orders),
    )
    .unwrap();
    let query = Query::select(users.clone())
        .field(f("username").qualified(&users))
        .field(f("total").qualified(&orders))
        .join(Join::left(orders.clone(), on))
        .filter(gt(f("total").qualified(&orders), p("min_total")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT u.\"username\", o.\"total\" FROM \"users\" u LEFT JOIN \"orders\" o ON u.\"id\" = o.\"user_id\" WHERE o.\"total\" > :min_total"
    );
}

#[test]
fn test_join_qualified_by_table_name() {
    let users = t("users");
    let orders = t("orders");
    let on = Condition::compare_fields(
        f("id").qualified(&users),
        Operator::Eq,
        f("user_id").qualified(&orders),
    )
    .unwrap();
    let query = Query::select(users.clone())
        .field(f("id").qualified(&users))
        .join(Join::inner(orders, on));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT \"users\".\"id\" FROM \"users\" INNER JOIN \"orders\" ON \"users\".\"id\" = \"orders\".\"user_id\""
    );
}

#[test]
fn test_cross_join() {
    let query = Query::select(t("users")).join(Join::cross(t("products")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT * FROM \"users\" CROSS JOIN \"products\""
    );
}

#[test]
fn test_malformed_join_rejected_at_render() {
    let mut join = Join::cross(t("products"));
    join.on = Some(eq(f("id"), p("id")));
    let query = Query::select(t("users")).join(join);
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::InvalidJoin {
            kind: JoinKind::Cross,
            table: "products".to_string()
        }
    );
}

#[test]
fn test_group_by_having() {
    let query = Query::select(t("orders"))
        .field(f("user_id"))
        .field(Expr::sum(f("total")).alias("spent").unwrap())
        .group_by(vec![f("user_id")])
        .having(
            Condition::aggregate(AggregateKind::Count, None, Operator::Gt, p("min_orders"))
                .unwrap(),
        );
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT \"user_id\", SUM(\"total\") AS \"spent\" FROM \"orders\" GROUP BY \"user_id\" HAVING COUNT(*) > :min_orders"
    );
}

#[test]
fn test_having_requires_group_by() {
    let query = Query::select(t("orders")).having(
        Condition::aggregate(AggregateKind::Sum, Some(f("total")), Operator::Gt, p("n")).unwrap(),
    );
    assert_eq!(query.to_sql().unwrap_err(), RenderError::HavingWithoutGroupBy);
}

#[test]
fn test_lock_suffix() {
    let query = Query::select(t("orders"))
        .filter(eq(f("id"), p("id")))
        .lock(LockMode::for_update().skip_locked());
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT * FROM \"orders\" WHERE \"id\" = :id FOR UPDATE SKIP LOCKED"
    );
}

#[test]
fn test_insert_columns_sorted() {
    let row = Row::new()
        .value(f("username"), p("username"))
        .unwrap()
        .value(f("email"), p("email"))
        .unwrap();
    let rendered = Query::insert(t("users")).row(row).to_sql().unwrap();
    assert_eq!(
        rendered.sql,
        "INSERT INTO \"users\" (\"email\", \"username\") VALUES (:email, :username)"
    );
    assert_eq!(rendered.params, vec!["email", "username"]);
}

#[test]
fn test_insert_multiple_rows_with_returning() {
    let row = |name: &str, mail: &str| {
        Row::new()
            .value(f("username"), p(name))
            .unwrap()
            .value(f("email"), p(mail))
            .unwrap()
    };
    let query = Query::insert(t("users"))
        .row(row("name_1", "email_1"))
        .row(row("name_2", "email_2"))
        .returning(vec![f("id")]);
    assert_eq!(
        query.to_sql().unwrap().sql,
        "INSERT INTO \"users\" (\"email\", \"username\") VALUES (:email_1, :name_1), (:email_2, :name_2) RETURNING \"id\""
    );
}

#[test]
fn test_insert_rows_must_share_columns() {
    let first = Row::new().value(f("email"), p("email")).unwrap();
    let second = Row::new().value(f("username"), p("username")).unwrap();
    let query = Query::insert(t("users")).row(first).row(second);
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::RowShapeMismatch { row: 1 }
    );
}

#[test]
fn test_insert_without_rows() {
    assert!(matches!(
        Query::insert(t("users")).to_sql(),
        Err(RenderError::MissingOperand { .. })
    ));
}

#[test]
fn test_update_assignments_sorted() {
    let query = Query::update(t("users"))
        .set(f("username"), p("username"))
        .unwrap()
        .set(f("email"), p("email"))
        .unwrap()
        .filter(eq(f("id"), p("id")))
        .returning(vec![f("id"), f("email")]);
    let rendered = query.to_sql().unwrap();
    assert_eq!(
        rendered.sql,
        "UPDATE \"users\" SET \"email\" = :email, \"username\" = :username WHERE \"id\" = :id RETURNING \"id\", \"email\""
    );
    assert_eq!(rendered.params, vec!["email", "username", "id"]);
}

#[test]
fn test_update_with_expression() {
    let query = Query::update(t("products"))
        .set(f("stock"), Expr::binary(f("stock"), BinaryOp::Sub, p("qty")))
        .unwrap()
        .filter(eq(f("id"), p("id")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "UPDATE \"products\" SET \"stock\" = \"stock\" - :qty WHERE \"id\" = :id"
    );
}

#[test]
fn test_update_rejects_aggregate_value() {
    let mut query = Query::update(t("orders"));
    query.assignments.push(Assignment {
        field: f("total"),
        value: AssignValue::Expr(Expr::sum(f("amount"))),
    });
    assert!(matches!(
        query.to_sql(),
        Err(RenderError::InvalidAssignment(_))
    ));
}

#[test]
fn test_update_duplicate_assignment_from_deserialized_tree() {
    let mut query = Query::update(t("users"));
    for name in ["a", "b"] {
        query.assignments.push(Assignment {
            field: f("email"),
            value: AssignValue::Param(p(name)),
        });
    }
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::DuplicateAssignment {
            field: "email".to_string()
        }
    );
}

#[test]
fn test_delete_with_returning() {
    let query = Query::delete(t("orders"))
        .filter(eq(f("status"), p("status")))
        .returning(vec![f("id")]);
    assert_eq!(
        query.to_sql().unwrap().sql,
        "DELETE FROM \"orders\" WHERE \"status\" = :status RETURNING \"id\""
    );
}

#[test]
fn test_delete_rejects_limit() {
    let query = Query::delete(t("orders")).limit(5);
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::clause(Operation::Delete, "LIMIT")
    );
}

#[test]
fn test_dml_rejects_table_alias() {
    let query = Query::delete(t("orders").aliased('o').unwrap());
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::clause(Operation::Delete, "table alias")
    );
}

#[test]
fn test_count() {
    let query = Query::count(t("users")).filter(eq(f("active"), p("active")));
    assert_eq!(
        query.to_sql().unwrap().sql,
        "SELECT COUNT(*) FROM \"users\" WHERE \"active\" = :active"
    );
}

#[test]
fn test_count_rejects_order_by() {
    let query = Query::count(t("users")).order_by(OrderBy::asc(f("id")));
    assert_eq!(
        query.to_sql().unwrap_err(),
        RenderError::clause(Operation::Count, "ORDER BY")
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let build = || {
        Query::update(t("users"))
            .set(f("username"), p("username"))
            .unwrap()
            .set(f("active"), p("active"))
            .unwrap()
            .set(f("email"), p("email"))
            .unwrap()
    };
    let first = build().to_sql().unwrap();
    for _ in 0..5 {
        assert_eq!(build().to_sql().unwrap(), first);
    }
}
