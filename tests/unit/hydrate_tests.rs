//! Unit tests for hydration and dehydration of leaves

use plpgsql_deparser::hydrate::{dehydrate_expr, dehydrate_type};
use plpgsql_deparser::model::{Datum, HydratedExpr, ParseMode, PlExpr, PlType, Stmt};
use plpgsql_deparser::{
    dehydrate, hydrate, hydrate_with, BackendError, HydrateOptions, HydrationErrorKind,
    PostgresBackend, SqlBackend,
};
use serde_json::json;
use sqlparser::ast::{DataType, Expr, Statement};

use crate::common::{assign, expr, function_with, perform, var};

fn first_stmt_expr(result: &plpgsql_deparser::ParseResult) -> &PlExpr {
    match &result.functions[0].action.body[0] {
        Stmt::Assign(s) => &s.expr,
        Stmt::Perform(s) => &s.expr,
        Stmt::Return(s) => s.expr.as_ref().expect("return without expression"),
        other => panic!("unexpected statement {:?}", other),
    }
}

// ============================================================================
// Leaf shapes
// ============================================================================

#[test]
fn test_assignment_sides_are_parsed() {
    let input = function_with(json!([var("x", 1, "int")]), json!([assign(3, 0, "x := x * 2")]));
    let result = hydrate(&input, &HydrateOptions::default()).unwrap();

    match first_stmt_expr(&result.tree) {
        PlExpr::Hydrated(HydratedExpr::Assign { target, value, target_expr, value_expr, .. }) => {
            assert_eq!(target, "x");
            assert_eq!(value, "x * 2");
            assert!(matches!(target_expr.as_deref(), Some(Expr::Identifier(_))));
            assert!(matches!(value_expr.as_deref(), Some(Expr::BinaryOp { .. })));
        }
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn test_statement_leaf_is_parsed() {
    let input = function_with(json!([]), json!([perform("SELECT pg_sleep(1)")]));
    assert!(!first_stmt_expr(&input).is_hydrated());
    let result = hydrate(&input, &HydrateOptions::default()).unwrap();
    assert!(first_stmt_expr(&result.tree).is_hydrated());
    assert!(matches!(
        first_stmt_expr(&result.tree),
        PlExpr::Hydrated(HydratedExpr::SqlStmt { .. })
    ));
}

#[test]
fn test_unparseable_side_is_kept_as_text() {
    let input = function_with(
        json!([var("x", 1, "int")]),
        json!([assign(3, 0, "x := CASE WHEN")]),
    );
    let result = hydrate(&input, &HydrateOptions::default()).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, HydrationErrorKind::LeafParse);
    assert_eq!(result.errors[0].original, "x := CASE WHEN");
    match first_stmt_expr(&result.tree) {
        PlExpr::Hydrated(HydratedExpr::Assign { target_expr, value_expr, .. }) => {
            assert!(target_expr.is_some());
            assert!(value_expr.is_none());
        }
        other => panic!("expected an assignment, got {:?}", other),
    }
    assert_eq!(dehydrate_expr(first_stmt_expr(&result.tree)), "x := CASE WHEN");
}

#[test]
fn test_disabled_expressions_stay_raw() {
    let input = function_with(json!([]), json!([perform("SELECT 1")]));
    let options = HydrateOptions {
        hydrate_expressions: false,
        ..Default::default()
    };
    let result = hydrate(&input, &options).unwrap();
    assert!(matches!(
        first_stmt_expr(&result.tree),
        PlExpr::Hydrated(HydratedExpr::Raw { parse_mode: ParseMode::Default, .. })
    ));
    assert_eq!(result.stats.raw, 1);
}

#[test]
fn test_qualified_type_is_hydrated() {
    let input = function_with(json!([var("o", 1, "sales.orders%ROWTYPE")]), json!([]));
    let result = hydrate(&input, &HydrateOptions::default()).unwrap();

    let Datum::Var(o) = &result.tree.functions[0].datums[0] else {
        panic!("expected a variable");
    };
    match o.datatype.as_ref() {
        Some(PlType::Hydrated(hydrated)) => {
            assert_eq!(hydrated.suffix.as_deref(), Some("%ROWTYPE"));
            assert_eq!(hydrated.original, "sales.orders%ROWTYPE");
        }
        other => panic!("expected a hydrated type, got {:?}", other),
    }
    assert_eq!(dehydrate_type(o.datatype.as_ref().unwrap()), "sales.orders%ROWTYPE");
}

// ============================================================================
// Backends
// ============================================================================

/// A backend that can parse nothing.
struct RefusingBackend;

impl SqlBackend for RefusingBackend {
    fn parse_statement(&self, _: &str) -> Result<Statement, BackendError> {
        Err(BackendError::Parse { message: "refused".into() })
    }
    fn parse_expression(&self, _: &str) -> Result<Expr, BackendError> {
        Err(BackendError::Parse { message: "refused".into() })
    }
    fn parse_type_name(&self, _: &str) -> Result<DataType, BackendError> {
        Err(BackendError::Parse { message: "refused".into() })
    }
    fn render_statement(&self, stmt: &Statement) -> Result<String, BackendError> {
        PostgresBackend.render_statement(stmt)
    }
    fn render_expression(&self, expr: &Expr) -> Result<String, BackendError> {
        PostgresBackend.render_expression(expr)
    }
    fn render_type_name(&self, data_type: &DataType) -> Result<String, BackendError> {
        PostgresBackend.render_type_name(data_type)
    }
}

#[test]
fn test_failures_are_collected_in_order() {
    let input = function_with(
        json!([var("t", 1, "app.money")]),
        json!([
            perform("SELECT 1"),
            {"PLpgSQL_stmt_return": {"lineno": 4, "expr": expr("2", 2)}}
        ]),
    );
    let result = hydrate_with(&RefusingBackend, &input, &HydrateOptions::default()).unwrap();

    let kinds: Vec<HydrationErrorKind> = result.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![HydrationErrorKind::TypeName, HydrationErrorKind::LeafParse, HydrationErrorKind::LeafParse]
    );
    assert_eq!(result.errors[0].path, "functions[0].datums[0].datatype");
    assert_eq!(result.stats.failed, 3);
    assert_eq!(result.stats.parsed, 0);

    // Every leaf still renders its original text
    assert_eq!(dehydrate(&result.tree), input);
}
