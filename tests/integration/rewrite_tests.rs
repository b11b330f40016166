//! Hydrate, rewrite embedded SQL structurally, dehydrate and render

use std::ops::ControlFlow;

use plpgsql_deparser::model::{for_each_expr_mut, Datum, HydratedExpr, ParseResult, PlExpr};
use plpgsql_deparser::{
    deparse, dehydrate, hydrate, DeparseOptions, HydrateOptions, ReturnInfo, ReturnKind,
};
use pretty_assertions::assert_eq;
use sqlparser::ast::{visit_expressions_mut, Expr};

use crate::common::{load_fixture, normalize_ws};

fn rename_identifier(expr: &mut Expr, from: &str, to: &str) {
    let _ = visit_expressions_mut(expr, |e| {
        if let Expr::Identifier(ident) = e {
            if ident.value == from {
                ident.value = to.to_string();
            }
        }
        ControlFlow::<()>::Continue(())
    });
}

/// Rename a variable in every hydrated leaf and in the datum table.
fn rename_variable(tree: &mut ParseResult, from: &str, to: &str) {
    for_each_expr_mut(tree, |_, leaf| {
        let PlExpr::Hydrated(hydrated) = leaf else { return };
        match hydrated {
            HydratedExpr::Assign { target_expr, value_expr, .. } => {
                for side in [target_expr, value_expr].into_iter().flatten() {
                    rename_identifier(side, from, to);
                }
            }
            HydratedExpr::SqlExpr { expr, .. } => rename_identifier(expr, from, to),
            HydratedExpr::SqlStmt { stmt, .. } => {
                let _ = visit_expressions_mut(stmt.as_mut(), |e| {
                    if let Expr::Identifier(ident) = e {
                        if ident.value == from {
                            ident.value = to.to_string();
                        }
                    }
                    ControlFlow::<()>::Continue(())
                });
            }
            HydratedExpr::Raw { .. } => {}
        }
    });
    for datum in &mut tree.functions[0].datums {
        if let Datum::Var(var) = datum {
            if var.refname == from {
                var.refname = to.to_string();
            }
        }
    }
}

// ============================================================================
// Structural rewrites
// ============================================================================

#[test]
fn test_rename_through_hydrated_assignment() {
    let source = load_fixture("order_total.json");
    let mut hydrated = hydrate(&source, &HydrateOptions::default()).unwrap();
    assert!(hydrated.errors.is_empty(), "{:?}", hydrated.errors);

    rename_variable(&mut hydrated.tree, "v_discount", "v_rebate");
    let tree = dehydrate(&hydrated.tree);
    let body = deparse(
        &tree,
        &DeparseOptions::default(),
        Some(&ReturnInfo::new(ReturnKind::Scalar)),
    )
    .remove(0);

    assert!(body.contains("  v_rebate numeric;\n"), "{}", body);
    assert!(body.contains("  v_rebate := 0;\n"), "{}", body);
    assert!(body.contains("    v_rebate := v_rebate + i;\n"), "{}", body);
    assert!(body.contains("  RETURN v_total - v_rebate;\n"), "{}", body);
    assert!(!body.contains("v_discount"), "{}", body);
}

#[test]
fn test_render_directly_from_hydrated_tree() {
    let source = load_fixture("order_total.json");
    let mut hydrated = hydrate(&source, &HydrateOptions::default()).unwrap();
    rename_variable(&mut hydrated.tree, "v_total", "v_sum");

    let options = DeparseOptions::default();
    let info = ReturnInfo::new(ReturnKind::Scalar);
    let direct = deparse(&hydrated.tree, &options, Some(&info));
    let via_dehydrate = deparse(&dehydrate(&hydrated.tree), &options, Some(&info));
    assert_eq!(direct, via_dehydrate);
    assert!(direct[0].contains("INTO v_sum FROM"), "{}", direct[0]);
    assert!(direct[0].contains("IF v_sum IS NULL THEN"), "{}", direct[0]);
}

// ============================================================================
// Round-trip properties
// ============================================================================

#[test]
fn test_hydration_is_idempotent() {
    for name in ["order_total.json", "audit_cleanup.json"] {
        let once = hydrate(&load_fixture(name), &HydrateOptions::default()).unwrap();
        let twice = hydrate(&once.tree, &HydrateOptions::default()).unwrap();
        assert_eq!(twice.tree, once.tree, "{}", name);
        assert_eq!(twice.stats.already_hydrated, once.stats.expressions, "{}", name);
        assert!(twice.errors.is_empty(), "{}", name);
    }
}

#[test]
fn test_dehydrate_of_untouched_hydrate_is_identity() {
    for name in ["order_total.json", "audit_cleanup.json"] {
        let source = load_fixture(name);
        let hydrated = hydrate(&source, &HydrateOptions::default()).unwrap();
        assert!(hydrated.errors.is_empty(), "{}: {:?}", name, hydrated.errors);
        assert_eq!(dehydrate(&hydrated.tree), source, "{}", name);
    }
}

#[test]
fn test_hydrated_tree_survives_json() {
    let source = load_fixture("audit_cleanup.json");
    let hydrated = hydrate(&source, &HydrateOptions::default()).unwrap();

    let encoded = hydrated.tree.to_json().unwrap();
    let decoded = ParseResult::from_json(&encoded).unwrap();
    assert_eq!(decoded, hydrated.tree);
    assert!(encoded.contains("\"Hydrated\""));
}

#[test]
fn test_edited_leaf_renders_normalized_sql() {
    let source = load_fixture("audit_cleanup.json");
    let mut hydrated = hydrate(&source, &HydrateOptions::default()).unwrap();
    rename_variable(&mut hydrated.tree, "v_cutoff", "v_limit");

    let body = deparse(&dehydrate(&hydrated.tree), &DeparseOptions::default(), None).remove(0);
    assert!(
        normalize_ws(&body).contains("FOR r IN SELECT id FROM audit.events WHERE created_at < v_limit LOOP"),
        "{}",
        body
    );
    assert!(body.contains("v_limit := now() - interval '30 days';"), "{}", body);
}
