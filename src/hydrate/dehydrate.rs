//! Rendering hydrated leaves back into the raw form.
//!
//! Dehydration never fails: whenever the backend cannot render a stored
//! tree, the text captured before hydration is used instead.

use sqlparser::ast::Expr;

use super::backend::{PostgresBackend, SqlBackend};
use crate::deparser::type_name::hydration_candidate;
use crate::model::{walk_mut, HydratedExpr, HydratedTypeName, ParseResult, PlExpr, PlType, TreeVisitorMut};

/// Dehydrate every leaf with the default backend.
pub fn dehydrate(result: &ParseResult) -> ParseResult {
    dehydrate_with(&PostgresBackend, result)
}

/// Dehydrate every leaf with `backend`.
pub fn dehydrate_with<B: SqlBackend + ?Sized>(backend: &B, result: &ParseResult) -> ParseResult {
    struct Dehydrator<'b, B: ?Sized>(&'b B);

    impl<B: SqlBackend + ?Sized> TreeVisitorMut for Dehydrator<'_, B> {
        fn visit_expr(&mut self, _path: &str, expr: &mut PlExpr) {
            if let PlExpr::Hydrated(hydrated) = expr {
                let mode = hydrated.parse_mode();
                let query = hydrated_text(self.0, hydrated);
                *expr = PlExpr::raw(query, mode);
            }
        }

        fn visit_type(&mut self, _path: &str, ty: &mut PlType) {
            if let PlType::Hydrated(hydrated) = ty {
                let typname = hydrated_type_text(self.0, hydrated);
                *ty = PlType::raw(typname);
            }
        }
    }

    let mut tree = result.clone();
    walk_mut(&mut tree, &mut Dehydrator(backend));
    tree
}

/// Text of a leaf in either state, with the default backend.
pub fn dehydrate_expr(expr: &PlExpr) -> String {
    match expr {
        PlExpr::Raw(raw) => raw.query.clone(),
        PlExpr::Hydrated(hydrated) => hydrated_text(&PostgresBackend, hydrated),
    }
}

/// Type name of a datum in either state, with the default backend.
pub fn dehydrate_type(ty: &PlType) -> String {
    match ty {
        PlType::Raw(raw) => raw.typname.clone(),
        PlType::Hydrated(hydrated) => hydrated_type_text(&PostgresBackend, hydrated),
    }
}

pub(crate) fn hydrated_text<B: SqlBackend + ?Sized>(backend: &B, hydrated: &HydratedExpr) -> String {
    match hydrated {
        HydratedExpr::Raw { original, .. } => original.clone(),
        HydratedExpr::SqlStmt { original, stmt, .. } => {
            if backend.parse_statement(original).is_ok_and(|parsed| parsed == **stmt) {
                return original.clone();
            }
            render_or(backend.render_statement(stmt), original)
        }
        HydratedExpr::SqlExpr { original, expr, .. } => expr_side(backend, original, expr),
        HydratedExpr::Assign {
            original,
            target,
            value,
            target_expr,
            value_expr,
            ..
        } => {
            let new_target = match target_expr {
                Some(expr) => expr_side(backend, target, expr),
                None => target.clone(),
            };
            let new_value = match value_expr {
                Some(expr) => expr_side(backend, value, expr),
                None => value.clone(),
            };
            if new_target == *target && new_value == *value {
                return original.clone();
            }
            format!("{} := {}", new_target, new_value)
        }
    }
}

pub(crate) fn hydrated_type_text<B: SqlBackend + ?Sized>(backend: &B, hydrated: &HydratedTypeName) -> String {
    let untouched = hydration_candidate(&hydrated.original)
        .and_then(|(base, _)| backend.parse_type_name(base).ok())
        .is_some_and(|parsed| parsed == hydrated.type_name);
    if untouched {
        return hydrated.original.clone();
    }
    match backend.render_type_name(&hydrated.type_name) {
        Ok(text) => format!("{}{}", text, hydrated.suffix.as_deref().unwrap_or("")),
        Err(e) => {
            tracing::debug!(original = %hydrated.original, error = %e, "type name render failed, using original");
            hydrated.original.clone()
        }
    }
}

/// Text of an expression tree. A tree equal to a fresh parse of its
/// captured text was not edited, and the captured text is kept as written.
fn expr_side<B: SqlBackend + ?Sized>(backend: &B, original: &str, expr: &Expr) -> String {
    if backend.parse_expression(original).is_ok_and(|parsed| parsed == *expr) {
        return original.to_string();
    }
    render_or(backend.render_expression(expr), original)
}

fn render_or(rendered: Result<String, crate::error::BackendError>, original: &str) -> String {
    match rendered {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(original, error = %e, "leaf render failed, using original");
            original.to_string()
        }
    }
}
