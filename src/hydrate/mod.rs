//! Hydration: turning raw leaf text into parsed SQL trees, and back.
//!
//! A hydrated tree lets callers rewrite embedded SQL structurally (e.g.
//! rename an identifier with `sqlparser`'s visitors) instead of editing
//! strings. Every hydrated leaf keeps its original text, so dehydration
//! can always produce something.

mod backend;
mod dehydrate;

use std::ops::AddAssign;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Expr;

use crate::deparser::type_name::hydration_candidate;
use crate::error::DeparseError;
use crate::model::{
    walk_function_mut, Function, HydratedExpr, HydratedTypeName, ParseMode, ParseResult, PlExpr,
    PlType, TreeVisitorMut,
};
use crate::parser::split_assignment;

pub use backend::{PostgresBackend, SqlBackend};
pub use dehydrate::{dehydrate, dehydrate_expr, dehydrate_type, dehydrate_with};

/// What to hydrate, and what to do when a leaf fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrateOptions {
    /// Parse statement and expression leaves
    pub hydrate_expressions: bool,
    /// Split and parse `target := value` leaves
    pub hydrate_assignments: bool,
    /// Parse schema-qualified datum types
    pub hydrate_type_names: bool,
    /// Keep going after a leaf fails; otherwise the first failure aborts
    pub continue_on_error: bool,
}

impl Default for HydrateOptions {
    fn default() -> Self {
        Self {
            hydrate_expressions: true,
            hydrate_assignments: true,
            hydrate_type_names: true,
            continue_on_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HydrationErrorKind {
    LeafParse,
    AssignmentSplit,
    TypeName,
}

/// A leaf that could not be hydrated. The leaf itself stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydrationError {
    pub path: String,
    pub original: String,
    pub parse_mode: ParseMode,
    pub kind: HydrationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrationStats {
    /// Expression leaves seen
    pub expressions: usize,
    /// Leaves turned into at least one parsed tree
    pub parsed: usize,
    /// Leaves with a recorded error
    pub failed: usize,
    pub assignments: usize,
    pub sql_expressions: usize,
    pub sql_statements: usize,
    /// Leaves kept as text (by choice or after failure)
    pub raw: usize,
    pub type_names: usize,
    pub already_hydrated: usize,
}

impl AddAssign for HydrationStats {
    fn add_assign(&mut self, other: Self) {
        self.expressions += other.expressions;
        self.parsed += other.parsed;
        self.failed += other.failed;
        self.assignments += other.assignments;
        self.sql_expressions += other.sql_expressions;
        self.sql_statements += other.sql_statements;
        self.raw += other.raw;
        self.type_names += other.type_names;
        self.already_hydrated += other.already_hydrated;
    }
}

#[derive(Debug, Clone)]
pub struct HydrationResult {
    pub tree: ParseResult,
    pub errors: Vec<HydrationError>,
    pub stats: HydrationStats,
}

/// Hydrate with the default backend.
pub fn hydrate(result: &ParseResult, options: &HydrateOptions) -> Result<HydrationResult, DeparseError> {
    hydrate_with(&PostgresBackend, result, options)
}

/// Hydrate every function of `result`. Functions are processed in parallel;
/// errors and statistics come back in function order.
///
/// Leaf failures are recorded, not raised, unless `continue_on_error` is off,
/// in which case the first failure aborts the whole call.
pub fn hydrate_with<B: SqlBackend + ?Sized>(
    backend: &B,
    result: &ParseResult,
    options: &HydrateOptions,
) -> Result<HydrationResult, DeparseError> {
    let outcomes: Vec<FunctionOutcome> = result
        .functions
        .par_iter()
        .enumerate()
        .map(|(index, func)| hydrate_function(backend, options, index, func))
        .collect();

    let mut hydrated = HydrationResult {
        tree: ParseResult::default(),
        errors: Vec::new(),
        stats: HydrationStats::default(),
    };
    for outcome in outcomes {
        if outcome.aborted {
            if let Some(first) = outcome.errors.into_iter().next() {
                return Err(DeparseError::HydrationAborted {
                    path: first.path,
                    message: first.message,
                });
            }
        } else {
            hydrated.tree.functions.push(outcome.function);
            hydrated.errors.extend(outcome.errors);
            hydrated.stats += outcome.stats;
        }
    }

    tracing::debug!(
        functions = hydrated.tree.functions.len(),
        parsed = hydrated.stats.parsed,
        failed = hydrated.stats.failed,
        "hydration finished"
    );
    Ok(hydrated)
}

struct FunctionOutcome {
    function: Function,
    errors: Vec<HydrationError>,
    stats: HydrationStats,
    aborted: bool,
}

fn hydrate_function<B: SqlBackend + ?Sized>(
    backend: &B,
    options: &HydrateOptions,
    index: usize,
    func: &Function,
) -> FunctionOutcome {
    let mut function = func.clone();
    let mut hydrator = Hydrator {
        backend,
        options,
        errors: Vec::new(),
        stats: HydrationStats::default(),
        aborted: false,
    };
    walk_function_mut(index, &mut function, &mut hydrator);
    FunctionOutcome {
        function,
        errors: hydrator.errors,
        stats: hydrator.stats,
        aborted: hydrator.aborted,
    }
}

struct Hydrator<'a, B: ?Sized> {
    backend: &'a B,
    options: &'a HydrateOptions,
    errors: Vec<HydrationError>,
    stats: HydrationStats,
    aborted: bool,
}

impl<B: SqlBackend + ?Sized> TreeVisitorMut for Hydrator<'_, B> {
    fn visit_expr(&mut self, path: &str, expr: &mut PlExpr) {
        if self.aborted {
            return;
        }
        self.stats.expressions += 1;
        let PlExpr::Raw(raw) = expr else {
            self.stats.already_hydrated += 1;
            return;
        };
        let hydrated = self.hydrate_leaf(path, &raw.query, raw.parse_mode);
        *expr = PlExpr::Hydrated(hydrated);
    }

    fn visit_type(&mut self, path: &str, ty: &mut PlType) {
        if self.aborted || !self.options.hydrate_type_names {
            return;
        }
        let PlType::Raw(raw) = ty else {
            return;
        };
        let Some((base, suffix)) = hydration_candidate(&raw.typname) else {
            return;
        };
        match self.backend.parse_type_name(base) {
            Ok(type_name) => {
                self.stats.type_names += 1;
                let hydrated = HydratedTypeName {
                    original: raw.typname.clone(),
                    type_name,
                    suffix: suffix.map(str::to_string),
                };
                *ty = PlType::Hydrated(hydrated);
            }
            Err(e) => {
                tracing::warn!(path, typname = %raw.typname, error = %e, "type name hydration failed");
                let original = raw.typname.clone();
                self.record(path, &original, ParseMode::TypeName, HydrationErrorKind::TypeName, e.to_string());
            }
        }
    }
}

impl<B: SqlBackend + ?Sized> Hydrator<'_, B> {
    fn hydrate_leaf(&mut self, path: &str, text: &str, mode: ParseMode) -> HydratedExpr {
        if mode.is_assignment() {
            self.stats.assignments += 1;
            if !self.options.hydrate_assignments {
                return self.keep_raw(text, mode);
            }
            return self.hydrate_assignment(path, text, mode);
        }

        match mode {
            ParseMode::Default if self.options.hydrate_expressions => {
                match self.backend.parse_statement(text) {
                    Ok(stmt) => {
                        self.stats.parsed += 1;
                        self.stats.sql_statements += 1;
                        tracing::debug!(path, "hydrated statement");
                        HydratedExpr::SqlStmt {
                            original: text.to_string(),
                            parse_mode: mode,
                            stmt: Box::new(stmt),
                        }
                    }
                    Err(e) => {
                        self.record(path, text, mode, HydrationErrorKind::LeafParse, e.to_string());
                        self.keep_raw(text, mode)
                    }
                }
            }
            ParseMode::PlpgsqlExpr if self.options.hydrate_expressions => {
                match self.backend.parse_expression(text) {
                    Ok(expr) => {
                        self.stats.parsed += 1;
                        self.stats.sql_expressions += 1;
                        tracing::debug!(path, "hydrated expression");
                        HydratedExpr::SqlExpr {
                            original: text.to_string(),
                            parse_mode: mode,
                            expr: Box::new(expr),
                        }
                    }
                    Err(e) => {
                        self.record(path, text, mode, HydrationErrorKind::LeafParse, e.to_string());
                        self.keep_raw(text, mode)
                    }
                }
            }
            _ => self.keep_raw(text, mode),
        }
    }

    fn hydrate_assignment(&mut self, path: &str, text: &str, mode: ParseMode) -> HydratedExpr {
        let parts = match split_assignment(text) {
            Ok(parts) => parts,
            Err(e) => {
                self.record(path, text, mode, HydrationErrorKind::AssignmentSplit, e.to_string());
                return self.keep_raw(text, mode);
            }
        };

        let target_expr = self.parse_side(path, text, mode, parts.target);
        let value_expr = self.parse_side(path, text, mode, parts.value);
        if target_expr.is_some() || value_expr.is_some() {
            self.stats.parsed += 1;
        }
        tracing::debug!(path, target = parts.target, "hydrated assignment");
        HydratedExpr::Assign {
            original: text.to_string(),
            parse_mode: mode,
            target: parts.target.to_string(),
            value: parts.value.to_string(),
            target_expr,
            value_expr,
        }
    }

    /// Parse one side of an assignment. A failure is recorded against the
    /// whole leaf and leaves that side as text only.
    fn parse_side(&mut self, path: &str, text: &str, mode: ParseMode, side: &str) -> Option<Box<Expr>> {
        match self.backend.parse_expression(side) {
            Ok(expr) => Some(Box::new(expr)),
            Err(e) => {
                let message = format!("`{}`: {}", side, e);
                self.record(path, text, mode, HydrationErrorKind::LeafParse, message);
                None
            }
        }
    }

    fn keep_raw(&mut self, text: &str, mode: ParseMode) -> HydratedExpr {
        self.stats.raw += 1;
        HydratedExpr::Raw {
            original: text.to_string(),
            parse_mode: mode,
        }
    }

    fn record(&mut self, path: &str, original: &str, parse_mode: ParseMode, kind: HydrationErrorKind, message: String) {
        tracing::debug!(path, mode = parse_mode.as_str(), error = %message, "leaf hydration failed");
        self.stats.failed += 1;
        self.errors.push(HydrationError {
            path: path.to_string(),
            original: original.to_string(),
            parse_mode,
            kind,
            message,
        });
        if !self.options.continue_on_error {
            self.aborted = true;
        }
    }
}
