//! Which datums get declared, and in which block.
//!
//! The parse tree does not record lexical scope. The only positional signal
//! is line numbers: a block's line is its `BEGIN`, which follows that
//! block's `DECLARE` section, so a datum belongs to the nearest block that
//! starts after it.

use std::collections::{BTreeMap, HashSet};

use crate::constants::is_internal_datum_name;
use crate::model::{walk_stmts, Block, Datum, Function, Stmt};

/// Line numbers of variables introduced by a loop head (`FOR i IN ...`).
///
/// A loop variable counts only when its line equals the loop statement's
/// own line; otherwise it was declared separately and is an ordinary datum.
/// `FOREACH` targets are always ordinary datums.
pub fn loop_variable_lines(action: &Block) -> HashSet<i32> {
    let mut lines = HashSet::new();
    for body in action.nested_bodies() {
        walk_stmts(body, &mut |stmt| {
            let (stmt_line, var) = match stmt {
                Stmt::ForI(s) => (s.lineno, &s.var),
                Stmt::ForS(s) => (s.lineno, &s.var),
                Stmt::ForC(s) => (s.lineno, &s.var),
                Stmt::DynFors(s) => (s.lineno, &s.var),
                _ => return,
            };
            if var.lineno() == stmt_line {
                lines.insert(stmt_line);
            }
        });
    }
    lines
}

/// Line numbers of every block nested below `action`, ascending and unique.
pub fn nested_block_lines(action: &Block) -> Vec<i32> {
    let mut lines = Vec::new();
    for body in action.nested_bodies() {
        walk_stmts(body, &mut |stmt| {
            if let Stmt::Block(block) = stmt {
                lines.push(block.lineno);
            }
        });
    }
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Datum indices to declare, split between the function's outer `DECLARE`
/// and each nested block (keyed by the block's line number).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationPlan {
    pub top_level: Vec<usize>,
    pub nested: BTreeMap<i32, Vec<usize>>,
}

impl DeclarationPlan {
    pub fn resolve(func: &Function) -> Self {
        let loop_lines = loop_variable_lines(&func.action);
        let block_lines = nested_block_lines(&func.action);
        let cursor_args = cursor_argument_datums(func);
        let outer_line = func.action.lineno;

        let mut plan = DeclarationPlan::default();
        for (index, datum) in func.datums.iter().enumerate() {
            let line = datum.lineno();
            let declarable = matches!(datum, Datum::Var(_) | Datum::Rec(_))
                && line > 0
                && !datum.refname().is_some_and(is_internal_datum_name)
                && !loop_lines.contains(&line)
                && !cursor_args.contains(&index);
            if !declarable {
                continue;
            }

            let block = if line > outer_line {
                block_lines.iter().copied().find(|&block_line| block_line > line)
            } else {
                None
            };
            match block {
                Some(block_line) => plan.nested.entry(block_line).or_default().push(index),
                None => plan.top_level.push(index),
            }
        }
        plan
    }
}

/// Datums that only exist as arguments of an explicit cursor. They render
/// inside the cursor's declaration.
fn cursor_argument_datums(func: &Function) -> HashSet<usize> {
    let mut args = HashSet::new();
    for datum in &func.datums {
        let Datum::Var(var) = datum else { continue };
        let Some(argrow) = var.cursor_explicit_argrow else { continue };
        if let Some(Datum::Row(row)) = func.datum(argrow) {
            args.extend(
                row.fields
                    .iter()
                    .filter_map(|field| usize::try_from(field.varno).ok()),
            );
        }
    }
    args
}
