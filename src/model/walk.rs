//! Mutable traversal over every leaf of a parse result.
//!
//! Paths name a leaf the way a reader would locate it in the JSON tree, e.g.
//! `functions[0].action.body[2].expr` or `functions[0].datums[3].datatype`.

use super::expr::{PlExpr, PlType};
use super::function::{Datum, Function, ParseResult};
use super::statements::{Block, Stmt};

/// Callbacks for each expression leaf and each datum type reference.
pub trait TreeVisitorMut {
    fn visit_expr(&mut self, path: &str, expr: &mut PlExpr);

    fn visit_type(&mut self, _path: &str, _ty: &mut PlType) {}
}

/// Walk every function of a parse result.
pub fn walk_mut<V: TreeVisitorMut>(result: &mut ParseResult, visitor: &mut V) {
    for (index, func) in result.functions.iter_mut().enumerate() {
        walk_function_mut(index, func, visitor);
    }
}

/// Walk one function. `index` is its position in the enclosing parse result.
pub fn walk_function_mut<V: TreeVisitorMut>(index: usize, func: &mut Function, visitor: &mut V) {
    let root = format!("functions[{}]", index);
    for (dno, datum) in func.datums.iter_mut().enumerate() {
        let path = format!("{}.datums[{}]", root, dno);
        match datum {
            Datum::Var(var) => {
                if let Some(ty) = &mut var.datatype {
                    visitor.visit_type(&format!("{}.datatype", path), ty);
                }
                if let Some(expr) = &mut var.default_val {
                    visitor.visit_expr(&format!("{}.default_val", path), expr);
                }
                if let Some(expr) = &mut var.cursor_explicit_expr {
                    visitor.visit_expr(&format!("{}.cursor_explicit_expr", path), expr);
                }
            }
            Datum::Rec(rec) => {
                if let Some(ty) = &mut rec.datatype {
                    visitor.visit_type(&format!("{}.datatype", path), ty);
                }
            }
            Datum::Row(_) | Datum::RecField(_) => {}
        }
    }
    walk_block(&format!("{}.action", root), &mut func.action, visitor);
}

/// Apply `f` to every expression leaf in the parse result.
pub fn for_each_expr_mut<F>(result: &mut ParseResult, f: F)
where
    F: FnMut(&str, &mut PlExpr),
{
    struct ExprFn<F>(F);

    impl<F: FnMut(&str, &mut PlExpr)> TreeVisitorMut for ExprFn<F> {
        fn visit_expr(&mut self, path: &str, expr: &mut PlExpr) {
            (self.0)(path, expr)
        }
    }

    walk_mut(result, &mut ExprFn(f));
}

/// Zero every statement line number, leaving datum line numbers intact.
///
/// Trees that went through different sources (or a rename) can then be
/// compared structurally. Datum lines stay because declaration placement
/// depends on them.
pub fn clear_line_numbers(result: &mut ParseResult) {
    for func in &mut result.functions {
        clear_block_lines(&mut func.action);
    }
}

fn clear_block_lines(block: &mut Block) {
    block.lineno = 0;
    clear_stmt_lines(&mut block.body);
    if let Some(exceptions) = &mut block.exceptions {
        for handler in &mut exceptions.exc_list {
            handler.lineno = 0;
            clear_stmt_lines(&mut handler.action);
        }
    }
}

fn clear_stmt_lines(stmts: &mut [Stmt]) {
    for stmt in stmts {
        *stmt.lineno_mut() = 0;
        match stmt {
            Stmt::Block(block) => clear_block_lines(block),
            Stmt::If(s) => {
                clear_stmt_lines(&mut s.then_body);
                for elsif in &mut s.elsif_list {
                    elsif.lineno = 0;
                    clear_stmt_lines(&mut elsif.stmts);
                }
                clear_stmt_lines(&mut s.else_body);
            }
            Stmt::Case(s) => {
                for when in &mut s.case_when_list {
                    when.lineno = 0;
                    clear_stmt_lines(&mut when.stmts);
                }
                clear_stmt_lines(&mut s.else_stmts);
            }
            Stmt::Loop(s) => clear_stmt_lines(&mut s.body),
            Stmt::While(s) => clear_stmt_lines(&mut s.body),
            Stmt::ForI(s) => clear_stmt_lines(&mut s.body),
            Stmt::ForS(s) => clear_stmt_lines(&mut s.body),
            Stmt::ForC(s) => clear_stmt_lines(&mut s.body),
            Stmt::ForEachA(s) => clear_stmt_lines(&mut s.body),
            Stmt::DynFors(s) => clear_stmt_lines(&mut s.body),
            Stmt::Assign(_)
            | Stmt::Exit(_)
            | Stmt::Return(_)
            | Stmt::ReturnNext(_)
            | Stmt::ReturnQuery(_)
            | Stmt::Raise(_)
            | Stmt::Assert(_)
            | Stmt::ExecSql(_)
            | Stmt::DynExecute(_)
            | Stmt::GetDiag(_)
            | Stmt::Open(_)
            | Stmt::Fetch(_)
            | Stmt::Close(_)
            | Stmt::Perform(_)
            | Stmt::Call(_)
            | Stmt::Commit(_)
            | Stmt::Rollback(_)
            | Stmt::Set(_) => {}
        }
    }
}

fn walk_block<V: TreeVisitorMut>(path: &str, block: &mut Block, visitor: &mut V) {
    walk_stmts(&format!("{}.body", path), &mut block.body, visitor);
    if let Some(exceptions) = &mut block.exceptions {
        for (i, handler) in exceptions.exc_list.iter_mut().enumerate() {
            let action = format!("{}.exceptions.exc_list[{}].action", path, i);
            walk_stmts(&action, &mut handler.action, visitor);
        }
    }
}

fn visit_opt<V: TreeVisitorMut>(path: &str, field: &str, expr: &mut Option<PlExpr>, visitor: &mut V) {
    if let Some(expr) = expr {
        visitor.visit_expr(&format!("{}.{}", path, field), expr);
    }
}

fn visit_list<V: TreeVisitorMut>(path: &str, field: &str, exprs: &mut [PlExpr], visitor: &mut V) {
    for (i, expr) in exprs.iter_mut().enumerate() {
        visitor.visit_expr(&format!("{}.{}[{}]", path, field, i), expr);
    }
}

fn walk_stmts<V: TreeVisitorMut>(prefix: &str, stmts: &mut [Stmt], visitor: &mut V) {
    for (i, stmt) in stmts.iter_mut().enumerate() {
        let path = format!("{}[{}]", prefix, i);
        walk_stmt(&path, stmt, visitor);
    }
}

fn walk_stmt<V: TreeVisitorMut>(path: &str, stmt: &mut Stmt, visitor: &mut V) {
    let field = |name: &str| format!("{}.{}", path, name);
    match stmt {
        Stmt::Block(block) => walk_block(path, block, visitor),
        Stmt::Assign(s) => visitor.visit_expr(&field("expr"), &mut s.expr),
        Stmt::If(s) => {
            visitor.visit_expr(&field("cond"), &mut s.cond);
            walk_stmts(&field("then_body"), &mut s.then_body, visitor);
            for (i, elsif) in s.elsif_list.iter_mut().enumerate() {
                let elsif_path = format!("{}.elsif_list[{}]", path, i);
                visitor.visit_expr(&format!("{}.cond", elsif_path), &mut elsif.cond);
                walk_stmts(&format!("{}.stmts", elsif_path), &mut elsif.stmts, visitor);
            }
            walk_stmts(&field("else_body"), &mut s.else_body, visitor);
        }
        Stmt::Case(s) => {
            visit_opt(path, "t_expr", &mut s.t_expr, visitor);
            for (i, when) in s.case_when_list.iter_mut().enumerate() {
                let when_path = format!("{}.case_when_list[{}]", path, i);
                visitor.visit_expr(&format!("{}.expr", when_path), &mut when.expr);
                walk_stmts(&format!("{}.stmts", when_path), &mut when.stmts, visitor);
            }
            walk_stmts(&field("else_stmts"), &mut s.else_stmts, visitor);
        }
        Stmt::Loop(s) => walk_stmts(&field("body"), &mut s.body, visitor),
        Stmt::While(s) => {
            visitor.visit_expr(&field("cond"), &mut s.cond);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::ForI(s) => {
            visitor.visit_expr(&field("lower"), &mut s.lower);
            visitor.visit_expr(&field("upper"), &mut s.upper);
            visit_opt(path, "step", &mut s.step, visitor);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::ForS(s) => {
            visitor.visit_expr(&field("query"), &mut s.query);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::ForC(s) => {
            visit_opt(path, "argquery", &mut s.argquery, visitor);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::ForEachA(s) => {
            visitor.visit_expr(&field("expr"), &mut s.expr);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::DynFors(s) => {
            visitor.visit_expr(&field("query"), &mut s.query);
            visit_list(path, "params", &mut s.params, visitor);
            walk_stmts(&field("body"), &mut s.body, visitor);
        }
        Stmt::Exit(s) => visit_opt(path, "cond", &mut s.cond, visitor),
        Stmt::Return(s) => visit_opt(path, "expr", &mut s.expr, visitor),
        Stmt::ReturnNext(s) => visit_opt(path, "expr", &mut s.expr, visitor),
        Stmt::ReturnQuery(s) => {
            visit_opt(path, "query", &mut s.query, visitor);
            visit_opt(path, "dynquery", &mut s.dynquery, visitor);
            visit_list(path, "params", &mut s.params, visitor);
        }
        Stmt::Raise(s) => {
            visit_list(path, "params", &mut s.params, visitor);
            for (i, option) in s.options.iter_mut().enumerate() {
                visitor.visit_expr(&format!("{}.options[{}].expr", path, i), &mut option.expr);
            }
        }
        Stmt::Assert(s) => {
            visitor.visit_expr(&field("cond"), &mut s.cond);
            visit_opt(path, "message", &mut s.message, visitor);
        }
        Stmt::ExecSql(s) => visitor.visit_expr(&field("sqlstmt"), &mut s.sqlstmt),
        Stmt::DynExecute(s) => {
            visitor.visit_expr(&field("query"), &mut s.query);
            visit_list(path, "params", &mut s.params, visitor);
        }
        Stmt::Open(s) => {
            visit_opt(path, "argquery", &mut s.argquery, visitor);
            visit_opt(path, "query", &mut s.query, visitor);
            visit_opt(path, "dynquery", &mut s.dynquery, visitor);
            visit_list(path, "params", &mut s.params, visitor);
        }
        Stmt::Fetch(s) => visit_opt(path, "expr", &mut s.expr, visitor),
        Stmt::Perform(s) => visitor.visit_expr(&field("expr"), &mut s.expr),
        Stmt::Call(s) => visitor.visit_expr(&field("expr"), &mut s.expr),
        Stmt::Set(s) => visitor.visit_expr(&field("expr"), &mut s.expr),
        Stmt::GetDiag(_) | Stmt::Close(_) | Stmt::Commit(_) | Stmt::Rollback(_) => {}
    }
}
