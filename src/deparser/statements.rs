//! Per-statement rendering.

use std::sync::LazyLock;

use regex::Regex;

use super::{FunctionDeparser, ReturnKind};
use crate::constants::CASE_VARIABLE_PREFIX;
use crate::model::{
    Case, Datum, ElogLevel, Exit, Fetch, FetchDirection, Open, PlExpr, Raise, Return, Stmt,
    FETCH_ALL,
};
use crate::parser::insert_into_clause;
use crate::util::strip_leading_select;

/// `"__Case__Variable_N__" IN (values)`, the stored form of a simple-CASE arm.
static CASE_ARM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?s)^\s*"?{}\d+__"?\s+IN\s*\((.*)\)\s*$"#,
        regex::escape(CASE_VARIABLE_PREFIX)
    ))
    .unwrap()
});

impl FunctionDeparser<'_> {
    pub(super) fn render_stmts(&mut self, depth: usize, stmts: &[Stmt]) {
        for stmt in stmts {
            self.render_stmt(depth, stmt);
        }
    }

    fn render_stmt(&mut self, depth: usize, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.render_nested_block(depth, block),
            Stmt::Assign(s) => {
                let text = self.expr_text(&s.expr);
                if s.expr.parse_mode().is_assignment() || text.contains(":=") {
                    self.line(depth, format!("{};", text));
                } else {
                    let target = self.func.datum_reference(s.varno);
                    self.line(depth, format!("{} := {};", target, text));
                }
            }
            Stmt::If(s) => {
                let cond = self.expr_text(&s.cond);
                self.line(depth, format!("{} {} {}", self.kw("IF"), cond, self.kw("THEN")));
                self.render_stmts(depth + 1, &s.then_body);
                for elsif in &s.elsif_list {
                    let cond = self.expr_text(&elsif.cond);
                    self.line(depth, format!("{} {} {}", self.kw("ELSIF"), cond, self.kw("THEN")));
                    self.render_stmts(depth + 1, &elsif.stmts);
                }
                if !s.else_body.is_empty() {
                    self.line(depth, self.kw("ELSE"));
                    self.render_stmts(depth + 1, &s.else_body);
                }
                self.line(depth, self.kw("END IF;"));
            }
            Stmt::Case(s) => self.render_case(depth, s),
            Stmt::Loop(s) => {
                self.label_line(depth, s.label.as_deref());
                self.line(depth, self.kw("LOOP"));
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::While(s) => {
                self.label_line(depth, s.label.as_deref());
                let cond = self.expr_text(&s.cond);
                self.line(depth, format!("{} {} {}", self.kw("WHILE"), cond, self.kw("LOOP")));
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::ForI(s) => {
                self.label_line(depth, s.label.as_deref());
                let mut head = format!(
                    "{} {} {} ",
                    self.kw("FOR"),
                    self.func.reference_for(&s.var),
                    self.kw("IN")
                );
                if s.reverse {
                    head.push_str(&self.kw("REVERSE "));
                }
                head.push_str(&format!("{}..{}", self.expr_text(&s.lower), self.expr_text(&s.upper)));
                if let Some(step) = &s.step {
                    head.push_str(&format!(" {} {}", self.kw("BY"), self.expr_text(step)));
                }
                head.push_str(&format!(" {}", self.kw("LOOP")));
                self.line(depth, head);
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::ForS(s) => {
                self.label_line(depth, s.label.as_deref());
                let head = format!(
                    "{} {} {} {} {}",
                    self.kw("FOR"),
                    self.func.reference_for(&s.var),
                    self.kw("IN"),
                    self.expr_text(&s.query),
                    self.kw("LOOP")
                );
                self.line(depth, head);
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::ForC(s) => {
                self.label_line(depth, s.label.as_deref());
                let mut cursor = self.func.datum_reference(s.curvar);
                if let Some(args) = &s.argquery {
                    cursor.push_str(&format!("({})", self.cursor_args(args)));
                }
                let head = format!(
                    "{} {} {} {} {}",
                    self.kw("FOR"),
                    self.func.reference_for(&s.var),
                    self.kw("IN"),
                    cursor,
                    self.kw("LOOP")
                );
                self.line(depth, head);
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::ForEachA(s) => {
                self.label_line(depth, s.label.as_deref());
                let mut head = format!("{} {}", self.kw("FOREACH"), self.func.datum_reference(s.varno));
                if s.slice > 0 {
                    head.push_str(&format!(" {} {}", self.kw("SLICE"), s.slice));
                }
                head.push_str(&format!(
                    " {} {} {}",
                    self.kw("IN ARRAY"),
                    self.expr_text(&s.expr),
                    self.kw("LOOP")
                ));
                self.line(depth, head);
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::DynFors(s) => {
                self.label_line(depth, s.label.as_deref());
                let head = format!(
                    "{} {} {} {}{} {}",
                    self.kw("FOR"),
                    self.func.reference_for(&s.var),
                    self.kw("IN EXECUTE"),
                    self.expr_text(&s.query),
                    self.using_clause(&s.params),
                    self.kw("LOOP")
                );
                self.line(depth, head);
                self.render_stmts(depth + 1, &s.body);
                self.end_loop(depth, s.label.as_deref());
            }
            Stmt::Exit(s) => {
                let text = self.exit_text(s);
                self.line(depth, text);
            }
            Stmt::Return(s) => {
                let text = self.return_text(s);
                self.line(depth, text);
            }
            Stmt::ReturnNext(s) => {
                let text = match (&s.expr, s.retvarno) {
                    (Some(expr), _) => format!("{} {};", self.kw("RETURN NEXT"), self.expr_text(expr)),
                    (None, Some(varno)) => {
                        format!("{} {};", self.kw("RETURN NEXT"), self.func.datum_reference(varno))
                    }
                    (None, None) => format!("{};", self.kw("RETURN NEXT")),
                };
                self.line(depth, text);
            }
            Stmt::ReturnQuery(s) => {
                let text = match (&s.query, &s.dynquery) {
                    (Some(query), _) => format!("{} {};", self.kw("RETURN QUERY"), self.expr_text(query)),
                    (None, Some(dynquery)) => format!(
                        "{} {}{};",
                        self.kw("RETURN QUERY EXECUTE"),
                        self.expr_text(dynquery),
                        self.using_clause(&s.params)
                    ),
                    (None, None) => format!("{};", self.kw("RETURN QUERY")),
                };
                self.line(depth, text);
            }
            Stmt::Raise(s) => {
                let text = self.raise_text(s);
                self.line(depth, text);
            }
            Stmt::Assert(s) => {
                let mut text = format!("{} {}", self.kw("ASSERT"), self.expr_text(&s.cond));
                if let Some(message) = &s.message {
                    text.push_str(&format!(", {}", self.expr_text(message)));
                }
                text.push(';');
                self.line(depth, text);
            }
            Stmt::ExecSql(s) => {
                let sql = self.expr_text(&s.sqlstmt);
                let text = match (&s.target, s.into) {
                    (Some(target), true) => {
                        let clause = self.into_clause(target, s.strict);
                        insert_into_clause(&sql, &clause)
                    }
                    _ => sql,
                };
                self.line(depth, format!("{};", text));
            }
            Stmt::DynExecute(s) => {
                let mut text = format!("{} {}", self.kw("EXECUTE"), self.expr_text(&s.query));
                if let (Some(target), true) = (&s.target, s.into) {
                    text.push(' ');
                    text.push_str(&self.into_clause(target, s.strict));
                }
                text.push_str(&self.using_clause(&s.params));
                text.push(';');
                self.line(depth, text);
            }
            Stmt::GetDiag(s) => {
                let keyword = if s.is_stacked {
                    self.kw("GET STACKED DIAGNOSTICS")
                } else {
                    self.kw("GET DIAGNOSTICS")
                };
                let items: Vec<String> = s
                    .diag_items
                    .iter()
                    .map(|item| {
                        format!("{} = {}", self.func.datum_reference(item.target), self.kw(item.kind.keyword()))
                    })
                    .collect();
                self.line(depth, format!("{} {};", keyword, items.join(", ")));
            }
            Stmt::Open(s) => {
                let text = self.open_text(s);
                self.line(depth, text);
            }
            Stmt::Fetch(s) => {
                let text = self.fetch_text(s);
                self.line(depth, text);
            }
            Stmt::Close(s) => {
                let text = format!("{} {};", self.kw("CLOSE"), self.func.datum_reference(s.curvar));
                self.line(depth, text);
            }
            Stmt::Perform(s) => {
                let text = self.expr_text(&s.expr);
                self.line(depth, format!("{} {};", self.kw("PERFORM"), strip_leading_select(&text)));
            }
            Stmt::Call(s) => {
                let text = self.expr_text(&s.expr);
                self.line(depth, format!("{};", text));
            }
            Stmt::Commit(s) => {
                let text = self.transaction_text("COMMIT", s.chain);
                self.line(depth, text);
            }
            Stmt::Rollback(s) => {
                let text = self.transaction_text("ROLLBACK", s.chain);
                self.line(depth, text);
            }
            Stmt::Set(s) => {
                let text = self.expr_text(&s.expr);
                self.line(depth, format!("{};", text));
            }
        }
    }

    fn end_loop(&mut self, depth: usize, label: Option<&str>) {
        let text = match label {
            Some(label) => format!("{} {};", self.kw("END LOOP"), label),
            None => format!("{};", self.kw("END LOOP")),
        };
        self.line(depth, text);
    }

    fn render_case(&mut self, depth: usize, s: &Case) {
        let head = match &s.t_expr {
            Some(operand) => format!("{} {}", self.kw("CASE"), self.expr_text(operand)),
            None => self.kw("CASE"),
        };
        self.line(depth, head);
        for when in &s.case_when_list {
            let text = self.expr_text(&when.expr);
            let arm = if s.t_expr.is_some() {
                match CASE_ARM_RE.captures(&text) {
                    Some(caps) => caps[1].trim().to_string(),
                    None => text,
                }
            } else {
                text
            };
            self.line(depth + 1, format!("{} {} {}", self.kw("WHEN"), arm, self.kw("THEN")));
            self.render_stmts(depth + 2, &when.stmts);
        }
        if s.have_else {
            self.line(depth + 1, self.kw("ELSE"));
            self.render_stmts(depth + 2, &s.else_stmts);
        }
        self.line(depth, self.kw("END CASE;"));
    }

    fn exit_text(&self, s: &Exit) -> String {
        let mut text = if s.is_exit {
            self.kw("EXIT")
        } else {
            self.kw("CONTINUE")
        };
        if let Some(label) = &s.label {
            text.push(' ');
            text.push_str(label);
        }
        if let Some(cond) = &s.cond {
            text.push_str(&format!(" {} {}", self.kw("WHEN"), self.expr_text(cond)));
        }
        text.push(';');
        text
    }

    /// An empty `RETURN` depends on the function's return shape: scalar
    /// functions need an explicit `NULL`, everything else stays bare.
    fn return_text(&self, s: &Return) -> String {
        if let Some(expr) = &s.expr {
            return format!("{} {};", self.kw("RETURN"), self.expr_text(expr));
        }
        if let Some(datum) = s.retvarno.and_then(|no| self.func.datum(no)) {
            let named = match datum {
                Datum::Rec(_) => true,
                Datum::Row(row) => !row.is_unnamed() && self.return_kind != Some(ReturnKind::OutParams),
                _ => false,
            };
            if named {
                return format!("{} {};", self.kw("RETURN"), self.func.reference_for(datum));
            }
        }
        match self.return_kind {
            Some(ReturnKind::Scalar) => format!("{};", self.kw("RETURN NULL")),
            _ => format!("{};", self.kw("RETURN")),
        }
    }

    fn raise_text(&self, s: &Raise) -> String {
        let is_rethrow = s.condname.is_none()
            && s.message.is_none()
            && s.params.is_empty()
            && s.options.is_empty()
            && s.elog_level == ElogLevel::default();
        if is_rethrow {
            return format!("{};", self.kw("RAISE"));
        }

        let mut text = format!("{} {}", self.kw("RAISE"), self.kw(s.elog_level.keyword()));
        if let Some(condname) = &s.condname {
            text.push(' ');
            text.push_str(&self.condition_text(condname));
        } else if let Some(message) = &s.message {
            text.push_str(&format!(" '{}'", message.replace('\'', "''")));
            for param in &s.params {
                text.push_str(&format!(", {}", self.expr_text(param)));
            }
        }
        if !s.options.is_empty() {
            let options: Vec<String> = s
                .options
                .iter()
                .map(|opt| format!("{} = {}", self.kw(opt.opt_type.keyword()), self.expr_text(&opt.expr)))
                .collect();
            text.push_str(&format!(" {} {}", self.kw("USING"), options.join(", ")));
        }
        text.push(';');
        text
    }

    fn open_text(&self, s: &Open) -> String {
        let mut text = format!("{} {}", self.kw("OPEN"), self.func.datum_reference(s.curvar));
        if let Some(args) = &s.argquery {
            text.push_str(&format!("({})", self.cursor_args(args)));
        } else if let Some(query) = &s.query {
            text.push(' ');
            text.push_str(&self.scroll_prefix(s.cursor_options));
            text.push_str(&format!("{} {}", self.kw("FOR"), self.expr_text(query)));
        } else if let Some(dynquery) = &s.dynquery {
            text.push(' ');
            text.push_str(&self.scroll_prefix(s.cursor_options));
            text.push_str(&format!(
                "{} {}{}",
                self.kw("FOR EXECUTE"),
                self.expr_text(dynquery),
                self.using_clause(&s.params)
            ));
        }
        text.push(';');
        text
    }

    fn fetch_text(&self, s: &Fetch) -> String {
        let mut text = if s.is_move {
            self.kw("MOVE")
        } else {
            self.kw("FETCH")
        };
        let direction = self.fetch_direction(s);
        if !direction.is_empty() {
            text.push(' ');
            text.push_str(&direction);
            text.push(' ');
            text.push_str(&self.kw("FROM"));
        }
        text.push(' ');
        text.push_str(&self.func.datum_reference(s.curvar));
        if let (Some(target), false) = (&s.target, s.is_move) {
            text.push_str(&format!(" {} {}", self.kw("INTO"), self.func.reference_for(target)));
        }
        text.push(';');
        text
    }

    /// Direction words for FETCH/MOVE; empty for the default `NEXT`.
    fn fetch_direction(&self, s: &Fetch) -> String {
        if let Some(count) = &s.expr {
            let keyword = match s.direction {
                FetchDirection::Forward => "FORWARD",
                FetchDirection::Backward => "BACKWARD",
                FetchDirection::Absolute => "ABSOLUTE",
                FetchDirection::Relative => "RELATIVE",
            };
            return format!("{} {}", self.kw(keyword), self.expr_text(count));
        }
        match (s.direction, s.how_many) {
            (FetchDirection::Forward, 1) => String::new(),
            (FetchDirection::Backward, 1) => self.kw("PRIOR"),
            (FetchDirection::Absolute, 1) => self.kw("FIRST"),
            (FetchDirection::Absolute, -1) => self.kw("LAST"),
            (FetchDirection::Absolute, n) => format!("{} {}", self.kw("ABSOLUTE"), n),
            (FetchDirection::Relative, n) => format!("{} {}", self.kw("RELATIVE"), n),
            (FetchDirection::Forward, FETCH_ALL) => self.kw("FORWARD ALL"),
            (FetchDirection::Backward, FETCH_ALL) => self.kw("BACKWARD ALL"),
            (FetchDirection::Forward, n) => format!("{} {}", self.kw("FORWARD"), n),
            (FetchDirection::Backward, n) => format!("{} {}", self.kw("BACKWARD"), n),
        }
    }

    fn transaction_text(&self, keyword: &str, chain: bool) -> String {
        if chain {
            format!("{} {};", self.kw(keyword), self.kw("AND CHAIN"))
        } else {
            format!("{};", self.kw(keyword))
        }
    }

    fn into_clause(&self, target: &Datum, strict: bool) -> String {
        let mut clause = self.kw("INTO");
        if strict {
            clause.push(' ');
            clause.push_str(&self.kw("STRICT"));
        }
        clause.push(' ');
        clause.push_str(&self.func.reference_for(target));
        clause
    }

    /// ` USING a, b`, or nothing without parameters.
    fn using_clause(&self, params: &[PlExpr]) -> String {
        if params.is_empty() {
            return String::new();
        }
        let params: Vec<String> = params.iter().map(|p| self.expr_text(p)).collect();
        format!(" {} {}", self.kw("USING"), params.join(", "))
    }

    /// Cursor arguments are stored as a `SELECT a, b` query.
    fn cursor_args(&self, args: &PlExpr) -> String {
        let text = self.expr_text(args);
        strip_leading_select(&text).to_string()
    }
}
