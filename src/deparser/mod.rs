//! Rendering of procedural parse trees back into source text.

mod declarations;
mod statements;
pub mod type_name;

use serde::{Deserialize, Serialize};

use crate::hydrate::{dehydrate_expr, dehydrate_type};
use crate::model::{
    Block, Datum, Function, ParseResult, PlExpr, PlType, PlVar, CURSOR_OPT_NO_SCROLL,
    CURSOR_OPT_SCROLL,
};
use crate::parser::parse_return_kind;

pub use declarations::{loop_variable_lines, nested_block_lines, DeclarationPlan};
pub use type_name::render_type_name;

/// Formatting of rendered bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeparseOptions {
    /// One level of indentation
    pub indent: String,
    /// Line separator
    pub newline: String,
    /// Emit keywords in upper case
    pub uppercase_keywords: bool,
}

impl Default for DeparseOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            newline: "\n".to_string(),
            uppercase_keywords: true,
        }
    }
}

/// Return shape of the enclosing function, as declared in its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    Void,
    Setof,
    Trigger,
    Scalar,
    OutParams,
}

/// What the caller knows about the enclosing function's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInfo {
    pub kind: ReturnKind,
}

impl ReturnInfo {
    pub fn new(kind: ReturnKind) -> Self {
        Self { kind }
    }

    /// Classify the signature of a `CREATE FUNCTION`/`CREATE PROCEDURE`
    /// statement. `None` if the text is not one.
    pub fn from_create_function(sql: &str) -> Option<Self> {
        parse_return_kind(sql).map(Self::new)
    }
}

/// Render every function of a parse result.
pub fn deparse(
    result: &ParseResult,
    options: &DeparseOptions,
    return_info: Option<&ReturnInfo>,
) -> Vec<String> {
    result
        .functions
        .iter()
        .map(|func| deparse_function(func, options, return_info))
        .collect()
}

/// Render one function's body, from its outer label (or `DECLARE`) through
/// the final `END`.
pub fn deparse_function(
    func: &Function,
    options: &DeparseOptions,
    return_info: Option<&ReturnInfo>,
) -> String {
    let mut deparser = FunctionDeparser::new(func, options, return_info);
    deparser.render_outer_block(&func.action);
    deparser.finish()
}

/// Renders one function. Holds the declaration plan and accumulates lines.
pub(crate) struct FunctionDeparser<'a> {
    func: &'a Function,
    options: &'a DeparseOptions,
    return_kind: Option<ReturnKind>,
    plan: DeclarationPlan,
    lines: Vec<String>,
}

impl<'a> FunctionDeparser<'a> {
    fn new(
        func: &'a Function,
        options: &'a DeparseOptions,
        return_info: Option<&ReturnInfo>,
    ) -> Self {
        Self {
            func,
            options,
            return_kind: return_info.map(|info| info.kind),
            plan: DeclarationPlan::resolve(func),
            lines: Vec::new(),
        }
    }

    fn finish(self) -> String {
        self.lines.join(&self.options.newline)
    }

    // ========================================================================
    // Output helpers
    // ========================================================================

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let mut line = self.options.indent.repeat(depth);
        line.push_str(text.as_ref());
        self.lines.push(line);
    }

    /// Keyword text in the configured case.
    fn kw(&self, keyword: &str) -> String {
        if self.options.uppercase_keywords {
            keyword.to_ascii_uppercase()
        } else {
            keyword.to_ascii_lowercase()
        }
    }

    /// Leaf text, dehydrating hydrated leaves on the way.
    fn expr_text(&self, expr: &PlExpr) -> String {
        dehydrate_expr(expr).trim().to_string()
    }

    fn type_text(&self, ty: &PlType) -> String {
        render_type_name(&dehydrate_type(ty))
    }

    fn label_line(&mut self, depth: usize, label: Option<&str>) {
        if let Some(label) = label {
            self.line(depth, format!("<<{}>>", label));
        }
    }

    // ========================================================================
    // Blocks and declarations
    // ========================================================================

    fn render_outer_block(&mut self, block: &Block) {
        let declared = std::mem::take(&mut self.plan.top_level);
        self.render_block(0, block, &declared, true);
    }

    fn render_nested_block(&mut self, depth: usize, block: &Block) {
        let declared = self.plan.nested.remove(&block.lineno).unwrap_or_default();
        self.render_block(depth, block, &declared, false);
    }

    fn render_block(&mut self, depth: usize, block: &Block, declared: &[usize], outermost: bool) {
        self.label_line(depth, block.label.as_deref());
        if !declared.is_empty() {
            self.line(depth, self.kw("DECLARE"));
            for &index in declared {
                if let Some(decl) = self.declaration(index) {
                    self.line(depth + 1, decl);
                }
            }
        }

        self.line(depth, self.kw("BEGIN"));
        self.render_stmts(depth + 1, &block.body);

        if let Some(exceptions) = &block.exceptions {
            self.line(depth, self.kw("EXCEPTION"));
            for handler in &exceptions.exc_list {
                let conditions: Vec<String> = handler
                    .conditions
                    .iter()
                    .map(|c| self.condition_text(&c.condname))
                    .collect();
                let or = format!(" {} ", self.kw("OR"));
                self.line(
                    depth + 1,
                    format!("{} {} {}", self.kw("WHEN"), conditions.join(&or), self.kw("THEN")),
                );
                self.render_stmts(depth + 2, &handler.action);
            }
        }

        let mut end = self.kw("END");
        if let Some(label) = &block.label {
            end.push(' ');
            end.push_str(label);
        }
        if !outermost {
            end.push(';');
        }
        self.line(depth, end);
    }

    /// `WHEN` condition: a bare SQLSTATE code or a condition name.
    fn condition_text(&self, condname: &str) -> String {
        if condname.len() == 5
            && condname.bytes().all(|b| b.is_ascii_alphanumeric())
            && condname.bytes().any(|b| b.is_ascii_digit())
        {
            format!("{} '{}'", self.kw("SQLSTATE"), condname)
        } else if condname.eq_ignore_ascii_case("others") {
            self.kw("OTHERS")
        } else {
            condname.to_string()
        }
    }

    /// One line of a `DECLARE` section.
    fn declaration(&self, index: usize) -> Option<String> {
        match self.func.datums.get(index)? {
            Datum::Var(var) if var.cursor_explicit_expr.is_some() => Some(self.cursor_declaration(var)),
            Datum::Var(var) => {
                let mut decl = var.refname.clone();
                if var.isconst {
                    decl.push(' ');
                    decl.push_str(&self.kw("CONSTANT"));
                }
                decl.push(' ');
                decl.push_str(&match &var.datatype {
                    Some(ty) => self.type_text(ty),
                    None => self.kw("record"),
                });
                if var.notnull {
                    decl.push(' ');
                    decl.push_str(&self.kw("NOT NULL"));
                }
                if let Some(default) = &var.default_val {
                    decl.push_str(" := ");
                    decl.push_str(&self.expr_text(default));
                }
                decl.push(';');
                Some(decl)
            }
            Datum::Rec(rec) => {
                let ty = match &rec.datatype {
                    Some(ty) if !ty.original().trim().eq_ignore_ascii_case("record") => self.type_text(ty),
                    _ => self.kw("record"),
                };
                Some(format!("{} {};", rec.refname, ty))
            }
            Datum::Row(_) | Datum::RecField(_) => None,
        }
    }

    fn cursor_declaration(&self, var: &PlVar) -> String {
        let mut decl = var.refname.clone();
        decl.push(' ');
        decl.push_str(&self.scroll_prefix(var.cursor_options));
        decl.push_str(&self.kw("CURSOR"));

        if let Some(Datum::Row(row)) = var.cursor_explicit_argrow.and_then(|no| self.func.datum(no)) {
            let args: Vec<String> = row
                .fields
                .iter()
                .map(|field| match self.func.datum(field.varno) {
                    Some(Datum::Var(arg)) => match &arg.datatype {
                        Some(ty) => format!("{} {}", arg.refname, self.type_text(ty)),
                        None => arg.refname.clone(),
                    },
                    _ => field.name.clone(),
                })
                .collect();
            decl.push_str(&format!(" ({})", args.join(", ")));
        }

        if let Some(query) = &var.cursor_explicit_expr {
            decl.push_str(&format!(" {} {}", self.kw("FOR"), self.expr_text(query)));
        }
        decl.push(';');
        decl
    }

    /// `SCROLL ` / `NO SCROLL ` from cursor option bits, or nothing.
    fn scroll_prefix(&self, options: i32) -> String {
        if options & CURSOR_OPT_NO_SCROLL != 0 {
            format!("{} ", self.kw("NO SCROLL"))
        } else if options & CURSOR_OPT_SCROLL != 0 {
            format!("{} ", self.kw("SCROLL"))
        } else {
            String::new()
        }
    }
}
