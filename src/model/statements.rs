//! Statement nodes of a procedural function body.
//!
//! `Stmt` is closed: every tag the procedural parser emits has a variant, and
//! a tag outside this set fails decoding instead of being skipped.

use serde::{Deserialize, Deserializer, Serialize};

use super::expr::PlExpr;
use super::function::Datum;
use super::tagged::{self, NodeTag};

/// Numeric value or symbolic name, as different parser versions emit either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberOrName {
    Number(i64),
    Name(String),
}

fn bool_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrNumber {
        Bool(bool),
        Number(i64),
    }
    Ok(match BoolOrNumber::deserialize(deserializer)? {
        BoolOrNumber::Bool(b) => b,
        BoolOrNumber::Number(n) => n != 0,
    })
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Blocks and exception handlers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(
        default,
        with = "tagged::opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub exceptions: Option<ExceptionBlock>,
}

impl NodeTag for Block {
    const TAG: &'static str = "PLpgSQL_stmt_block";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionBlock {
    #[serde(default, with = "tagged::list")]
    pub exc_list: Vec<ExceptionHandler>,
}

impl NodeTag for ExceptionBlock {
    const TAG: &'static str = "PLpgSQL_exception_block";
}

/// One `WHEN cond [OR cond ...] THEN` arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionHandler {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, with = "tagged::list")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub action: Vec<Stmt>,
}

impl NodeTag for ExceptionHandler {
    const TAG: &'static str = "PLpgSQL_exception";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub condname: String,
}

impl NodeTag for Condition {
    const TAG: &'static str = "PLpgSQL_condition";
}

// ============================================================================
// Assignment and conditionals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assign {
    #[serde(default)]
    pub lineno: i32,
    pub varno: i32,
    pub expr: PlExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct If {
    #[serde(default)]
    pub lineno: i32,
    pub cond: PlExpr,
    #[serde(default)]
    pub then_body: Vec<Stmt>,
    #[serde(default, with = "tagged::list")]
    pub elsif_list: Vec<Elsif>,
    #[serde(default)]
    pub else_body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elsif {
    #[serde(default)]
    pub lineno: i32,
    pub cond: PlExpr,
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl NodeTag for Elsif {
    const TAG: &'static str = "PLpgSQL_if_elsif";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_expr: Option<PlExpr>,
    #[serde(default)]
    pub t_varno: i32,
    #[serde(default, with = "tagged::list")]
    pub case_when_list: Vec<CaseWhen>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub have_else: bool,
    #[serde(default)]
    pub else_stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseWhen {
    #[serde(default)]
    pub lineno: i32,
    pub expr: PlExpr,
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl NodeTag for CaseWhen {
    const TAG: &'static str = "PLpgSQL_case_when";
}

// ============================================================================
// Loops
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loop {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct While {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub cond: PlExpr,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// `FOR i IN [REVERSE] lower..upper [BY step] LOOP`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForI {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub var: Datum,
    pub lower: PlExpr,
    pub upper: PlExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<PlExpr>,
    #[serde(default, deserialize_with = "bool_or_number", skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// `FOR target IN query LOOP`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForS {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub var: Datum,
    #[serde(default)]
    pub body: Vec<Stmt>,
    pub query: PlExpr,
}

/// `FOR rec IN bound_cursor [(args)] LOOP`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForC {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub var: Datum,
    #[serde(default)]
    pub body: Vec<Stmt>,
    pub curvar: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argquery: Option<PlExpr>,
}

/// `FOREACH var [SLICE n] IN ARRAY expr LOOP`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForEachA {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub varno: i32,
    #[serde(default)]
    pub slice: i32,
    pub expr: PlExpr,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

/// `FOR target IN EXECUTE query [USING ...] LOOP`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynFors {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub var: Datum,
    #[serde(default)]
    pub body: Vec<Stmt>,
    pub query: PlExpr,
    #[serde(default)]
    pub params: Vec<PlExpr>,
}

/// `EXIT` (or `CONTINUE` when `is_exit` is false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default)]
    pub is_exit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<PlExpr>,
}

// ============================================================================
// Returns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Return {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retvarno: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnNext {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retvarno: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynquery: Option<PlExpr>,
    #[serde(default)]
    pub params: Vec<PlExpr>,
}

// ============================================================================
// RAISE / ASSERT
// ============================================================================

/// Severity of a `RAISE`, as a PostgreSQL elog level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrName", into = "i64")]
pub struct ElogLevel(pub i64);

impl ElogLevel {
    pub const DEBUG: ElogLevel = ElogLevel(14);
    pub const LOG: ElogLevel = ElogLevel(15);
    pub const INFO: ElogLevel = ElogLevel(17);
    pub const NOTICE: ElogLevel = ElogLevel(18);
    pub const WARNING: ElogLevel = ElogLevel(19);
    pub const EXCEPTION: ElogLevel = ElogLevel(21);

    /// Keyword written after `RAISE`.
    pub fn keyword(self) -> &'static str {
        match self.0 {
            10..=14 => "DEBUG",
            15 | 16 => "LOG",
            17 => "INFO",
            18 => "NOTICE",
            19 | 20 => "WARNING",
            _ => "EXCEPTION",
        }
    }
}

impl Default for ElogLevel {
    fn default() -> Self {
        Self::EXCEPTION
    }
}

impl TryFrom<NumberOrName> for ElogLevel {
    type Error = String;

    fn try_from(value: NumberOrName) -> Result<Self, Self::Error> {
        match value {
            NumberOrName::Number(n) => Ok(ElogLevel(n)),
            NumberOrName::Name(name) => match name.to_ascii_uppercase().as_str() {
                "DEBUG" => Ok(Self::DEBUG),
                "LOG" => Ok(Self::LOG),
                "INFO" => Ok(Self::INFO),
                "NOTICE" => Ok(Self::NOTICE),
                "WARNING" => Ok(Self::WARNING),
                "EXCEPTION" | "ERROR" => Ok(Self::EXCEPTION),
                other => Err(format!("unknown elog level `{}`", other)),
            },
        }
    }
}

impl From<ElogLevel> for i64 {
    fn from(level: ElogLevel) -> Self {
        level.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrName", into = "String")]
pub enum RaiseOptionType {
    Errcode,
    Message,
    Detail,
    Hint,
    Column,
    Constraint,
    Datatype,
    Table,
    Schema,
}

impl RaiseOptionType {
    const ALL: [RaiseOptionType; 9] = [
        Self::Errcode,
        Self::Message,
        Self::Detail,
        Self::Hint,
        Self::Column,
        Self::Constraint,
        Self::Datatype,
        Self::Table,
        Self::Schema,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Errcode => "ERRCODE",
            Self::Message => "MESSAGE",
            Self::Detail => "DETAIL",
            Self::Hint => "HINT",
            Self::Column => "COLUMN",
            Self::Constraint => "CONSTRAINT",
            Self::Datatype => "DATATYPE",
            Self::Table => "TABLE",
            Self::Schema => "SCHEMA",
        }
    }
}

impl TryFrom<NumberOrName> for RaiseOptionType {
    type Error = String;

    fn try_from(value: NumberOrName) -> Result<Self, Self::Error> {
        match value {
            NumberOrName::Number(n) => usize::try_from(n)
                .ok()
                .and_then(|index| Self::ALL.get(index).copied())
                .ok_or_else(|| format!("unknown raise option {}", n)),
            NumberOrName::Name(name) => {
                let upper = name.to_ascii_uppercase();
                let bare = upper
                    .strip_prefix("PLPGSQL_RAISEOPTION_")
                    .unwrap_or(&upper);
                Self::ALL
                    .into_iter()
                    .find(|opt| opt.keyword() == bare)
                    .ok_or_else(|| format!("unknown raise option `{}`", name))
            }
        }
    }
}

impl From<RaiseOptionType> for String {
    fn from(opt: RaiseOptionType) -> Self {
        opt.keyword().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseOption {
    pub opt_type: RaiseOptionType,
    pub expr: PlExpr,
}

impl NodeTag for RaiseOption {
    const TAG: &'static str = "PLpgSQL_raise_option";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raise {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default)]
    pub elog_level: ElogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub params: Vec<PlExpr>,
    #[serde(default, with = "tagged::list")]
    pub options: Vec<RaiseOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assert {
    #[serde(default)]
    pub lineno: i32,
    pub cond: PlExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<PlExpr>,
}

// ============================================================================
// SQL execution
// ============================================================================

/// A static SQL statement, optionally with `INTO [STRICT] target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecSql {
    #[serde(default)]
    pub lineno: i32,
    pub sqlstmt: PlExpr,
    #[serde(default, skip_serializing_if = "is_false")]
    pub into: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Datum>,
}

/// `EXECUTE query [INTO [STRICT] target] [USING ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynExecute {
    #[serde(default)]
    pub lineno: i32,
    pub query: PlExpr,
    #[serde(default, skip_serializing_if = "is_false")]
    pub into: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Datum>,
    #[serde(default)]
    pub params: Vec<PlExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NumberOrName", into = "String")]
pub enum DiagKind {
    RowCount,
    RoutineOid,
    Context,
    ErrorContext,
    ErrorDetail,
    ErrorHint,
    ReturnedSqlstate,
    ColumnName,
    ConstraintName,
    DatatypeName,
    MessageText,
    TableName,
    SchemaName,
}

impl DiagKind {
    const ALL: [DiagKind; 13] = [
        Self::RowCount,
        Self::RoutineOid,
        Self::Context,
        Self::ErrorContext,
        Self::ErrorDetail,
        Self::ErrorHint,
        Self::ReturnedSqlstate,
        Self::ColumnName,
        Self::ConstraintName,
        Self::DatatypeName,
        Self::MessageText,
        Self::TableName,
        Self::SchemaName,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::RowCount => "ROW_COUNT",
            Self::RoutineOid => "PG_ROUTINE_OID",
            Self::Context => "PG_CONTEXT",
            Self::ErrorContext => "PG_EXCEPTION_CONTEXT",
            Self::ErrorDetail => "PG_EXCEPTION_DETAIL",
            Self::ErrorHint => "PG_EXCEPTION_HINT",
            Self::ReturnedSqlstate => "RETURNED_SQLSTATE",
            Self::ColumnName => "COLUMN_NAME",
            Self::ConstraintName => "CONSTRAINT_NAME",
            Self::DatatypeName => "PG_DATATYPE_NAME",
            Self::MessageText => "MESSAGE_TEXT",
            Self::TableName => "TABLE_NAME",
            Self::SchemaName => "SCHEMA_NAME",
        }
    }
}

impl TryFrom<NumberOrName> for DiagKind {
    type Error = String;

    fn try_from(value: NumberOrName) -> Result<Self, Self::Error> {
        match value {
            NumberOrName::Number(n) => usize::try_from(n)
                .ok()
                .and_then(|index| Self::ALL.get(index).copied())
                .ok_or_else(|| format!("unknown diagnostics item {}", n)),
            NumberOrName::Name(name) => Self::ALL
                .into_iter()
                .find(|kind| kind.keyword().eq_ignore_ascii_case(&name))
                .ok_or_else(|| format!("unknown diagnostics item `{}`", name)),
        }
    }
}

impl From<DiagKind> for String {
    fn from(kind: DiagKind) -> Self {
        kind.keyword().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagItem {
    pub kind: DiagKind,
    pub target: i32,
}

impl NodeTag for DiagItem {
    const TAG: &'static str = "PLpgSQL_diag_item";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDiag {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_stacked: bool,
    #[serde(default, with = "tagged::list")]
    pub diag_items: Vec<DiagItem>,
}

// ============================================================================
// Cursors
// ============================================================================

/// `SCROLL` bit of a cursor's options.
pub const CURSOR_OPT_SCROLL: i32 = 0x0002;
/// `NO SCROLL` bit of a cursor's options.
pub const CURSOR_OPT_NO_SCROLL: i32 = 0x0004;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Open {
    #[serde(default)]
    pub lineno: i32,
    pub curvar: i32,
    #[serde(default)]
    pub cursor_options: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argquery: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynquery: Option<PlExpr>,
    #[serde(default)]
    pub params: Vec<PlExpr>,
}

/// Direction of a `FETCH` / `MOVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "NumberOrName", into = "i64")]
pub enum FetchDirection {
    #[default]
    Forward,
    Backward,
    Absolute,
    Relative,
}

impl TryFrom<NumberOrName> for FetchDirection {
    type Error = String;

    fn try_from(value: NumberOrName) -> Result<Self, Self::Error> {
        match value {
            NumberOrName::Number(0) => Ok(Self::Forward),
            NumberOrName::Number(1) => Ok(Self::Backward),
            NumberOrName::Number(2) => Ok(Self::Absolute),
            NumberOrName::Number(3) => Ok(Self::Relative),
            NumberOrName::Number(n) => Err(format!("unknown fetch direction {}", n)),
            NumberOrName::Name(name) => {
                let upper = name.to_ascii_uppercase();
                match upper.strip_prefix("FETCH_").unwrap_or(&upper) {
                    "FORWARD" => Ok(Self::Forward),
                    "BACKWARD" => Ok(Self::Backward),
                    "ABSOLUTE" => Ok(Self::Absolute),
                    "RELATIVE" => Ok(Self::Relative),
                    _ => Err(format!("unknown fetch direction `{}`", name)),
                }
            }
        }
    }
}

impl From<FetchDirection> for i64 {
    fn from(direction: FetchDirection) -> Self {
        match direction {
            FetchDirection::Forward => 0,
            FetchDirection::Backward => 1,
            FetchDirection::Absolute => 2,
            FetchDirection::Relative => 3,
        }
    }
}

/// Count PostgreSQL uses for `ALL`.
pub const FETCH_ALL: i64 = i64::MAX;

fn default_how_many() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetch {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Datum>,
    pub curvar: i32,
    #[serde(default)]
    pub direction: FetchDirection,
    #[serde(default = "default_how_many")]
    pub how_many: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_move: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub returns_multiple_rows: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Close {
    #[serde(default)]
    pub lineno: i32,
    pub curvar: i32,
}

// ============================================================================
// Simple statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perform {
    #[serde(default)]
    pub lineno: i32,
    pub expr: PlExpr,
}

/// `CALL proc(...)` or `DO $$...$$` (when `is_call` is false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    #[serde(default)]
    pub lineno: i32,
    pub expr: PlExpr,
    #[serde(default)]
    pub is_call: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Datum>,
}

/// `COMMIT [AND CHAIN]` / `ROLLBACK [AND CHAIN]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub chain: bool,
}

/// `SET` / `RESET`, kept as a single statement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    #[serde(default)]
    pub lineno: i32,
    pub expr: PlExpr,
}

// ============================================================================
// The statement sum type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    #[serde(rename = "PLpgSQL_stmt_block")]
    Block(Block),
    #[serde(rename = "PLpgSQL_stmt_assign")]
    Assign(Assign),
    #[serde(rename = "PLpgSQL_stmt_if")]
    If(If),
    #[serde(rename = "PLpgSQL_stmt_case")]
    Case(Case),
    #[serde(rename = "PLpgSQL_stmt_loop")]
    Loop(Loop),
    #[serde(rename = "PLpgSQL_stmt_while")]
    While(While),
    #[serde(rename = "PLpgSQL_stmt_fori")]
    ForI(ForI),
    #[serde(rename = "PLpgSQL_stmt_fors")]
    ForS(ForS),
    #[serde(rename = "PLpgSQL_stmt_forc")]
    ForC(ForC),
    #[serde(rename = "PLpgSQL_stmt_foreach_a")]
    ForEachA(ForEachA),
    #[serde(rename = "PLpgSQL_stmt_exit")]
    Exit(Exit),
    #[serde(rename = "PLpgSQL_stmt_return")]
    Return(Return),
    #[serde(rename = "PLpgSQL_stmt_return_next")]
    ReturnNext(ReturnNext),
    #[serde(rename = "PLpgSQL_stmt_return_query")]
    ReturnQuery(ReturnQuery),
    #[serde(rename = "PLpgSQL_stmt_raise")]
    Raise(Raise),
    #[serde(rename = "PLpgSQL_stmt_assert")]
    Assert(Assert),
    #[serde(rename = "PLpgSQL_stmt_execsql")]
    ExecSql(ExecSql),
    #[serde(rename = "PLpgSQL_stmt_dynexecute")]
    DynExecute(DynExecute),
    #[serde(rename = "PLpgSQL_stmt_dynfors")]
    DynFors(DynFors),
    #[serde(rename = "PLpgSQL_stmt_getdiag")]
    GetDiag(GetDiag),
    #[serde(rename = "PLpgSQL_stmt_open")]
    Open(Open),
    #[serde(rename = "PLpgSQL_stmt_fetch")]
    Fetch(Fetch),
    #[serde(rename = "PLpgSQL_stmt_close")]
    Close(Close),
    #[serde(rename = "PLpgSQL_stmt_perform")]
    Perform(Perform),
    #[serde(rename = "PLpgSQL_stmt_call")]
    Call(Call),
    #[serde(rename = "PLpgSQL_stmt_commit")]
    Commit(Transaction),
    #[serde(rename = "PLpgSQL_stmt_rollback")]
    Rollback(Transaction),
    #[serde(rename = "PLpgSQL_stmt_set")]
    Set(Set),
}

impl Stmt {
    /// Source line of the statement.
    pub fn lineno(&self) -> i32 {
        match self {
            Stmt::Block(s) => s.lineno,
            Stmt::Assign(s) => s.lineno,
            Stmt::If(s) => s.lineno,
            Stmt::Case(s) => s.lineno,
            Stmt::Loop(s) => s.lineno,
            Stmt::While(s) => s.lineno,
            Stmt::ForI(s) => s.lineno,
            Stmt::ForS(s) => s.lineno,
            Stmt::ForC(s) => s.lineno,
            Stmt::ForEachA(s) => s.lineno,
            Stmt::Exit(s) => s.lineno,
            Stmt::Return(s) => s.lineno,
            Stmt::ReturnNext(s) => s.lineno,
            Stmt::ReturnQuery(s) => s.lineno,
            Stmt::Raise(s) => s.lineno,
            Stmt::Assert(s) => s.lineno,
            Stmt::ExecSql(s) => s.lineno,
            Stmt::DynExecute(s) => s.lineno,
            Stmt::DynFors(s) => s.lineno,
            Stmt::GetDiag(s) => s.lineno,
            Stmt::Open(s) => s.lineno,
            Stmt::Fetch(s) => s.lineno,
            Stmt::Close(s) => s.lineno,
            Stmt::Perform(s) => s.lineno,
            Stmt::Call(s) => s.lineno,
            Stmt::Commit(s) | Stmt::Rollback(s) => s.lineno,
            Stmt::Set(s) => s.lineno,
        }
    }

    pub fn lineno_mut(&mut self) -> &mut i32 {
        match self {
            Stmt::Block(s) => &mut s.lineno,
            Stmt::Assign(s) => &mut s.lineno,
            Stmt::If(s) => &mut s.lineno,
            Stmt::Case(s) => &mut s.lineno,
            Stmt::Loop(s) => &mut s.lineno,
            Stmt::While(s) => &mut s.lineno,
            Stmt::ForI(s) => &mut s.lineno,
            Stmt::ForS(s) => &mut s.lineno,
            Stmt::ForC(s) => &mut s.lineno,
            Stmt::ForEachA(s) => &mut s.lineno,
            Stmt::Exit(s) => &mut s.lineno,
            Stmt::Return(s) => &mut s.lineno,
            Stmt::ReturnNext(s) => &mut s.lineno,
            Stmt::ReturnQuery(s) => &mut s.lineno,
            Stmt::Raise(s) => &mut s.lineno,
            Stmt::Assert(s) => &mut s.lineno,
            Stmt::ExecSql(s) => &mut s.lineno,
            Stmt::DynExecute(s) => &mut s.lineno,
            Stmt::DynFors(s) => &mut s.lineno,
            Stmt::GetDiag(s) => &mut s.lineno,
            Stmt::Open(s) => &mut s.lineno,
            Stmt::Fetch(s) => &mut s.lineno,
            Stmt::Close(s) => &mut s.lineno,
            Stmt::Perform(s) => &mut s.lineno,
            Stmt::Call(s) => &mut s.lineno,
            Stmt::Commit(s) | Stmt::Rollback(s) => &mut s.lineno,
            Stmt::Set(s) => &mut s.lineno,
        }
    }

    /// Statement lists nested directly inside this statement, in source order.
    pub fn nested_bodies(&self) -> Vec<&[Stmt]> {
        match self {
            Stmt::Block(block) => block.nested_bodies(),
            Stmt::If(s) => {
                let mut bodies = vec![s.then_body.as_slice()];
                bodies.extend(s.elsif_list.iter().map(|e| e.stmts.as_slice()));
                bodies.push(s.else_body.as_slice());
                bodies
            }
            Stmt::Case(s) => {
                let mut bodies: Vec<&[Stmt]> =
                    s.case_when_list.iter().map(|w| w.stmts.as_slice()).collect();
                bodies.push(s.else_stmts.as_slice());
                bodies
            }
            Stmt::Loop(s) => vec![s.body.as_slice()],
            Stmt::While(s) => vec![s.body.as_slice()],
            Stmt::ForI(s) => vec![s.body.as_slice()],
            Stmt::ForS(s) => vec![s.body.as_slice()],
            Stmt::ForC(s) => vec![s.body.as_slice()],
            Stmt::ForEachA(s) => vec![s.body.as_slice()],
            Stmt::DynFors(s) => vec![s.body.as_slice()],
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
            | Stmt::Set(_) => Vec::new(),
        }
    }
}

impl Block {
    /// The block body followed by each exception handler's actions.
    pub fn nested_bodies(&self) -> Vec<&[Stmt]> {
        let mut bodies = vec![self.body.as_slice()];
        if let Some(exceptions) = &self.exceptions {
            bodies.extend(exceptions.exc_list.iter().map(|h| h.action.as_slice()));
        }
        bodies
    }
}

/// Visit every statement below `stmts` in pre-order.
pub fn walk_stmts<'a, F>(stmts: &'a [Stmt], f: &mut F)
where
    F: FnMut(&'a Stmt),
{
    for stmt in stmts {
        f(stmt);
        for body in stmt.nested_bodies() {
            walk_stmts(body, f);
        }
    }
}
