//! Leaf nodes: embedded SQL expressions and type references.
//!
//! A leaf starts life as the raw text the procedural parser captured. After
//! hydration it may carry a parsed sub-tree instead, but it always keeps the
//! original text alongside so rendering can fall back to it.

use serde::{Deserialize, Serialize};
use sqlparser::ast::{DataType, Expr as AstExpr, Statement};

/// How the procedural parser asked the SQL grammar to read a leaf.
///
/// Mirrors PostgreSQL's `RawParseMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ParseMode {
    /// A complete SQL statement
    #[default]
    Default,
    /// A bare type name
    TypeName,
    /// A PL/pgSQL expression
    PlpgsqlExpr,
    /// `target := value` with a one-part target
    Assign1,
    /// `target := value` with a two-part target
    Assign2,
    /// `target := value` with a three-part target
    Assign3,
    Other(i32),
}

impl ParseMode {
    pub fn is_assignment(self) -> bool {
        matches!(self, Self::Assign1 | Self::Assign2 | Self::Assign3)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::TypeName => "type_name",
            Self::PlpgsqlExpr => "plpgsql_expr",
            Self::Assign1 => "plpgsql_assign1",
            Self::Assign2 => "plpgsql_assign2",
            Self::Assign3 => "plpgsql_assign3",
            Self::Other(_) => "other",
        }
    }
}

impl From<i32> for ParseMode {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Default,
            1 => Self::TypeName,
            2 => Self::PlpgsqlExpr,
            3 => Self::Assign1,
            4 => Self::Assign2,
            5 => Self::Assign3,
            other => Self::Other(other),
        }
    }
}

impl From<ParseMode> for i32 {
    fn from(mode: ParseMode) -> Self {
        match mode {
            ParseMode::Default => 0,
            ParseMode::TypeName => 1,
            ParseMode::PlpgsqlExpr => 2,
            ParseMode::Assign1 => 3,
            ParseMode::Assign2 => 4,
            ParseMode::Assign3 => 5,
            ParseMode::Other(other) => other,
        }
    }
}

/// Unparsed leaf text as captured by the procedural parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExpr {
    pub query: String,
    #[serde(rename = "parseMode", default)]
    pub parse_mode: ParseMode,
}

/// A leaf after hydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydratedExpr {
    /// Could not (or was not asked to) be parsed further
    Raw {
        original: String,
        parse_mode: ParseMode,
    },
    /// A complete SQL statement
    SqlStmt {
        original: String,
        parse_mode: ParseMode,
        stmt: Box<Statement>,
    },
    /// A scalar expression
    SqlExpr {
        original: String,
        parse_mode: ParseMode,
        expr: Box<AstExpr>,
    },
    /// `target := value`, each side parsed independently when possible
    Assign {
        original: String,
        parse_mode: ParseMode,
        target: String,
        value: String,
        target_expr: Option<Box<AstExpr>>,
        value_expr: Option<Box<AstExpr>>,
    },
}

impl HydratedExpr {
    /// The leaf text as it was before hydration.
    pub fn original(&self) -> &str {
        match self {
            Self::Raw { original, .. }
            | Self::SqlStmt { original, .. }
            | Self::SqlExpr { original, .. }
            | Self::Assign { original, .. } => original,
        }
    }

    pub fn parse_mode(&self) -> ParseMode {
        match self {
            Self::Raw { parse_mode, .. }
            | Self::SqlStmt { parse_mode, .. }
            | Self::SqlExpr { parse_mode, .. }
            | Self::Assign { parse_mode, .. } => *parse_mode,
        }
    }
}

/// An embedded SQL leaf (`PLpgSQL_expr`), raw or hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlExpr {
    #[serde(rename = "PLpgSQL_expr")]
    Raw(RawExpr),
    #[serde(rename = "Hydrated")]
    Hydrated(HydratedExpr),
}

impl PlExpr {
    pub fn raw(query: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self::Raw(RawExpr {
            query: query.into(),
            parse_mode,
        })
    }

    pub fn parse_mode(&self) -> ParseMode {
        match self {
            Self::Raw(raw) => raw.parse_mode,
            Self::Hydrated(hydrated) => hydrated.parse_mode(),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        matches!(self, Self::Hydrated(_))
    }

    /// Original captured text, regardless of state.
    pub fn original(&self) -> &str {
        match self {
            Self::Raw(raw) => &raw.query,
            Self::Hydrated(hydrated) => hydrated.original(),
        }
    }
}

/// Unparsed type reference (`PLpgSQL_type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawType {
    pub typname: String,
}

/// A schema-qualified type reference parsed into a type-name tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydratedTypeName {
    pub original: String,
    pub type_name: DataType,
    /// `%ROWTYPE` / `%TYPE`, kept verbatim
    pub suffix: Option<String>,
}

/// A datum's declared type, raw or hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlType {
    #[serde(rename = "PLpgSQL_type")]
    Raw(RawType),
    #[serde(rename = "HydratedTypeName")]
    Hydrated(HydratedTypeName),
}

impl PlType {
    pub fn raw(typname: impl Into<String>) -> Self {
        Self::Raw(RawType {
            typname: typname.into(),
        })
    }

    pub fn original(&self) -> &str {
        match self {
            Self::Raw(raw) => &raw.typname,
            Self::Hydrated(hydrated) => &hydrated.original,
        }
    }
}
