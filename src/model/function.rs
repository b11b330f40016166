//! Functions, their datum tables, and the top-level parse result.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::expr::{PlExpr, PlType};
use super::statements::Block;
use super::tagged::{self, NodeTag};
use crate::constants::{UNNAMED_ROW, UNRESOLVED_DATUM_PREFIX};
use crate::error::DeparseError;

static UNKNOWN_VARIANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"unknown variant `([^`]+)`").unwrap());

/// A scalar variable (`PLpgSQL_var`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlVar {
    pub refname: String,
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<PlType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub isconst: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub notnull: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_val: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_explicit_expr: Option<PlExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_explicit_argrow: Option<i32>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cursor_options: i32,
}

/// A record variable (`PLpgSQL_rec`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlRec {
    pub refname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dno: Option<i32>,
    #[serde(default)]
    pub lineno: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<PlType>,
}

/// One member of a row datum: the field name and the datum it reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowField {
    pub name: String,
    pub varno: i32,
}

/// A row of other datums (`PLpgSQL_row`), e.g. an `INTO a, b` target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlRow {
    pub refname: String,
    #[serde(default)]
    pub lineno: i32,
    #[serde(default)]
    pub fields: Vec<RowField>,
}

impl PlRow {
    pub fn is_unnamed(&self) -> bool {
        self.refname == UNNAMED_ROW
    }
}

/// A field access on a record (`PLpgSQL_recfield`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlRecField {
    pub fieldname: String,
    /// Index of the parent record in the datum table. A lookup, never ownership.
    pub recparentno: i32,
}

/// Any declared name in a function's local scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Datum {
    #[serde(rename = "PLpgSQL_var")]
    Var(PlVar),
    #[serde(rename = "PLpgSQL_rec")]
    Rec(PlRec),
    #[serde(rename = "PLpgSQL_row")]
    Row(PlRow),
    #[serde(rename = "PLpgSQL_recfield")]
    RecField(PlRecField),
}

impl Datum {
    /// Declared name; field accesses have none of their own.
    pub fn refname(&self) -> Option<&str> {
        match self {
            Self::Var(var) => Some(&var.refname),
            Self::Rec(rec) => Some(&rec.refname),
            Self::Row(row) => Some(&row.refname),
            Self::RecField(_) => None,
        }
    }

    /// Source line of the declaration, 0 when the compiler made it up.
    pub fn lineno(&self) -> i32 {
        match self {
            Self::Var(var) => var.lineno,
            Self::Rec(rec) => rec.lineno,
            Self::Row(row) => row.lineno,
            Self::RecField(_) => 0,
        }
    }

    pub fn lineno_mut(&mut self) -> Option<&mut i32> {
        match self {
            Self::Var(var) => Some(&mut var.lineno),
            Self::Rec(rec) => Some(&mut rec.lineno),
            Self::Row(row) => Some(&mut row.lineno),
            Self::RecField(_) => None,
        }
    }
}

/// One compiled function: its datum table and outermost block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub datums: Vec<Datum>,
    #[serde(with = "tagged::one")]
    pub action: Block,
}

impl NodeTag for Function {
    const TAG: &'static str = "PLpgSQL_function";
}

impl Function {
    /// Look up a datum by index. Negative or out-of-range indices yield `None`.
    pub fn datum(&self, varno: i32) -> Option<&Datum> {
        usize::try_from(varno)
            .ok()
            .and_then(|index| self.datums.get(index))
    }

    /// Textual reference to a datum as it appears in source.
    ///
    /// Unnamed rows expand to their comma-joined member names and field
    /// accesses to `record.field`. Indices with no table entry, and indices
    /// that lead back to a datum already being expanded, degrade to a
    /// placeholder name.
    pub fn datum_reference(&self, varno: i32) -> String {
        self.reference_at(varno, &mut Vec::new())
    }

    /// Textual reference for a datum embedded in a statement (e.g. an `INTO` target).
    pub fn reference_for(&self, datum: &Datum) -> String {
        self.reference_in(datum, &mut Vec::new())
    }

    fn reference_at(&self, varno: i32, visiting: &mut Vec<i32>) -> String {
        let Some(datum) = self.datum(varno) else {
            tracing::warn!(varno, "unresolved datum reference");
            return unresolved(varno);
        };
        if visiting.contains(&varno) {
            tracing::warn!(varno, "cyclic datum reference");
            return unresolved(varno);
        }
        visiting.push(varno);
        let reference = self.reference_in(datum, visiting);
        visiting.pop();
        reference
    }

    fn reference_in(&self, datum: &Datum, visiting: &mut Vec<i32>) -> String {
        match datum {
            Datum::Var(var) => var.refname.clone(),
            Datum::Rec(rec) => rec.refname.clone(),
            Datum::Row(row) if row.is_unnamed() => row
                .fields
                .iter()
                .map(|field| match self.datum(field.varno) {
                    Some(_) => self.reference_at(field.varno, visiting),
                    None => field.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Datum::Row(row) => row.refname.clone(),
            Datum::RecField(field) => format!(
                "{}.{}",
                self.reference_at(field.recparentno, visiting),
                field.fieldname
            ),
        }
    }
}

fn unresolved(varno: i32) -> String {
    format!("{}{}", UNRESOLVED_DATUM_PREFIX, varno)
}

/// The procedural parser's output: one entry per function.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseResult {
    pub functions: Vec<Function>,
}

impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        tagged::list::serialize(&self.functions, serializer)
    }
}

impl<'de> Deserialize<'de> for ParseResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        tagged::list::deserialize(deserializer).map(|functions| ParseResult { functions })
    }
}

impl ParseResult {
    /// Decode the parser's JSON output.
    pub fn from_json(json: &str) -> Result<Self, DeparseError> {
        serde_json::from_str(json).map_err(decode_error)
    }

    /// Decode an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DeparseError> {
        serde_json::from_value(value).map_err(decode_error)
    }

    /// Read and decode a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, DeparseError> {
        let json = fs::read_to_string(path).map_err(|e| DeparseError::ParseTreeReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    /// Encode back to the parser's JSON shape (hydrated leaves included).
    pub fn to_json(&self) -> Result<String, DeparseError> {
        serde_json::to_string(self).map_err(|e| DeparseError::SerializeError {
            message: e.to_string(),
        })
    }
}

/// Map a decoder failure onto the crate's error, singling out unknown tags.
fn decode_error(err: serde_json::Error) -> DeparseError {
    let message = err.to_string();
    if let Some(caps) = UNKNOWN_VARIANT_RE.captures(&message) {
        return DeparseError::UnknownNodeTag {
            tag: caps[1].to_string(),
        };
    }
    DeparseError::InvalidParseTree {
        line: err.line(),
        column: err.column(),
        message,
    }
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}
