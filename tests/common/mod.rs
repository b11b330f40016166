//! Common test utilities for plpgsql-deparser tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use plpgsql_deparser::model::ParseResult;
use serde_json::{json, Value};

/// Get the path to a test fixture
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Raw JSON text of a fixture
pub fn fixture_json(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

/// Decode a fixture, panicking with the decoder message on failure
pub fn load_fixture(name: &str) -> ParseResult {
    ParseResult::from_path(&fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to decode fixture '{}': {}", name, e))
}

// ============================================================================
// JSON builders
// ============================================================================

/// Wrap statements into a one-function parse result with the given datums.
/// The outer block sits on line 2.
pub fn function_with(datums: Value, body: Value) -> ParseResult {
    let value = json!([{"PLpgSQL_function": {
        "datums": datums,
        "action": {"PLpgSQL_stmt_block": {"lineno": 2, "body": body}}
    }}]);
    ParseResult::from_value(value).expect("Failed to decode built tree")
}

/// A function with no declared variables.
pub fn function_of(body: Value) -> ParseResult {
    function_with(json!([]), body)
}

pub fn expr(query: &str, parse_mode: i32) -> Value {
    json!({"PLpgSQL_expr": {"query": query, "parseMode": parse_mode}})
}

pub fn var(refname: &str, lineno: i32, typname: &str) -> Value {
    json!({"PLpgSQL_var": {
        "refname": refname,
        "lineno": lineno,
        "datatype": {"PLpgSQL_type": {"typname": typname}}
    }})
}

/// An `INTO` target row over the given datum indices.
pub fn into_row(fields: &[(&str, i32)]) -> Value {
    let fields: Vec<Value> = fields
        .iter()
        .map(|(name, varno)| json!({"name": name, "varno": varno}))
        .collect();
    json!({"PLpgSQL_row": {"refname": "(unnamed row)", "fields": fields}})
}

pub fn perform(query: &str) -> Value {
    json!({"PLpgSQL_stmt_perform": {"lineno": 3, "expr": expr(query, 0)}})
}

pub fn assign(lineno: i32, varno: i32, query: &str) -> Value {
    json!({"PLpgSQL_stmt_assign": {"lineno": lineno, "varno": varno, "expr": expr(query, 3)}})
}

pub fn bare_return(lineno: i32) -> Value {
    json!({"PLpgSQL_stmt_return": {"lineno": lineno}})
}

/// Collapse runs of whitespace, for comparing text that may be re-rendered.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
