//! plpgsql-deparser: render PL/pgSQL parse trees back to source text
//!
//! The input is the procedural parser's JSON tree. Its embedded SQL leaves
//! can be hydrated into `sqlparser` trees, rewritten structurally, and
//! dehydrated again before the body is rendered.

pub mod constants;
pub mod deparser;
pub mod error;
pub mod hydrate;
pub mod model;
pub mod parser;
pub mod util;

use anyhow::{Context, Result};

pub use deparser::{deparse, deparse_function, DeparseOptions, ReturnInfo, ReturnKind};
pub use error::{AssignmentSplitError, BackendError, DeparseError};
pub use hydrate::{
    dehydrate, dehydrate_with, hydrate, hydrate_with, HydrateOptions, HydrationError,
    HydrationErrorKind, HydrationResult, HydrationStats, PostgresBackend, SqlBackend,
};
pub use model::ParseResult;

/// Decode a parse tree and render every function body in it.
pub fn deparse_json(
    json: &str,
    options: &DeparseOptions,
    return_info: Option<&ReturnInfo>,
) -> Result<Vec<String>> {
    let result = ParseResult::from_json(json).context("Failed to decode PL/pgSQL parse tree")?;
    tracing::debug!(functions = result.functions.len(), "decoded parse tree");
    Ok(deparse(&result, options, return_info))
}

/// Render the first function of `parse_json` and put it back into the
/// `CREATE FUNCTION` statement it was parsed from. The return shape is
/// read from that statement's signature.
pub fn deparse_create_function(
    create_sql: &str,
    parse_json: &str,
    options: &DeparseOptions,
) -> Result<String> {
    let result =
        ParseResult::from_json(parse_json).context("Failed to decode PL/pgSQL parse tree")?;
    let func = result
        .functions
        .first()
        .context("Parse tree contains no functions")?;

    let return_info = ReturnInfo::from_create_function(create_sql)
        .context("Input is not a CREATE FUNCTION or CREATE PROCEDURE statement")?;
    let body = format!(
        "{nl}{}{nl}",
        deparse_function(func, options, Some(&return_info)),
        nl = options.newline
    );

    parser::replace_function_body(create_sql, &body)
        .context("Failed to locate the function body")
}
