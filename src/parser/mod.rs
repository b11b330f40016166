//! Text-level scanning of SQL and assignment leaves

mod assignment;
pub mod function_sql;
pub mod identifier_utils;
mod into_clause;
mod token_parser_base;

pub use assignment::{split_assignment, AssignmentParts};
pub use function_sql::{extract_function_body, parse_return_kind, replace_function_body};
pub use into_clause::{find_into_position, insert_into_clause, InsertionPoint};
