//! The plain-SQL parser/renderer that hydration and dehydration delegate to.

use sqlparser::ast::{DataType, Expr, SelectItem, SetExpr, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::BackendError;

/// Parses SQL fragments into trees and renders trees back into text.
///
/// Implementations must be shareable across threads: hydration processes
/// functions in parallel.
pub trait SqlBackend: Sync {
    /// Parse exactly one complete SQL statement.
    fn parse_statement(&self, sql: &str) -> Result<Statement, BackendError>;

    /// Parse a scalar expression.
    fn parse_expression(&self, sql: &str) -> Result<Expr, BackendError>;

    /// Parse a type name such as `app.money_amount` or `numeric(10, 2)[]`.
    fn parse_type_name(&self, sql: &str) -> Result<DataType, BackendError>;

    fn render_statement(&self, stmt: &Statement) -> Result<String, BackendError>;

    fn render_expression(&self, expr: &Expr) -> Result<String, BackendError>;

    fn render_type_name(&self, data_type: &DataType) -> Result<String, BackendError>;
}

/// `sqlparser` with the PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresBackend;

impl PostgresBackend {
    fn parse_single(sql: &str) -> Result<Statement, BackendError> {
        let dialect = PostgreSqlDialect {};
        let mut statements = Parser::parse_sql(&dialect, sql)?;
        if statements.len() != 1 {
            return Err(BackendError::UnexpectedShape {
                expected: format!("one statement, found {}", statements.len()),
            });
        }
        Ok(statements.remove(0))
    }

    /// Unwrap `SELECT <item>` with no FROM, WHERE or WITH.
    fn single_projection(stmt: Statement) -> Option<SelectItem> {
        let Statement::Query(query) = stmt else {
            return None;
        };
        if query.with.is_some() {
            return None;
        }
        let SetExpr::Select(select) = *query.body else {
            return None;
        };
        if !select.from.is_empty() || select.selection.is_some() {
            return None;
        }
        let mut projection = select.projection;
        if projection.len() != 1 {
            return None;
        }
        projection.pop()
    }
}

impl SqlBackend for PostgresBackend {
    fn parse_statement(&self, sql: &str) -> Result<Statement, BackendError> {
        Self::parse_single(sql)
    }

    fn parse_expression(&self, sql: &str) -> Result<Expr, BackendError> {
        let stmt = Self::parse_single(&format!("SELECT {}", sql))?;
        match Self::single_projection(stmt) {
            Some(SelectItem::UnnamedExpr(expr)) => Ok(expr),
            _ => Err(BackendError::UnexpectedShape {
                expected: "a single unaliased expression".to_string(),
            }),
        }
    }

    fn parse_type_name(&self, sql: &str) -> Result<DataType, BackendError> {
        let stmt = Self::parse_single(&format!("SELECT NULL::{}", sql))?;
        match Self::single_projection(stmt) {
            Some(SelectItem::UnnamedExpr(Expr::Cast { data_type, .. })) => Ok(data_type),
            _ => Err(BackendError::UnexpectedShape {
                expected: "a type name".to_string(),
            }),
        }
    }

    fn render_statement(&self, stmt: &Statement) -> Result<String, BackendError> {
        Ok(stmt.to_string())
    }

    fn render_expression(&self, expr: &Expr) -> Result<String, BackendError> {
        Ok(expr.to_string())
    }

    fn render_type_name(&self, data_type: &DataType) -> Result<String, BackendError> {
        Ok(data_type.to_string())
    }
}
