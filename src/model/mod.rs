//! Procedural parse tree model

mod expr;
mod function;
mod statements;
pub mod tagged;
mod walk;

pub use expr::*;
pub use function::*;
pub use statements::*;
pub use walk::{clear_line_numbers, for_each_expr_mut, walk_function_mut, walk_mut, TreeVisitorMut};
