//! Naming conventions of the procedural parser and of PostgreSQL itself.
//!
//! Every magic name the renderer and the hydrator compare against lives here,
//! so the set can be audited and versioned independently of rendering logic.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Datums the procedural compiler creates on its own. They are never declared.
pub const RESERVED_DATUM_NAMES: &[&str] = &[
    "found",
    "sqlstate",
    "sqlerrm",
    "new",
    "old",
    "tg_name",
    "tg_when",
    "tg_level",
    "tg_op",
    "tg_relid",
    "tg_relname",
    "tg_table_name",
    "tg_table_schema",
    "tg_nargs",
    "tg_argv",
    "tg_event",
    "tg_tag",
];

/// Refname of a row the compiler builds for `INTO a, b` style target lists.
pub const UNNAMED_ROW: &str = "(unnamed row)";

/// Prefix of the hidden variable that holds a simple `CASE x` operand.
pub const CASE_VARIABLE_PREFIX: &str = "__Case__Variable_";

/// Prefix of positional parameter aliases (`$1`, `$2`, ...).
pub const POSITIONAL_PARAM_PREFIX: &str = "$";

/// Qualifier of builtin types, dropped when rendering type names.
pub const CATALOG_SCHEMA_PREFIX: &str = "pg_catalog.";

/// Textual stand-in for a datum index with no table entry.
pub const UNRESOLVED_DATUM_PREFIX: &str = "__datum_";

/// Procedural-only type suffixes. Never real SQL types, never quoted.
pub const TYPE_REFERENCE_SUFFIXES: &[&str] = &["%rowtype", "%type"];

/// Keywords that end the result list of a query, in match order.
pub const INTO_BOUNDARY_KEYWORDS: &[&str] = &[
    "FROM",
    "WHERE",
    "GROUP",
    "HAVING",
    "WINDOW",
    "ORDER",
    "LIMIT",
    "OFFSET",
    "FETCH",
    "FOR",
    "UNION",
    "INTERSECT",
    "EXCEPT",
];

/// Statement keywords that put `INTO` after `RETURNING` rather than before `FROM`.
pub const DML_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "MERGE"];

/// PostgreSQL reserved keywords (and type-function names) that force quoting
/// of an otherwise lowercase identifier.
pub static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "all",
        "analyse",
        "analyze",
        "and",
        "any",
        "array",
        "as",
        "asc",
        "asymmetric",
        "authorization",
        "between",
        "bigint",
        "binary",
        "bit",
        "boolean",
        "both",
        "case",
        "cast",
        "char",
        "character",
        "check",
        "coalesce",
        "collate",
        "collation",
        "column",
        "concurrently",
        "constraint",
        "create",
        "cross",
        "current_catalog",
        "current_date",
        "current_role",
        "current_schema",
        "current_time",
        "current_timestamp",
        "current_user",
        "dec",
        "decimal",
        "default",
        "deferrable",
        "desc",
        "distinct",
        "do",
        "else",
        "end",
        "except",
        "exists",
        "extract",
        "false",
        "fetch",
        "float",
        "for",
        "foreign",
        "freeze",
        "from",
        "full",
        "grant",
        "greatest",
        "group",
        "grouping",
        "having",
        "ilike",
        "in",
        "initially",
        "inner",
        "inout",
        "int",
        "integer",
        "intersect",
        "interval",
        "into",
        "is",
        "isnull",
        "join",
        "lateral",
        "leading",
        "least",
        "left",
        "like",
        "limit",
        "localtime",
        "localtimestamp",
        "national",
        "natural",
        "nchar",
        "none",
        "normalize",
        "not",
        "notnull",
        "null",
        "nullif",
        "numeric",
        "offset",
        "on",
        "only",
        "or",
        "order",
        "out",
        "outer",
        "overlaps",
        "overlay",
        "placing",
        "position",
        "precision",
        "primary",
        "real",
        "references",
        "returning",
        "right",
        "row",
        "select",
        "session_user",
        "setof",
        "similar",
        "smallint",
        "some",
        "substring",
        "symmetric",
        "system_user",
        "table",
        "tablesample",
        "then",
        "time",
        "timestamp",
        "to",
        "trailing",
        "treat",
        "trim",
        "true",
        "union",
        "unique",
        "user",
        "using",
        "values",
        "varchar",
        "variadic",
        "verbose",
        "when",
        "where",
        "window",
        "with",
        "xmlattributes",
        "xmlconcat",
        "xmlelement",
        "xmlexists",
        "xmlforest",
        "xmlnamespaces",
        "xmlparse",
        "xmlpi",
        "xmlroot",
        "xmlserialize",
        "xmltable",
    ]
    .into_iter()
    .collect()
});

/// Whether a datum name belongs to the compiler rather than the author.
pub fn is_internal_datum_name(name: &str) -> bool {
    RESERVED_DATUM_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
        || name == UNNAMED_ROW
        || name.starts_with(CASE_VARIABLE_PREFIX)
        || name.starts_with(POSITIONAL_PARAM_PREFIX)
}
