//! Unit tests for body rendering

use plpgsql_deparser::model::ParseResult;
use plpgsql_deparser::{deparse, DeparseOptions, ReturnInfo, ReturnKind};
use pretty_assertions::assert_eq;
use regex::Regex;
use serde_json::json;

use crate::common::{assign, bare_return, expr, function_of, function_with, into_row, perform, var};

fn render(result: &ParseResult, kind: Option<ReturnKind>) -> String {
    let info = kind.map(ReturnInfo::new);
    deparse(result, &DeparseOptions::default(), info.as_ref()).remove(0)
}

// ============================================================================
// Statement rendering
// ============================================================================

#[test]
fn test_perform_replaces_select() {
    let result = function_of(json!([perform("SELECT pg_sleep(1)")]));
    let out = render(&result, None);
    assert!(out.contains("PERFORM pg_sleep(1);"), "{}", out);
    assert!(!Regex::new(r"PERFORM\s+SELECT").unwrap().is_match(&out));
}

#[test]
fn test_into_goes_between_targets_and_from() {
    let result = function_with(
        json!([var("v_count", 1, "integer")]),
        json!([{"PLpgSQL_stmt_execsql": {"lineno": 3,
            "sqlstmt": expr("SELECT count(*) FROM users", 0),
            "into": true,
            "target": into_row(&[("v_count", 0)])}}]),
    );
    assert_eq!(
        render(&result, None),
        "DECLARE\n  v_count integer;\nBEGIN\n  SELECT count(*) INTO v_count FROM users;\nEND"
    );
}

#[test]
fn test_strict_into_with_subquery() {
    let result = function_with(
        json!([var("a", 1, "int"), var("b", 1, "text")]),
        json!([{"PLpgSQL_stmt_execsql": {"lineno": 3,
            "sqlstmt": expr("SELECT (SELECT max(id) FROM orders), name FROM users", 0),
            "into": true, "strict": true,
            "target": into_row(&[("a", 0), ("b", 1)])}}]),
    );
    let out = render(&result, None);
    assert!(
        out.contains("SELECT (SELECT max(id) FROM orders), name INTO STRICT a, b FROM users;"),
        "{}",
        out
    );
}

#[test]
fn test_insert_returning_into() {
    let result = function_with(
        json!([var("v_id", 1, "bigint")]),
        json!([{"PLpgSQL_stmt_execsql": {"lineno": 3,
            "sqlstmt": expr("INSERT INTO orders (total) VALUES (0) RETURNING id", 0),
            "into": true,
            "target": into_row(&[("v_id", 0)])}}]),
    );
    let out = render(&result, None);
    assert!(out.contains("INSERT INTO orders (total) VALUES (0) RETURNING id INTO v_id;"), "{}", out);
}

#[test]
fn test_bare_return_by_kind() {
    let result = function_of(json!([bare_return(3)]));
    assert!(render(&result, Some(ReturnKind::Scalar)).contains("RETURN NULL;"));
    for kind in [ReturnKind::Void, ReturnKind::Setof, ReturnKind::Trigger, ReturnKind::OutParams] {
        let out = render(&result, Some(kind));
        assert!(out.contains("  RETURN;"), "{:?}: {}", kind, out);
        assert!(!out.contains("RETURN NULL"), "{:?}: {}", kind, out);
    }
    assert!(render(&result, None).contains("  RETURN;"));
}

#[test]
fn test_return_record_variable() {
    let result = function_with(
        json!([{"PLpgSQL_rec": {"refname": "r", "lineno": 1}}]),
        json!([{"PLpgSQL_stmt_return": {"lineno": 3, "retvarno": 0}}]),
    );
    assert!(render(&result, Some(ReturnKind::Scalar)).contains("RETURN r;"));
}

#[test]
fn test_if_elsif_else() {
    let result = function_of(json!([{"PLpgSQL_stmt_if": {"lineno": 3,
        "cond": expr("x > 10", 2),
        "then_body": [perform("SELECT big()")],
        "elsif_list": [{"PLpgSQL_if_elsif": {"lineno": 5, "cond": expr("x > 5", 2),
            "stmts": [perform("SELECT medium()")]}}],
        "else_body": [perform("SELECT small()")]}}]));
    assert_eq!(
        render(&result, None),
        "BEGIN\n  IF x > 10 THEN\n    PERFORM big();\n  ELSIF x > 5 THEN\n    PERFORM medium();\n  ELSE\n    PERFORM small();\n  END IF;\nEND"
    );
}

#[test]
fn test_simple_case_recovers_values() {
    let result = function_of(json!([{"PLpgSQL_stmt_case": {"lineno": 3,
        "t_expr": expr("status", 2),
        "t_varno": 0,
        "case_when_list": [{"PLpgSQL_case_when": {"lineno": 4,
            "expr": expr("\"__Case__Variable_0__\" IN ('new', 'open')", 2),
            "stmts": [perform("SELECT touch()")]}}],
        "have_else": true,
        "else_stmts": [bare_return(6)]}}]));
    let out = render(&result, Some(ReturnKind::Void));
    assert!(out.contains("  CASE status\n    WHEN 'new', 'open' THEN\n      PERFORM touch();\n    ELSE\n      RETURN;\n  END CASE;"), "{}", out);
}

#[test]
fn test_labeled_loop_with_exit() {
    let result = function_of(json!([{"PLpgSQL_stmt_loop": {"lineno": 3, "label": "outer",
        "body": [{"PLpgSQL_stmt_exit": {"lineno": 4, "is_exit": true, "label": "outer",
            "cond": expr("done", 2)}}]}}]));
    assert_eq!(
        render(&result, None),
        "BEGIN\n  <<outer>>\n  LOOP\n    EXIT outer WHEN done;\n  END LOOP outer;\nEND"
    );
}

#[test]
fn test_reverse_for_with_step() {
    let result = function_of(json!([{"PLpgSQL_stmt_fori": {"lineno": 3,
        "var": {"PLpgSQL_var": {"refname": "i", "lineno": 3}},
        "lower": expr("10", 2), "upper": expr("1", 2), "step": expr("2", 2),
        "reverse": 1,
        "body": [{"PLpgSQL_stmt_exit": {"lineno": 4, "is_exit": false}}]}}]));
    let out = render(&result, None);
    assert!(out.contains("FOR i IN REVERSE 10..1 BY 2 LOOP\n    CONTINUE;\n  END LOOP;"), "{}", out);
}

#[test]
fn test_raise_forms() {
    let result = function_of(json!([
        {"PLpgSQL_stmt_raise": {"lineno": 3, "elog_level": 19,
            "message": "it's % late", "params": [expr("now()", 2)]}},
        {"PLpgSQL_stmt_raise": {"lineno": 4, "elog_level": 21, "condname": "22012"}},
        {"PLpgSQL_stmt_raise": {"lineno": 5, "elog_level": 21, "message": "bad",
            "options": [{"PLpgSQL_raise_option": {"opt_type": 3, "expr": expr("'check input'", 2)}}]}},
        {"PLpgSQL_stmt_raise": {"lineno": 6}}
    ]));
    let out = render(&result, None);
    assert!(out.contains("RAISE WARNING 'it''s % late', now();"), "{}", out);
    assert!(out.contains("RAISE EXCEPTION SQLSTATE '22012';"), "{}", out);
    assert!(out.contains("RAISE EXCEPTION 'bad' USING HINT = 'check input';"), "{}", out);
    assert!(out.contains("\n  RAISE;\n"), "{}", out);
}

#[test]
fn test_dynamic_execute_and_diagnostics() {
    let result = function_with(
        json!([var("n", 1, "integer")]),
        json!([
            {"PLpgSQL_stmt_dynexecute": {"lineno": 3,
                "query": expr("'DELETE FROM ' || quote_ident(t)", 2),
                "params": [expr("x", 2)]}},
            {"PLpgSQL_stmt_getdiag": {"lineno": 4,
                "diag_items": [{"PLpgSQL_diag_item": {"kind": "ROW_COUNT", "target": 0}}]}}
        ]),
    );
    let out = render(&result, None);
    assert!(out.contains("EXECUTE 'DELETE FROM ' || quote_ident(t) USING x;"), "{}", out);
    assert!(out.contains("GET DIAGNOSTICS n = ROW_COUNT;"), "{}", out);
}

#[test]
fn test_cursor_statements() {
    let result = function_with(
        json!([
            {"PLpgSQL_var": {"refname": "p_min", "lineno": 2,
                "datatype": {"PLpgSQL_type": {"typname": "integer"}}}},
            {"PLpgSQL_row": {"refname": "(unnamed row)", "lineno": 2,
                "fields": [{"name": "p_min", "varno": 0}]}},
            {"PLpgSQL_var": {"refname": "cur", "lineno": 2,
                "datatype": {"PLpgSQL_type": {"typname": "refcursor"}},
                "cursor_explicit_argrow": 1,
                "cursor_options": 2,
                "cursor_explicit_expr": expr("SELECT id FROM t WHERE id > p_min", 0)}},
            {"PLpgSQL_rec": {"refname": "r", "lineno": 1}}
        ]),
        json!([
            {"PLpgSQL_stmt_open": {"lineno": 3, "curvar": 2, "argquery": expr("SELECT 5", 0)}},
            {"PLpgSQL_stmt_fetch": {"lineno": 4, "curvar": 2, "direction": 1,
                "target": {"PLpgSQL_rec": {"refname": "r", "lineno": 1}}}},
            {"PLpgSQL_stmt_fetch": {"lineno": 5, "curvar": 2, "is_move": true,
                "direction": 0, "how_many": i64::MAX}},
            {"PLpgSQL_stmt_close": {"lineno": 6, "curvar": 2}}
        ]),
    );
    let out = render(&result, None);
    assert!(
        out.contains("cur SCROLL CURSOR (p_min integer) FOR SELECT id FROM t WHERE id > p_min;"),
        "{}",
        out
    );
    assert!(!out.contains("  p_min integer;"), "{}", out);
    assert!(out.contains("  r RECORD;"), "{}", out);
    assert!(out.contains("OPEN cur(5);"), "{}", out);
    assert!(out.contains("FETCH PRIOR FROM cur INTO r;"), "{}", out);
    assert!(out.contains("MOVE FORWARD ALL FROM cur;"), "{}", out);
    assert!(out.contains("CLOSE cur;"), "{}", out);
}

#[test]
fn test_unresolved_datum_renders_placeholder() {
    let result = function_of(json!([{"PLpgSQL_stmt_close": {"lineno": 3, "curvar": 42}}]));
    assert!(render(&result, None).contains("CLOSE __datum_42;"));
}

#[test]
fn test_transaction_statements() {
    let result = function_of(json!([
        {"PLpgSQL_stmt_commit": {"lineno": 3}},
        {"PLpgSQL_stmt_rollback": {"lineno": 4, "chain": true}}
    ]));
    assert_eq!(render(&result, Some(ReturnKind::Void)), "BEGIN\n  COMMIT;\n  ROLLBACK AND CHAIN;\nEND");
}

// ============================================================================
// Declarations and blocks
// ============================================================================

#[test]
fn test_loop_variable_not_declared() {
    let result = function_with(
        json!([var("total", 1, "integer"), var("i", 3, "integer")]),
        json!([{"PLpgSQL_stmt_fori": {"lineno": 3,
            "var": {"PLpgSQL_var": {"refname": "i", "lineno": 3}},
            "lower": expr("1", 2), "upper": expr("10", 2),
            "body": [assign(4, 0, "total := total + i")]}}]),
    );
    let out = render(&result, None);
    assert!(out.starts_with("DECLARE\n  total integer;\nBEGIN"), "{}", out);
    assert!(!Regex::new(r"(?m)^\s*i integer;").unwrap().is_match(&out), "{}", out);
}

#[test]
fn test_query_loop_variables_by_kind() {
    let result = function_with(
        json!([
            var("total", 1, "integer"),
            {"PLpgSQL_rec": {"refname": "r", "lineno": 3}},
            {"PLpgSQL_rec": {"refname": "d", "lineno": 1}},
            var("x", 7, "integer")
        ]),
        json!([
            {"PLpgSQL_stmt_fors": {"lineno": 3,
                "var": {"PLpgSQL_rec": {"refname": "r", "lineno": 3}},
                "query": expr("SELECT 1", 0), "body": []}},
            {"PLpgSQL_stmt_dynfors": {"lineno": 6,
                "var": {"PLpgSQL_rec": {"refname": "d", "lineno": 1}},
                "query": expr("'SELECT 2'", 2), "body": []}},
            {"PLpgSQL_stmt_foreach_a": {"lineno": 7, "varno": 3,
                "expr": expr("ARRAY[1, 2]", 2),
                "body": [assign(8, 0, "total := total + x")]}}
        ]),
    );
    let out = render(&result, None);
    let (declare, body) = out.split_once("BEGIN").expect("no BEGIN");

    // Implicit FOR-over-query variable stays out of DECLARE
    assert!(!Regex::new(r"(?m)^\s*r\b").unwrap().is_match(declare), "{}", out);
    // Separately declared dynamic-loop variable and FOREACH target stay in
    assert!(Regex::new(r"(?m)^  d\b").unwrap().is_match(declare), "{}", out);
    assert!(declare.contains("  x integer;\n"), "{}", out);
    assert!(body.contains("FOR r IN SELECT 1 LOOP"), "{}", out);
    assert!(body.contains("FOREACH x IN ARRAY"), "{}", out);
}

#[test]
fn test_nested_block_declares_its_own_variables() {
    let result = function_with(
        json!([var("a", 1, "int"), var("b", 4, "text")]),
        json!([{"PLpgSQL_stmt_block": {"lineno": 5, "label": "inner",
            "body": [assign(6, 1, "b := 'x'")]}}]),
    );
    assert_eq!(
        render(&result, None),
        "DECLARE\n  a int;\nBEGIN\n  <<inner>>\n  DECLARE\n    b text;\n  BEGIN\n    b := 'x';\n  END inner;\nEND"
    );
}

#[test]
fn test_exception_handlers() {
    let result = function_of(json!([{"PLpgSQL_stmt_block": {"lineno": 3,
        "body": [perform("SELECT risky()")],
        "exceptions": {"PLpgSQL_exception_block": {"exc_list": [
            {"PLpgSQL_exception": {"lineno": 5,
                "conditions": [
                    {"PLpgSQL_condition": {"condname": "unique_violation"}},
                    {"PLpgSQL_condition": {"condname": "23503"}}
                ],
                "action": [perform("SELECT recover()")]}},
            {"PLpgSQL_exception": {"lineno": 7,
                "conditions": [{"PLpgSQL_condition": {"condname": "others"}}],
                "action": [{"PLpgSQL_stmt_raise": {"lineno": 8}}]}}
        ]}}}}]));
    let out = render(&result, None);
    assert!(out.contains(
        "  EXCEPTION\n    WHEN unique_violation OR SQLSTATE '23503' THEN\n      PERFORM recover();\n    WHEN OTHERS THEN\n      RAISE;\n  END;"
    ), "{}", out);
}

#[test]
fn test_declaration_options() {
    let result = function_with(
        json!([
            {"PLpgSQL_var": {"refname": "k", "lineno": 1, "isconst": true, "notnull": true,
                "datatype": {"PLpgSQL_type": {"typname": "pg_catalog.int4"}},
                "default_val": expr("42", 2)}},
            {"PLpgSQL_var": {"refname": "o", "lineno": 1,
                "datatype": {"PLpgSQL_type": {"typname": "Sales.\"Order\"%ROWTYPE"}}}}
        ]),
        json!([]),
    );
    let out = render(&result, None);
    assert!(out.contains("  k CONSTANT int4 NOT NULL := 42;"), "{}", out);
    assert!(out.contains("  o Sales.\"Order\"%ROWTYPE;"), "{}", out);
}

#[test]
fn test_internal_datums_never_declared() {
    let result = function_with(
        json!([
            {"PLpgSQL_var": {"refname": "found", "lineno": 0,
                "datatype": {"PLpgSQL_type": {"typname": "boolean"}}}},
            var("sqlstate", 1, "text"),
            var("__Case__Variable_3__", 1, "text")
        ]),
        json!([]),
    );
    assert_eq!(render(&result, None), "BEGIN\nEND");
}

#[test]
fn test_lowercase_keywords_and_custom_indent() {
    let result = function_of(json!([perform("SELECT f()")]));
    let options = DeparseOptions {
        indent: "\t".to_string(),
        newline: "\r\n".to_string(),
        uppercase_keywords: false,
    };
    let out = deparse(&result, &options, None).remove(0);
    assert_eq!(out, "begin\r\n\tperform f();\r\nend");
}
