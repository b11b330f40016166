//! End-to-end rendering of fixture trees

use plpgsql_deparser::{
    deparse, deparse_create_function, deparse_json, DeparseOptions, ReturnInfo, ReturnKind,
};
use pretty_assertions::assert_eq;

use crate::common::{fixture_json, load_fixture};

const ORDER_TOTAL_BODY: &str = "\
DECLARE
  v_total numeric;
  v_discount numeric;
BEGIN
  v_discount := 0;
  SELECT sum(amount) INTO v_total FROM order_lines WHERE order_id = p_id;
  PERFORM pg_notify('orders', p_id::text);
  IF v_total IS NULL THEN
    RETURN NULL;
  END IF;
  FOR i IN 1..3 LOOP
    v_discount := v_discount + i;
  END LOOP;
  RETURN v_total - v_discount;
END";

const AUDIT_CLEANUP_BODY: &str = "\
<<cleanup>>
DECLARE
  v_cutoff timestamp with time zone;
  r RECORD;
BEGIN
  v_cutoff := now() - interval '30 days';
  FOR r IN SELECT id FROM audit.events WHERE created_at < v_cutoff LOOP
    DECLARE
      v_count integer := 0;
    BEGIN
      DELETE FROM audit.events WHERE id = r.id;
      GET DIAGNOSTICS v_count = ROW_COUNT;
    END;
  END LOOP;
  PERFORM pg_sleep(1);
  DECLARE
    v_msg text;
  BEGIN
    RAISE NOTICE 'cleaned % rows', v_count;
  EXCEPTION
    WHEN OTHERS THEN
      v_msg := SQLERRM;
      RAISE;
  END;
  RETURN;
END cleanup";

// ============================================================================
// Full bodies
// ============================================================================

#[test]
fn test_order_total_scalar() {
    let result = load_fixture("order_total.json");
    let bodies = deparse(
        &result,
        &DeparseOptions::default(),
        Some(&ReturnInfo::new(ReturnKind::Scalar)),
    );
    assert_eq!(bodies, vec![ORDER_TOTAL_BODY.to_string()]);
}

#[test]
fn test_order_total_void_keeps_bare_return() {
    let result = load_fixture("order_total.json");
    let body = deparse(
        &result,
        &DeparseOptions::default(),
        Some(&ReturnInfo::new(ReturnKind::Void)),
    )
    .remove(0);
    assert!(body.contains("    RETURN;\n"), "{}", body);
    assert!(!body.contains("RETURN NULL"), "{}", body);
}

#[test]
fn test_audit_cleanup_scopes() {
    let bodies = deparse_json(
        &fixture_json("audit_cleanup.json"),
        &DeparseOptions::default(),
        Some(&ReturnInfo::new(ReturnKind::Void)),
    )
    .unwrap();
    assert_eq!(bodies, vec![AUDIT_CLEANUP_BODY.to_string()]);
}

#[test]
fn test_rendering_is_deterministic() {
    let result = load_fixture("audit_cleanup.json");
    let options = DeparseOptions::default();
    assert_eq!(deparse(&result, &options, None), deparse(&result, &options, None));
}

// ============================================================================
// Pipeline entry points
// ============================================================================

#[test]
fn test_deparse_json_reports_context() {
    let err = deparse_json("{", &DeparseOptions::default(), None).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to decode PL/pgSQL parse tree"), "{}", message);
}

#[test]
fn test_deparse_create_function() {
    let create = "CREATE OR REPLACE FUNCTION order_total(p_id integer) RETURNS numeric AS $$\nBEGIN\n  -- stale\nEND\n$$ LANGUAGE plpgsql;";
    let sql = deparse_create_function(
        create,
        &fixture_json("order_total.json"),
        &DeparseOptions::default(),
    )
    .unwrap();

    assert_eq!(
        sql,
        format!(
            "CREATE OR REPLACE FUNCTION order_total(p_id integer) RETURNS numeric AS $$\n{}\n$$ LANGUAGE plpgsql;",
            ORDER_TOTAL_BODY
        )
    );
}

#[test]
fn test_deparse_create_function_rejects_other_statements() {
    let err = deparse_create_function(
        "CREATE TABLE t (a int)",
        &fixture_json("order_total.json"),
        &DeparseOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("CREATE FUNCTION"), "{}", err);
}
