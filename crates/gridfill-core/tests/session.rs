//! End-to-end behaviour of a session over an in-memory store.

use gridfill_core::session::DEFAULT_STORAGE_KEY;
use gridfill_core::{
    AutofillDecision, AutofillRequest, CellInput, CellValue, DisplayBuffer, EngineError,
    GridChange, GridSurface, KeyValueStore, MemoryStore, RejectReason, Session, SessionConfig,
    SubmitOutcome, Workbook,
};

type TestSession = Session<DisplayBuffer, MemoryStore>;

fn open(store: MemoryStore) -> TestSession {
    Session::open(
        SessionConfig::default(),
        DisplayBuffer::new(),
        store,
        Workbook::new(),
    )
    .unwrap()
}

fn reopen(session: TestSession) -> TestSession {
    let (_, store, _) = session.into_parts();
    open(store)
}

fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

#[test]
fn fresh_session_is_blank_at_minimum_bounds() {
    let s = open(MemoryStore::new());
    assert_eq!(s.grid().row_count(), 100);
    assert_eq!(s.grid().col_count(), 50);
    assert_eq!(s.surface().row_count(), 100);
    assert_eq!(s.surface().col_count(), 50);
    assert!(s.selection().is_none());
    assert!(!s.formula_bar().is_editing());
}

#[test]
fn autofill_continues_linear_sequence() {
    let mut s = open(MemoryStore::new());
    for (i, n) in [2.0, 4.0, 6.0, 8.0, 10.0, 12.0].into_iter().enumerate() {
        s.set_cell(5 + i, 2, CellInput::Literal(num(n))).unwrap();
    }

    let decision = s.before_autofill(AutofillRequest::new(2, 5, 10, 13));
    assert!(matches!(decision, AutofillDecision::Accept(ref v) if v.len() == 3));

    for (row, expected) in [(11, 14.0), (12, 16.0), (13, 18.0)] {
        assert_eq!(s.cell(row, 2).unwrap().value, num(expected));
        assert_eq!(s.surface().display(row, 2), Some(num(expected)));
    }
    assert!(s.cell(14, 2).unwrap().is_blank());
}

#[test]
fn autofill_reject_leaves_target_untouched() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::Literal(num(3.0))).unwrap();
    s.set_cell(1, 0, CellInput::parse("x")).unwrap();
    s.set_cell(2, 0, CellInput::parse("keep")).unwrap();

    let decision = s.before_autofill(AutofillRequest::new(0, 0, 1, 3));
    assert_eq!(
        decision,
        AutofillDecision::Reject(RejectReason::NonNumeric { row: 1 })
    );
    assert_eq!(s.cell(2, 0).unwrap().value, CellValue::from("keep"));
    assert!(s.cell(3, 0).unwrap().is_blank());
}

#[test]
fn autofill_result_is_persisted() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 1, CellInput::parse("1")).unwrap();
    s.set_cell(1, 1, CellInput::parse("2")).unwrap();
    s.before_autofill(AutofillRequest::new(1, 0, 1, 4));

    let s = reopen(s);
    assert_eq!(s.cell(4, 1).unwrap().value, num(5.0));
}

#[test]
fn submit_without_selection_is_ignored() {
    let mut s = open(MemoryStore::new());
    assert_eq!(s.submit("=1+1"), SubmitOutcome::Ignored);
    assert!(s.grid().iter().all(|(_, _, c)| c.is_blank()));
    assert!(s.store().is_empty());
}

#[test]
fn submit_literal_stores_text() {
    let mut s = open(MemoryStore::new());
    s.select(3, 4);
    s.set_input("hello");
    assert_eq!(s.submit("hello"), SubmitOutcome::Literal);

    let cell = s.cell(3, 4).unwrap();
    assert_eq!(cell.value, CellValue::from("hello"));
    assert_eq!(cell.formula, None);
    assert_eq!(s.surface().text(3, 4), "hello");
    assert_eq!(s.formula_bar().input(), "");
    assert_eq!(s.selection(), Some((3, 4)));
}

#[test]
fn submit_formula_records_value_and_source() {
    let mut s = open(MemoryStore::new());
    s.select(0, 0);
    assert_eq!(s.submit("=1+1"), SubmitOutcome::Formula(num(2.0)));

    let cell = s.cell(0, 0).unwrap();
    assert_eq!(cell.value, num(2.0));
    assert_eq!(cell.formula.as_deref(), Some("=1+1"));
    assert_eq!(s.surface().text(0, 0), "2");

    // Reselecting shows the formula, not the value.
    assert_eq!(s.select(0, 0), "=1+1");
}

#[test]
fn malformed_formula_changes_nothing() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("old")).unwrap();
    s.select(0, 0);

    let outcome = s.submit("=1+");
    assert!(matches!(outcome, SubmitOutcome::Rejected(EngineError::Parse(_))));
    assert_eq!(s.cell(0, 0).unwrap().value, CellValue::from("old"));
    assert_eq!(s.cell(0, 0).unwrap().formula, None);
    assert_eq!(s.surface().text(0, 0), "old");
    assert_eq!(s.formula_bar().input(), "");
}

#[test]
fn circular_formula_is_rejected() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("=B1")).unwrap();
    let err = s.set_cell(0, 1, CellInput::parse("=A1 + 1")).unwrap_err();
    assert!(matches!(err, EngineError::CircularReference(_)));
    assert!(s.cell(0, 1).unwrap().is_blank());
}

#[test]
fn literal_edit_refreshes_dependent_formula() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("3")).unwrap();
    s.set_cell(1, 0, CellInput::parse("4")).unwrap();
    s.set_cell(2, 0, CellInput::parse("=SUM(A1:A2)")).unwrap();
    assert_eq!(s.cell(2, 0).unwrap().value, num(7.0));

    s.select(1, 0);
    s.submit("10");
    assert_eq!(s.cell(2, 0).unwrap().value, num(13.0));
    assert_eq!(s.surface().text(2, 0), "13");
}

#[test]
fn reload_restores_formulas() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("5")).unwrap();
    s.set_cell(0, 1, CellInput::parse("=A1 * 2")).unwrap();

    let mut s = reopen(s);
    assert_eq!(s.cell(0, 1).unwrap().value, num(10.0));
    assert_eq!(s.cell(0, 1).unwrap().formula.as_deref(), Some("=A1 * 2"));
    assert_eq!(s.surface().text(0, 1), "10");

    // The dependency is live again after reload.
    s.set_cell(0, 0, CellInput::parse("6")).unwrap();
    assert_eq!(s.cell(0, 1).unwrap().value, num(12.0));
}

#[test]
fn legacy_array_snapshot_is_migrated() {
    let mut store = MemoryStore::new();
    store
        .set(DEFAULT_STORAGE_KEY, r#"[[1, "a"], [null, 2.5]]"#)
        .unwrap();

    let mut s = open(store);
    assert_eq!(s.cell(0, 0).unwrap().value, num(1.0));
    assert_eq!(s.cell(0, 1).unwrap().value, CellValue::from("a"));
    assert!(s.cell(1, 0).unwrap().is_blank());
    assert_eq!(s.grid().row_count(), 100);
    assert_eq!(s.grid().col_count(), 50);

    assert!(s.persist());
    let stored = s.store().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    assert!(stored.starts_with(r#"{"version":1,"#));
}

#[test]
fn unreadable_snapshot_falls_back_to_blank() {
    let mut store = MemoryStore::new();
    store.set(DEFAULT_STORAGE_KEY, "not json").unwrap();

    let s = open(store);
    assert_eq!(s.grid().row_count(), 100);
    assert!(s.grid().iter().all(|(_, _, c)| c.is_blank()));
}

#[test]
fn quota_exceeded_keeps_session_usable() {
    let mut s = open(MemoryStore::new().with_quota(Some(16)));
    s.select(0, 0);
    assert_eq!(s.submit("=2*21"), SubmitOutcome::Formula(num(42.0)));
    assert!(!s.persist());
    assert!(s.store().is_empty());

    s.select(1, 0);
    assert_eq!(s.submit("=A1+1"), SubmitOutcome::Formula(num(43.0)));
}

#[test]
fn grid_change_reconciles_into_model() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("1")).unwrap();
    s.set_cell(0, 1, CellInput::parse("=A1 + 1")).unwrap();

    s.surface_mut().set_display(0, 0, CellValue::from("9"));
    s.on_grid_change(&[GridChange {
        row: 0,
        col: 0,
        value: CellValue::from("9"),
    }]);

    assert_eq!(s.cell(0, 0).unwrap().value, CellValue::from("9"));
    assert_eq!(s.cell(0, 1).unwrap().value, num(10.0));

    let s = reopen(s);
    assert_eq!(s.cell(0, 0).unwrap().value, CellValue::from("9"));
}

#[test]
fn grid_change_with_bad_formula_restores_display() {
    let mut s = open(MemoryStore::new());
    s.set_cell(2, 2, CellInput::parse("keep")).unwrap();

    s.surface_mut().set_display(2, 2, CellValue::from("=("));
    s.on_grid_change(&[GridChange {
        row: 2,
        col: 2,
        value: CellValue::from("=("),
    }]);

    assert_eq!(s.cell(2, 2).unwrap().value, CellValue::from("keep"));
    assert_eq!(s.surface().text(2, 2), "keep");
}

#[test]
fn clear_cell_blanks_model_and_display() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("=1+2")).unwrap();
    s.clear_cell(0, 0);
    assert!(s.cell(0, 0).unwrap().is_blank());
    assert_eq!(s.surface().text(0, 0), "");
}

#[test]
fn writes_outside_bounds_grow_grid() {
    let mut s = open(MemoryStore::new());
    s.select(150, 60);
    s.submit("far");
    assert_eq!(s.grid().row_count(), 151);
    assert_eq!(s.grid().col_count(), 61);
    assert!(s.grid().rows().iter().all(|r| r.len() == 61));
    assert_eq!(s.surface().text(150, 60), "far");
}

#[test]
fn typing_computed_value_over_formula_replaces_it() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("abc")).unwrap();
    s.set_cell(0, 1, CellInput::parse("=A1")).unwrap();
    assert_eq!(s.surface().text(0, 1), "abc");

    s.on_grid_change(&[GridChange {
        row: 0,
        col: 1,
        value: CellValue::from("abc"),
    }]);
    assert_eq!(s.cell(0, 1).unwrap().formula, None);

    s.set_cell(0, 0, CellInput::parse("zzz")).unwrap();
    assert_eq!(s.cell(0, 1).unwrap().value, CellValue::from("abc"));
    assert_eq!(s.surface().text(0, 1), "abc");
}

#[test]
fn clearing_formula_with_blank_result_drops_formula() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("=\"\"")).unwrap();
    assert!(s.cell(0, 0).unwrap().value.is_blank());
    assert!(s.cell(0, 0).unwrap().formula.is_some());

    s.on_grid_change(&[GridChange {
        row: 0,
        col: 0,
        value: CellValue::blank(),
    }]);
    assert!(s.cell(0, 0).unwrap().is_blank());
}

#[test]
fn runaway_formula_does_not_hang_submit() {
    let mut s = open(MemoryStore::new());
    s.select(0, 0);
    assert_eq!(
        s.submit("=loop {}"),
        SubmitOutcome::Formula(CellValue::from("#ERROR!"))
    );
    assert_eq!(s.surface().text(0, 0), "#ERROR!");

    s.select(1, 0);
    assert_eq!(s.submit("=2+2"), SubmitOutcome::Formula(num(4.0)));
}

#[test]
fn overflowed_autofill_survives_reload() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::Literal(num(1e308))).unwrap();
    s.set_cell(1, 0, CellInput::Literal(num(1.5e308))).unwrap();
    s.before_autofill(AutofillRequest::new(0, 0, 1, 3));
    assert_eq!(s.cell(2, 0).unwrap().value, num(f64::INFINITY));
    assert_eq!(s.surface().text(2, 0), "#INF!");

    let s = reopen(s);
    assert_eq!(s.cell(2, 0).unwrap().value, num(f64::INFINITY));
    assert_eq!(s.cell(3, 0).unwrap().value, num(f64::INFINITY));
    assert_eq!(s.surface().text(3, 0), "#INF!");
}

#[test]
fn load_over_live_session_reinstalls_engine_cells() {
    let mut s = open(MemoryStore::new());
    s.set_cell(0, 0, CellInput::parse("5")).unwrap();
    s.set_cell(0, 1, CellInput::parse("=A1 * 2")).unwrap();
    s.set_cell(1, 0, CellInput::parse("x")).unwrap();

    s.load();
    assert_eq!(s.cell(0, 1).unwrap().value, num(10.0));
    assert_eq!(s.cell(1, 0).unwrap().value, CellValue::from("x"));
    assert_eq!(s.evaluate("A1 + B1").unwrap(), num(15.0));

    s.set_cell(0, 0, CellInput::parse("7")).unwrap();
    assert_eq!(s.cell(0, 1).unwrap().value, num(14.0));
    assert_eq!(s.surface().text(0, 1), "14");
}
