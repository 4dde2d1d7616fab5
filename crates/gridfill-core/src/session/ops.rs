use gridfill_engine::{Address, EngineError};

use super::Session;
use crate::autofill::{self, AutofillDecision, AutofillRequest};
use crate::model::{Cell, CellValue};
use crate::storage::KeyValueStore;
use crate::surface::GridSurface;

/// Prefix that marks input as a formula.
pub const FORMULA_PREFIX: char = '=';

/// New contents for one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellInput {
    /// Full formula text, including the leading `=`.
    Formula(String),
    Literal(CellValue),
}

impl CellInput {
    /// Classify typed text by its first character.
    pub fn parse(text: &str) -> CellInput {
        if text.starts_with(FORMULA_PREFIX) {
            CellInput::Formula(text.to_string())
        } else {
            CellInput::Literal(CellValue::Text(text.to_string()))
        }
    }
}

/// A value the surface shows after a direct edit in the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridChange {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing is selected.
    Ignored,
    /// Stored as a literal.
    Literal,
    /// Formula registered; carries the computed value.
    Formula(CellValue),
    /// The formula engine refused the formula; nothing changed.
    Rejected(EngineError),
}

impl<S: GridSurface, K: KeyValueStore> Session<S, K> {
    /// Make `(row, col)` the active cell and load it into the formula bar.
    pub fn select(&mut self, row: usize, col: usize) -> &str {
        self.bar.active = Some((row, col));
        self.bar.input = self
            .grid
            .get(row, col)
            .map(Cell::input_text)
            .unwrap_or_default();
        &self.bar.input
    }

    /// Submit formula-bar text to the active cell. The input is cleared
    /// afterwards whatever the outcome; the selection is kept.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let Some((row, col)) = self.bar.active else {
            log::debug!("submit without a selection ignored");
            return SubmitOutcome::Ignored;
        };

        let input = CellInput::parse(text);
        let is_formula = matches!(input, CellInput::Formula(_));
        let outcome = match self.set_cell(row, col, input) {
            Ok(value) if is_formula => SubmitOutcome::Formula(value),
            Ok(_) => SubmitOutcome::Literal,
            Err(e) => SubmitOutcome::Rejected(e),
        };
        self.bar.input.clear();
        outcome
    }

    /// The single mutation path: update the model, refresh dependent
    /// formulas, update the display, persist.
    ///
    /// Returns the value now shown in the cell. A formula the engine
    /// refuses leaves model and display untouched.
    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        input: CellInput,
    ) -> Result<CellValue, EngineError> {
        let value = self.apply_cell(row, col, input)?;
        self.persist();
        Ok(value)
    }

    /// Blank a cell.
    pub fn clear_cell(&mut self, row: usize, col: usize) {
        // Literals only fail for an unknown sheet, which `new` rules out.
        let _ = self.set_cell(row, col, CellInput::Literal(CellValue::blank()));
    }

    /// Reconcile direct edits reported by the surface, then persist.
    ///
    /// Changes that already match a literal in the model (echoes of the
    /// session's own display writes) are skipped; typing over a formula cell
    /// always replaces the formula. Text starting with `=` is treated as a
    /// formula; if the engine refuses it the display reverts to the model.
    pub fn on_grid_change(&mut self, changes: &[GridChange]) {
        for change in changes {
            let current = self.grid.get(change.row, change.col);
            let is_echo =
                current.is_some_and(|c| c.formula.is_none() && c.value == change.value);
            if is_echo {
                continue;
            }
            let current = current.map(|c| c.value.clone());

            let input = match &change.value {
                CellValue::Text(text) => CellInput::parse(text),
                number => CellInput::Literal(number.clone()),
            };
            if let Err(e) = self.apply_cell(change.row, change.col, input) {
                log::warn!(
                    "rejected edit at ({}, {}): {}",
                    change.row,
                    change.col,
                    e
                );
                self.surface
                    .set_display(change.row, change.col, current.unwrap_or_default());
            }
        }
        self.persist();
    }

    /// Autofill hook: decide the fill from the displayed source values and,
    /// when accepted, apply it through the mutation path.
    pub fn before_autofill(&mut self, request: AutofillRequest) -> AutofillDecision {
        let decision = autofill::extrapolate(&self.surface, &request);
        match &decision {
            AutofillDecision::Accept(fill) => {
                for v in fill {
                    let input = CellInput::Literal(CellValue::Number(v.value));
                    if let Err(e) = self.apply_cell(v.row, v.col, input) {
                        log::warn!("autofill write at ({}, {}) failed: {}", v.row, v.col, e);
                    }
                }
                if !fill.is_empty() {
                    self.persist();
                }
                log::info!(
                    "autofill column {} rows {}..={}: wrote {} cells",
                    request.col,
                    request.start_row,
                    request.end_row,
                    fill.len()
                );
            }
            AutofillDecision::Reject(reason) => {
                log::debug!("autofill column {} rejected: {}", request.col, reason);
            }
        }
        decision
    }

    /// Evaluate a formula (with or without the leading `=`) against the
    /// current grid without storing it.
    pub fn evaluate(&self, formula: &str) -> Result<CellValue, EngineError> {
        let expr = formula.strip_prefix(FORMULA_PREFIX).unwrap_or(formula);
        self.workbook.evaluate(self.sheet, expr).map(CellValue::from)
    }

    fn apply_cell(
        &mut self,
        row: usize,
        col: usize,
        input: CellInput,
    ) -> Result<CellValue, EngineError> {
        let addr = self.addr(row, col);
        let (cell, recalculated) = match input {
            CellInput::Formula(text) => {
                let expr = text.strip_prefix(FORMULA_PREFIX).unwrap_or(&text);
                let recalculated = self.workbook.set_formula(addr, expr).inspect_err(|e| {
                    log::warn!("formula {:?} at ({}, {}) rejected: {}", text, row, col, e);
                })?;
                let value = CellValue::from(self.workbook.value(addr));
                (Cell::computed(value, &text), recalculated)
            }
            CellInput::Literal(value) => {
                let recalculated = self.workbook.set_value(addr, value.to_engine_value())?;
                (Cell::literal(value), recalculated)
            }
        };

        let shown = cell.value.clone();
        self.grid.set(row, col, cell);
        self.surface.set_display(row, col, shown.clone());
        self.refresh_dependents(&recalculated, addr);
        Ok(shown)
    }

    /// Copy recalculated formula values into the model, then the display.
    fn refresh_dependents(&mut self, recalculated: &[Address], origin: Address) {
        for addr in recalculated {
            if *addr == origin || addr.sheet != self.sheet {
                continue;
            }
            let value = CellValue::from(self.workbook.value(*addr));
            let Some(cell) = self.grid.get_mut(addr.row, addr.col) else {
                continue;
            };
            if cell.formula.is_none() || cell.value == value {
                continue;
            }
            cell.value = value.clone();
            self.surface.set_display(addr.row, addr.col, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::storage::MemoryStore;
    use crate::surface::DisplayBuffer;
    use gridfill_engine::Workbook;

    fn session() -> Session<DisplayBuffer, MemoryStore> {
        Session::open(
            SessionConfig::default(),
            DisplayBuffer::new(),
            MemoryStore::new(),
            Workbook::new(),
        )
        .unwrap()
    }

    #[test]
    fn cell_input_parse() {
        assert_eq!(CellInput::parse("=A1"), CellInput::Formula("=A1".to_string()));
        assert_eq!(CellInput::parse(" =A1"), CellInput::Literal(CellValue::from(" =A1")));
        assert_eq!(CellInput::parse(""), CellInput::Literal(CellValue::blank()));
    }

    #[test]
    fn select_loads_formula_or_value() {
        let mut s = session();
        s.set_cell(0, 0, CellInput::Formula("=2*3".to_string())).unwrap();
        s.set_cell(0, 1, CellInput::Literal(CellValue::Number(14.0))).unwrap();
        assert_eq!(s.select(0, 0), "=2*3");
        assert_eq!(s.select(0, 1), "14");
        assert_eq!(s.select(500, 500), "");
        assert_eq!(s.selection(), Some((500, 500)));
    }

    #[test]
    fn set_input_requires_selection() {
        let mut s = session();
        s.set_input("typed");
        assert_eq!(s.formula_bar().input(), "");
        s.select(1, 1);
        s.set_input("typed");
        assert_eq!(s.formula_bar().input(), "typed");
    }

    #[test]
    fn dependents_refresh_in_model_and_display() {
        let mut s = session();
        s.set_cell(0, 0, CellInput::parse("5")).unwrap();
        s.set_cell(0, 1, CellInput::parse("=A1 * 2")).unwrap();
        assert_eq!(s.surface().text(0, 1), "10");

        s.set_cell(0, 0, CellInput::parse("7")).unwrap();
        assert_eq!(s.cell(0, 1).unwrap().value, CellValue::Number(14.0));
        assert_eq!(s.surface().text(0, 1), "14");
    }

    #[test]
    fn evaluate_does_not_touch_grid() {
        let mut s = session();
        s.set_cell(2, 0, CellInput::parse("4")).unwrap();
        assert_eq!(s.evaluate("=A3 + 1").unwrap(), CellValue::Number(5.0));
        assert_eq!(s.evaluate("A3 * 2").unwrap(), CellValue::Number(8.0));
        assert!(s.evaluate("=(").is_err());
    }
}
