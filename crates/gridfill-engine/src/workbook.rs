//! Workbook: named sheets, formula registration and recalculation.
//!
//! Formulas are compiled once on registration. Each cell's current value
//! lives in a shared [`ValueMap`] that the Rhai built-ins read, and a reverse
//! dependency map drives recalculation in topological order whenever a cell
//! changes.

use rhai::{AST, Dynamic, Engine};
use std::collections::{HashMap, HashSet};

use crate::engine::{
    Address, ERROR_CODE, SheetId, Value, ValueMap, create_engine, detect_cycle,
    extract_dependencies, preprocess_formula,
};
use crate::error::{EngineError, Result};

struct FormulaCell {
    source: String,
    ast: AST,
    depends_on: Vec<Address>,
}

pub struct Workbook {
    sheets: Vec<String>,
    engine: Engine,
    values: ValueMap,
    formulas: HashMap<Address, FormulaCell>,
    /// Reverse dependency map: cell -> formula cells that read it
    dependents: HashMap<Address, HashSet<Address>>,
}

impl Workbook {
    /// Create an empty workbook with no sheets.
    pub fn new() -> Self {
        let values = ValueMap::default();
        Workbook {
            sheets: Vec::new(),
            engine: create_engine(values.clone()),
            values,
            formulas: HashMap::new(),
            dependents: HashMap::new(),
        }
    }

    /// Add a named sheet. Names are unique ignoring ASCII case.
    pub fn add_sheet(&mut self, name: &str) -> Result<SheetId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidSheetName(name.to_string()));
        }
        if self.sheet_id(name).is_some() {
            return Err(EngineError::DuplicateSheet(name.to_string()));
        }
        let id = u32::try_from(self.sheets.len())
            .map_err(|_| EngineError::InvalidSheetName(name.to_string()))?;
        self.sheets.push(name.to_string());
        log::debug!("added sheet {} as {}", name, id);
        Ok(SheetId(id))
    }

    pub fn sheet_id(&self, name: &str) -> Option<SheetId> {
        self.sheets
            .iter()
            .position(|s| s.eq_ignore_ascii_case(name.trim()))
            .map(|i| SheetId(i as u32))
    }

    pub fn sheet_name(&self, id: SheetId) -> Option<&str> {
        self.sheets.get(id.0 as usize).map(String::as_str)
    }

    fn check_sheet(&self, id: SheetId) -> Result<()> {
        match self.sheet_name(id) {
            Some(_) => Ok(()),
            None => Err(EngineError::UnknownSheet(id)),
        }
    }

    /// Register (or overwrite) a formula. `formula` excludes the leading `=`.
    ///
    /// On error nothing changes. On success returns every formula cell that
    /// was recalculated, `addr` first.
    pub fn set_formula(&mut self, addr: Address, formula: &str) -> Result<Vec<Address>> {
        self.check_sheet(addr.sheet)?;
        if formula.trim().is_empty() {
            return Err(EngineError::EmptyFormula);
        }

        let ast = self.compile(formula, addr.sheet)?;

        let mut depends_on: Vec<Address> = extract_dependencies(formula)
            .into_iter()
            .map(|c| c.on(addr.sheet))
            .collect();
        depends_on.sort();
        depends_on.dedup();

        let cycle = detect_cycle(&addr, |a| {
            if *a == addr {
                depends_on.clone()
            } else {
                self.formulas
                    .get(a)
                    .map(|f| f.depends_on.clone())
                    .unwrap_or_default()
            }
        });
        if let Some(path) = cycle {
            return Err(EngineError::CircularReference(
                path.iter().map(Address::cell_ref).collect(),
            ));
        }

        self.unlink(&addr);
        for dep in &depends_on {
            self.dependents.entry(*dep).or_default().insert(addr);
        }
        self.formulas.insert(
            addr,
            FormulaCell {
                source: formula.to_string(),
                ast,
                depends_on,
            },
        );

        Ok(self.recalculate_from(addr))
    }

    /// Store a literal value, replacing any formula at `addr`.
    /// Returns the formula cells that were recalculated as a result.
    pub fn set_value(&mut self, addr: Address, value: Value) -> Result<Vec<Address>> {
        self.check_sheet(addr.sheet)?;
        self.unlink(&addr);
        self.formulas.remove(&addr);
        self.store(addr, value);
        Ok(self.recalculate_from(addr))
    }

    pub fn clear(&mut self, addr: Address) -> Result<Vec<Address>> {
        self.set_value(addr, Value::Empty)
    }

    /// Current value of a cell (blank cells are [`Value::Empty`]).
    pub fn value(&self, addr: Address) -> Value {
        self.values
            .get(&addr)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }

    /// Formula registered at `addr`, without the leading `=`.
    pub fn formula(&self, addr: Address) -> Option<&str> {
        self.formulas.get(&addr).map(|f| f.source.as_str())
    }

    /// Evaluate a formula against `sheet` without storing it.
    pub fn evaluate(&self, sheet: SheetId, formula: &str) -> Result<Value> {
        self.check_sheet(sheet)?;
        if formula.trim().is_empty() {
            return Err(EngineError::EmptyFormula);
        }
        let ast = self.compile(formula, sheet)?;
        Ok(self.run(&ast))
    }

    fn compile(&self, formula: &str, sheet: SheetId) -> Result<AST> {
        let processed = preprocess_formula(formula, sheet);
        self.engine
            .compile(&processed)
            .map_err(|e| EngineError::Parse(e.to_string()))
    }

    fn run(&self, ast: &AST) -> Value {
        match self.engine.eval_ast::<Dynamic>(ast) {
            Ok(v) => Value::from_dynamic(&v),
            Err(e) => {
                log::debug!("formula evaluation failed: {}", e);
                Value::Error(ERROR_CODE.to_string())
            }
        }
    }

    fn store(&self, addr: Address, value: Value) {
        if value == Value::Empty {
            self.values.remove(&addr);
        } else {
            self.values.insert(addr, value);
        }
    }

    /// Remove `addr` from the dependents sets of the cells it used to read.
    fn unlink(&mut self, addr: &Address) {
        let Some(old) = self.formulas.get(addr) else {
            return;
        };
        for dep in &old.depends_on {
            if let Some(set) = self.dependents.get_mut(dep) {
                set.remove(addr);
                if set.is_empty() {
                    self.dependents.remove(dep);
                }
            }
        }
    }

    /// Re-evaluate `origin` (if it is a formula) and everything that depends
    /// on it, in topological order.
    fn recalculate_from(&mut self, origin: Address) -> Vec<Address> {
        let order = self.recalc_order(origin);
        for addr in &order {
            if let Some(cell) = self.formulas.get(addr) {
                let value = self.run(&cell.ast);
                self.store(*addr, value);
            }
        }
        order
    }

    fn recalc_order(&self, origin: Address) -> Vec<Address> {
        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        let mut stack = vec![(origin, false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                post_order.push(node);
                continue;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.push((node, true));
            if let Some(deps) = self.dependents.get(&node) {
                let mut deps: Vec<_> = deps.iter().copied().collect();
                deps.sort();
                for dep in deps {
                    if !visited.contains(&dep) {
                        stack.push((dep, false));
                    }
                }
            }
        }

        post_order.reverse();
        post_order.retain(|a| self.formulas.contains_key(a));
        post_order
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
