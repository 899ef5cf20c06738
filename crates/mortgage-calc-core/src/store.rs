//! Persistence boundary. The core never performs I/O itself; callers hand
//! it a [`ScenarioStore`] that moves flat records in and out.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, ScenarioId};
use crate::MortgageResult;

/// Flat persisted form of a scenario: `(id, principal, apr, term_years)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: ScenarioId,
    pub principal: Money,
    pub apr: Percent,
    pub term_years: u32,
}

/// Something that can hold an ordered list of scenario records.
pub trait ScenarioStore {
    fn save(&self, records: &[ScenarioRecord]) -> MortgageResult<()>;
    fn load(&self) -> MortgageResult<Vec<ScenarioRecord>>;
}

/// In-process store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<Vec<ScenarioRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioStore for MemoryStore {
    fn save(&self, records: &[ScenarioRecord]) -> MortgageResult<()> {
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }

    fn load(&self) -> MortgageResult<Vec<ScenarioRecord>> {
        Ok(self.records.borrow().clone())
    }
}
