use std::collections::HashSet;

use tracing::debug;

use crate::error::MortgageError;
use crate::scenario::{LoanScenario, LoanTerms};
use crate::store::ScenarioRecord;
use crate::types::ScenarioId;
use crate::MortgageResult;

/// First id handed out by a fresh registry. Zero is the caller's
/// "back to menu" sentinel and is never assigned.
pub const FIRST_SCENARIO_ID: ScenarioId = 1;

/// Ordered collection of scenarios keyed by a monotonically assigned id.
///
/// Ids are never reused, including after removal. Listing follows
/// insertion order.
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    scenarios: Vec<LoanScenario>,
    next_id: ScenarioId,
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        ScenarioRegistry {
            scenarios: Vec::new(),
            next_id: FIRST_SCENARIO_ID,
        }
    }

    /// Register a new scenario and return its id.
    ///
    /// Fails only once the id space is exhausted.
    pub fn add(&mut self, terms: LoanTerms) -> MortgageResult<ScenarioId> {
        let id = self.next_id;
        self.next_id = successor(id)?;
        self.scenarios.push(LoanScenario::new(id, terms));
        debug!(id, principal = %terms.principal(), apr = %terms.apr(), term_years = terms.term_years(), "scenario registered");
        Ok(id)
    }

    pub fn get(&self, id: ScenarioId) -> MortgageResult<&LoanScenario> {
        self.scenarios
            .iter()
            .find(|s| s.id() == id)
            .ok_or(MortgageError::ScenarioNotFound(id))
    }

    pub fn contains(&self, id: ScenarioId) -> bool {
        self.scenarios.iter().any(|s| s.id() == id)
    }

    /// All scenarios in insertion order.
    pub fn list_all(&self) -> &[LoanScenario] {
        &self.scenarios
    }

    pub fn remove(&mut self, id: ScenarioId) -> MortgageResult<LoanScenario> {
        let pos = self
            .scenarios
            .iter()
            .position(|s| s.id() == id)
            .ok_or(MortgageError::ScenarioNotFound(id))?;
        debug!(id, "scenario removed");
        Ok(self.scenarios.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Id the next `add` will assign.
    pub fn next_id(&self) -> ScenarioId {
        self.next_id
    }

    /// Flat records for persistence, in listing order.
    pub fn records(&self) -> Vec<ScenarioRecord> {
        self.scenarios
            .iter()
            .map(|s| ScenarioRecord {
                id: s.id(),
                principal: s.principal(),
                apr: s.apr(),
                term_years: s.term_years(),
            })
            .collect()
    }

    /// Replace the contents with previously saved records, keeping their ids.
    ///
    /// The whole set is validated before anything is replaced. The counter
    /// moves past the highest restored id but never backwards.
    pub fn restore(&mut self, records: &[ScenarioRecord]) -> MortgageResult<()> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut restored = Vec::with_capacity(records.len());

        for record in records {
            if record.id < FIRST_SCENARIO_ID {
                return Err(MortgageError::invalid(
                    "id",
                    format!("Scenario id must be at least {FIRST_SCENARIO_ID}"),
                ));
            }
            if !seen.insert(record.id) {
                return Err(MortgageError::DuplicateScenario(record.id));
            }
            let terms = LoanTerms::new(record.principal, record.apr, record.term_years)?;
            restored.push(LoanScenario::new(record.id, terms));
        }

        let highest = restored.iter().map(|s| s.id()).max().unwrap_or(0);
        self.next_id = self.next_id.max(successor(highest)?);
        self.scenarios = restored;
        debug!(count = self.scenarios.len(), next_id = self.next_id, "registry restored");
        Ok(())
    }
}

/// Id following `id`. The largest `ScenarioId` is never assigned so the
/// counter always has somewhere to go.
fn successor(id: ScenarioId) -> MortgageResult<ScenarioId> {
    id.checked_add(1).ok_or_else(|| {
        MortgageError::invalid("id", format!("Scenario id must be below {}", ScenarioId::MAX))
    })
}
