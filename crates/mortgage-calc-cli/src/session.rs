use mortgage_calc_core::store::ScenarioStore;
use mortgage_calc_core::{MortgageCalculator, MortgageResult};
use tracing::info;

/// A calculator bound to the store it was loaded from.
pub struct Session {
    calculator: MortgageCalculator,
    store: Box<dyn ScenarioStore>,
    dirty: bool,
}

impl Session {
    /// Load every saved scenario from `store`.
    pub fn open(store: Box<dyn ScenarioStore>) -> MortgageResult<Self> {
        let mut calculator = MortgageCalculator::new();
        let count = calculator.load_from(store.as_ref())?;
        info!(count, "scenarios loaded");
        Ok(Session {
            calculator,
            store,
            dirty: false,
        })
    }

    pub fn calculator(&self) -> &MortgageCalculator {
        &self.calculator
    }

    /// Mutable access; marks the session as having unsaved changes.
    pub fn calculator_mut(&mut self) -> &mut MortgageCalculator {
        self.dirty = true;
        &mut self.calculator
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self) -> MortgageResult<()> {
        self.calculator.save_to(self.store.as_ref())?;
        self.dirty = false;
        Ok(())
    }

    /// Discard in-memory changes and reload from the store.
    pub fn reload(&mut self) -> MortgageResult<usize> {
        let count = self.calculator.load_from(self.store.as_ref())?;
        self.dirty = false;
        Ok(count)
    }
}
