use std::fs;
use std::path::{Path, PathBuf};

use mortgage_calc_core::store::{ScenarioRecord, ScenarioStore};
use mortgage_calc_core::{MortgageError, MortgageResult};
use tracing::debug;

/// Scenario records as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ScenarioStore for JsonFileStore {
    fn save(&self, records: &[ScenarioRecord]) -> MortgageResult<()> {
        let body = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, body).map_err(|e| {
            MortgageError::Persistence(format!("Failed to write '{}': {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), count = records.len(), "saved json store");
        Ok(())
    }

    /// A missing file is an empty store.
    fn load(&self) -> MortgageResult<Vec<ScenarioRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            MortgageError::Persistence(format!("Failed to read '{}': {}", self.path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<ScenarioRecord> = serde_json::from_str(&contents).map_err(|e| {
            MortgageError::Persistence(format!("Failed to parse '{}': {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), count = records.len(), "loaded json store");
        Ok(records)
    }
}
