use std::path::{Path, PathBuf};
use std::str::FromStr;

use mortgage_calc_core::store::{ScenarioRecord, ScenarioStore};
use mortgage_calc_core::{MortgageError, MortgageResult};
use tracing::debug;

const HEADER: [&str; 4] = ["id", "principal", "apr", "term_years"];

/// Scenario records as a four-column CSV sheet, one row per scenario.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn error(&self, action: &str, e: impl std::fmt::Display) -> MortgageError {
        MortgageError::Persistence(format!("Failed to {} '{}': {}", action, self.path.display(), e))
    }

    fn column<T: FromStr>(&self, row: &csv::StringRecord, line: usize, index: usize) -> MortgageResult<T> {
        let name = HEADER[index];
        let raw = row
            .get(index)
            .ok_or_else(|| self.error("parse", format!("row {} is missing '{}'", line + 1, name)))?;
        raw.trim()
            .parse()
            .map_err(|_| self.error("parse", format!("row {} has an invalid '{}'", line + 1, name)))
    }
}

impl ScenarioStore for CsvFileStore {
    fn save(&self, records: &[ScenarioRecord]) -> MortgageResult<()> {
        let mut wtr = csv::Writer::from_path(&self.path).map_err(|e| self.error("create", e))?;
        wtr.write_record(HEADER).map_err(|e| self.error("write", e))?;
        for r in records {
            wtr.write_record([
                r.id.to_string(),
                r.principal.to_string(),
                r.apr.to_string(),
                r.term_years.to_string(),
            ])
            .map_err(|e| self.error("write", e))?;
        }
        wtr.flush().map_err(|e| self.error("write", e))?;
        debug!(path = %self.path.display(), count = records.len(), "saved csv store");
        Ok(())
    }

    /// A missing file is an empty store.
    fn load(&self) -> MortgageResult<Vec<ScenarioRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| self.error("read", e))?;
        let mut records = Vec::new();

        for (line, row) in rdr.records().enumerate() {
            let row = row.map_err(|e| self.error("read", e))?;
            records.push(ScenarioRecord {
                id: self.column(&row, line, 0)?,
                principal: self.column(&row, line, 1)?,
                apr: self.column(&row, line, 2)?,
                term_years: self.column(&row, line, 3)?,
            });
        }

        debug!(path = %self.path.display(), count = records.len(), "loaded csv store");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn test_save_then_load_keeps_precision() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvFileStore::new(dir.path().join("scenarios.csv"));
        let records = vec![
            ScenarioRecord { id: 1, principal: dec!(100000), apr: dec!(4.3), term_years: 30 },
            ScenarioRecord { id: 5, principal: dec!(80000.50), apr: dec!(3.125), term_years: 15 },
        ];
        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_written_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.csv");
        CsvFileStore::new(&path)
            .save(&[ScenarioRecord { id: 2, principal: dec!(1500), apr: dec!(6), term_years: 3 }])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "id,principal,apr,term_years\n2,1500,6,3\n");
    }

    #[test]
    fn test_bad_number_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "id,principal,apr,term_years\n1,lots,4.3,30\n").unwrap();
        let err = CsvFileStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("principal"));
    }
}
