pub mod csv_file;
pub mod json_file;

use std::path::Path;

use mortgage_calc_core::store::ScenarioStore;

pub use csv_file::CsvFileStore;
pub use json_file::JsonFileStore;

/// Pick a store implementation from the file extension: `.csv` is CSV,
/// anything else is JSON.
pub fn open_store(path: &Path) -> Box<dyn ScenarioStore> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvFileStore::new(path))
    } else {
        Box::new(JsonFileStore::new(path))
    }
}
