// src/process/mod.rs

pub mod cleanse;
pub mod format;
pub mod staging;

pub use cleanse::cleanse_partition;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Canonical column names, assigned positionally from the catalogue.
    /// The sheet's own header row is not trusted for naming.
    pub headers: Vec<String>,
    /// Every row below the sheet header, one optional text cell per column.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}
