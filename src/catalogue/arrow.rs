// src/catalogue/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{CatalogueEntry, ColumnType};

/// Map a catalogue column type onto the Arrow type it cleanses to.
///
/// - `str_year` → Int64, never null once cleansed
/// - `qty`      → Float64, null where the source had a placeholder
/// - other      → Utf8
pub fn map_to_arrow_type(ty: ColumnType) -> (DataType, bool) {
    match ty {
        ColumnType::StrYear => (DataType::Int64, false),
        ColumnType::Qty => (DataType::Float64, true),
        ColumnType::Text => (DataType::Utf8, true),
    }
}

/// Build the cleansed ArrowSchema for `entry`: canonical columns in
/// catalogue order followed by the three metadata columns.
pub fn build_arrow_schema(entry: &CatalogueEntry) -> Arc<ArrowSchema> {
    let mut fields: Vec<ArrowField> = entry
        .columns
        .iter()
        .map(|col| {
            let (dt, nullable) = map_to_arrow_type(col.column_type);
            ArrowField::new(&col.name, dt, nullable)
        })
        .collect();

    for name in entry.metadata_columns() {
        fields.push(ArrowField::new(name, DataType::Utf8, false));
    }

    Arc::new(ArrowSchema::new(fields))
}
