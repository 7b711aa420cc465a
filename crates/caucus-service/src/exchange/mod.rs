//! CSV exchange: date-ranged export and all-or-nothing import.

mod export;
mod import;


pub use export::{ExportRange, export_constituents, export_filename, write_csv};
pub use import::{ImportSummary, import_constituents, import_csv_file, parse_import};
