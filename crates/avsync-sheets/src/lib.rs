//! Spreadsheet storage for avsync.
//!
//! [`SheetStore`] is the cell-level seam; [`GoogleSheetsClient`] talks to the
//! Google Sheets v4 REST API and [`InMemoryStore`] backs the runner tests.

pub mod error;
pub mod google;
pub mod memory;
pub mod store;
pub mod table;

pub use error::SheetError;
pub use google::GoogleSheetsClient;
pub use memory::InMemoryStore;
pub use store::{column_letters, qualified_range, CellRange, CellRef, SheetStore};
pub use table::{ensure_table, read_body, write_body, FIRST_DATA_ROW};
