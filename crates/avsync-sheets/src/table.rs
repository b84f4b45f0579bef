//! Header-plus-body tables on top of a [`SheetStore`].
//!
//! Row 1 holds the header; data rows start at row 2 and are read and written
//! as a whole.

use crate::error::SheetError;
use crate::store::{CellRange, CellRef, SheetStore};

/// First data row under the header.
pub const FIRST_DATA_ROW: u32 = 2;

/// Creates `worksheet` if needed and writes `header` into row 1 when the
/// worksheet has no header yet. Returns whether the header was written.
///
/// # Errors
///
/// Propagates store errors.
pub async fn ensure_table<S>(store: &S, worksheet: &str, header: &[&str]) -> Result<bool, SheetError>
where
    S: SheetStore + ?Sized,
{
    store.ensure_worksheet(worksheet).await?;
    let width = column_count(header.len())?;
    let existing = store
        .get_values(
            worksheet,
            CellRange::between(CellRef::new(1, 1), CellRef::new(1, width)),
        )
        .await?;
    if existing.iter().any(|row| row.iter().any(|c| !c.trim().is_empty())) {
        return Ok(false);
    }

    let header_row: Vec<String> = header.iter().map(|h| (*h).to_owned()).collect();
    store
        .set_values(worksheet, CellRef::new(1, 1), &[header_row])
        .await?;
    tracing::info!(worksheet, "wrote table header");
    Ok(true)
}

/// Reads every data row of `worksheet`, columns `1..=width`.
///
/// # Errors
///
/// Propagates store errors.
pub async fn read_body<S>(store: &S, worksheet: &str, width: u32) -> Result<Vec<Vec<String>>, SheetError>
where
    S: SheetStore + ?Sized,
{
    store
        .get_values(
            worksheet,
            CellRange::open(CellRef::new(FIRST_DATA_ROW, 1), width),
        )
        .await
}

/// Writes `rows` back as the table body in one operation, from row 2.
///
/// # Errors
///
/// Propagates store errors.
pub async fn write_body<S>(store: &S, worksheet: &str, rows: &[Vec<String>]) -> Result<(), SheetError>
where
    S: SheetStore + ?Sized,
{
    store
        .set_values(worksheet, CellRef::new(FIRST_DATA_ROW, 1), rows)
        .await
}

fn column_count(len: usize) -> Result<u32, SheetError> {
    u32::try_from(len.max(1))
        .map_err(|_| SheetError::InvalidRange(format!("header has {len} columns")))
}
