//! In-memory [`SheetStore`] used by tests.
//!
//! Reads mimic the Sheets API: trailing empty cells and trailing empty rows
//! are dropped, and a missing worksheet is an error.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::SheetError;
use crate::store::{CellRange, CellRef, SheetStore};

type Grid = Vec<Vec<String>>;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    worksheets: Mutex<HashMap<String, Grid>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a worksheet holding `rows` starting at `A1`.
    #[must_use]
    pub fn with_worksheet(self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.lock().insert(name.to_owned(), rows);
        self
    }

    /// Current contents of `name` as the API would return `A1:` onwards.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Option<Grid> {
        self.lock().get(name).map(|grid| trimmed(grid.clone()))
    }

    #[must_use]
    pub fn worksheet_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Grid>> {
        self.worksheets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn missing(worksheet: &str) -> SheetError {
    SheetError::Api {
        status: 400,
        message: format!("Unable to parse range: worksheet '{worksheet}' not found"),
    }
}

fn index(n: u32) -> usize {
    usize::try_from(n.saturating_sub(1)).unwrap_or(usize::MAX)
}

/// Drops trailing empty cells of each row, then trailing empty rows.
fn trimmed(mut rows: Grid) -> Grid {
    for row in &mut rows {
        while row.last().is_some_and(String::is_empty) {
            row.pop();
        }
    }
    while rows.last().is_some_and(Vec::is_empty) {
        rows.pop();
    }
    rows
}

#[async_trait]
impl SheetStore for InMemoryStore {
    async fn get_values(
        &self,
        worksheet: &str,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        range.to_a1()?;
        let sheets = self.lock();
        let grid = sheets.get(worksheet).ok_or_else(|| missing(worksheet))?;

        let first_row = index(range.start.row);
        let last_row = range
            .end_row
            .map_or(grid.len(), |r| index(r).saturating_add(1).min(grid.len()));
        let first_col = index(range.start.col);
        let last_col = index(range.end_col).saturating_add(1);

        let rows = grid
            .get(first_row..last_row.max(first_row))
            .unwrap_or_default()
            .iter()
            .map(|row| {
                row.iter()
                    .skip(first_col)
                    .take(last_col.saturating_sub(first_col))
                    .cloned()
                    .collect()
            })
            .collect();
        Ok(trimmed(rows))
    }

    async fn set_values(
        &self,
        worksheet: &str,
        start: CellRef,
        rows: &[Vec<String>],
    ) -> Result<(), SheetError> {
        start.to_a1()?;
        let mut sheets = self.lock();
        let grid = sheets.get_mut(worksheet).ok_or_else(|| missing(worksheet))?;

        let first_row = index(start.row);
        let first_col = index(start.col);
        for (offset, values) in rows.iter().enumerate() {
            let r = first_row + offset;
            if grid.len() <= r {
                grid.resize_with(r + 1, Vec::new);
            }
            let row = &mut grid[r];
            if row.len() < first_col + values.len() {
                row.resize(first_col + values.len(), String::new());
            }
            for (c, value) in values.iter().enumerate() {
                row[first_col + c].clone_from(value);
            }
        }
        Ok(())
    }

    async fn set_value(
        &self,
        worksheet: &str,
        cell: CellRef,
        value: &str,
    ) -> Result<(), SheetError> {
        self.set_values(worksheet, cell, &[vec![value.to_owned()]])
            .await
    }

    async fn first_empty_row(&self, worksheet: &str) -> Result<u32, SheetError> {
        let sheets = self.lock();
        let grid = sheets.get(worksheet).ok_or_else(|| missing(worksheet))?;
        let used = grid
            .iter()
            .rposition(|row| row.first().is_some_and(|c| !c.is_empty()))
            .map_or(0, |idx| idx + 1);
        u32::try_from(used + 1)
            .map_err(|_| SheetError::InvalidRange(format!("{worksheet} has too many rows")))
    }

    async fn ensure_worksheet(&self, worksheet: &str) -> Result<bool, SheetError> {
        let mut sheets = self.lock();
        if sheets.contains_key(worksheet) {
            return Ok(false);
        }
        sheets.insert(worksheet.to_owned(), Vec::new());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_worksheet(
            "profiles",
            vec![
                row(&["label", "id", "client", "secret"]),
                row(&["shop", "42", "cid", "s", "", ""]),
                row(&["", "", "", ""]),
                row(&["other", "43", "cid2", "s2"]),
                row(&[]),
            ],
        )
    }

    #[tokio::test]
    async fn open_range_reads_to_last_data_row_and_trims() {
        let rows = store()
            .get_values("profiles", CellRange::open(CellRef::new(2, 1), 13))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], row(&["shop", "42", "cid", "s"]));
        assert!(rows[1].is_empty(), "interior blank rows are kept as empty");
        assert_eq!(rows[2][0], "other");
    }

    #[tokio::test]
    async fn closed_range_limits_columns() {
        let rows = store()
            .get_values(
                "profiles",
                CellRange::between(CellRef::new(2, 2), CellRef::new(2, 3)),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![row(&["42", "cid"])]);
    }

    #[tokio::test]
    async fn set_values_grows_the_grid() {
        let store = store();
        store
            .set_values("profiles", CellRef::new(7, 2), &[row(&["x", "y"])])
            .await
            .unwrap();
        let rows = store
            .get_values(
                "profiles",
                CellRange::between(CellRef::new(7, 1), CellRef::new(7, 3)),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![row(&["", "x", "y"])]);
    }

    #[tokio::test]
    async fn first_empty_row_follows_column_a() {
        let store = store();
        assert_eq!(store.first_empty_row("profiles").await.unwrap(), 5);

        store.ensure_worksheet("42").await.unwrap();
        assert_eq!(store.first_empty_row("42").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_worksheet_creates_once() {
        let store = InMemoryStore::new();
        assert!(store.ensure_worksheet("42").await.unwrap());
        assert!(!store.ensure_worksheet("42").await.unwrap());
        assert_eq!(store.worksheet_names(), ["42"]);
    }

    #[tokio::test]
    async fn unknown_worksheet_is_an_error() {
        let result = InMemoryStore::new().first_empty_row("nope").await;
        assert!(matches!(result, Err(SheetError::Api { status: 400, .. })));
    }
}
