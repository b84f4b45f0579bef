//! Spreadsheet store abstraction.
//!
//! Coordinates are 1-indexed `(row, column)` and every cell is a string.
//! Reads follow the Sheets API convention: trailing empty cells of a row and
//! trailing empty rows of a range are not returned.

use async_trait::async_trait;

use crate::error::SheetError;

/// A single 1-indexed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1 notation for this cell, e.g. `(2, 28)` → `AB2`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidRange`] for a zero row or column.
    pub fn to_a1(self) -> Result<String, SheetError> {
        if self.row == 0 {
            return Err(SheetError::InvalidRange(format!(
                "row must be >= 1, got {}",
                self.row
            )));
        }
        Ok(format!("{}{}", column_letters(self.col)?, self.row))
    }
}

/// A rectangular range. `end_row = None` reads to the last non-empty row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end_col: u32,
    pub end_row: Option<u32>,
}

impl CellRange {
    /// Closed range from `start` to `end`, both inclusive.
    #[must_use]
    pub fn between(start: CellRef, end: CellRef) -> Self {
        Self {
            start,
            end_col: end.col,
            end_row: Some(end.row),
        }
    }

    /// Columns `start.col..=end_col` from `start.row` to the last data row.
    #[must_use]
    pub fn open(start: CellRef, end_col: u32) -> Self {
        Self {
            start,
            end_col,
            end_row: None,
        }
    }

    /// A1 notation without a worksheet prefix, e.g. `A2:E` or `B3:D9`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidRange`] for zero coordinates or an end
    /// before the start.
    pub fn to_a1(self) -> Result<String, SheetError> {
        if self.end_col < self.start.col || self.end_row.is_some_and(|r| r < self.start.row) {
            return Err(SheetError::InvalidRange(format!(
                "range end precedes start: {self:?}"
            )));
        }
        let start = self.start.to_a1()?;
        let end_col = column_letters(self.end_col)?;
        Ok(match self.end_row {
            Some(row) => format!("{start}:{end_col}{row}"),
            None => format!("{start}:{end_col}"),
        })
    }
}

/// Column letters for a 1-indexed column: 1 → `A`, 26 → `Z`, 27 → `AA`.
///
/// # Errors
///
/// Returns [`SheetError::InvalidRange`] for column 0.
pub fn column_letters(col: u32) -> Result<String, SheetError> {
    if col == 0 {
        return Err(SheetError::InvalidRange("column must be >= 1, got 0".to_owned()));
    }
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    Ok(letters.into_iter().rev().collect())
}

/// Qualifies an A1 range with a quoted worksheet name: `'my sheet'!A1:B2`.
#[must_use]
pub fn qualified_range(worksheet: &str, a1: &str) -> String {
    format!("'{}'!{a1}", worksheet.replace('\'', "''"))
}

/// Cell-level access to the worksheets of one spreadsheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Reads `range` as rows of strings.
    async fn get_values(
        &self,
        worksheet: &str,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError>;

    /// Writes `rows` with their top-left corner at `start`.
    async fn set_values(
        &self,
        worksheet: &str,
        start: CellRef,
        rows: &[Vec<String>],
    ) -> Result<(), SheetError>;

    /// Writes a single cell.
    async fn set_value(&self, worksheet: &str, cell: CellRef, value: &str)
        -> Result<(), SheetError>;

    /// First row after the last non-empty cell of column A.
    async fn first_empty_row(&self, worksheet: &str) -> Result<u32, SheetError>;

    /// Creates `worksheet` if it does not exist. Returns whether it was created.
    async fn ensure_worksheet(&self, worksheet: &str) -> Result<bool, SheetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(1).unwrap(), "A");
        assert_eq!(column_letters(13).unwrap(), "M");
        assert_eq!(column_letters(26).unwrap(), "Z");
        assert_eq!(column_letters(27).unwrap(), "AA");
        assert_eq!(column_letters(52).unwrap(), "AZ");
        assert_eq!(column_letters(703).unwrap(), "AAA");
    }

    #[test]
    fn zero_coordinates_are_rejected() {
        assert!(column_letters(0).is_err());
        assert!(CellRef::new(0, 1).to_a1().is_err());
    }

    #[test]
    fn ranges_render_closed_and_open() {
        let closed = CellRange::between(CellRef::new(2, 1), CellRef::new(9, 5));
        assert_eq!(closed.to_a1().unwrap(), "A2:E9");

        let open = CellRange::open(CellRef::new(2, 1), 13);
        assert_eq!(open.to_a1().unwrap(), "A2:M");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let range = CellRange::between(CellRef::new(5, 3), CellRef::new(2, 1));
        assert!(matches!(range.to_a1(), Err(SheetError::InvalidRange(_))));
    }

    #[test]
    fn worksheet_names_are_quoted() {
        assert_eq!(qualified_range("profiles", "A1:M"), "'profiles'!A1:M");
        assert_eq!(qualified_range("Bob's", "A1"), "'Bob''s'!A1");
    }
}
