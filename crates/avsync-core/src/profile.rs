//! Seller profiles as stored in the profiles worksheet.
//!
//! Row 1 is a header. Each following row describes one seller account:
//!
//! | Col | Field            |
//! |-----|------------------|
//! | A   | label            |
//! | B   | profile id       |
//! | C   | client id        |
//! | D   | client secret    |
//! | E   | status marker    |
//! | F   | account name     |
//! | G   | balance          |
//! | H   | active ads       |
//! | I   | rating           |
//! | J   | last error       |
//! | K   | reviews answered |
//! | L   | oldest stat date |
//! | M   | last synced at   |
//! | N   | reviews count    |
//! | O   | profile url      |

use thiserror::Error;

/// 1-indexed column numbers of the profiles worksheet.
pub mod columns {
    pub const LABEL: u32 = 1;
    pub const PROFILE_ID: u32 = 2;
    pub const STATUS: u32 = 5;
    pub const ACCOUNT_NAME: u32 = 6;
    pub const ERROR: u32 = 10;
    pub const REVIEWS_ANSWERED: u32 = 11;
    pub const LAST_SYNCED: u32 = 13;
    pub const REVIEWS_COUNT: u32 = 14;
    pub const PROFILE_URL: u32 = 15;
    /// Width of a full profile row.
    pub const WIDTH: u32 = 15;
}

/// Minimum number of cells a profile row needs: label, id, client id, secret.
pub const MIN_ROW_FIELDS: usize = 4;

/// Persisted authentication state of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Unset,
    Active,
    Blocked,
}

impl ProfileStatus {
    /// Marker written to the status column.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            ProfileStatus::Unset => "",
            ProfileStatus::Active => "ACTIVE",
            ProfileStatus::Blocked => "BLOCK",
        }
    }

    /// Parse a status cell; anything unrecognised reads as `Unset`.
    #[must_use]
    pub fn from_marker(cell: &str) -> Self {
        match cell.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => ProfileStatus::Active,
            "BLOCK" | "BLOCKED" => ProfileStatus::Blocked,
            _ => ProfileStatus::Unset,
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileStatus::Unset => write!(f, "unset"),
            ProfileStatus::Active => write!(f, "active"),
            ProfileStatus::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row has {fields} fields, expected at least {expected}")]
    TooShort { fields: usize, expected: usize },

    #[error("row is missing a {0}")]
    EmptyField(&'static str),
}

/// One seller account row.
#[derive(Clone)]
pub struct Profile {
    /// 1-indexed sheet row the profile was read from.
    pub row: u32,
    pub label: String,
    pub profile_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub status: ProfileStatus,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("row", &self.row)
            .field("label", &self.label)
            .field("profile_id", &self.profile_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("status", &self.status)
            .finish()
    }
}

impl Profile {
    /// Parse a profile from its sheet cells.
    ///
    /// Returns `Ok(None)` for blank rows (empty label), which the runner skips.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::TooShort`] when a non-blank row has fewer than
    /// [`MIN_ROW_FIELDS`] cells, and [`RowError::EmptyField`] when the profile
    /// id is blank. Blank credentials are kept as-is; the token exchange
    /// rejects them and the profile is marked blocked.
    pub fn from_row(row: u32, cells: &[String]) -> Result<Option<Self>, RowError> {
        let label = cells.first().map_or("", |c| c.trim());
        if label.is_empty() {
            return Ok(None);
        }
        if cells.len() < MIN_ROW_FIELDS {
            return Err(RowError::TooShort {
                fields: cells.len(),
                expected: MIN_ROW_FIELDS,
            });
        }

        let profile_id = cells[1].trim();
        if profile_id.is_empty() {
            return Err(RowError::EmptyField("profile id"));
        }

        Ok(Some(Self {
            row,
            label: label.to_string(),
            profile_id: profile_id.to_string(),
            client_id: cells[2].trim().to_string(),
            client_secret: cells[3].trim().to_string(),
            status: cells
                .get(4)
                .map_or(ProfileStatus::Unset, |c| ProfileStatus::from_marker(c)),
        }))
    }
}
