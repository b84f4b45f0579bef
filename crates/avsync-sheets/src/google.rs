//! Google Sheets v4 REST backend.
//!
//! Authenticates with an opaque bearer token. Values are written with
//! `valueInputOption=RAW` so strings land in cells verbatim.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::store::{qualified_range, CellRange, CellRef, SheetStore};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Longest slice of a failing response body carried in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Client for one spreadsheet.
pub struct GoogleSheetsClient {
    http: Client,
    base_url: Url,
    spreadsheet_id: String,
    access_token: String,
}

impl std::fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("access_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsClient {
    /// Creates a client against the public Sheets endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        spreadsheet_id: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SheetError> {
        Self::with_base_url(
            spreadsheet_id,
            access_token,
            timeout_secs,
            user_agent,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (used for testing).
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SheetError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        spreadsheet_id: &str,
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SheetError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SheetError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.trim().to_owned(),
            access_token: access_token.trim().to_owned(),
        })
    }

    fn spreadsheet_url(&self, suffix: &str) -> Result<Url, SheetError> {
        let id = utf8_percent_encode(&self.spreadsheet_id, NON_ALPHANUMERIC);
        let path = format!("v4/spreadsheets/{id}{suffix}");
        self.base_url
            .join(&path)
            .map_err(|e| SheetError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join path '{path}': {e}"),
            })
    }

    fn values_url(&self, qualified: &str) -> Result<Url, SheetError> {
        let encoded = utf8_percent_encode(qualified, NON_ALPHANUMERIC);
        self.spreadsheet_url(&format!("/values/{encoded}"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, SheetError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SheetError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(body)
    }

    async fn read_range(&self, qualified: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let url = self.values_url(qualified)?;
        let body = self
            .send(self.http.get(url).query(&[("majorDimension", "ROWS")]))
            .await?;
        let parsed: ValueRange =
            serde_json::from_str(&body).map_err(|e| SheetError::Deserialize {
                context: qualified.to_owned(),
                source: e,
            })?;
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn worksheet_titles(&self) -> Result<Vec<String>, SheetError> {
        let url = self.spreadsheet_url("")?;
        let body = self
            .send(
                self.http
                    .get(url)
                    .query(&[("fields", "sheets.properties.title")]),
            )
            .await?;
        let meta: SpreadsheetMeta =
            serde_json::from_str(&body).map_err(|e| SheetError::Deserialize {
                context: "spreadsheet metadata".to_owned(),
                source: e,
            })?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

/// Formatted values arrive as strings; anything else is rendered as JSON.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn get_values(
        &self,
        worksheet: &str,
        range: CellRange,
    ) -> Result<Vec<Vec<String>>, SheetError> {
        let qualified = qualified_range(worksheet, &range.to_a1()?);
        let rows = self.read_range(&qualified).await?;
        tracing::debug!(range = %qualified, rows = rows.len(), "read range");
        Ok(rows)
    }

    async fn set_values(
        &self,
        worksheet: &str,
        start: CellRef,
        rows: &[Vec<String>],
    ) -> Result<(), SheetError> {
        if rows.is_empty() {
            return Ok(());
        }
        let qualified = qualified_range(worksheet, &start.to_a1()?);
        let url = self.values_url(&qualified)?;
        let body = ValueRangeBody {
            range: &qualified,
            major_dimension: "ROWS",
            values: rows,
        };
        self.send(
            self.http
                .put(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&body),
        )
        .await?;
        tracing::debug!(range = %qualified, rows = rows.len(), "wrote range");
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
        let qualified = qualified_range(worksheet, "A:A");
        let rows = self.read_range(&qualified).await?;
        let used = u32::try_from(rows.len())
            .map_err(|_| SheetError::InvalidRange(format!("{qualified} has too many rows")))?;
        Ok(used + 1)
    }

    async fn ensure_worksheet(&self, worksheet: &str) -> Result<bool, SheetError> {
        if self
            .worksheet_titles()
            .await?
            .iter()
            .any(|title| title == worksheet)
        {
            return Ok(false);
        }

        let url = self.spreadsheet_url(":batchUpdate")?;
        let body = serde_json::json!({
            "requests": [{"addSheet": {"properties": {"title": worksheet}}}]
        });
        self.send(self.http.post(url).json(&body)).await?;
        tracing::info!(worksheet, "created worksheet");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleSheetsClient {
        GoogleSheetsClient::with_base_url("sheet-id", "s3cr3t", 30, "test", "http://localhost:9")
            .expect("client construction should not fail")
    }

    #[test]
    fn values_url_encodes_the_range() {
        let url = client().values_url("'my sheet'!A2:E").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9/v4/spreadsheets/sheet%2Did/values/%27my%20sheet%27%21A2%3AE"
        );
    }

    #[test]
    fn batch_update_url_keeps_colon_suffix() {
        let url = client().spreadsheet_url(":batchUpdate").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9/v4/spreadsheets/sheet%2Did:batchUpdate"
        );
    }

    #[test]
    fn numeric_cells_become_strings() {
        assert_eq!(cell_to_string(serde_json::json!(5)), "5");
        assert_eq!(cell_to_string(serde_json::json!("x")), "x");
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("[redacted]"));
    }
}
