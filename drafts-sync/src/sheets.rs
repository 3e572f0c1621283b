//! Remote tabular store.
//!
//! [`SheetStore`] is the seam between the reconciler and the spreadsheet.
//! [`GoogleSheets`] talks to the Sheets v4 values API. Unit tests use an
//! in-memory store that records every call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use drafts_core::SheetRow;

use crate::auth::{AccessToken, ServiceAccount, TOKEN_URL};
use crate::error::{decode_err, http_err};
use crate::SyncError;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_SHEET_NAME: &str = "Draft Images";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Read and append access to one spreadsheet, addressed by A1 ranges.
pub trait SheetStore {
    /// Rows in `range`. Empty trailing cells may be omitted by the store.
    fn read_range(&mut self, range: &str) -> Result<Vec<SheetRow>, SyncError>;

    /// Append `rows` after the last row of the table in `range`, verbatim.
    fn append_rows(&mut self, range: &str, rows: &[SheetRow]) -> Result<(), SyncError>;
}

impl<S: SheetStore + ?Sized> SheetStore for &mut S {
    fn read_range(&mut self, range: &str) -> Result<Vec<SheetRow>, SyncError> {
        (**self).read_range(range)
    }

    fn append_rows(&mut self, range: &str, rows: &[SheetRow]) -> Result<(), SyncError> {
        (**self).append_rows(range, rows)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything needed to open a [`GoogleSheets`] store.
///
/// Credentials are optional here so a run with nothing to sync never needs
/// them; [`GoogleSheets::connect`] reports whichever one is missing.
#[derive(Debug, Clone)]
pub struct SheetsSettings {
    pub spreadsheet_id: Option<String>,
    pub service_account_email: Option<String>,
    pub service_account_key: Option<String>,
    pub api_base: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            service_account_email: None,
            service_account_key: None,
            api_base: SHEETS_API_BASE.to_string(),
            token_url: TOKEN_URL.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Google Sheets
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<SheetRow>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: &'a [SheetRow],
}

/// Sheets v4 values API client.
pub struct GoogleSheets {
    agent: ureq::Agent,
    api_base: Url,
    spreadsheet_id: String,
    token: AccessToken,
}

impl GoogleSheets {
    /// Authenticate as the configured service account.
    pub fn connect(settings: &SheetsSettings) -> Result<Self, SyncError> {
        let spreadsheet_id = settings
            .spreadsheet_id
            .clone()
            .ok_or(SyncError::MissingConfig("SHEETS_SPREADSHEET_ID"))?;
        let email = settings
            .service_account_email
            .as_deref()
            .ok_or(SyncError::MissingConfig("SHEETS_SERVICE_ACCOUNT_EMAIL"))?;
        let key = settings
            .service_account_key
            .as_deref()
            .ok_or(SyncError::MissingConfig("SHEETS_SERVICE_ACCOUNT_KEY"))?;

        let agent = ureq::AgentBuilder::new().timeout(settings.timeout).build();
        let account = ServiceAccount::new(email, key);
        let token = account.fetch_token(&agent, &settings.token_url)?;
        tracing::info!("authenticated as {}", account.email());

        Self::with_token(agent, &settings.api_base, spreadsheet_id, token)
    }

    /// Build a client around an already-issued token.
    pub fn with_token(
        agent: ureq::Agent,
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        token: AccessToken,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            agent,
            api_base: Url::parse(api_base)?,
            spreadsheet_id: spreadsheet_id.into(),
            token,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}` with the range
    /// percent-encoded as a single path segment.
    pub fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SyncError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                format!("{range}{suffix}").as_str(),
            ]);
        Ok(url)
    }
}

impl SheetStore for GoogleSheets {
    fn read_range(&mut self, range: &str) -> Result<Vec<SheetRow>, SyncError> {
        let context = format!("reading {range}");
        let url = self.values_url(range, "")?;
        let response = self
            .agent
            .request_url("GET", &url)
            .set("Authorization", &self.token.header_value())
            .call()
            .map_err(|e| http_err(context.as_str(), e))?;
        let body: ValueRange = response
            .into_json()
            .map_err(|e| decode_err(context.as_str(), e))?;
        tracing::debug!("read {} row(s) from {}", body.values.len(), range);
        Ok(body.values)
    }

    fn append_rows(&mut self, range: &str, rows: &[SheetRow]) -> Result<(), SyncError> {
        let context = format!("appending {} row(s) to {range}", rows.len());
        let url = self.values_url(range, ":append")?;
        self.agent
            .request_url("POST", &url)
            .query("valueInputOption", "RAW")
            .query("insertDataOption", "INSERT_ROWS")
            .set("Authorization", &self.token.header_value())
            .send_json(AppendBody { values: rows })
            .map_err(|e| http_err(context.as_str(), e))?;
        tracing::info!("appended {} row(s) to {}", rows.len(), range);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A call made against a [`MemorySheet`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SheetCall {
    Read { range: String },
    Append { range: String, rows: usize },
}

/// In-memory sheet. Row 0 is the header.
///
/// Ranges starting at row 1 (`…!A1:…`) read the header only; any other range
/// reads every data row.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySheet {
    pub(crate) rows: Vec<SheetRow>,
    pub(crate) calls: Vec<SheetCall>,
}

#[cfg(test)]
impl MemorySheet {
    pub(crate) fn new(header: SheetRow, data: Vec<SheetRow>) -> Self {
        let mut rows = vec![header];
        rows.extend(data);
        Self {
            rows,
            calls: Vec::new(),
        }
    }

    pub(crate) fn data_rows(&self) -> &[SheetRow] {
        self.rows.get(1..).unwrap_or_default()
    }
}

#[cfg(test)]
impl SheetStore for MemorySheet {
    fn read_range(&mut self, range: &str) -> Result<Vec<SheetRow>, SyncError> {
        self.calls.push(SheetCall::Read {
            range: range.to_string(),
        });
        if range.contains("!A1:") {
            Ok(self.rows.first().cloned().into_iter().collect())
        } else {
            Ok(self.data_rows().to_vec())
        }
    }

    fn append_rows(&mut self, range: &str, rows: &[SheetRow]) -> Result<(), SyncError> {
        self.calls.push(SheetCall::Append {
            range: range.to_string(),
            rows: rows.len(),
        });
        self.rows.extend_from_slice(rows);
        Ok(())
    }
}
