use crate::error::{DashboardError, Result};
use crate::source::RowSource;
use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// How requests to the Sheets API are authorised. Obtaining the credential is up to the
/// caller.
#[derive(Clone)]
pub enum SheetsAuth {
    ApiKey(String),
    BearerToken(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    auth: SheetsAuth,
    base_url: String,
}

impl SheetsClient {
    pub fn new(auth: SheetsAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DashboardError::ConfigError(format!("invalid Sheets base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::ConfigError("Sheets base URL cannot take a path".to_string()))?
            .extend([spreadsheet_id, "values", worksheet]);
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    /// Reads every row of `worksheet`, header first. Trailing empty cells may be omitted
    /// by the API, so rows can be ragged.
    pub async fn fetch_values(&self, spreadsheet_id: &str, worksheet: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, worksheet)?;

        let mut request = self.client.get(url);
        if let SheetsAuth::BearerToken(token) = &self.auth {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            return Err(DashboardError::SheetsError {
                status: status.as_u16(),
                body,
            });
        }

        let range: ValueRange = res.json().await?;
        debug!(
            "Sheets returned {} rows for {}/{}",
            range.values.len(),
            spreadsheet_id,
            worksheet
        );
        Ok(range.values)
    }
}

/// Blocking [`RowSource`] over one worksheet, driving the async client on its own runtime.
pub struct SheetsSource {
    client: SheetsClient,
    spreadsheet_id: String,
    worksheet: String,
    runtime: tokio::runtime::Runtime,
}

impl SheetsSource {
    pub fn new(
        client: SheetsClient,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            runtime,
        })
    }

    pub fn from_config(client: SheetsClient, config: &crate::schema::DashboardConfig) -> Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(DashboardError::ConfigError(
                "spreadsheet_id is required to read from Google Sheets".to_string(),
            ));
        }
        Self::new(client, config.spreadsheet_id.clone(), config.worksheet.clone())
    }
}

impl RowSource for SheetsSource {
    fn fetch_rows(&self) -> Result<Vec<Vec<String>>> {
        self.runtime
            .block_on(self.client.fetch_values(&self.spreadsheet_id, &self.worksheet))
    }
}
