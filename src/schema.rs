use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One shipment line after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Shipment date. `None` when the source cell could not be parsed.
    pub date: Option<NaiveDate>,
    /// Year-month bucket as written in the ledger (`YYYY-MM`), sourced independently of `date`.
    pub period: String,
    /// Channel (customer) code.
    pub channel: String,
    /// Product display name.
    pub product: String,
    pub quantity: Option<f64>,
    /// Net revenue excluding VAT.
    pub revenue: Option<f64>,
}

/// Header names of the six columns the ledger must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMapping {
    #[schemars(description = "Header of the shipment date column (e.g. 2024-05-01)")]
    #[serde(default = "default_date_column")]
    pub date: String,

    #[schemars(description = "Header of the shipment year-month column (YYYY-MM)")]
    #[serde(default = "default_period_column")]
    pub period: String,

    #[schemars(description = "Header of the channel / customer code column")]
    #[serde(default = "default_channel_column")]
    pub channel: String,

    #[schemars(description = "Header of the product name column")]
    #[serde(default = "default_product_column")]
    pub product: String,

    #[schemars(description = "Header of the shipped quantity column; thousands separators are allowed")]
    #[serde(default = "default_quantity_column")]
    pub quantity: String,

    #[schemars(description = "Header of the net revenue (VAT excluded) column; thousands separators are allowed")]
    #[serde(default = "default_revenue_column")]
    pub revenue: String,
}

fn default_date_column() -> String {
    "출고일자".to_string()
}

fn default_period_column() -> String {
    "출고년월".to_string()
}

fn default_channel_column() -> String {
    "거래처코드".to_string()
}

fn default_product_column() -> String {
    "내품상품명".to_string()
}

fn default_quantity_column() -> String {
    "총내품출고수량".to_string()
}

fn default_revenue_column() -> String {
    "품목별매출(VAT제외)".to_string()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: default_date_column(),
            period: default_period_column(),
            channel: default_channel_column(),
            product: default_product_column(),
            quantity: default_quantity_column(),
            revenue: default_revenue_column(),
        }
    }
}

impl ColumnMapping {
    /// Header names in ledger order: date, period, channel, product, quantity, revenue.
    pub fn headers(&self) -> [&str; 6] {
        [
            &self.date,
            &self.period,
            &self.channel,
            &self.product,
            &self.quantity,
            &self.revenue,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DashboardConfig {
    #[schemars(description = "Identifier of the spreadsheet holding the ledger")]
    #[serde(default)]
    pub spreadsheet_id: String,

    #[schemars(description = "Worksheet (tab) name inside the spreadsheet")]
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    #[schemars(description = "Header names of the required ledger columns")]
    #[serde(default)]
    pub columns: ColumnMapping,

    #[schemars(description = "Length of the trailing recency window in calendar months")]
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    #[schemars(description = "How many of the largest values are flagged in rankings and in the pivot")]
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[schemars(description = "Seconds a fetched ledger snapshot is reused before refetching")]
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

fn default_worksheet() -> String {
    "VIEW_TABLE".to_string()
}

fn default_window_months() -> u32 {
    12
}

fn default_top_k() -> usize {
    3
}

fn default_cache_ttl_secs() -> i64 {
    600
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: default_worksheet(),
            columns: ColumnMapping::default(),
            window_months: default_window_months(),
            top_k: default_top_k(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_months == 0 {
            return Err(DashboardError::ConfigError(
                "window_months must be at least 1".to_string(),
            ));
        }
        if self.cache_ttl_secs <= 0 {
            return Err(DashboardError::ConfigError(format!(
                "cache_ttl_secs must be positive, got {}",
                self.cache_ttl_secs
            )));
        }

        let headers = self.columns.headers();
        for (idx, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                return Err(DashboardError::ConfigError(format!(
                    "column header #{} is empty",
                    idx
                )));
            }
            if headers[..idx].contains(header) {
                return Err(DashboardError::ConfigError(format!(
                    "column header '{}' is mapped twice",
                    header
                )));
            }
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
