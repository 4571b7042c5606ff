//! Wire types for the ChurnInsight backend
//!
//! Every field the backend may leave out is optional or defaulted, so a
//! partially filled response still decodes.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Live counters for the dashboard header (`GET /stats`)
///
/// All-`None` means "unavailable" and is rendered as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    #[serde(default)]
    pub active_users: Option<u64>,
    #[serde(default)]
    pub retention_rate: Option<f64>,
    #[serde(default)]
    pub today_predictions: Option<u64>,
}

impl StatsData {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.active_users.is_some()
            || self.retention_rate.is_some()
            || self.today_predictions.is_some()
    }

    /// An empty backend database reports zeros everywhere
    pub(crate) fn is_all_zero(&self) -> bool {
        self.active_users == Some(0)
            && self.retention_rate == Some(0.0)
            && self.today_predictions == Some(0)
    }
}

/// Business KPIs for the last month (`GET /stats/kpis`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KpisData {
    pub total_high_risk_clients: u64,
    pub capital_at_risk: f64,
    pub accuracy_last_month: f64,
    pub total_predictions: u64,
    pub average_risk: f64,
}

/// One stored prediction (`GET /churn/history` and friends)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    pub id: Option<i64>,
    pub customer_id: String,
    pub churn_probability: f64,
    pub num_of_products: Option<u32>,
    /// ISO local date-time as sent by the backend
    pub prediction_date: String,
    pub balance: Option<f64>,
    pub estimated_salary: Option<f64>,
    pub country: Option<String>,
    pub tenure: Option<u32>,
    pub is_active_member: Option<bool>,
}

impl HistoryEntry {
    pub fn predicted_at(&self) -> Option<NaiveDateTime> {
        parse_backend_datetime(&self.prediction_date)
    }
}

/// A point of a customer's probability trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: Option<NaiveDate>,
    pub probability: f64,
}

impl From<&HistoryEntry> for HistoryPoint {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            date: entry.predicted_at().map(|dt| dt.date()),
            probability: entry.churn_probability,
        }
    }
}

/// Paged history for administrators (`GET /churn/history/all`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryPage {
    pub content: Vec<HistoryEntry>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalystSummary {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub total_analyses: u64,
    pub last_prediction_date: Option<String>,
    pub average_churn_probability: Option<f64>,
}

/// Aggregated activity of one analyst for a month or a year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalystPeriodReport {
    pub year: i32,
    /// `None` for yearly aggregation
    pub month: Option<u32>,
    pub total_analyses: u64,
    pub high_risk_count: u64,
    pub average_churn_probability: Option<f64>,
}

impl AnalystPeriodReport {
    /// `2024-03` for monthly rows, `2024` for yearly rows
    pub fn period_label(&self) -> String {
        match self.month {
            Some(month) => format!("{}-{:02}", self.year, month),
            None => self.year.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Monthly,
    Yearly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Granularity::Monthly),
            "yearly" => Ok(Granularity::Yearly),
            _ => Err(format!("Unknown granularity: {} (expected monthly or yearly)", s)),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
    pub username: Option<String>,
}

fn parse_backend_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
