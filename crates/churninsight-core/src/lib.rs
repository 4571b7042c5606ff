//! ChurnInsight Core Library
//!
//! Shared functionality for the ChurnInsight churn-risk dashboard:
//! - Customer data model and input validation
//! - Risk Insight Engine (business insight, risk factors, segment, urgency, value)
//! - Threshold configuration with embedded defaults
//! - Analyst session handling with local token expiry checks
//! - HTTP client for the prediction, stats, history and admin endpoints
//! - CSV export of reports and history, CSV batch input

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod insights;
pub mod models;
pub mod session;

/// Test utilities including the mock churn backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{
    AnalystPeriodReport, AnalystSummary, ApiClient, Granularity, HistoryEntry, HistoryPage,
    HistoryPoint, KpisData, StatsData,
};
pub use config::{ConfigSource, EngineConfig};
pub use error::{Error, Result};
pub use export::{
    export_history_csv, export_reports_csv, read_features_csv, write_reports_csv, BatchRow,
};
pub use insights::{
    FixedProbability, InsightReport, PredictionService, RiskInsightEngine, UrgencyTier,
};
pub use models::{confidence, Country, CustomerFeatures, PredictionResult, RiskLevel};
pub use session::{is_token_valid, token_expiry, Session};
