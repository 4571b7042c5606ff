//! HTTP client for the ChurnInsight backend
//!
//! Only `predict` and `login` surface errors to the caller. Everything else
//! feeds a secondary dashboard panel and degrades to an "unavailable"
//! sentinel instead: the failure is logged at `warn` and never retried.
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config.api).with_session(Session::load(&path)?);
//! let prediction = client.predict(&features).await?;
//! let stats = client.fetch_stats().await; // never fails
//! ```

pub mod types;

pub use types::{
    AnalystPeriodReport, AnalystSummary, Granularity, HistoryEntry, HistoryPage, HistoryPoint,
    KpisData, StatsData,
};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::insights::PredictionService;
use crate::models::{CustomerFeatures, PredictionResult};
use crate::session::Session;

use types::{LoginRequest, LoginResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Days of history requested for a customer trend when none is given
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Backend client carrying an explicit, optional session
#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    predict_timeout: Duration,
    read_timeout: Duration,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: normalize_base_url(&config.base_url),
            predict_timeout: config.predict_timeout(),
            read_timeout: config.read_timeout(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn with_timeouts(mut self, predict: Duration, read: Duration) -> Self {
        self.predict_timeout = predict;
        self.read_timeout = read;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The session, if present and not expired
    fn valid_session(&self) -> Result<&Session> {
        match &self.session {
            None => Err(Error::Session("Not logged in".into())),
            Some(s) if !s.is_valid_at(Utc::now()) => {
                Err(Error::Session("Session expired. Log in again.".into()))
            }
            Some(s) => Ok(s),
        }
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        match session {
            Some(s) => builder.bearer_auth(&s.token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, timeout: Duration) -> Result<Response> {
        builder
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_request(e, timeout))
    }

    async fn read_body(&self, response: Response, timeout: Duration) -> Result<String> {
        response
            .text()
            .await
            .map_err(|e| Error::from_request(e, timeout))
    }

    /// Exchange credentials for a session token
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest { username, password };
        let builder = self.request(Method::POST, "/auth/login", None).json(&body);
        let response = self.send(builder, self.read_timeout).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Session("Invalid credentials".into()));
        }
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
            });
        }

        let text = self.read_body(response, self.read_timeout).await?;
        let login: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| Error::InvalidResponse(format!("login response: {}", e)))?;
        let token = login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidResponse("login response has no token".into()))?;

        info!(username = %username, "Logged in");
        Ok(Session::new(
            token,
            login.username.unwrap_or_else(|| username.to_string()),
        ))
    }

    /// Ask the remote model for a churn probability
    pub async fn predict(&self, features: &CustomerFeatures) -> Result<PredictionResult> {
        features.validate()?;
        let session = self.valid_session()?;

        debug!(url = %format!("{}/churn/predict", self.base_url), "Requesting churn prediction");
        let builder = self
            .request(Method::POST, "/churn/predict", Some(session))
            .json(features);
        let response = self.send(builder, self.predict_timeout).await?;
        check_status(response.status())?;

        let text = self.read_body(response, self.predict_timeout).await?;
        let prediction = parse_prediction(&text)?;
        debug!(
            customer_id = %prediction.customer_id,
            probability = prediction.churn_probability,
            "Prediction received"
        );
        Ok(prediction)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let session = self.valid_session()?;
        let builder = self.request(Method::GET, path, Some(session)).query(query);
        let response = self.send(builder, self.read_timeout).await?;
        check_status(response.status())?;

        let text = self.read_body(response, self.read_timeout).await?;
        serde_json::from_str(&text)
            .map_err(|e| Error::InvalidResponse(format!("{}: {}", path, e)))
    }

    /// Live counters; all-`None` when unavailable or when the backend is empty
    pub async fn fetch_stats(&self) -> StatsData {
        let stats = degrade("stats", self.get_json::<StatsData>("/stats", &[]).await);
        match stats {
            Some(s) if !s.is_all_zero() => s,
            _ => StatsData::unavailable(),
        }
    }

    /// Business KPIs; zeroed when unavailable
    pub async fn fetch_kpis(&self) -> KpisData {
        degrade("kpis", self.get_json("/stats/kpis", &[]).await).unwrap_or_default()
    }

    /// The analyst's own prediction history; empty when unavailable
    pub async fn fetch_history(&self) -> Vec<HistoryEntry> {
        degrade("history", self.get_json("/churn/history", &[]).await).unwrap_or_default()
    }

    /// Probability trend of one customer over the last `days` days
    pub async fn fetch_customer_history(&self, customer_id: &str, days: u32) -> Vec<HistoryPoint> {
        let path = format!("/churn/customer/{}/history", encode_path_segment(customer_id));
        let entries: Vec<HistoryEntry> = degrade(
            "customer history",
            self.get_json(&path, &[("days", days.to_string())]).await,
        )
        .unwrap_or_default();
        entries.iter().map(HistoryPoint::from).collect()
    }

    /// Every stored prediction, newest first (administrators only)
    pub async fn fetch_all_history(&self, page: u32, size: u32) -> HistoryPage {
        let query = [("page", page.to_string()), ("size", size.to_string())];
        degrade(
            "all history",
            self.get_json("/churn/history/all", &query).await,
        )
        .unwrap_or_else(|| HistoryPage {
            current_page: page,
            page_size: size,
            ..Default::default()
        })
    }

    pub async fn fetch_analysts(&self) -> Vec<AnalystSummary> {
        degrade("analysts", self.get_json("/admin/analysts", &[]).await).unwrap_or_default()
    }

    /// Activity of one analyst between two dates (inclusive)
    pub async fn fetch_analyst_report(
        &self,
        username: &str,
        from: NaiveDate,
        to: NaiveDate,
        granularity: Granularity,
    ) -> Vec<AnalystPeriodReport> {
        let query = [
            ("username", username.to_string()),
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("granularity", granularity.as_str().to_string()),
        ];
        degrade(
            "analyst report",
            self.get_json("/admin/report/analyst-period", &query).await,
        )
        .unwrap_or_default()
    }
}

#[async_trait]
impl PredictionService for ApiClient {
    async fn predict(&self, features: &CustomerFeatures) -> Result<PredictionResult> {
        ApiClient::predict(self, features).await
    }
}

/// Log a secondary fetch failure and turn it into "no data"
fn degrade<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(fetch = what, error = %e, "Falling back to empty data");
            None
        }
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        401 | 403 => Err(Error::Session(
            "Session is no longer valid. Log in again to continue.".into(),
        )),
        code => Err(Error::Server { status: code }),
    }
}

/// Validate the prediction body: numeric probability in [0, 1] and a string id
pub(crate) fn parse_prediction(body: &str) -> Result<PredictionResult> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::InvalidResponse(format!("prediction is not JSON: {}", e)))?;

    let probability = value
        .get("churn_probability")
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::InvalidResponse("missing numeric churn_probability".into()))?;
    let customer_id = value
        .get("customer_id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidResponse("missing string customer_id".into()))?;

    if !(0.0..=1.0).contains(&probability) {
        return Err(Error::InvalidResponse(format!(
            "probability {} is outside [0, 1]",
            probability
        )));
    }

    Ok(PredictionResult {
        churn_probability: probability,
        customer_id: customer_id.to_string(),
        prevision: value
            .get("prevision")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

/// Percent-encode one path segment so ids containing `/`, `?` or `#` stay
/// inside it
fn encode_path_segment(segment: &str) -> String {
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return segment.to_string(),
    };
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.clear().push(segment);
        }
        Err(()) => return segment.to_string(),
    }
    url.path().trim_start_matches('/').to_string()
}

/// Repair common base URL misconfigurations
///
/// - empty: the local default
/// - `:8080/api`: host and scheme missing
/// - `localhost:8080/api`, `127.0.0.1/api`: scheme missing
/// - `/api`: relative path, resolved against localhost
pub fn normalize_base_url(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    let local = Regex::new(r"(?i)^(localhost|127\.0\.0\.1)[:/]").expect("valid regex");
    let url = if value.starts_with(':') || value.starts_with('/') {
        format!("http://localhost{}", value)
    } else if local.is_match(value) || value.eq_ignore_ascii_case("localhost") {
        format!("http://{}", value)
    } else {
        value.to_string()
    };

    url.trim_end_matches('/').to_string()
}
