//! Test utilities for churninsight-core
//!
//! Provides a mock ChurnInsight backend that emulates every endpoint the
//! client talks to, with switchable failure modes, plus a helper to mint
//! unsigned JWTs with a chosen expiry.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::api::{
    AnalystPeriodReport, AnalystSummary, HistoryEntry, HistoryPage, KpisData, StatsData,
};

pub const MOCK_USERNAME: &str = "analyst";
pub const MOCK_PASSWORD: &str = "secret123";

/// Mint an unsigned JWT whose payload carries `exp` (seconds since epoch)
pub fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": MOCK_USERNAME, "exp": exp }).to_string());
    format!("{}.{}.mock-signature", header, payload)
}

/// A token valid for the next hour
pub fn fresh_token() -> String {
    make_token(chrono::Utc::now().timestamp() + 3600)
}

/// How the mock backend answers
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Answer every data endpoint with this status instead of a body
    pub force_status: Option<u16>,
    /// Sleep before answering
    pub delay: Option<Duration>,
    /// Answer predict with a body of the wrong shape
    pub malformed: bool,
    pub probability: f64,
    pub customer_id: String,
    pub stats: StatsData,
    pub kpis: KpisData,
    pub history: Vec<HistoryEntry>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            force_status: None,
            delay: None,
            malformed: false,
            probability: 0.73,
            customer_id: "CUST-0001".to_string(),
            stats: StatsData {
                active_users: Some(120),
                retention_rate: Some(84.5),
                today_predictions: Some(7),
            },
            kpis: KpisData {
                total_high_risk_clients: 12,
                capital_at_risk: 1_250_000.0,
                accuracy_last_month: 0.87,
                total_predictions: 340,
                average_risk: 0.41,
            },
            history: sample_history(),
        }
    }
}

fn sample_history() -> Vec<HistoryEntry> {
    vec![
        HistoryEntry {
            id: Some(2),
            customer_id: "CUST-0001".into(),
            churn_probability: 0.73,
            num_of_products: Some(3),
            prediction_date: "2024-03-02T09:15:00".into(),
            balance: Some(85_000.0),
            estimated_salary: Some(62_000.0),
            country: Some("Germany".into()),
            tenure: Some(6),
            is_active_member: Some(false),
        },
        HistoryEntry {
            id: Some(1),
            customer_id: "CUST-0001".into(),
            churn_probability: 0.58,
            num_of_products: Some(3),
            prediction_date: "2024-02-20T16:40:00".into(),
            balance: Some(91_000.0),
            estimated_salary: Some(62_000.0),
            country: Some("Germany".into()),
            tenure: Some(6),
            is_active_member: Some(true),
        },
    ]
}

#[derive(Clone)]
struct MockState {
    behavior: Arc<Mutex<MockBehavior>>,
    requests: Arc<AtomicUsize>,
}

impl MockState {
    fn behavior(&self) -> MockBehavior {
        self.behavior.lock().unwrap().clone()
    }
}

/// Mock ChurnInsight backend for tests
pub struct MockChurnApi {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChurnApi {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockBehavior::default()).await
    }

    pub async fn start_with(behavior: MockBehavior) -> Self {
        let state = MockState {
            behavior: Arc::new(Mutex::new(behavior)),
            requests: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/api/auth/login", post(handle_login))
            .route("/api/churn/predict", post(handle_predict))
            .route("/api/churn/history", get(handle_history))
            .route("/api/churn/history/all", get(handle_history_all))
            .route("/api/churn/customer/:id/history", get(handle_customer_history))
            .route("/api/stats", get(handle_stats))
            .route("/api/stats/kpis", get(handle_kpis))
            .route("/api/admin/analysts", get(handle_analysts))
            .route("/api/admin/report/analyst-period", get(handle_analyst_report))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL including the `/api` prefix
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Change behavior while the server runs
    pub fn update(&self, f: impl FnOnce(&mut MockBehavior)) {
        f(&mut self.state.behavior.lock().unwrap());
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChurnApi {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Common prelude of every data endpoint: count, delay, auth, forced status
async fn guard(state: &MockState, headers: &HeaderMap) -> Result<MockBehavior, Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let behavior = state.behavior();

    if let Some(delay) = behavior.delay {
        tokio::time::sleep(delay).await;
    }

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    if !authorized {
        return Err((StatusCode::UNAUTHORIZED, "missing token").into_response());
    }

    if let Some(code) = behavior.force_status {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err((status, "forced").into_response());
    }

    Ok(behavior)
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn handle_login(State(state): State<MockState>, Json(body): Json<LoginBody>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if body.username == MOCK_USERNAME && body.password == MOCK_PASSWORD {
        Json(json!({
            "token": fresh_token(),
            "username": body.username,
            "message": "Autenticación exitosa",
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Credenciales inválidas" })),
        )
            .into_response()
    }
}

async fn handle_predict(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(_features): Json<Value>,
) -> Response {
    let behavior = match guard(&state, &headers).await {
        Ok(b) => b,
        Err(response) => return response,
    };

    if behavior.malformed {
        return Json(json!({ "churn_probability": "high", "customer_id": 17 })).into_response();
    }

    Json(json!({
        "churn_probability": behavior.probability,
        "customer_id": behavior.customer_id,
    }))
    .into_response()
}

async fn handle_stats(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match guard(&state, &headers).await {
        Ok(b) => Json(b.stats).into_response(),
        Err(response) => response,
    }
}

async fn handle_kpis(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match guard(&state, &headers).await {
        Ok(b) => Json(b.kpis).into_response(),
        Err(response) => response,
    }
}

async fn handle_history(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match guard(&state, &headers).await {
        Ok(b) => Json(b.history).into_response(),
        Err(response) => response,
    }
}

async fn handle_customer_history(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    match guard(&state, &headers).await {
        Ok(b) => {
            let entries: Vec<HistoryEntry> = b
                .history
                .into_iter()
                .filter(|e| e.customer_id == id)
                .collect();
            Json(entries).into_response()
        }
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
    size: Option<u32>,
}

async fn handle_history_all(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    match guard(&state, &headers).await {
        Ok(b) => {
            let page = query.page.unwrap_or(0);
            let size = query.size.unwrap_or(100).max(1);
            let total = b.history.len();
            let content: Vec<HistoryEntry> = b
                .history
                .into_iter()
                .skip((page * size) as usize)
                .take(size as usize)
                .collect();
            Json(HistoryPage {
                content,
                total_elements: total as u64,
                total_pages: total.div_ceil(size as usize) as u32,
                current_page: page,
                page_size: size,
            })
            .into_response()
        }
        Err(response) => response,
    }
}

async fn handle_analysts(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match guard(&state, &headers).await {
        Ok(_) => Json(vec![AnalystSummary {
            username: MOCK_USERNAME.into(),
            full_name: Some("Ana Analista".into()),
            email: Some("ana@example.com".into()),
            total_analyses: 42,
            last_prediction_date: Some("2024-03-02T09:15:00".into()),
            average_churn_probability: Some(0.44),
        }])
        .into_response(),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct ReportQuery {
    username: String,
    from: String,
    to: String,
    granularity: Option<String>,
}

async fn handle_analyst_report(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Response {
    if let Err(response) = guard(&state, &headers).await {
        return response;
    }

    let valid_dates = chrono::NaiveDate::parse_from_str(&query.from, "%Y-%m-%d").is_ok()
        && chrono::NaiveDate::parse_from_str(&query.to, "%Y-%m-%d").is_ok();
    if !valid_dates || query.username.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let yearly = query
        .granularity
        .as_deref()
        .is_some_and(|g| g.eq_ignore_ascii_case("yearly"));
    let rows = if yearly {
        vec![AnalystPeriodReport {
            year: 2024,
            month: None,
            total_analyses: 42,
            high_risk_count: 9,
            average_churn_probability: Some(0.44),
        }]
    } else {
        vec![
            AnalystPeriodReport {
                year: 2024,
                month: Some(2),
                total_analyses: 18,
                high_risk_count: 3,
                average_churn_probability: Some(0.39),
            },
            AnalystPeriodReport {
                year: 2024,
                month: Some(3),
                total_analyses: 24,
                high_risk_count: 6,
                average_churn_probability: Some(0.48),
            },
        ]
    };
    Json(rows).into_response()
}
