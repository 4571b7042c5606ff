//! Integration tests for churninsight-core
//!
//! These tests exercise the full login → predict → evaluate workflow against
//! the mock backend, and the documented business scenarios end to end.

use std::time::Duration;

use chrono::NaiveDate;
use churninsight_core::{
    api::DEFAULT_HISTORY_DAYS,
    config::ApiConfig,
    insights::{InsightPriority, SegmentKind, UrgencyTier},
    test_utils::{make_token, MockBehavior, MockChurnApi, MOCK_PASSWORD, MOCK_USERNAME},
    ApiClient, Country, CustomerFeatures, EngineConfig, Error, Granularity, KpisData,
    PredictionResult, RiskInsightEngine, RiskLevel, Session, StatsData,
};

fn customer() -> CustomerFeatures {
    CustomerFeatures {
        age: 45,
        country: Country::France,
        num_of_products: 1,
        is_active_member: false,
        balance: 200_000.0,
        estimated_salary: 50_000.0,
        tenure: 24,
        credit_score: 640,
        delta_balance: 0.0,
        delta_num_of_products: 0,
        recent_inactive: false,
        product_usage_drop: false,
        had_complaint: false,
    }
}

fn client_for(mock: &MockChurnApi) -> ApiClient {
    let config = ApiConfig {
        base_url: mock.url(),
        ..Default::default()
    };
    ApiClient::new(&config)
}

async fn logged_in_client(mock: &MockChurnApi) -> ApiClient {
    let client = client_for(mock);
    let session = client
        .login(MOCK_USERNAME, MOCK_PASSWORD)
        .await
        .expect("login should succeed");
    client.with_session(Some(session))
}

// =============================================================================
// Business scenarios
// =============================================================================

#[test]
fn test_scenario_inactive_in_risk_age() {
    let engine = RiskInsightEngine::default();
    let mut c = customer();

    for products in [1, 3, 5] {
        c.num_of_products = products;
        let insight = engine.select_insight(&c);
        assert_eq!(insight.business_cause, "Abandono silencioso");
        assert_eq!(insight.priority, InsightPriority::High);
    }
}

#[test]
fn test_scenario_product_saturation() {
    let engine = RiskInsightEngine::default();
    let mut c = customer();
    c.is_active_member = true;
    c.num_of_products = 5;

    assert_eq!(engine.select_insight(&c).business_cause, "Saturación de cartera");
}

#[test]
fn test_scenario_customer_value() {
    let engine = RiskInsightEngine::default();
    let mut c = customer();
    c.num_of_products = 2;

    let value = engine.estimate_value(&c, 0.5);
    assert!((value.clv - 34_000.0).abs() < 1e-6);
    assert!((value.potential_loss - 17_000.0).abs() < 1e-6);
    assert!((value.retention_roi - 13_600.0).abs() < 1e-6);
}

#[test]
fn test_scenario_maximum_urgency() {
    let engine = RiskInsightEngine::default();
    let mut c = customer();
    c.recent_inactive = true;
    c.delta_balance = -2000.0;
    c.had_complaint = true;
    c.delta_num_of_products = -1;

    let urgency = engine.score_urgency(0.9, &c);
    assert_eq!(urgency.score, 100);

    let timeline = engine.action_timeline(&urgency);
    assert_eq!(timeline.tier, UrgencyTier::Immediate);
    assert!(timeline.medium_term.is_empty());
}

#[test]
fn test_embedded_config_drives_engine() {
    let config = EngineConfig::embedded().unwrap();
    let engine = RiskInsightEngine::new(config);
    let report = engine.evaluate(&customer(), &PredictionResult::new("C-1", 0.75));

    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.segment.kind, SegmentKind::Premium);
}

// =============================================================================
// API workflow against the mock backend
// =============================================================================

#[tokio::test]
async fn test_login_and_assess() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;
    assert_eq!(client.session().unwrap().username, MOCK_USERNAME);

    let engine = RiskInsightEngine::default();
    let report = engine.assess(&client, &customer()).await.unwrap();

    assert_eq!(report.customer_id, "CUST-0001");
    assert_eq!(report.churn_probability, 0.73);
    assert_eq!(report.risk_level, RiskLevel::High);
    assert_eq!(report.business_insight.business_cause, "Abandono silencioso");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let mock = MockChurnApi::start().await;
    let err = client_for(&mock)
        .login(MOCK_USERNAME, "wrong")
        .await
        .unwrap_err();
    assert!(err.is_session());
}

#[tokio::test]
async fn test_invalid_input_sends_nothing() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;
    let before = mock.request_count();

    let mut c = customer();
    c.age = 12;
    let err = client.predict(&c).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(mock.request_count(), before);
}

#[tokio::test]
async fn test_expired_session_is_rejected_locally() {
    let mock = MockChurnApi::start().await;
    let expired = Session::new(make_token(chrono::Utc::now().timestamp() - 60), "ana");
    let client = client_for(&mock).with_session(Some(expired));

    let err = client.predict(&customer()).await.unwrap_err();
    assert!(err.is_session());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_unauthorized_maps_to_session_error() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    for status in [401, 403] {
        mock.update(|b| b.force_status = Some(status));
        let err = client.predict(&customer()).await.unwrap_err();
        assert!(err.is_session(), "status {} should be a session error", status);
    }
}

#[tokio::test]
async fn test_server_errors_carry_status() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    mock.update(|b| b.force_status = Some(400));
    let err = client.predict(&customer()).await.unwrap_err();
    assert!(matches!(err, Error::Server { status: 400 }));
    assert!(err.to_string().contains("Invalid input data"));

    mock.update(|b| b.force_status = Some(503));
    let err = client.predict(&customer()).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 503");
}

#[tokio::test]
async fn test_response_shape_errors() {
    let mock = MockChurnApi::start_with(MockBehavior {
        malformed: true,
        ..Default::default()
    })
    .await;
    let client = logged_in_client(&mock).await;

    let err = client.predict(&customer()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));

    mock.update(|b| {
        b.malformed = false;
        b.probability = 1.5;
    });
    let err = client.predict(&customer()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(ref msg) if msg.contains("outside")));
}

#[tokio::test]
async fn test_predict_timeout() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock)
        .await
        .with_timeouts(Duration::from_millis(100), Duration::from_millis(100));
    mock.update(|b| b.delay = Some(Duration::from_millis(500)));

    let err = client.predict(&customer()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1/api".into(),
        ..Default::default()
    };
    let session = Session::new(make_token(chrono::Utc::now().timestamp() + 600), "ana");
    let client = ApiClient::new(&config).with_session(Some(session));

    let err = client.predict(&customer()).await.unwrap_err();
    assert!(err.is_network());
}

// =============================================================================
// Secondary panels
// =============================================================================

#[tokio::test]
async fn test_dashboard_fetches() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    let stats = client.fetch_stats().await;
    assert_eq!(stats.active_users, Some(120));
    assert_eq!(stats.today_predictions, Some(7));

    let kpis = client.fetch_kpis().await;
    assert_eq!(kpis.total_high_risk_clients, 12);

    let history = client.fetch_history().await;
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_all_zero_stats_are_unavailable() {
    let mock = MockChurnApi::start_with(MockBehavior {
        stats: StatsData {
            active_users: Some(0),
            retention_rate: Some(0.0),
            today_predictions: Some(0),
        },
        ..Default::default()
    })
    .await;
    let client = logged_in_client(&mock).await;

    assert!(!client.fetch_stats().await.is_available());
}

#[tokio::test]
async fn test_secondary_fetches_degrade_on_errors() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    mock.update(|b| b.force_status = Some(403));
    assert_eq!(client.fetch_stats().await, StatsData::unavailable());
    assert_eq!(client.fetch_kpis().await, KpisData::default());
    assert!(client.fetch_history().await.is_empty());
    assert!(client.fetch_analysts().await.is_empty());

    mock.update(|b| {
        b.force_status = None;
        b.delay = Some(Duration::from_millis(500));
    });
    let slow = client
        .clone()
        .with_timeouts(Duration::from_secs(5), Duration::from_millis(100));
    assert!(slow
        .fetch_customer_history("CUST-0001", DEFAULT_HISTORY_DAYS)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_customer_history_points() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    let points = client
        .fetch_customer_history("CUST-0001", DEFAULT_HISTORY_DAYS)
        .await;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 3, 2));
    assert_eq!(points[0].probability, 0.73);

    assert!(client.fetch_customer_history("NOPE", 7).await.is_empty());
}

#[tokio::test]
async fn test_customer_history_id_with_reserved_characters() {
    let mock = MockChurnApi::start().await;
    mock.update(|b| {
        for entry in &mut b.history {
            entry.customer_id = "A/B?1".into();
        }
    });
    let client = logged_in_client(&mock).await;

    let points = client
        .fetch_customer_history("A/B?1", DEFAULT_HISTORY_DAYS)
        .await;
    assert_eq!(points.len(), 2);
    assert!(client.fetch_customer_history("A", 7).await.is_empty());
}

#[tokio::test]
async fn test_admin_endpoints() {
    let mock = MockChurnApi::start().await;
    let client = logged_in_client(&mock).await;

    let page = client.fetch_all_history(0, 1).await;
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);

    let analysts = client.fetch_analysts().await;
    assert_eq!(analysts[0].username, MOCK_USERNAME);

    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let monthly = client
        .fetch_analyst_report(MOCK_USERNAME, from, to, Granularity::Monthly)
        .await;
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[1].period_label(), "2024-03");

    let yearly = client
        .fetch_analyst_report(MOCK_USERNAME, from, to, Granularity::Yearly)
        .await;
    assert_eq!(yearly.len(), 1);
    assert_eq!(yearly[0].month, None);
}
