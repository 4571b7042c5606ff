//! Risk Insight Engine - turns a churn probability into retention guidance
//!
//! A churn model only answers "how likely is this customer to leave". The
//! engine adds the rest: why, what kind of customer this is, how urgent an
//! intervention is, and how much money is at stake.
//!
//! ## Rule sets
//!
//! - **Business Insight Selector** - one headline explanation, first match wins
//! - **Risk Factor Enumerator** - every independent risk condition, heaviest first
//! - **Segment Classifier** - one of five fixed segments, first match wins
//! - **Urgency Scorer** - additive 0-100 score plus a fixed action timeline
//! - **Customer Value Estimator** - CLV, potential loss and retention ROI
//!
//! Every rule set is a pure function of the customer's features (and the
//! probability where needed). Nothing here touches the network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use churninsight_core::insights::{FixedProbability, RiskInsightEngine};
//!
//! let engine = RiskInsightEngine::new(config);
//! let report = engine.assess(&api_client, &features).await?;
//! println!("{}", report.business_insight.business_cause);
//! ```

pub mod business_insight;
pub mod customer_value;
pub mod engine;
pub mod risk_factors;
pub mod segment;
pub mod types;
pub mod urgency;

pub use business_insight::select_insight;
pub use customer_value::estimate_value;
pub use engine::{FixedProbability, PredictionService, RiskInsightEngine};
pub use risk_factors::enumerate_factors;
pub use segment::classify_segment;
pub use types::{
    ActionTimeline, BusinessInsight, CustomerSegment, CustomerValueEstimate, Impact,
    InsightPriority, InsightReport, InsightRule, RiskFactor, SegmentKind, UrgencyScore,
    UrgencyTier,
};
pub use urgency::{action_timeline, score_urgency, urgency_tier};
