//! Risk Insight Engine - bundles the five rule sets into one report

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{confidence, CustomerFeatures, PredictionResult, RiskLevel};

use super::types::{
    ActionTimeline, BusinessInsight, CustomerSegment, CustomerValueEstimate, InsightReport,
    RiskFactor, UrgencyScore,
};
use super::{business_insight, customer_value, risk_factors, segment, urgency};

/// Source of churn probabilities
///
/// The engine only interprets a probability; where it comes from is behind
/// this trait (the remote model, or a fixed value for what-if analysis).
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, features: &CustomerFeatures) -> Result<PredictionResult>;
}

/// Offline prediction service that always answers with the same probability
#[derive(Debug, Clone)]
pub struct FixedProbability {
    customer_id: String,
    probability: f64,
}

impl FixedProbability {
    pub fn new(customer_id: impl Into<String>, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::InvalidInput(format!(
                "probability must be between 0 and 1, got {}",
                probability
            )));
        }
        Ok(Self {
            customer_id: customer_id.into(),
            probability,
        })
    }
}

#[async_trait]
impl PredictionService for FixedProbability {
    async fn predict(&self, _features: &CustomerFeatures) -> Result<PredictionResult> {
        Ok(PredictionResult::new(
            self.customer_id.clone(),
            self.probability,
        ))
    }
}

/// Stateless rule engine; the config is read-only thresholds
#[derive(Debug, Clone, Default)]
pub struct RiskInsightEngine {
    config: EngineConfig,
}

impl RiskInsightEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn select_insight(&self, features: &CustomerFeatures) -> BusinessInsight {
        business_insight::select_insight(features, &self.config.insight)
    }

    pub fn enumerate_factors(&self, features: &CustomerFeatures) -> Vec<RiskFactor> {
        risk_factors::enumerate_factors(features, &self.config)
    }

    pub fn classify_segment(&self, features: &CustomerFeatures) -> CustomerSegment {
        segment::classify_segment(features, &self.config.segments)
    }

    pub fn score_urgency(&self, probability: f64, features: &CustomerFeatures) -> UrgencyScore {
        urgency::score_urgency(
            probability,
            features,
            &self.config.urgency,
            &self.config.risk_factors,
        )
    }

    pub fn estimate_value(
        &self,
        features: &CustomerFeatures,
        probability: f64,
    ) -> CustomerValueEstimate {
        customer_value::estimate_value(features, probability, &self.config.value)
    }

    pub fn action_timeline(&self, urgency: &UrgencyScore) -> ActionTimeline {
        urgency::action_timeline(urgency, &self.config.urgency)
    }

    pub fn risk_level(&self, probability: f64) -> RiskLevel {
        let cuts = &self.config.risk_levels;
        RiskLevel::from_probability(probability, cuts.high_above, cuts.moderate_above)
    }

    /// Derive the full report for one prediction. Never fails.
    pub fn evaluate(
        &self,
        features: &CustomerFeatures,
        prediction: &PredictionResult,
    ) -> InsightReport {
        let p = prediction.churn_probability;
        let urgency = self.score_urgency(p, features);
        let action_timeline = self.action_timeline(&urgency);

        InsightReport {
            customer_id: prediction.customer_id.clone(),
            churn_probability: p,
            risk_level: self.risk_level(p),
            confidence: confidence(p),
            business_insight: self.select_insight(features),
            risk_factors: self.enumerate_factors(features),
            segment: self.classify_segment(features),
            urgency,
            customer_value: self.estimate_value(features, p),
            action_timeline,
        }
    }

    /// Validate, predict, evaluate
    pub async fn assess(
        &self,
        service: &dyn PredictionService,
        features: &CustomerFeatures,
    ) -> Result<InsightReport> {
        features.validate()?;
        let prediction = service.predict(features).await?;
        let report = self.evaluate(features, &prediction);

        tracing::info!(
            customer_id = %report.customer_id,
            probability = report.churn_probability,
            risk_level = report.risk_level.as_str(),
            urgency = report.urgency.score,
            "Customer assessed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::{InsightRule, SegmentKind, UrgencyTier};
    use crate::models::tests::stable_customer;

    #[test]
    fn test_evaluate_stable_customer() {
        let engine = RiskInsightEngine::default();
        let report = engine.evaluate(&stable_customer(), &PredictionResult::new("C-1", 0.1));

        assert_eq!(report.customer_id, "C-1");
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.business_insight.rule, InsightRule::Stable);
        assert!(report.risk_factors.is_empty());
        assert!(report.top_factor().is_none());
        assert_eq!(report.segment.kind, SegmentKind::Standard);
        assert_eq!(report.urgency.score, 0);
        assert_eq!(report.action_timeline.tier, UrgencyTier::Maintenance);
        assert!((report.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_critical_customer() {
        let mut c = stable_customer();
        c.age = 52;
        c.recent_inactive = true;
        c.delta_balance = -2000.0;
        c.had_complaint = true;
        c.delta_num_of_products = -1;

        let engine = RiskInsightEngine::default();
        let report = engine.evaluate(&c, &PredictionResult::new("C-9", 0.9));

        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.business_insight.business_cause, "Abandono silencioso");
        assert_eq!(report.urgency.score, 100);
        assert_eq!(report.action_timeline.tier, UrgencyTier::Immediate);
        assert_eq!(report.segment.kind, SegmentKind::CriticalMultifactor);
        assert_eq!(report.top_factor().unwrap().name, "Inactivo en Edad Crítica");
        assert_eq!(report.critical_factor_count(), 3);
    }

    #[test]
    fn test_fixed_probability_rejects_out_of_range() {
        assert!(FixedProbability::new("x", 1.5).is_err());
        assert!(FixedProbability::new("x", -0.1).is_err());
        assert!(FixedProbability::new("x", f64::NAN).is_err());
        assert!(FixedProbability::new("x", 1.0).is_ok());
    }

    #[tokio::test]
    async fn test_assess_offline() {
        let engine = RiskInsightEngine::default();
        let service = FixedProbability::new("offline", 0.55).unwrap();
        let report = engine.assess(&service, &stable_customer()).await.unwrap();
        assert_eq!(report.customer_id, "offline");
        assert_eq!(report.risk_level, RiskLevel::Moderate);
    }

    #[tokio::test]
    async fn test_assess_validates_before_predicting() {
        let engine = RiskInsightEngine::default();
        let service = FixedProbability::new("offline", 0.5).unwrap();
        let mut c = stable_customer();
        c.credit_score = 100;

        let err = engine.assess(&service, &c).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_config_thresholds_flow_through() {
        let mut config = EngineConfig::default();
        config.risk_levels.high_above = 0.5;
        let engine = RiskInsightEngine::new(config);
        assert_eq!(engine.risk_level(0.6), RiskLevel::High);
    }
}
