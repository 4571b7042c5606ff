//! Core types for the Risk Insight Engine
//!
//! All of these are derived values: recomputed from scratch for every
//! evaluation and never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::RiskLevel;

/// Impact tier of a risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
            Impact::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Impact::Low => 1,
            Impact::Medium => 2,
            Impact::High => 3,
            Impact::Critical => 4,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Impact::Low),
            "medium" => Ok(Impact::Medium),
            "high" => Ok(Impact::High),
            "critical" => Ok(Impact::Critical),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

/// Priority attached to the business insight headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightPriority {
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl InsightPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightPriority::Low => "baja",
            InsightPriority::Medium => "media",
            InsightPriority::High => "alta",
        }
    }
}

impl fmt::Display for InsightPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which cascade rule produced the business insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightRule {
    /// Inactive member inside the risk age band
    InactiveInRiskAge,
    /// Too many products
    ProductSaturation,
    /// Resident of the high-risk country
    RegionalSensitivity,
    /// Inside the risk age band, active or not
    LifeCycle,
    /// Nothing matched
    Stable,
}

/// A single detected risk condition with its fixed severity weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Severity weight in [0, 1]; not a probability
    pub value: f64,
    pub impact: Impact,
    pub description: String,
    pub recommendation: String,
}

/// The one headline explanation selected for a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessInsight {
    pub rule: InsightRule,
    #[serde(rename = "causalTecnica")]
    pub technical_cause: String,
    #[serde(rename = "causalNegocio")]
    pub business_cause: String,
    #[serde(rename = "accionSugerida")]
    pub suggested_action: String,
    #[serde(rename = "prioridad")]
    pub priority: InsightPriority,
    #[serde(rename = "impactoEstimado")]
    pub estimated_impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Premium,
    CriticalMultifactor,
    YoungActive,
    SeniorEstablished,
    Standard,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Premium => "premium",
            SegmentKind::CriticalMultifactor => "critical_multifactor",
            SegmentKind::YoungActive => "young_active",
            SegmentKind::SeniorEstablished => "senior_established",
            SegmentKind::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub kind: SegmentKind,
    pub name: String,
    pub characteristics: Vec<String>,
    pub retention_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyScore {
    /// Clamped to [0, 100]
    pub score: u32,
    /// Labels of the conditions that contributed points, in rule order
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerValueEstimate {
    pub clv: f64,
    pub potential_loss: f64,
    pub retention_roi: f64,
}

/// Intervention tier chosen from the urgency score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    /// Actions within hours
    Immediate,
    /// Actions within days to weeks
    ShortTerm,
    /// Regular relationship maintenance
    Maintenance,
}

impl UrgencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Immediate => "immediate",
            UrgencyTier::ShortTerm => "short_term",
            UrgencyTier::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTimeline {
    pub tier: UrgencyTier,
    pub immediate_actions: Vec<String>,
    pub short_term: Vec<String>,
    pub medium_term: Vec<String>,
}

/// Everything the engine derives for one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub customer_id: String,
    pub churn_probability: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub business_insight: BusinessInsight,
    /// Sorted by `value`, highest first
    pub risk_factors: Vec<RiskFactor>,
    pub segment: CustomerSegment,
    pub urgency: UrgencyScore,
    pub customer_value: CustomerValueEstimate,
    pub action_timeline: ActionTimeline,
}

impl InsightReport {
    /// The heaviest risk factor, if any was detected
    pub fn top_factor(&self) -> Option<&RiskFactor> {
        self.risk_factors.first()
    }

    /// Number of factors at `Critical` impact
    pub fn critical_factor_count(&self) -> usize {
        self.risk_factors
            .iter()
            .filter(|f| f.impact == Impact::Critical)
            .count()
    }
}
