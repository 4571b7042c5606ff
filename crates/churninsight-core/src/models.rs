//! Customer and prediction data models
//!
//! `CustomerFeatures` is both the engine input and the body of
//! `POST /churn/predict`, so it serializes with the backend's camelCase names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Country of residence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    France,
    Germany,
    Spain,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::France => "France",
            Country::Germany => "Germany",
            Country::Spain => "Spain",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "france" | "francia" => Ok(Country::France),
            "germany" | "alemania" => Ok(Country::Germany),
            "spain" | "españa" | "espana" => Ok(Country::Spain),
            _ => Err(format!("Unknown country: {}", s)),
        }
    }
}

/// Raw customer attributes collected by the analyst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFeatures {
    pub age: u32,
    pub country: Country,
    pub num_of_products: u32,
    pub is_active_member: bool,
    pub balance: f64,
    pub estimated_salary: f64,
    /// Years with the bank
    pub tenure: u32,
    pub credit_score: u32,
    /// Recent change in balance (negative = money left the bank)
    #[serde(default)]
    pub delta_balance: f64,
    /// Recent change in product count (negative = cancellations)
    #[serde(default)]
    pub delta_num_of_products: i32,
    /// Customer went from active to inactive recently
    #[serde(default)]
    pub recent_inactive: bool,
    #[serde(default)]
    pub product_usage_drop: bool,
    #[serde(default)]
    pub had_complaint: bool,
}

impl CustomerFeatures {
    pub const AGE_RANGE: (u32, u32) = (18, 100);
    pub const CREDIT_SCORE_RANGE: (u32, u32) = (300, 850);
    pub const PRODUCTS_RANGE: (u32, u32) = (1, 10);

    /// Reject out-of-range attributes before anything is sent to the API
    pub fn validate(&self) -> Result<()> {
        check_range("age", self.age, Self::AGE_RANGE)?;
        check_range("creditScore", self.credit_score, Self::CREDIT_SCORE_RANGE)?;
        check_range("numOfProducts", self.num_of_products, Self::PRODUCTS_RANGE)?;

        if !self.balance.is_finite() || self.balance < 0.0 {
            return Err(Error::InvalidInput(format!(
                "balance must be a non-negative amount, got {}",
                self.balance
            )));
        }
        if !self.estimated_salary.is_finite() || self.estimated_salary < 0.0 {
            return Err(Error::InvalidInput(format!(
                "estimatedSalary must be a non-negative amount, got {}",
                self.estimated_salary
            )));
        }
        if !self.delta_balance.is_finite() {
            return Err(Error::InvalidInput("deltaBalance must be a number".into()));
        }

        Ok(())
    }
}

fn check_range(field: &str, value: u32, (min, max): (u32, u32)) -> Result<()> {
    if value < min || value > max {
        return Err(Error::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Output of the external churn model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability in [0, 1]
    pub churn_probability: f64,
    pub customer_id: String,
    /// Optional textual verdict some backend versions attach
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevision: Option<String>,
}

impl PredictionResult {
    pub fn new(customer_id: impl Into<String>, churn_probability: f64) -> Self {
        Self {
            churn_probability,
            customer_id: customer_id.into(),
            prevision: None,
        }
    }

    /// `1 - |p - 0.5| * 2`: 1.0 at p = 0.5, falling to 0.0 at p = 0 or 1
    pub fn confidence(&self) -> f64 {
        confidence(self.churn_probability)
    }
}

/// Confidence shown next to a probability: `1 - |p - 0.5| * 2`
///
/// Peaks at 1.0 for p = 0.5 and drops linearly to 0.0 at either extreme.
pub fn confidence(probability: f64) -> f64 {
    (1.0 - (probability - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

/// Coarse risk band used for colouring and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify a probability with the given (high, moderate) cut points
    pub fn from_probability(probability: f64, high_above: f64, moderate_above: f64) -> Self {
        if probability > high_above {
            RiskLevel::High
        } else if probability > moderate_above {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    /// Label shown to analysts
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Bajo Riesgo",
            RiskLevel::Moderate => "Riesgo Moderado",
            RiskLevel::High => "Alto Riesgo",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Baseline customer that triggers no rule at all
    pub fn stable_customer() -> CustomerFeatures {
        CustomerFeatures {
            age: 30,
            country: Country::France,
            num_of_products: 1,
            is_active_member: false,
            balance: 5_000.0,
            estimated_salary: 40_000.0,
            tenure: 3,
            credit_score: 650,
            delta_balance: 0.0,
            delta_num_of_products: 0,
            recent_inactive: false,
            product_usage_drop: false,
            had_complaint: false,
        }
    }

    #[test]
    fn test_country_parsing() {
        assert_eq!(Country::from_str("Germany").unwrap(), Country::Germany);
        assert_eq!(Country::from_str(" spain ").unwrap(), Country::Spain);
        assert_eq!(Country::from_str("Alemania").unwrap(), Country::Germany);
        assert!(Country::from_str("Italy").is_err());
    }

    #[test]
    fn test_validate_accepts_stable_customer() {
        assert!(stable_customer().validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        let mut c = stable_customer();
        c.age = 17;
        assert!(matches!(c.validate(), Err(Error::InvalidInput(msg)) if msg.contains("age")));

        let mut c = stable_customer();
        c.age = 100;
        assert!(c.validate().is_ok());

        let mut c = stable_customer();
        c.credit_score = 851;
        assert!(matches!(c.validate(), Err(Error::InvalidInput(msg)) if msg.contains("creditScore")));

        let mut c = stable_customer();
        c.num_of_products = 0;
        assert!(c.validate().is_err());

        let mut c = stable_customer();
        c.num_of_products = 11;
        assert!(c.validate().is_err());

        let mut c = stable_customer();
        c.balance = -1.0;
        assert!(c.validate().is_err());

        let mut c = stable_customer();
        c.delta_balance = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_features_wire_format() {
        let json = serde_json::to_value(stable_customer()).unwrap();
        assert_eq!(json["numOfProducts"], 1);
        assert_eq!(json["isActiveMember"], false);
        assert_eq!(json["estimatedSalary"], 40_000.0);
        assert_eq!(json["country"], "France");
        assert!(json.get("num_of_products").is_none());
    }

    #[test]
    fn test_features_deltas_default_when_missing() {
        let json = r#"{
            "age": 45, "country": "Spain", "numOfProducts": 2, "isActiveMember": true,
            "balance": 1000.0, "estimatedSalary": 2000.0, "tenure": 5, "creditScore": 700
        }"#;
        let features: CustomerFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features.delta_num_of_products, 0);
        assert!(!features.had_complaint);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_probability(0.71, 0.7, 0.4), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.7, 0.7, 0.4), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.4, 0.7, 0.4), RiskLevel::Low);
        assert_eq!(RiskLevel::High.label(), "Alto Riesgo");
    }

    #[test]
    fn test_confidence() {
        assert_eq!(confidence(0.5), 1.0);
        assert_eq!(confidence(1.0), 0.0);
        assert_eq!(confidence(0.0), 0.0);
        assert!((confidence(0.75) - 0.5).abs() < 1e-9);
        assert_eq!(PredictionResult::new("C-1", 0.5).confidence(), 1.0);
    }
}
