//! Spreadsheet export and batch input
//!
//! Reports are flattened into one CSV row per customer. Batch input uses the
//! same camelCase column names as the predict request body, plus optional
//! `customerId` and `churnProbability` columns.

use std::io::{Read, Write};
use std::str::FromStr;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::HistoryEntry;
use crate::error::{Error, Result};
use crate::insights::InsightReport;
use crate::models::{Country, CustomerFeatures};

/// Flat projection of an `InsightReport`
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    customer_id: &'a str,
    churn_probability: f64,
    risk_level: &'static str,
    confidence: f64,
    urgency_score: u32,
    urgency_tier: &'static str,
    business_cause: &'a str,
    priority: &'static str,
    segment: &'a str,
    clv: f64,
    potential_loss: f64,
    retention_roi: f64,
    top_factor: &'a str,
    factor_count: usize,
}

impl<'a> From<&'a InsightReport> for ReportRow<'a> {
    fn from(r: &'a InsightReport) -> Self {
        Self {
            customer_id: &r.customer_id,
            churn_probability: r.churn_probability,
            risk_level: r.risk_level.as_str(),
            confidence: r.confidence,
            urgency_score: r.urgency.score,
            urgency_tier: r.action_timeline.tier.as_str(),
            business_cause: &r.business_insight.business_cause,
            priority: r.business_insight.priority.as_str(),
            segment: &r.segment.name,
            clv: round2(r.customer_value.clv),
            potential_loss: round2(r.customer_value.potential_loss),
            retention_roi: round2(r.customer_value.retention_roi),
            top_factor: r.top_factor().map(|f| f.name.as_str()).unwrap_or(""),
            factor_count: r.risk_factors.len(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Write reports as CSV (with header) to any writer
pub fn write_reports_csv<W: Write>(writer: W, reports: &[InsightReport]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for report in reports {
        wtr.serialize(ReportRow::from(report))?;
    }
    wtr.flush()?;
    debug!(rows = reports.len(), "Exported insight reports");
    Ok(())
}

/// Export reports to a CSV string
pub fn export_reports_csv(reports: &[InsightReport]) -> Result<String> {
    let mut buf = Vec::new();
    write_reports_csv(&mut buf, reports)?;
    into_string(buf)
}

/// Export prediction history to a CSV string
pub fn export_history_csv(entries: &[HistoryEntry]) -> Result<String> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for entry in entries {
        wtr.serialize(entry)?;
    }
    let buf = wtr
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    into_string(buf)
}

fn into_string(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf).map_err(|e| Error::InvalidInput(format!("CSV is not UTF-8: {}", e)))
}

/// One customer from a batch file
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub customer_id: Option<String>,
    /// Known probability for offline evaluation
    pub churn_probability: Option<f64>,
    pub features: CustomerFeatures,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBatchRow {
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    churn_probability: Option<f64>,
    age: u32,
    country: String,
    num_of_products: u32,
    is_active_member: bool,
    balance: f64,
    estimated_salary: f64,
    tenure: u32,
    credit_score: u32,
    #[serde(default)]
    delta_balance: Option<f64>,
    #[serde(default)]
    delta_num_of_products: Option<i32>,
    #[serde(default)]
    recent_inactive: Option<bool>,
    #[serde(default)]
    product_usage_drop: Option<bool>,
    #[serde(default)]
    had_complaint: Option<bool>,
}

impl RawBatchRow {
    fn into_batch_row(self, row: usize) -> Result<BatchRow> {
        let country = Country::from_str(&self.country)
            .map_err(|e| Error::InvalidInput(format!("row {}: {}", row, e)))?;

        Ok(BatchRow {
            row,
            customer_id: self.customer_id.filter(|id| !id.trim().is_empty()),
            churn_probability: self.churn_probability,
            features: CustomerFeatures {
                age: self.age,
                country,
                num_of_products: self.num_of_products,
                is_active_member: self.is_active_member,
                balance: self.balance,
                estimated_salary: self.estimated_salary,
                tenure: self.tenure,
                credit_score: self.credit_score,
                delta_balance: self.delta_balance.unwrap_or(0.0),
                delta_num_of_products: self.delta_num_of_products.unwrap_or(0),
                recent_inactive: self.recent_inactive.unwrap_or(false),
                product_usage_drop: self.product_usage_drop.unwrap_or(false),
                had_complaint: self.had_complaint.unwrap_or(false),
            },
        })
    }
}

/// Parse a batch file. Rows are not validated here; a malformed cell fails
/// the whole file with its row number.
pub fn read_features_csv<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<RawBatchRow>().enumerate() {
        let raw = result.map_err(|e| Error::InvalidInput(format!("row {}: {}", i + 1, e)))?;
        rows.push(raw.into_batch_row(i + 1)?);
    }

    debug!(rows = rows.len(), "Read batch input");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::RiskInsightEngine;
    use crate::models::tests::stable_customer;
    use crate::models::PredictionResult;

    const BATCH: &str = "\
customerId,age,country,numOfProducts,isActiveMember,balance,estimatedSalary,tenure,creditScore,churnProbability,deltaBalance,hadComplaint
C-1,45,France,1,false,1000,50000,5,600,0.8,,
C-2,30,Alemania,2,true,250000,60000,10,720,,-5000,true
";

    #[test]
    fn test_read_features_csv() {
        let rows = read_features_csv(BATCH.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].customer_id.as_deref(), Some("C-1"));
        assert_eq!(rows[0].churn_probability, Some(0.8));
        assert_eq!(rows[0].features.delta_balance, 0.0);
        assert!(!rows[0].features.had_complaint);

        assert_eq!(rows[1].features.country, Country::Germany);
        assert_eq!(rows[1].churn_probability, None);
        assert_eq!(rows[1].features.delta_balance, -5000.0);
        assert!(rows[1].features.had_complaint);
        assert!(!rows[1].features.recent_inactive);
    }

    #[test]
    fn test_read_features_csv_reports_bad_row() {
        let csv = "\
age,country,numOfProducts,isActiveMember,balance,estimatedSalary,tenure,creditScore
45,France,1,false,1000,50000,5,600
abc,France,1,false,1000,50000,5,600
";
        let err = read_features_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));

        let csv = "\
age,country,numOfProducts,isActiveMember,balance,estimatedSalary,tenure,creditScore
45,Italy,1,false,1000,50000,5,600
";
        let err = read_features_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Unknown country"));
    }

    #[test]
    fn test_export_reports_csv() {
        let engine = RiskInsightEngine::default();
        let mut risky = stable_customer();
        risky.age = 50;
        risky.had_complaint = true;

        let reports = vec![
            engine.evaluate(&stable_customer(), &PredictionResult::new("C-1", 0.2)),
            engine.evaluate(&risky, &PredictionResult::new("C-2", 0.9)),
        ];
        let csv = export_reports_csv(&reports).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("customer_id,churn_probability,risk_level"));
        assert!(lines[1].starts_with("C-1,0.2,low,"));
        assert!(lines[2].contains("Abandono silencioso"));
        assert!(lines[2].contains("Inactivo en Edad Crítica"));
    }

    #[test]
    fn test_export_history_csv() {
        let entries = vec![HistoryEntry {
            id: Some(1),
            customer_id: "C-1".into(),
            churn_probability: 0.35,
            prediction_date: "2024-03-05T10:00:00".into(),
            country: Some("Spain".into()),
            ..Default::default()
        }];
        let csv = export_history_csv(&entries).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,customerId,churnProbability,numOfProducts,predictionDate,balance,estimatedSalary,country,tenure,isActiveMember"
        );
        assert_eq!(lines.next().unwrap(), "1,C-1,0.35,,2024-03-05T10:00:00,,,Spain,,");
    }
}
