//! Prediction commands (predict, analyze, batch)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use churninsight_core::{
    read_features_csv, write_reports_csv, CustomerFeatures, FixedProbability, InsightReport,
    PredictionService, RiskLevel, UrgencyTier,
};

use super::AppContext;

pub async fn cmd_predict(ctx: &AppContext, features: CustomerFeatures, json: bool) -> Result<()> {
    let client = ctx.require_client()?;
    let engine = ctx.engine();

    if !json {
        println!("🔮 Requesting churn prediction...");
    }

    match engine.assess(&client, &features).await {
        Ok(report) => output_report(&report, json),
        Err(e) if e.is_session() => {
            ctx.forget_session();
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_analyze(
    ctx: &AppContext,
    features: CustomerFeatures,
    probability: f64,
    customer_id: &str,
    json: bool,
) -> Result<()> {
    let service = FixedProbability::new(customer_id, probability)?;
    let report = ctx.engine().assess(&service, &features).await?;
    output_report(&report, json)
}

/// Evaluate each row of a CSV file. Rows that fail are logged and skipped;
/// a session failure stops the run.
pub async fn cmd_batch(
    ctx: &AppContext,
    file: &Path,
    output: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let reader = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let rows = read_features_csv(BufReader::new(reader))
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("📥 Evaluating {} customers from {}...", rows.len(), file.display());

    let engine = ctx.engine();
    let client = if offline {
        None
    } else {
        Some(ctx.require_client()?)
    };

    let mut reports = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        let customer_id = row
            .customer_id
            .clone()
            .unwrap_or_else(|| format!("row-{}", row.row));

        let result = match (&client, row.churn_probability) {
            (Some(client), _) => engine.assess(client as &dyn PredictionService, &row.features).await,
            (None, Some(p)) => match FixedProbability::new(customer_id.clone(), p) {
                Ok(service) => engine.assess(&service, &row.features).await,
                Err(e) => Err(e),
            },
            (None, None) => {
                tracing::warn!(row = row.row, "No churnProbability for offline evaluation, skipping");
                skipped += 1;
                continue;
            }
        };

        match result {
            // Online reports keep the backend's customer id
            Ok(report) => reports.push(report),
            Err(e) if e.is_session() => {
                ctx.forget_session();
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!(row = row.row, customer = %customer_id, error = %e, "Skipping row");
                skipped += 1;
            }
        }
    }

    match output {
        Some(path) => {
            let out = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_reports_csv(out, &reports)?;
            println!("✅ Wrote {} reports to {}", reports.len(), path.display());
        }
        None => print_batch_summary(&reports),
    }

    if skipped > 0 {
        println!("   ⚠️  {} rows skipped (see log)", skipped);
    }
    Ok(())
}

fn output_report(report: &InsightReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report);
    }
    Ok(())
}

fn risk_icon(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "🔴",
        RiskLevel::Moderate => "🟡",
        RiskLevel::Low => "🟢",
    }
}

fn tier_label(tier: UrgencyTier) -> &'static str {
    match tier {
        UrgencyTier::Immediate => "Inmediata (0-24h)",
        UrgencyTier::ShortTerm => "Corto plazo (1-4 semanas)",
        UrgencyTier::Maintenance => "Mantenimiento",
    }
}

pub fn print_report(report: &InsightReport) {
    let insight = &report.business_insight;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        📉 ChurnInsight Analysis         │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Customer:      {}", report.customer_id);
    println!(
        "  Churn risk:    {} {:.1}% ({})",
        risk_icon(report.risk_level),
        report.churn_probability * 100.0,
        report.risk_level.label()
    );
    println!("  Confidence:    {:.0}%", report.confidence * 100.0);
    println!();

    println!("💡 {} (prioridad {})", insight.business_cause, insight.priority);
    println!("   Causa técnica: {}", insight.technical_cause);
    println!("   Acción:        {}", insight.suggested_action);
    println!("   Impacto:       {}", insight.estimated_impact);
    println!();

    if report.risk_factors.is_empty() {
        println!("✅ No risk factors detected");
    } else {
        println!("⚠️  Risk factors ({}):", report.risk_factors.len());
        for factor in &report.risk_factors {
            println!(
                "   [{:>8}] {:.2}  {}",
                factor.impact.as_str(),
                factor.value,
                factor.name
            );
            println!("              {}", factor.description);
            println!("              → {}", factor.recommendation);
        }
    }
    println!();

    println!("👤 Segment: {}", report.segment.name);
    for c in &report.segment.characteristics {
        println!("   • {}", c);
    }
    println!("   Strategy: {}", report.segment.retention_strategy);
    println!();

    println!(
        "⏱️  Urgency: {}/100 ({})",
        report.urgency.score,
        tier_label(report.action_timeline.tier)
    );
    if !report.urgency.factors.is_empty() {
        println!("   Drivers: {}", report.urgency.factors.join(", "));
    }
    print_actions("Now", &report.action_timeline.immediate_actions);
    print_actions("Short term", &report.action_timeline.short_term);
    print_actions("Medium term", &report.action_timeline.medium_term);
    println!();

    let value = &report.customer_value;
    println!("💰 Customer value");
    println!("   CLV:            ${:.2}", value.clv);
    println!("   Potential loss: ${:.2}", value.potential_loss);
    println!("   Retention ROI:  ${:.2}", value.retention_roi);
    println!();
}

fn print_actions(label: &str, actions: &[String]) {
    if actions.is_empty() {
        return;
    }
    println!("   {}:", label);
    for a in actions {
        println!("     - {}", a);
    }
}

fn print_batch_summary(reports: &[InsightReport]) {
    println!();
    println!(
        "  {:<14} {:>7} {:>9} {:>7}  {:<26} {}",
        "CUSTOMER", "PROB", "RISK", "URGENCY", "INSIGHT", "SEGMENT"
    );
    println!("  {}", "─".repeat(96));
    for r in reports {
        println!(
            "  {:<14} {:>6.1}% {:>9} {:>7}  {:<26} {}",
            super::truncate(&r.customer_id, 14),
            r.churn_probability * 100.0,
            r.risk_level.as_str(),
            r.urgency.score,
            super::truncate(&r.business_insight.business_cause, 26),
            r.segment.name
        );
    }

    let high = reports
        .iter()
        .filter(|r| r.risk_level == RiskLevel::High)
        .count();
    let at_risk: f64 = reports.iter().map(|r| r.customer_value.potential_loss).sum();
    println!();
    println!(
        "  {} customers, {} high risk, ${:.2} potential loss",
        reports.len(),
        high,
        at_risk
    );
}
