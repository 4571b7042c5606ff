//! Administrator commands (analyst list, analyst activity report)

use anyhow::Result;
use chrono::NaiveDate;
use churninsight_core::Granularity;

use super::{truncate, AppContext};

pub async fn cmd_admin_analysts(ctx: &AppContext) -> Result<()> {
    let client = ctx.require_client()?;
    let analysts = client.fetch_analysts().await;

    println!();
    println!("👥 Analysts ({})", analysts.len());
    println!("   ─────────────────────────────────────────────────────────────");

    if analysts.is_empty() {
        println!("   No analysts found (administrator role required)");
        println!();
        return Ok(());
    }

    println!(
        "   {:<16} {:<22} {:>8} {:>8}  {}",
        "USERNAME", "NAME", "ANALYSES", "AVG RISK", "LAST PREDICTION"
    );
    for a in &analysts {
        println!(
            "   {:<16} {:<22} {:>8} {:>8}  {}",
            truncate(&a.username, 16),
            truncate(a.full_name.as_deref().unwrap_or("-"), 22),
            a.total_analyses,
            a.average_churn_probability
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            a.last_prediction_date.as_deref().unwrap_or("-")
        );
    }
    println!();
    Ok(())
}

pub async fn cmd_admin_report(
    ctx: &AppContext,
    username: &str,
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
) -> Result<()> {
    if from > to {
        anyhow::bail!("--from ({}) must not be after --to ({})", from, to);
    }

    let client = ctx.require_client()?;
    let rows = client
        .fetch_analyst_report(username, from, to, granularity)
        .await;

    println!();
    println!(
        "📅 {} - {} activity from {} to {}",
        username, granularity, from, to
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No activity in this period");
        println!();
        return Ok(());
    }

    println!(
        "   {:<8} {:>8} {:>10} {:>9}",
        "PERIOD", "ANALYSES", "HIGH RISK", "AVG RISK"
    );
    for row in &rows {
        println!(
            "   {:<8} {:>8} {:>10} {:>9}",
            row.period_label(),
            row.total_analyses,
            row.high_risk_count,
            row.average_churn_probability
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let total: u64 = rows.iter().map(|r| r.total_analyses).sum();
    let high: u64 = rows.iter().map(|r| r.high_risk_count).sum();
    println!();
    println!("   Total: {} analyses, {} high risk", total, high);
    println!();
    Ok(())
}
