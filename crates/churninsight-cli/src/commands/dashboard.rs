//! Dashboard command (live stats and KPIs)

use anyhow::Result;
use churninsight_core::StatsData;

use super::AppContext;

const PLACEHOLDER: &str = "n/a";

pub async fn cmd_dashboard(ctx: &AppContext) -> Result<()> {
    let client = ctx.require_client()?;

    let (stats, kpis) = tokio::join!(client.fetch_stats(), client.fetch_kpis());

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        📊 ChurnInsight Dashboard        │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    print_stats(&stats);
    println!();
    println!("  📈 Last month");
    println!("     High-risk clients:  {}", kpis.total_high_risk_clients);
    println!("     Capital at risk:    ${:.2}", kpis.capital_at_risk);
    println!("     Model accuracy:     {:.1}%", kpis.accuracy_last_month * 100.0);
    println!("     Predictions:        {}", kpis.total_predictions);
    println!("     Average risk:       {:.1}%", kpis.average_risk * 100.0);
    println!();

    if !stats.is_available() {
        println!("  Live stats unavailable. Run with --verbose for details.");
        println!();
    }
    Ok(())
}

fn print_stats(stats: &StatsData) {
    let or_placeholder = |v: Option<String>| v.unwrap_or_else(|| PLACEHOLDER.to_string());

    println!(
        "  👥 Active users:       {}",
        or_placeholder(stats.active_users.map(|n| n.to_string()))
    );
    println!(
        "  🔁 Retention rate:     {}",
        or_placeholder(stats.retention_rate.map(|r| format!("{:.1}%", r)))
    );
    println!(
        "  🔮 Predictions today:  {}",
        or_placeholder(stats.today_predictions.map(|n| n.to_string()))
    );
}
