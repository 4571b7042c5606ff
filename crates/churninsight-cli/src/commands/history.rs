//! History commands (own history, customer trend, full paged history)

use std::path::Path;

use anyhow::{Context, Result};
use churninsight_core::{export_history_csv, HistoryEntry};

use super::{truncate, AppContext};

pub async fn cmd_history(ctx: &AppContext, export: Option<&Path>) -> Result<()> {
    let client = ctx.require_client()?;
    let entries = client.fetch_history().await;

    if let Some(path) = export {
        return write_export(path, &entries);
    }

    println!();
    println!("🕘 Prediction history ({} entries)", entries.len());
    println!("   ─────────────────────────────────────────────────────────────");
    print_entries(&entries);
    Ok(())
}

pub async fn cmd_customer_history(ctx: &AppContext, customer_id: &str, days: u32) -> Result<()> {
    let client = ctx.require_client()?;
    let points = client.fetch_customer_history(customer_id, days).await;

    println!();
    println!("📉 {} - last {} days", customer_id, days);
    println!("   ─────────────────────────────────────────────────────────────");

    if points.is_empty() {
        println!("   No predictions in this period");
        println!();
        return Ok(());
    }

    for point in &points {
        let date = point
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string());
        let bar_len = (point.probability * 40.0).round().clamp(0.0, 40.0) as usize;
        println!(
            "   {}  {:>5.1}%  {}",
            date,
            point.probability * 100.0,
            "█".repeat(bar_len)
        );
    }

    // Newest first
    if let (Some(oldest), Some(newest)) = (points.last(), points.first()) {
        let change = (newest.probability - oldest.probability) * 100.0;
        println!();
        println!("   Change over period: {:+.1} points", change);
    }
    println!();
    Ok(())
}

pub async fn cmd_history_all(
    ctx: &AppContext,
    page: u32,
    size: u32,
    export: Option<&Path>,
) -> Result<()> {
    let client = ctx.require_client()?;
    let history = client.fetch_all_history(page, size).await;

    if let Some(path) = export {
        return write_export(path, &history.content);
    }

    println!();
    println!(
        "🗂️  All predictions - page {} of {} ({} total)",
        history.current_page + 1,
        history.total_pages.max(1),
        history.total_elements
    );
    println!("   ─────────────────────────────────────────────────────────────");
    print_entries(&history.content);
    Ok(())
}

fn write_export(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    let csv = export_history_csv(entries)?;
    std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Exported {} entries to {}", entries.len(), path.display());
    Ok(())
}

fn print_entries(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("   No predictions found");
        println!();
        return;
    }

    println!(
        "   {:<17} {:<14} {:>7} {:>9} {:<8}",
        "DATE", "CUSTOMER", "PROB", "PRODUCTS", "COUNTRY"
    );
    for entry in entries {
        let date = entry
            .predicted_at()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| truncate(&entry.prediction_date, 16));
        println!(
            "   {:<17} {:<14} {:>6.1}% {:>9} {:<8}",
            date,
            truncate(&entry.customer_id, 14),
            entry.churn_probability * 100.0,
            entry
                .num_of_products
                .map(|n| n.to_string())
                .unwrap_or_default(),
            entry.country.as_deref().unwrap_or("")
        );
    }
    println!();
}
