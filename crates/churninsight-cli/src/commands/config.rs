//! Config command

use anyhow::Result;
use churninsight_core::config::default_config_path;

use super::AppContext;

pub fn cmd_config(ctx: &AppContext) -> Result<()> {
    let c = &ctx.config;

    println!();
    println!("⚙️  ChurnInsight Configuration");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Source:   {}", ctx.source);
    if let Some(path) = default_config_path() {
        println!("   Override: {}", path.display());
    }
    println!("   Session:  {}", ctx.session_path.display());
    println!();

    println!("   API");
    println!("     Base URL:        {}", c.api.base_url);
    println!("     Predict timeout: {}s", c.api.predict_timeout_secs);
    println!("     Read timeout:    {}s", c.api.read_timeout_secs);
    println!();

    println!("   Insights");
    println!(
        "     Risk age band:   {}-{}",
        c.insight.risk_age_min, c.insight.risk_age_max
    );
    println!("     Product overload: {}+", c.insight.product_overload_min);
    println!("     High-risk country: {}", c.insight.high_risk_country);
    println!(
        "     Withdrawal:      > {:.2}",
        c.risk_factors.withdrawal_threshold
    );
    println!();

    println!("   Segments");
    println!(
        "     Premium:         balance > {:.0} or salary > {:.0}",
        c.segments.premium_balance, c.segments.premium_salary
    );
    println!(
        "     Young active:    age < {}, products <= {}",
        c.segments.young_age_below, c.segments.young_products_max
    );
    println!(
        "     Senior:          age > {}, products >= {}",
        c.segments.senior_age_above, c.segments.senior_products_min
    );
    println!();

    println!("   Urgency");
    println!(
        "     Probability > {:.2}: +{}",
        c.urgency.high_probability, c.urgency.high_probability_points
    );
    println!("     Recent inactive:  +{}", c.urgency.recent_inactive_points);
    println!("     Withdrawal:       +{}", c.urgency.withdrawal_points);
    println!("     Complaint:        +{}", c.urgency.complaint_points);
    println!(
        "     Cancellation:     +{}",
        c.urgency.product_cancellation_points
    );
    println!(
        "     Tiers:            immediate > {}, short term > {}",
        c.urgency.immediate_above, c.urgency.short_term_above
    );
    println!();

    println!("   Value model");
    println!(
        "     Rates:           balance {:.2}, salary {:.2}",
        c.value.balance_rate, c.value.salary_rate
    );
    println!("     Recovery rate:   {:.0}%", c.value.recovery_rate * 100.0);
    println!(
        "     Risk levels:     high > {:.2}, moderate > {:.2}",
        c.risk_levels.high_above, c.risk_levels.moderate_above
    );
    println!();
    Ok(())
}
