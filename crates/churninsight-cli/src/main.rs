//! ChurnInsight CLI - churn-risk insights for analysts
//!
//! Usage:
//!   churninsight login -u USER          Log in and save the session
//!   churninsight predict --age 45 ...   Predict churn and explain the risk
//!   churninsight analyze -p 0.8 ...     Explain a known probability offline
//!   churninsight batch --file in.csv    Evaluate many customers
//!   churninsight dashboard              Live stats and KPIs

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let ctx = AppContext::load(
        cli.config.as_deref(),
        cli.api_url.as_deref(),
        cli.session.as_deref(),
    )?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::cmd_login(&ctx, &username, password.as_deref()).await
        }
        Commands::Logout => commands::cmd_logout(&ctx),
        Commands::Session => commands::cmd_session(&ctx),
        Commands::Predict { features, json } => {
            commands::cmd_predict(&ctx, features.into(), json).await
        }
        Commands::Analyze {
            features,
            probability,
            customer_id,
            json,
        } => commands::cmd_analyze(&ctx, features.into(), probability, &customer_id, json).await,
        Commands::Batch {
            file,
            output,
            offline,
        } => commands::cmd_batch(&ctx, &file, output.as_deref(), offline).await,
        Commands::Dashboard => commands::cmd_dashboard(&ctx).await,
        Commands::History {
            customer,
            days,
            export,
        } => match customer {
            Some(id) => commands::cmd_customer_history(&ctx, &id, days).await,
            None => commands::cmd_history(&ctx, export.as_deref()).await,
        },
        Commands::HistoryAll { page, size, export } => {
            commands::cmd_history_all(&ctx, page, size, export.as_deref()).await
        }
        Commands::Admin { action } => match action {
            AdminAction::Analysts => commands::cmd_admin_analysts(&ctx).await,
            AdminAction::Report {
                username,
                from,
                to,
                granularity,
            } => commands::cmd_admin_report(&ctx, &username, from, to, granularity).await,
        },
        Commands::Config => commands::cmd_config(&ctx),
    }
}
