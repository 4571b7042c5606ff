//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use churninsight_core::api::DEFAULT_HISTORY_DAYS;
use churninsight_core::{Country, CustomerFeatures, Granularity};
use clap::{Args, Parser, Subcommand};

/// ChurnInsight - Explain churn risk and plan retention
#[derive(Parser)]
#[command(name = "churninsight")]
#[command(about = "Churn-risk insights for bank customer retention", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend API base URL (overrides config and CHURNINSIGHT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Threshold config file (defaults to the data dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Saved session file
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session token
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (or set CHURNINSIGHT_PASSWORD)
        #[arg(short, long, env = "CHURNINSIGHT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the saved session
    Logout,

    /// Show the saved session and its expiry
    Session,

    /// Predict churn for a customer and explain the risk
    Predict {
        #[command(flatten)]
        features: FeatureArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Explain a known churn probability without calling the backend
    Analyze {
        #[command(flatten)]
        features: FeatureArgs,

        /// Churn probability between 0 and 1
        #[arg(short, long)]
        probability: f64,

        /// Label for the report
        #[arg(long, default_value = "what-if")]
        customer_id: String,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate every customer in a CSV file
    ///
    /// Columns use the request field names (age, country, numOfProducts,
    /// isActiveMember, balance, estimatedSalary, tenure, creditScore, plus
    /// optional deltaBalance, deltaNumOfProducts, recentInactive,
    /// productUsageDrop, hadComplaint, customerId, churnProbability).
    Batch {
        /// Input CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Write the reports as CSV instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the churnProbability column instead of the backend
        #[arg(long)]
        offline: bool,
    },

    /// Show live stats and business KPIs
    Dashboard,

    /// Show your prediction history, or one customer's trend
    History {
        /// Customer ID for a probability trend
        #[arg(short, long)]
        customer: Option<String>,

        /// Days of trend to fetch (with --customer)
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,

        /// Export the history as CSV
        #[arg(long, conflicts_with = "customer")]
        export: Option<PathBuf>,
    },

    /// Show every stored prediction (administrators)
    HistoryAll {
        #[arg(long, default_value = "0")]
        page: u32,

        #[arg(long, default_value = "100")]
        size: u32,

        /// Export the page as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Analyst activity reports (administrators)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Show the effective configuration and where it came from
    Config,
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// List analysts with their activity totals
    Analysts,

    /// Activity of one analyst per month or year
    Report {
        #[arg(short, long)]
        username: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: NaiveDate,

        /// monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        granularity: Granularity,
    },
}

/// Customer attributes shared by `predict` and `analyze`
#[derive(Args, Debug, Clone)]
pub struct FeatureArgs {
    #[arg(long)]
    pub age: u32,

    /// France, Germany or Spain
    #[arg(long)]
    pub country: Country,

    /// Number of products held
    #[arg(long)]
    pub products: u32,

    /// Customer is an active member
    #[arg(long)]
    pub active: bool,

    #[arg(long)]
    pub balance: f64,

    /// Estimated yearly salary
    #[arg(long)]
    pub salary: f64,

    /// Years with the bank
    #[arg(long)]
    pub tenure: u32,

    #[arg(long)]
    pub credit_score: u32,

    /// Recent balance change (negative = withdrawal)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub delta_balance: f64,

    /// Recent product count change (negative = cancellations)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub delta_products: i32,

    /// Went from active to inactive recently
    #[arg(long)]
    pub recent_inactive: bool,

    /// Product usage dropped
    #[arg(long)]
    pub usage_drop: bool,

    /// Filed a complaint recently
    #[arg(long)]
    pub complaint: bool,
}

impl From<FeatureArgs> for CustomerFeatures {
    fn from(a: FeatureArgs) -> Self {
        CustomerFeatures {
            age: a.age,
            country: a.country,
            num_of_products: a.products,
            is_active_member: a.active,
            balance: a.balance,
            estimated_salary: a.salary,
            tenure: a.tenure,
            credit_score: a.credit_score,
            delta_balance: a.delta_balance,
            delta_num_of_products: a.delta_products,
            recent_inactive: a.recent_inactive,
            product_usage_drop: a.usage_drop,
            had_complaint: a.complaint,
        }
    }
}
