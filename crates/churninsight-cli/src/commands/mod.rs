//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `admin` - Analyst listing and per-period activity reports
//! - `auth` - Login, logout and session status
//! - `config` - Effective threshold configuration
//! - `core` - Shared context (config, session file, API client)
//! - `dashboard` - Live stats and business KPIs
//! - `history` - Prediction history, customer trends, CSV export
//! - `predict` - Single prediction, offline analysis, CSV batch

pub mod admin;
pub mod auth;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod history;
pub mod predict;

// Re-export command functions for main.rs
pub use admin::*;
pub use auth::*;
pub use config::*;
pub use core::*;
pub use dashboard::*;
pub use history::*;
pub use predict::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
