//! Shared command context
//!
//! This module contains:
//! - `AppContext` - effective config plus the session file location
//! - `client` / `require_client` - build an API client from the saved session
//! - `forget_session` - drop the saved session after a 401/403

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use churninsight_core::session::default_session_path;
use churninsight_core::{ApiClient, ConfigSource, EngineConfig, RiskInsightEngine, Session};

/// Everything a command needs besides its own arguments
pub struct AppContext {
    pub config: EngineConfig,
    pub source: ConfigSource,
    pub session_path: PathBuf,
}

impl AppContext {
    /// Resolve config, API URL override and session path from the global flags
    pub fn load(
        config_path: Option<&Path>,
        api_url: Option<&str>,
        session_path: Option<&Path>,
    ) -> Result<Self> {
        let (mut config, source) =
            EngineConfig::load_from(config_path).context("Failed to load configuration")?;
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }

        let session_path = match session_path {
            Some(p) => p.to_path_buf(),
            None => default_session_path().context("Could not determine data directory")?,
        };

        Ok(Self {
            config,
            source,
            session_path,
        })
    }

    pub fn engine(&self) -> RiskInsightEngine {
        RiskInsightEngine::new(self.config.clone())
    }

    pub fn load_session(&self) -> Result<Option<Session>> {
        Session::load(&self.session_path).context("Failed to read saved session")
    }

    /// API client carrying the saved session, if any
    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(&self.config.api).with_session(self.load_session()?))
    }

    /// API client for commands that cannot work without a login
    pub fn require_client(&self) -> Result<ApiClient> {
        let client = self.client()?;
        if client.session().is_none() {
            anyhow::bail!("Not logged in. Run `churninsight login --username <user>` first.");
        }
        Ok(client)
    }

    /// Drop the saved session so the next command asks for a fresh login
    pub fn forget_session(&self) {
        match Session::clear(&self.session_path) {
            Ok(true) => println!("   🔑 Saved session cleared. Log in again to continue."),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to clear saved session"),
        }
    }
}
