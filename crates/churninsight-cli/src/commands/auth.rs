//! Session commands (login, logout, session)

use anyhow::{Context, Result};
use chrono::Utc;
use churninsight_core::ApiClient;

use super::AppContext;

pub async fn cmd_login(ctx: &AppContext, username: &str, password: Option<&str>) -> Result<()> {
    let password = password
        .filter(|p| !p.is_empty())
        .context("Password required: pass --password or set CHURNINSIGHT_PASSWORD")?;

    let client = ApiClient::new(&ctx.config.api);
    println!("🔐 Logging in to {}...", client.base_url());

    let session = client.login(username, password).await?;
    session
        .save(&ctx.session_path)
        .context("Failed to save session")?;

    println!("✅ Logged in as {}", session.username);
    if let Some(exp) = session.expires_at() {
        println!("   Session valid until {}", exp.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub fn cmd_logout(ctx: &AppContext) -> Result<()> {
    let removed = churninsight_core::Session::clear(&ctx.session_path)
        .context("Failed to remove session")?;
    if removed {
        println!("👋 Logged out");
    } else {
        println!("   No saved session");
    }
    Ok(())
}

pub fn cmd_session(ctx: &AppContext) -> Result<()> {
    println!();
    println!("🔑 Session");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   File: {}", ctx.session_path.display());
    println!("   API:  {}", ctx.config.api.base_url);

    match ctx.load_session()? {
        None => println!("   Status: not logged in"),
        Some(session) => {
            println!("   User: {}", session.username);
            match session.expires_at() {
                Some(exp) if exp > Utc::now() => {
                    println!("   Status: ✅ valid until {}", exp.format("%Y-%m-%d %H:%M UTC"));
                }
                Some(exp) => {
                    println!("   Status: ❌ expired at {}", exp.format("%Y-%m-%d %H:%M UTC"));
                }
                None => println!("   Status: ❌ token cannot be decoded"),
            }
        }
    }
    println!();
    Ok(())
}
