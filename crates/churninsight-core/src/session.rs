//! Analyst session: the bearer token returned by `/auth/login`
//!
//! The session is an explicit value handed to whatever issues requests.
//! Expiry is checked locally from the JWT `exp` claim before a request is
//! sent. The signature is never verified here; that is the server's job.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        token_expiry(&self.token)
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        is_token_valid(&self.token, now)
    }

    /// Load a saved session. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let session: Session = serde_json::from_str(&content)
            .map_err(|e| Error::Session(format!("Corrupt session file {}: {}", path.display(), e)))?;
        Ok(Some(session))
    }

    /// Write the session atomically (temp file in the same directory, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(path = %path.display(), username = %self.username, "Saved session");
        Ok(())
    }

    /// Remove a saved session. Returns whether a file was removed.
    pub fn clear(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Cleared session");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying it
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// A token is usable when it decodes and expires strictly after `now`
pub fn is_token_valid(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Some(exp) => exp > now,
        None => false,
    }
}

/// Default session file location
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("churninsight").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_token_expiry() {
        let token = token_with_payload(r#"{"sub":"ana","exp":1700000000}"#);
        let exp = token_expiry(&token).unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_token_validity_is_pure() {
        let token = token_with_payload(r#"{"exp":1700000000}"#);
        let exp = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert!(is_token_valid(&token, exp - Duration::seconds(1)));
        assert!(!is_token_valid(&token, exp));
        assert!(!is_token_valid(&token, exp + Duration::hours(1)));
    }

    #[test]
    fn test_undecodable_tokens_are_invalid() {
        let now = Utc::now();
        assert!(!is_token_valid("", now));
        assert!(!is_token_valid("not-a-jwt", now));
        assert!(!is_token_valid("a.!!!.c", now));
        assert!(!is_token_valid(&token_with_payload(r#"{"sub":"x"}"#), now));
        assert!(!is_token_valid(&token_with_payload("not json"), now));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":1700000000}"#);
        let token = format!("h.{}.s", payload);
        assert!(token_expiry(&token).is_some());
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        assert_eq!(Session::load(&path).unwrap(), None);

        let session = Session::new("abc.def.ghi", "ana");
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), Some(session));

        assert!(Session::clear(&path).unwrap());
        assert!(!Session::clear(&path).unwrap());
        assert_eq!(Session::load(&path).unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Session::load(&path).unwrap_err().is_session());
    }
}
