//! Environment-driven configuration. Every knob has a default so the console
//! starts without any setup against the public deployment.

use std::env;
use std::path::PathBuf;

use tracing::info;

const DEFAULT_API_URL: &str = "https://community-forum-backend-ts.vercel.app/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the primary backend REST API.
    pub api_url: String,
    /// Base URL of the identity-provider project, e.g. https://xyz.supabase.co
    pub idp_url: Option<String>,
    /// Identity-provider project (anon) API key.
    pub idp_key: Option<String>,
    /// Fixed request timeout applied to every HTTP call.
    pub timeout_secs: u64,
    /// Directory holding the persisted session record.
    pub state_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let api_url = var_or("STOOP_API_URL", DEFAULT_API_URL);
        let idp_url = env::var("STOOP_IDP_URL").ok().filter(|s| !s.is_empty());
        let idp_key = env::var("STOOP_IDP_KEY").ok().filter(|s| !s.is_empty());
        let timeout_secs = env::var("STOOP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let state_dir = env::var("STOOP_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());
        Self { api_url, idp_url, idp_key, timeout_secs, state_dir }
    }

    /// Path of the persisted session record inside the state dir.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            info!("{} not set, using default: {}", key, default);
            default.to_string()
        }
    }
}

fn default_state_dir() -> PathBuf {
    // Keep state next to the user's home when available, else the working dir
    match env::var("HOME").or_else(|_| env::var("USERPROFILE")) {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(".stoop"),
        _ => PathBuf::from(".stoop"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Scoped to keys this test owns; avoids clobbering developer env
        std::env::remove_var("STOOP_API_URL");
        std::env::remove_var("STOOP_TIMEOUT_SECS");
        let cfg = Config::from_env();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(cfg.session_file().ends_with("session.json"));
    }
}
