//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by
//! `main`) and can be overridden by command-line flags:
//!
//! - `SCRAPER_BACKEND_URL`: base address of the scraping backend
//!   (default `http://localhost:8000`)
//! - `SCRAPER_NOTICE_SECS`: how long notifications stay visible (default 6,
//!   at most one hour)

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_NOTICE_SECS: u64 = 6;
pub const MAX_NOTICE_SECS: u64 = 60 * 60;

const BACKEND_URL_ENV: &str = "SCRAPER_BACKEND_URL";
const NOTICE_SECS_ENV: &str = "SCRAPER_NOTICE_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base address without a trailing slash
    pub backend_url: String,
    /// Lifetime of error and success notifications
    pub notice_ttl: Duration,
    /// Render product links as OSC 8 terminal hyperlinks
    pub hyperlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            notice_ttl: Duration::from_secs(DEFAULT_NOTICE_SECS),
            hyperlinks: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to
    /// defaults for missing or malformed values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_backend_url(&url);
        }

        if let Some(raw) = lookup(NOTICE_SECS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if (1..=MAX_NOTICE_SECS).contains(&secs) => {
                    config.notice_ttl = Duration::from_secs(secs);
                }
                _ => warn!("Ignoring invalid {}={:?}", NOTICE_SECS_ENV, raw),
            }
        }

        config
    }

    #[must_use]
    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.backend_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_notice_secs(mut self, secs: u64) -> Self {
        self.notice_ttl = Duration::from_secs(secs.clamp(1, MAX_NOTICE_SECS));
        self
    }
}
