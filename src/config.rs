//! Client configuration. Flags win over environment variables, which win
//! over the defaults.
//!
//! `CRIBBDLE_SERVER`, `CRIBBDLE_API_PREFIX`, `CRIBBDLE_TIMEOUT_SECS`,
//! `CRIBBDLE_CHART`.

use std::time::Duration;

use crate::chart::ChartKind;

pub const DEFAULT_SERVER: &str = "http://localhost:5555";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const SERVER_ENV: &str = "CRIBBDLE_SERVER";
pub const API_PREFIX_ENV: &str = "CRIBBDLE_API_PREFIX";
pub const TIMEOUT_ENV: &str = "CRIBBDLE_TIMEOUT_SECS";
pub const CHART_ENV: &str = "CRIBBDLE_CHART";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: String,
    pub api_prefix: String,
    pub timeout: Duration,
    /// Chart drawn when a command does not name one.
    pub chart: ChartKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: DEFAULT_SERVER.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            chart: ChartKind::Line,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unparseable
    /// timeouts and chart names fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            server: lookup(SERVER_ENV)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.server),
            api_prefix: lookup(API_PREFIX_ENV).unwrap_or(defaults.api_prefix),
            timeout: lookup(TIMEOUT_ENV)
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            chart: lookup(CHART_ENV)
                .and_then(|s| ChartKind::parse(&s))
                .unwrap_or(defaults.chart),
        }
    }

    pub fn with_overrides(
        mut self,
        server: Option<String>,
        api_prefix: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Config {
        if let Some(server) = server {
            self.server = server;
        }
        if let Some(prefix) = api_prefix {
            self.api_prefix = prefix;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// `api_url("score/crib")` -> `http://localhost:5555/api/score/crib`
    pub fn api_url(&self, path: &str) -> String {
        let mut url = self.server.trim_end_matches('/').to_string();
        let prefix = self.api_prefix.trim_matches('/');
        if !prefix.is_empty() {
            url.push('/');
            url.push_str(prefix);
        }
        url.push('/');
        url.push_str(path.trim_start_matches('/'));
        url
    }

    pub fn health_url(&self) -> String {
        format!("{}/", self.server.trim_end_matches('/'))
    }
}
