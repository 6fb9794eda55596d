//! Runtime configuration for the D2 tracker server.
//!
//! Everything is read once at start-up and handed to the app as an explicit
//! value; handlers never touch the process environment.

use anyhow::{bail, Context};
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_API_ROOT: &str = "https://www.bungie.net/Platform";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Bungie.net application key, sent as `X-API-KEY`.
    pub api_key: String,
    /// Root of the Bungie platform API, without trailing slash.
    pub api_root: String,
    /// Address the HTTP server binds to.
    pub server_addr: String,
    /// Browser origin allowed by CORS.
    pub allowed_origin: String,
    /// Upper bound on a single upstream request.
    pub fetch_timeout: Duration,
    /// Activities requested per upstream page.
    pub page_size: u32,
    /// Page budget of one deep search.
    pub max_pages: u32,
    /// Matches shown by the recent-match summary.
    pub recent_count: usize,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("BUNGIE_API_KEY").context("BUNGIE_API_KEY must be set")?;
        if api_key.trim().is_empty() {
            bail!("BUNGIE_API_KEY is empty");
        }

        let api_root = env::var("BUNGIE_API_ROOT").unwrap_or_else(|_| DEFAULT_API_ROOT.into());
        Url::parse(&api_root).with_context(|| format!("invalid BUNGIE_API_ROOT {api_root}"))?;

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:4001".into());
        let allowed_origin =
            env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());

        let fetch_timeout = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        // Bungie rejects counts above 250.
        let page_size = env::var("ACTIVITY_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(25)
            .clamp(1, 250);

        let max_pages = env::var("MAX_PAGES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let recent_count = env::var("RECENT_MATCH_COUNT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        Ok(Settings {
            api_key,
            api_root: api_root.trim_end_matches('/').to_string(),
            server_addr,
            allowed_origin,
            fetch_timeout,
            page_size,
            max_pages,
            recent_count,
        })
    }
}
