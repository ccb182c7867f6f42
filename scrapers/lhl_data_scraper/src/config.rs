use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub group_id: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lakeshorehockeyleague.net".to_string(),
            group_id: 1313,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; LHLDataScraper/2.0)".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchLimits {
    pub concurrent_requests: usize,
    pub requests_per_second: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            concurrent_requests: 5,
            requests_per_second: 4,
        }
    }
}

/// Ambient scraping knobs. Run-scoped inputs (season start year, the
/// standings URL) are deliberately not here; they are passed as arguments
/// from the CLI into the entry points that need them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub limits: FetchLimits,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("LHL_BASE_URL") {
            config.site.base_url = base_url;
        }
        if let Ok(Some(group_id)) =
            env::var("LHL_GROUP_ID").map_or(Ok(None), |v| v.parse::<u32>().map(Some))
        {
            config.site.group_id = group_id;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.http.user_agent = user_agent;
        }
        if let Ok(Some(timeout)) =
            env::var("SCRAPER_TIMEOUT_SECS").map_or(Ok(None), |v| v.parse::<u64>().map(Some))
        {
            config.http.request_timeout_secs = timeout;
        }
        if let Ok(Some(concurrent)) =
            env::var("SCRAPER_CONCURRENT_REQUESTS").map_or(Ok(None), |v| v.parse::<usize>().map(Some))
        {
            config.limits.concurrent_requests = concurrent;
        }
        if let Ok(Some(rps)) =
            env::var("RATE_LIMIT_RPS").map_or(Ok(None), |v| v.parse::<u32>().map(Some))
        {
            config.limits.requests_per_second = rps;
        }

        config
    }
}
