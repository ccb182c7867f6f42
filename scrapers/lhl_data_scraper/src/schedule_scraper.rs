//! Scrapes one month of the league schedule: the schedule page yields
//! game detail links, each detail page is fetched with bounded concurrency
//! and parsed from its flattened text into a GameRecord.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use indicatif::ProgressBar;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::config::{FetchLimits, PipelineConfig, SiteConfig};
use crate::fetch;
use crate::types::GameRecord;
use crate::utils::{clean_space, non_blank};

// Footer/menu noise that follows the venue in the flattened page text.
const STOP_PHRASES: [&str; 12] = [
    "More Venue Details",
    "Officials",
    "Game Notes",
    "Box Score",
    "Webmail",
    "Safe Sport",
    "Privacy Policy",
    "Terms of Use",
    "Website Help",
    "Sitemap",
    "Contact",
    "Subscribe",
];

fn game_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/Groups/\d+/Games/\d+/?$").unwrap())
}

// Anchor on the real game code to prevent parsing drift.
fn game_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bU\d{1,2}AA-\d{3}\b").unwrap())
}

// Front matter of a game page: "Oct 04 Sat 5:30 PM <teams and venue>"
fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)\b(?P<mon>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\b\s+(?P<day>\d{1,2})\s+(?P<dow>Mon|Tue|Wed|Thu|Fri|Sat|Sun)\s+(?P<time>\d{1,2}:\d{2}\s*(?:AM|PM))\s+(?P<rest>.+)",
        )
        .unwrap()
    })
}

// "Away Team 5 @ Home Team 0", scores optional while the game is upcoming
fn teams_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)^(?P<away>.+?)(?:\s+(?P<away_score>\d+))?\s+@\s+(?P<home>.+?)(?:\s+(?P<home_score>\d+))?$",
        )
        .unwrap()
    })
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn stub_record(game_url: &str) -> GameRecord {
    GameRecord {
        scraped_at: now_iso(),
        date_text: String::new(),
        time: String::new(),
        away: String::new(),
        away_score: None,
        home: String::new(),
        home_score: None,
        game_code: String::new(),
        venue: String::new(),
        game_url: game_url.to_string(),
        game_date_iso: None,
    }
}

/// Game detail links found on a schedule page, resolved against the base
/// URL and sorted.
pub fn extract_game_links(schedule_html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(schedule_html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut links = BTreeSet::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            let href = href.trim();
            if game_link_re().is_match(href) {
                links.insert(format!("{}{}", base_url.trim_end_matches('/'), href));
            }
        }
    }
    links.into_iter().collect()
}

fn strip_at_stop_phrases(s: &str) -> String {
    let cleaned = clean_space(s);
    let lower = cleaned.to_ascii_lowercase();
    let mut cut_at: Option<usize> = None;
    for phrase in STOP_PHRASES {
        if let Some(idx) = lower.find(&phrase.to_ascii_lowercase()) {
            cut_at = Some(cut_at.map_or(idx, |c| c.min(idx)));
        }
    }
    match cut_at {
        Some(idx) => cleaned[..idx]
            .trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '|')
            .to_string(),
        None => cleaned,
    }
}

/// Parse a game detail page. Pages that do not carry the expected front
/// matter produce a stub row that still records the game URL, so the game
/// stays trackable across scrapes.
pub fn parse_game_page(html: &str, game_url: &str) -> GameRecord {
    let document = Html::parse_document(html);
    let text = clean_space(&document.root_element().text().collect::<Vec<_>>().join(" "));

    let mut record = stub_record(game_url);
    let Some(header) = header_re().captures(&text) else {
        return record;
    };

    let day = format!("{:0>2}", &header["day"]);
    record.date_text = format!("{} {} ({})", &header["mon"], day, &header["dow"]);
    record.time = clean_space(&header["time"]);
    let rest = clean_space(&header["rest"]);

    let Some(code) = game_code_re().find(&rest) else {
        return record;
    };
    record.game_code = code.as_str().to_string();

    let left = clean_space(&rest[..code.start()]);
    let right = clean_space(&rest[code.end()..]);

    if let Some(teams) = teams_re().captures(&left) {
        record.away = clean_space(&teams["away"]);
        record.home = clean_space(&teams["home"]);
        record.away_score = teams.name("away_score").and_then(|m| non_blank(m.as_str()));
        record.home_score = teams.name("home_score").and_then(|m| non_blank(m.as_str()));
    }

    record.venue = strip_at_stop_phrases(&right);
    record
}

pub struct ScheduleScraper {
    client: reqwest::Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    site: SiteConfig,
    limits: FetchLimits,
}

impl ScheduleScraper {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = fetch::build_client(&config.http)?;
        let quota = Quota::per_second(
            NonZeroU32::new(config.limits.requests_per_second)
                .ok_or_else(|| anyhow!("Invalid requests_per_second value"))?,
        );
        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            site: config.site.clone(),
            limits: config.limits.clone(),
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;
        fetch::fetch_html(&self.client, url).await
    }

    /// Scrape every game of one month. A failed game-page fetch degrades
    /// to a stub row; a failed schedule-page fetch fails the month.
    pub async fn scrape_month(&self, year: i32, month: u32) -> Result<Vec<GameRecord>> {
        let base = self.site.base_url.trim_end_matches('/');
        let schedule_url = format!(
            "{}/Groups/{}/Schedule/?Month={}&Year={}",
            base, self.site.group_id, month, year
        );
        info!("Fetching schedule: {}", schedule_url);

        let schedule_html = self.fetch_page(&schedule_url).await?;
        let links = extract_game_links(&schedule_html, &self.site.base_url);
        if links.is_empty() {
            info!("No games found for {}-{:02}", year, month);
            return Ok(Vec::new());
        }

        info!("Found {} game links, fetching details...", links.len());
        let progress = ProgressBar::new(links.len() as u64);
        let results: Vec<(String, Result<String>)> = stream::iter(links)
            .map(|url| {
                let progress = progress.clone();
                async move {
                    let html = self.fetch_page(&url).await;
                    progress.inc(1);
                    (url, html)
                }
            })
            .buffer_unordered(self.limits.concurrent_requests)
            .collect()
            .await;
        progress.finish_and_clear();

        // Keyed by URL: dedupes within the month and makes the extract
        // ordering independent of fetch completion order.
        let mut by_url: BTreeMap<String, GameRecord> = BTreeMap::new();
        for (url, html) in results {
            let record = match html {
                Ok(html) => parse_game_page(&html, &url),
                Err(err) => {
                    warn!("Failed to fetch {}: {:#}", url, err);
                    stub_record(&url)
                }
            };
            by_url.insert(url, record);
        }
        Ok(by_url.into_values().collect())
    }
}
