use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change_gate::ContentKeyed;
use crate::utils::clean_space;

/// One scheduled or played game as exported by the month scraper.
///
/// Values stay as the display strings scraped from the site; scores are
/// absent until the game has been played. `game_date_iso` is derived during
/// the combine step and empty in raw extracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub scraped_at: String,
    pub date_text: String,
    pub time: String,
    pub away: String,
    pub away_score: Option<String>,
    pub home: String,
    pub home_score: Option<String>,
    pub game_code: String,
    pub venue: String,
    pub game_url: String,
    #[serde(default)]
    pub game_date_iso: Option<String>,
}

/// Identity of a logical game across extracts. The game detail URL is the
/// stable identifier; rows scraped without one fall back to their content
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameKey {
    Url(String),
    Fields {
        date_text: String,
        time: String,
        away: String,
        home: String,
        game_code: String,
        venue: String,
    },
}

impl GameRecord {
    /// A game is played once both scores have been observed.
    pub fn is_played(&self) -> bool {
        let has = |s: &Option<String>| s.as_deref().map_or(false, |v| !v.trim().is_empty());
        has(&self.away_score) && has(&self.home_score)
    }

    pub fn identity(&self) -> GameKey {
        let url = self.game_url.trim();
        if !url.is_empty() {
            return GameKey::Url(url.to_string());
        }
        GameKey::Fields {
            date_text: clean_space(&self.date_text),
            time: clean_space(&self.time),
            away: clean_space(&self.away),
            home: clean_space(&self.home),
            game_code: clean_space(&self.game_code),
            venue: clean_space(&self.venue),
        }
    }

    /// Parse `scraped_at` as a UTC timestamp. Accepts RFC 3339 (with "Z" or
    /// an offset) and naive ISO timestamps, which are assumed UTC.
    pub fn scraped_time(&self) -> Option<DateTime<Utc>> {
        let s = self.scraped_at.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl ContentKeyed for GameRecord {
    fn content_key(&self) -> Vec<String> {
        vec![
            clean_space(&self.date_text),
            clean_space(&self.time),
            clean_space(&self.away),
            clean_space(&self.home),
            clean_space(&self.game_code),
            clean_space(&self.venue),
            clean_space(&self.game_url),
            clean_space(self.away_score.as_deref().unwrap_or("")),
            clean_space(self.home_score.as_deref().unwrap_or("")),
        ]
    }
}

/// One team's row in the league standings table at scrape time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub scraped_at: String,
    pub team: String,
    pub gp: String,
    pub w: String,
    pub l: String,
    pub t: String,
    pub pts: String,
    pub w_pct: String,
    pub gf: String,
    pub ga: String,
    pub diff: String,
    pub gf_pct: String,
    pub l10: String,
    pub strk: String,
}

impl ContentKeyed for StandingRow {
    fn content_key(&self) -> Vec<String> {
        vec![
            clean_space(&self.team).to_lowercase(),
            clean_space(&self.gp),
            clean_space(&self.w),
            clean_space(&self.l),
            clean_space(&self.t),
            clean_space(&self.pts),
        ]
    }
}
