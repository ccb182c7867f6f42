use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Months at or after October belong to the season's starting calendar year.
const SEASON_START_MONTH: u32 = 10;

fn date_fragment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // e.g. "Dec 03 (Wed)" -> ("Dec", "03"); the weekday parenthetical is ignored
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]{3})\s+(\d{1,2})").unwrap())
}

fn month_number(abbr: &str) -> Option<u32> {
    match abbr {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

/// Assign the calendar year for a month within a season that spans the
/// year boundary: Oct-Dec fall in `season_start_year`, everything earlier
/// in the calendar belongs to the following year.
pub fn infer_year(month: u32, season_start_year: i32) -> i32 {
    if month < SEASON_START_MONTH {
        season_start_year + 1
    } else {
        season_start_year
    }
}

/// Resolve a display fragment like "Dec 03 (Wed)" into a concrete date.
/// Unknown months and out-of-range days are unresolvable, not errors.
pub fn resolve_game_date(date_text: &str, season_start_year: i32) -> Option<NaiveDate> {
    let caps = date_fragment_re().captures(date_text.trim())?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(infer_year(month, season_start_year), month, day)
}

/// `resolve_game_date` formatted as "YYYY-MM-DD" for the canonical dataset.
pub fn game_date_iso(date_text: &str, season_start_year: i32) -> Option<String> {
    resolve_game_date(date_text, season_start_year).map(|d| d.format("%Y-%m-%d").to_string())
}
