//! Merge game records scraped from overlapping extracts into one record
//! per logical game. The merge is a pure function of the two colliding
//! records, so the result does not depend on input order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::change_gate::ContentKeyed;
use crate::types::{GameKey, GameRecord};

pub struct DedupeOutcome {
    pub records: Vec<GameRecord>,
    pub duplicates_removed: usize,
}

/// Collapse duplicates by game identity, keeping the preferred version of
/// each collision. Output order is unspecified; the combiner sorts.
pub fn dedupe(records: Vec<GameRecord>) -> DedupeOutcome {
    let mut by_key: HashMap<GameKey, GameRecord> = HashMap::new();
    let mut duplicates_removed = 0usize;

    for record in records {
        match by_key.entry(record.identity()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                duplicates_removed += 1;
                if prefer(&record, slot.get()) {
                    slot.insert(record);
                }
            }
        }
    }

    DedupeOutcome {
        records: by_key.into_values().collect(),
        duplicates_removed,
    }
}

/// Whether `candidate` should replace `incumbent` for the same game.
/// A played record always beats an unplayed one, so scores never regress
/// to blank; otherwise the later scrape wins, with content comparison as
/// the final deterministic tie-break.
fn prefer(candidate: &GameRecord, incumbent: &GameRecord) -> bool {
    match (candidate.is_played(), incumbent.is_played()) {
        (true, false) => return true,
        (false, true) => return false,
        _ => {}
    }

    let (c_time, i_time) = (candidate.scraped_time(), incumbent.scraped_time());
    if c_time != i_time {
        // None (unparseable timestamp) sorts before any parsed time
        return c_time > i_time;
    }
    if candidate.scraped_at != incumbent.scraped_at {
        return candidate.scraped_at > incumbent.scraped_at;
    }
    candidate.content_key() > incumbent.content_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(game_url: &str, scraped_at: &str, scores: Option<(&str, &str)>) -> GameRecord {
        GameRecord {
            scraped_at: scraped_at.to_string(),
            date_text: "Oct 04 (Sat)".to_string(),
            time: "5:30 PM".to_string(),
            away: "Y".to_string(),
            away_score: scores.map(|(a, _)| a.to_string()),
            home: "X".to_string(),
            home_score: scores.map(|(_, h)| h.to_string()),
            game_code: "U14AA-041".to_string(),
            venue: "Rink 1".to_string(),
            game_url: game_url.to_string(),
            game_date_iso: None,
        }
    }

    fn sorted_urls(outcome: &DedupeOutcome) -> Vec<String> {
        let mut urls: Vec<String> = outcome.records.iter().map(|r| r.game_url.clone()).collect();
        urls.sort();
        urls
    }

    #[test]
    fn test_played_beats_unplayed_in_either_order() {
        let unplayed = record("g1", "2025-10-05T12:00:00Z", None);
        let played = record("g1", "2025-10-01T12:00:00Z", Some(("2", "3")));

        for input in [
            vec![unplayed.clone(), played.clone()],
            vec![played.clone(), unplayed.clone()],
        ] {
            let outcome = dedupe(input);
            assert_eq!(outcome.records.len(), 1);
            assert_eq!(outcome.duplicates_removed, 1);
            let merged = &outcome.records[0];
            assert_eq!(merged.away_score.as_deref(), Some("2"));
            assert_eq!(merged.home_score.as_deref(), Some("3"));
        }
    }

    #[test]
    fn test_later_scrape_wins_on_equal_completeness() {
        let early = record("g1", "2025-10-01T12:00:00Z", Some(("1", "1")));
        let mut late = record("g1", "2025-10-08T12:00:00Z", Some(("1", "1")));
        late.venue = "Rink 2".to_string();

        for input in [
            vec![early.clone(), late.clone()],
            vec![late.clone(), early.clone()],
        ] {
            let outcome = dedupe(input);
            assert_eq!(outcome.records[0].venue, "Rink 2");
        }
    }

    #[test]
    fn test_fallback_identity_merges_urlless_rows() {
        let a = record("", "2025-10-01T12:00:00Z", None);
        let b = record("", "2025-10-02T12:00:00Z", Some(("4", "2")));
        let outcome = dedupe(vec![a, b]);
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].is_played());
    }

    #[test]
    fn test_distinct_games_are_kept_apart() {
        let outcome = dedupe(vec![
            record("g1", "2025-10-01T12:00:00Z", None),
            record("g2", "2025-10-01T12:00:00Z", None),
        ]);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.duplicates_removed, 0);
    }

    #[test]
    fn test_order_insensitive_across_permutations() {
        let records = vec![
            record("g1", "2025-10-01T12:00:00Z", None),
            record("g1", "2025-10-08T12:00:00Z", Some(("5", "0"))),
            record("g2", "2025-10-02T12:00:00Z", None),
            record("g2", "2025-10-02T12:00:00Z", None),
            record("", "2025-10-03T12:00:00Z", None),
        ];

        let permutations: Vec<Vec<usize>> = vec![
            vec![0, 1, 2, 3, 4],
            vec![4, 3, 2, 1, 0],
            vec![1, 4, 0, 3, 2],
            vec![2, 0, 4, 1, 3],
        ];

        let mut baseline: Option<Vec<Vec<String>>> = None;
        for order in permutations {
            let input: Vec<GameRecord> = order.iter().map(|&i| records[i].clone()).collect();
            let outcome = dedupe(input);
            let mut keys: Vec<Vec<String>> =
                outcome.records.iter().map(|r| r.content_key()).collect();
            keys.sort();
            match &baseline {
                None => baseline = Some(keys),
                Some(expected) => assert_eq!(&keys, expected),
            }
        }
    }

    #[test]
    fn test_unparseable_timestamp_loses_to_parsed() {
        let bad = record("g1", "sometime", Some(("1", "0")));
        let good = record("g1", "2025-10-01T12:00:00Z", Some(("2", "0")));
        for input in [vec![bad.clone(), good.clone()], vec![good.clone(), bad.clone()]] {
            let outcome = dedupe(input);
            assert_eq!(outcome.records[0].away_score.as_deref(), Some("2"));
        }
    }

    #[test]
    fn test_duplicate_count() {
        let outcome = dedupe(vec![
            record("g1", "t", None),
            record("g1", "t", None),
            record("g1", "t", None),
            record("g2", "t", None),
        ]);
        assert_eq!(sorted_urls(&outcome), vec!["g1", "g2"]);
        assert_eq!(outcome.duplicates_removed, 2);
    }
}
