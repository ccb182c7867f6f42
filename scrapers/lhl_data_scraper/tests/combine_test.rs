use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use lhl_data_scraper::combine::{combine, CombineError, COMBINED_CSV, GAMES_JSON};
use lhl_data_scraper::extract_csv::{read_game_extract, GAME_COLUMNS};

fn game_row(
    scraped_at: &str,
    date_text: &str,
    time: &str,
    away: &str,
    away_score: &str,
    home: &str,
    home_score: &str,
    game_code: &str,
    venue: &str,
    game_url: &str,
) -> String {
    [
        scraped_at, date_text, time, away, away_score, home, home_score, game_code, venue, game_url,
    ]
    .join(",")
}

fn write_extract(dir: &Path, name: &str, rows: &[String]) {
    let mut contents = GAME_COLUMNS.join(",");
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn combines_extracts_with_score_merge_and_sort() {
    let workdir = TempDir::new().unwrap();
    let exports = workdir.path().join("exports");
    let data = workdir.path().join("data");
    fs::create_dir_all(&exports).unwrap();

    // g1 appears in both extracts: unplayed in the October file, played in
    // the re-scraped one. g2 has no resolvable date and must sort last.
    write_extract(
        &exports,
        "2025-10.csv",
        &[
            game_row(
                "2025-10-01T08:00:00Z",
                "Oct 04 (Sat)",
                "5:30 PM",
                "Y",
                "",
                "X",
                "",
                "U14AA-041",
                "Rink 1",
                "g1",
            ),
            game_row(
                "2025-10-01T08:00:00Z",
                "TBD",
                "9:00 AM",
                "C",
                "",
                "D",
                "",
                "U14AA-050",
                "Rink 2",
                "g2",
            ),
        ],
    );
    write_extract(
        &exports,
        "2025-10-rescrape.csv",
        &[
            game_row(
                "2025-10-06T08:00:00Z",
                "Oct 04 (Sat)",
                "5:30 PM",
                "Y",
                "2",
                "X",
                "3",
                "U14AA-041",
                "Rink 1",
                "g1",
            ),
            game_row(
                "2025-10-06T08:00:00Z",
                "Jan 15 (Thu)",
                "7:00 PM",
                "E",
                "",
                "F",
                "",
                "U14AA-090",
                "Rink 3",
                "g3",
            ),
        ],
    );
    // A standings snapshot in the same directory must be ignored.
    fs::write(
        exports.join("2025-2026_u14aa_standings.csv"),
        "scraped_at,team\n2025-10-01T08:00:00Z,Ajax Attack\n",
    )
    .unwrap();

    let summary = combine(&exports, &data, 2025).unwrap();
    assert_eq!(summary.extract_files, 2);
    assert_eq!(summary.records_in, 4);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.records_out, 3);
    assert_eq!(summary.skipped_rows, 0);

    let combined = read_game_extract(&data.join(COMBINED_CSV)).unwrap().records;
    assert_eq!(combined.len(), 3);

    // Sorted ascending by resolved date; the unresolvable date sorts last.
    assert_eq!(combined[0].game_url, "g1");
    assert_eq!(combined[0].game_date_iso.as_deref(), Some("2025-10-04"));
    assert_eq!(combined[0].away_score.as_deref(), Some("2"));
    assert_eq!(combined[0].home_score.as_deref(), Some("3"));
    assert_eq!(combined[1].game_url, "g3");
    assert_eq!(combined[1].game_date_iso.as_deref(), Some("2026-01-15"));
    assert_eq!(combined[2].game_url, "g2");
    assert_eq!(combined[2].game_date_iso, None);

    // The JSON mirror carries the same records under the same field names.
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data.join(GAMES_JSON)).unwrap()).unwrap();
    let games = json.as_array().unwrap();
    assert_eq!(games.len(), 3);
    assert_eq!(games[0]["game_url"], "g1");
    assert_eq!(games[0]["home_score"], "3");
    assert_eq!(games[0]["game_date_iso"], "2025-10-04");
}

#[test]
fn combine_is_idempotent_and_order_insensitive() {
    let workdir = TempDir::new().unwrap();
    let exports = workdir.path().join("exports");
    let data = workdir.path().join("data");
    fs::create_dir_all(&exports).unwrap();

    let row_a = game_row(
        "2025-11-01T08:00:00Z",
        "Nov 12 (Wed)",
        "7:00 PM",
        "A",
        "",
        "B",
        "",
        "U14AA-102",
        "Rink 1",
        "g1",
    );
    let row_b = game_row(
        "2025-11-08T08:00:00Z",
        "Nov 12 (Wed)",
        "7:00 PM",
        "A",
        "4",
        "B",
        "2",
        "U14AA-102",
        "Rink 1",
        "g1",
    );

    // First layout: the played version lives in the second file.
    write_extract(&exports, "2025-11.csv", &[row_a.clone()]);
    write_extract(&exports, "2025-12.csv", &[row_b.clone()]);
    combine(&exports, &data, 2025).unwrap();
    let first = fs::read(data.join(COMBINED_CSV)).unwrap();

    // Second run over identical inputs: byte-identical output.
    combine(&exports, &data, 2025).unwrap();
    let second = fs::read(data.join(COMBINED_CSV)).unwrap();
    assert_eq!(first, second);

    // Swap which file carries which version: same canonical dataset.
    write_extract(&exports, "2025-11.csv", &[row_b]);
    write_extract(&exports, "2025-12.csv", &[row_a]);
    combine(&exports, &data, 2025).unwrap();
    let swapped = fs::read(data.join(COMBINED_CSV)).unwrap();
    assert_eq!(first, swapped);
}

#[test]
fn zero_extracts_is_an_error_and_writes_nothing() {
    let workdir = TempDir::new().unwrap();
    let exports = workdir.path().join("exports");
    let data = workdir.path().join("data");
    fs::create_dir_all(&exports).unwrap();

    let err = combine(&exports, &data, 2025).unwrap_err();
    assert!(matches!(err, CombineError::NoExtracts(_)));
    assert!(!data.join(COMBINED_CSV).exists());
    assert!(!data.join(GAMES_JSON).exists());
}

#[test]
fn zero_extracts_preserves_previous_canonical_output() {
    let workdir = TempDir::new().unwrap();
    let exports = workdir.path().join("exports");
    let data = workdir.path().join("data");
    fs::create_dir_all(&exports).unwrap();

    write_extract(
        &exports,
        "2025-10.csv",
        &[game_row(
            "2025-10-01T08:00:00Z",
            "Oct 04 (Sat)",
            "5:30 PM",
            "Y",
            "",
            "X",
            "",
            "U14AA-041",
            "Rink 1",
            "g1",
        )],
    );
    combine(&exports, &data, 2025).unwrap();
    let good = fs::read(data.join(COMBINED_CSV)).unwrap();

    fs::remove_file(exports.join("2025-10.csv")).unwrap();
    assert!(combine(&exports, &data, 2025).is_err());
    assert_eq!(fs::read(data.join(COMBINED_CSV)).unwrap(), good);
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let workdir = TempDir::new().unwrap();
    let exports = workdir.path().join("exports");
    let data = workdir.path().join("data");
    fs::create_dir_all(&exports).unwrap();

    let good = game_row(
        "2025-10-01T08:00:00Z",
        "Oct 04 (Sat)",
        "5:30 PM",
        "Y",
        "",
        "X",
        "",
        "U14AA-041",
        "Rink 1",
        "g1",
    );
    write_extract(
        &exports,
        "2025-10.csv",
        &[good, "this,row,is,short".to_string()],
    );

    let summary = combine(&exports, &data, 2025).unwrap();
    assert_eq!(summary.records_in, 1);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.records_out, 1);
}
