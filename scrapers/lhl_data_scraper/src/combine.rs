//! The combine step: load every game extract, resolve calendar dates,
//! dedupe across extracts, sort, and atomically rewrite the canonical
//! dataset (CSV plus a JSON mirror with the same field names).

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::dedupe;
use crate::extract_csv::{self, ExtractError, GAME_COLUMNS};
use crate::season;
use crate::types::GameRecord;

pub const COMBINED_CSV: &str = "combined.csv";
pub const GAMES_JSON: &str = "games.json";

/// Sorts after every real ISO date so undated games land at the end.
const UNDATED_SENTINEL: &str = "9999-99-99";

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("no game extract CSVs found in {0}")]
    NoExtracts(PathBuf),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    pub extract_files: usize,
    pub records_in: usize,
    pub skipped_rows: usize,
    pub duplicates_removed: usize,
    pub records_out: usize,
}

/// Run the full combine over `extracts_dir`, writing the canonical CSV and
/// JSON into `out_dir`. Errors if there is nothing to combine; the previous
/// canonical files are never left partially written.
pub fn combine(
    extracts_dir: &Path,
    out_dir: &Path,
    season_start_year: i32,
) -> Result<CombineSummary, CombineError> {
    let extract_paths = extract_csv::list_game_extracts(extracts_dir)?;
    if extract_paths.is_empty() {
        return Err(CombineError::NoExtracts(extracts_dir.to_path_buf()));
    }

    let mut all_records = Vec::new();
    let mut skipped_rows = 0usize;
    for path in &extract_paths {
        let loaded = extract_csv::read_game_extract(path)?;
        info!(
            "Loaded {} records from {} ({} skipped)",
            loaded.records.len(),
            path.display(),
            loaded.skipped_rows
        );
        skipped_rows += loaded.skipped_rows;
        all_records.extend(loaded.records);
    }
    let records_in = all_records.len();

    for record in &mut all_records {
        record.game_date_iso = season::game_date_iso(&record.date_text, season_start_year);
    }

    let outcome = dedupe::dedupe(all_records);
    let mut records = outcome.records;
    records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    write_atomic(&out_dir.join(COMBINED_CSV), &render_csv(&records)?)?;
    write_atomic(&out_dir.join(GAMES_JSON), &serde_json::to_vec_pretty(&records)?)?;

    Ok(CombineSummary {
        extract_files: extract_paths.len(),
        records_in,
        skipped_rows,
        duplicates_removed: outcome.duplicates_removed,
        records_out: records.len(),
    })
}

fn sort_key(r: &GameRecord) -> (String, String, String, String) {
    (
        r.game_date_iso
            .clone()
            .unwrap_or_else(|| UNDATED_SENTINEL.to_string()),
        r.time.clone(),
        r.away.clone(),
        r.home.clone(),
    )
}

fn render_csv(records: &[GameRecord]) -> Result<Vec<u8>, CombineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<&str> = GAME_COLUMNS.to_vec();
    header.push("game_date_iso");
    writer.write_record(&header)?;
    for r in records {
        writer.write_record([
            r.scraped_at.as_str(),
            r.date_text.as_str(),
            r.time.as_str(),
            r.away.as_str(),
            r.away_score.as_deref().unwrap_or(""),
            r.home.as_str(),
            r.home_score.as_deref().unwrap_or(""),
            r.game_code.as_str(),
            r.venue.as_str(),
            r.game_url.as_str(),
            r.game_date_iso.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush().map_err(|source| CombineError::Write {
        path: PathBuf::from(COMBINED_CSV),
        source,
    })?;
    writer.into_inner().map_err(|err| CombineError::Write {
        path: PathBuf::from(COMBINED_CSV),
        source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
    })
}

/// Write via a temp file in the destination directory and rename into
/// place, so a failed run cannot clobber the last-known-good output.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CombineError> {
    let write_err = |source: std::io::Error| CombineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}
