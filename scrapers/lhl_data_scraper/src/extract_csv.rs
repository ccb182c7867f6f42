//! Reading and writing the flat-file extracts produced by the scrapers
//! and consumed by the combiner.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::types::{GameRecord, StandingRow};

pub const GAME_COLUMNS: [&str; 10] = [
    "scraped_at",
    "date_text",
    "time",
    "away",
    "away_score",
    "home",
    "home_score",
    "game_code",
    "venue",
    "game_url",
];

pub const STANDINGS_COLUMNS: [&str; 14] = [
    "scraped_at",
    "team",
    "gp",
    "w",
    "l",
    "t",
    "pts",
    "w_pct",
    "gf",
    "ga",
    "diff",
    "gf_pct",
    "l10",
    "strk",
];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Records parsed from one extract, plus how many rows were dropped as
/// malformed. One bad row must not discard the rest of the file.
pub struct LoadedExtract<T> {
    pub records: Vec<T>,
    pub skipped_rows: usize,
}

fn read_extract<T: DeserializeOwned>(path: &Path) -> Result<LoadedExtract<T>, ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for result in reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped_rows += 1;
                warn!("Skipping malformed row in {}: {}", path.display(), err);
            }
        }
    }
    Ok(LoadedExtract {
        records,
        skipped_rows,
    })
}

pub fn read_game_extract(path: &Path) -> Result<LoadedExtract<GameRecord>, ExtractError> {
    read_extract(path)
}

pub fn read_standings_extract(path: &Path) -> Result<LoadedExtract<StandingRow>, ExtractError> {
    read_extract(path)
}

/// Game extract CSVs in a directory: every `*.csv` whose name does not
/// mark it as a standings snapshot, sorted for reproducible runs.
pub fn list_game_extracts(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let entries = fs::read_dir(dir).map_err(|source| ExtractError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ExtractError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "csv") {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !name.contains("standings") {
                paths.push(path);
            }
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn write_game_extract(path: &Path, records: &[GameRecord]) -> Result<(), ExtractError> {
    let io_err = |source: std::io::Error| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(GAME_COLUMNS).map_err(csv_err)?;
    for r in records {
        writer
            .write_record([
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
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

pub fn write_standings_extract(path: &Path, rows: &[StandingRow]) -> Result<(), ExtractError> {
    let io_err = |source: std::io::Error| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(STANDINGS_COLUMNS).map_err(csv_err)?;
    for r in rows {
        writer
            .write_record([
                r.scraped_at.as_str(),
                r.team.as_str(),
                r.gp.as_str(),
                r.w.as_str(),
                r.l.as_str(),
                r.t.as_str(),
                r.pts.as_str(),
                r.w_pct.as_str(),
                r.gf.as_str(),
                r.ga.as_str(),
                r.diff.as_str(),
                r.gf_pct.as_str(),
                r.l10.as_str(),
                r.strk.as_str(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}
