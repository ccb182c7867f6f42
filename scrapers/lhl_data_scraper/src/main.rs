use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Months, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{info, warn};

use lhl_data_scraper::change_gate;
use lhl_data_scraper::combine;
use lhl_data_scraper::config::PipelineConfig;
use lhl_data_scraper::extract_csv::{
    read_game_extract, read_standings_extract, write_game_extract, write_standings_extract,
};
use lhl_data_scraper::fetch;
use lhl_data_scraper::schedule_scraper::ScheduleScraper;
use lhl_data_scraper::standings_scraper;

const DEFAULT_STANDINGS_URL: &str =
    "https://lakeshorehockeyleague.net/Rounds/30700/2025-2026_U14_AA_Regular_Season/";
const STANDINGS_FILE: &str = "standings.csv";

#[derive(Debug, Parser)]
#[command(author, version, about = "Lakeshore Hockey League data pipeline", long_about = None)]
struct Cli {
    /// Directory holding the per-month and standings extracts
    #[arg(long, default_value = "exports", global = true)]
    exports_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape game data for the given months (default: current + next)
    ScrapeGames {
        /// Months to scrape, in YYYY-MM format
        #[arg(long, num_args = 1..)]
        months: Vec<String>,
    },
    /// Scrape the standings table
    ScrapeStandings {
        /// Standings page URL
        #[arg(long, default_value = DEFAULT_STANDINGS_URL)]
        url: String,
    },
    /// Combine extracts into the canonical CSV and JSON datasets
    Combine {
        /// Season start year; Oct-Dec games belong to this calendar year
        #[arg(long, default_value_t = 2025)]
        season_start_year: i32,
        /// Output directory for the canonical dataset
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Full pipeline: scrape games + standings, then combine
    Update {
        #[arg(long, num_args = 1..)]
        months: Vec<String>,
        #[arg(long, default_value = DEFAULT_STANDINGS_URL)]
        standings_url: String,
        #[arg(long, default_value_t = 2025)]
        season_start_year: i32,
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();

    match cli.command {
        Commands::ScrapeGames { months } => {
            cmd_scrape_games(&config, &months, &cli.exports_dir).await?;
        }
        Commands::ScrapeStandings { url } => {
            cmd_scrape_standings(&config, &url, &cli.exports_dir).await?;
        }
        Commands::Combine {
            season_start_year,
            out_dir,
        } => {
            cmd_combine(&cli.exports_dir, &out_dir, season_start_year)?;
        }
        Commands::Update {
            months,
            standings_url,
            season_start_year,
            out_dir,
        } => {
            cmd_scrape_games(&config, &months, &cli.exports_dir).await?;
            cmd_scrape_standings(&config, &standings_url, &cli.exports_dir).await?;
            cmd_combine(&cli.exports_dir, &out_dir, season_start_year)?;
        }
    }

    Ok(())
}

/// Current and next month in YYYY-MM form.
fn default_months() -> Vec<String> {
    let today = Utc::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    vec![
        today.format("%Y-%m").to_string(),
        next.format("%Y-%m").to_string(),
    ]
}

fn parse_month_arg(month: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    Ok((date.year(), date.month()))
}

async fn cmd_scrape_games(
    config: &PipelineConfig,
    months: &[String],
    exports_dir: &Path,
) -> Result<()> {
    let months = if months.is_empty() {
        default_months()
    } else {
        months.to_vec()
    };
    let parsed: Vec<(String, i32, u32)> = months
        .iter()
        .map(|m| parse_month_arg(m).map(|(y, mo)| (m.clone(), y, mo)))
        .collect::<Result<_>>()?;

    println!("Scraping games for: {}", months.join(", "));
    let scraper = ScheduleScraper::new(config)?;

    for (month_str, year, month) in parsed {
        let out_path = exports_dir.join(format!("{}.csv", month_str));
        info!("[{}]", month_str);

        let baseline = if out_path.exists() {
            read_game_extract(&out_path)?.records
        } else {
            Vec::new()
        };
        let fresh = scraper.scrape_month(year, month).await?;

        if fresh.is_empty() {
            write_game_extract(&out_path, &fresh)?;
            println!("  [{}] no games, wrote empty extract", month_str);
        } else if !baseline.is_empty() && !change_gate::changed(&baseline, &fresh) {
            println!("  [{}] no changes, keeping existing extract", month_str);
        } else {
            write_game_extract(&out_path, &fresh)?;
            println!("  [{}] wrote {} games to {}", month_str, fresh.len(), out_path.display());
        }
    }
    Ok(())
}

async fn cmd_scrape_standings(
    config: &PipelineConfig,
    url: &str,
    exports_dir: &Path,
) -> Result<()> {
    let client = fetch::build_client(&config.http)?;
    let rows = standings_scraper::scrape_standings(&client, url).await?;

    let out_path = exports_dir.join(STANDINGS_FILE);
    let baseline = if out_path.exists() {
        read_standings_extract(&out_path)?.records
    } else {
        Vec::new()
    };

    if !baseline.is_empty() && !change_gate::changed(&baseline, &rows) {
        println!("Standings unchanged, keeping existing extract");
    } else {
        write_standings_extract(&out_path, &rows)?;
        println!("Wrote {} standings rows to {}", rows.len(), out_path.display());
    }
    Ok(())
}

fn cmd_combine(exports_dir: &Path, out_dir: &Path, season_start_year: i32) -> Result<()> {
    let summary = combine::combine(exports_dir, out_dir, season_start_year)?;
    if summary.skipped_rows > 0 {
        warn!("Skipped {} malformed rows", summary.skipped_rows);
    }
    println!(
        "Combined {} extract file(s): {} records in, {} duplicates removed, {} written",
        summary.extract_files,
        summary.records_in,
        summary.duplicates_removed,
        summary.records_out
    );
    println!(
        "Wrote {} and {}",
        out_dir.join(combine::COMBINED_CSV).display(),
        out_dir.join(combine::GAMES_JSON).display()
    );
    Ok(())
}
