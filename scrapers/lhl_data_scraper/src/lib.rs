pub mod change_gate;
pub mod combine;
pub mod config;
pub mod dedupe;
pub mod extract_csv;
pub mod fetch;
pub mod schedule_scraper;
pub mod season;
pub mod standings_scraper;
pub mod types;
pub mod utils;
