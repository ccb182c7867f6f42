//! Scrapes the regular-season standings table. Headers are normalized to
//! snake_case and mapped through an alias table, so minor header wording
//! changes on the site do not break the extract schema.

use anyhow::{bail, Result};
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::fetch;
use crate::types::StandingRow;
use crate::utils::{clean_space, normalize_header, to_float, to_int};

fn map_column(normalized_header: &str) -> Option<&'static str> {
    match normalized_header {
        "team" | "team_name" => Some("team"),
        "gp" | "games_played" | "games" => Some("gp"),
        "w" | "wins" => Some("w"),
        "l" | "losses" => Some("l"),
        "t" | "ties" => Some("t"),
        "pts" | "points" => Some("pts"),
        "w_pct" | "win_pct" => Some("w_pct"),
        "gf" => Some("gf"),
        "ga" => Some("ga"),
        "diff" | "gd" => Some("diff"),
        "gf_pct" => Some("gf_pct"),
        "l10" => Some("l10"),
        "strk" => Some("strk"),
        _ => None,
    }
}

fn cell_texts(row: ElementRef, cells: &Selector) -> Vec<String> {
    row.select(cells)
        .map(|cell| clean_space(&cell.text().collect::<Vec<_>>().join(" ")))
        .collect()
}

/// Parse the first table on the standings page into rows. Rows without a
/// team name (spacers, repeated headers) are dropped.
pub fn parse_standings(html: &str) -> Result<Vec<StandingRow>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let thead_tr_sel = Selector::parse("thead tr").unwrap();
    let tbody_sel = Selector::parse("tbody").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();

    let Some(table) = document.select(&table_sel).next() else {
        bail!("Could not find standings table");
    };

    let header_from_thead = table.select(&thead_tr_sel).next();
    let header_row = header_from_thead
        .or_else(|| table.select(&tr_sel).next())
        .ok_or_else(|| anyhow::anyhow!("Standings table missing header row"))?;
    let headers: Vec<String> = cell_texts(header_row, &cell_sel)
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    if headers.is_empty() {
        bail!("Standings table has no header cells");
    }

    let body = table.select(&tbody_sel).next().unwrap_or(table);
    let mut rows = Vec::new();
    for tr in body.select(&tr_sel) {
        // When headers came from the first data-scope row, skip that row
        if header_from_thead.is_none() && tr.id() == header_row.id() {
            continue;
        }
        let cells = cell_texts(tr, &cell_sel);
        if cells.is_empty() {
            continue;
        }

        let mut row = StandingRow::default();
        for (idx, text) in cells.iter().enumerate() {
            let Some(mapped) = headers.get(idx).and_then(|h| map_column(h)) else {
                continue;
            };
            let value = text.clone();
            match mapped {
                "team" => row.team = value,
                "gp" => row.gp = value,
                "w" => row.w = value,
                "l" => row.l = value,
                "t" => row.t = value,
                "pts" => row.pts = value,
                "w_pct" => row.w_pct = value,
                "gf" => row.gf = value,
                "ga" => row.ga = value,
                "diff" => row.diff = value,
                "gf_pct" => row.gf_pct = value,
                "l10" => row.l10 = value,
                "strk" => row.strk = value,
                _ => {}
            }
        }

        if !row.team.is_empty() {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        bail!("No standings rows were parsed from the table");
    }
    Ok(rows)
}

/// League-table order: points, then win percentage, then goal differential,
/// all descending.
pub fn sort_standings(rows: &mut [StandingRow]) {
    rows.sort_by(|a, b| {
        to_int(&b.pts)
            .cmp(&to_int(&a.pts))
            .then(to_float(&b.w_pct).total_cmp(&to_float(&a.w_pct)))
            .then(to_int(&b.diff).cmp(&to_int(&a.diff)))
    });
}

/// Fetch, parse, sort, and stamp one standings snapshot.
pub async fn scrape_standings(client: &Client, url: &str) -> Result<Vec<StandingRow>> {
    info!("Fetching standings: {}", url);
    let html = fetch::fetch_html(client, url).await?;
    let mut rows = parse_standings(&html)?;
    sort_standings(&mut rows);

    let scraped_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    for row in &mut rows {
        row.scraped_at = scraped_at.clone();
    }
    Ok(rows)
}
