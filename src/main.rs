// src/main.rs

use abpscraper::{chart, config::Config, extract, fetch, normalize};
use anyhow::Result;
use chrono::Local;
use reqwest::Client;
use std::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    fs::create_dir_all(&config.outputs_dir)?;

    // ─── 3) fetch & extract each case page ───────────────────────────
    let client = Client::new();
    let mut raw_records = Vec::new();
    for (infrastructure, cases) in &config.projects {
        for (short_name, case_id) in cases {
            let url = config.case_url(*case_id)?;
            let html = match fetch::fetch_case_page(&client, &url).await {
                Ok(html) => html,
                Err(e) => {
                    error!(project = %short_name, error = %e, "fetch failed; skipping project");
                    continue;
                }
            };
            let mut fields = match extract::extract_fields(&html) {
                Ok(fields) => fields,
                Err(e) => {
                    error!(project = %short_name, error = %e, "extraction failed; skipping project");
                    continue;
                }
            };
            fields.insert("short_name".to_string(), short_name.clone());
            fields.insert("infrastructure_type".to_string(), infrastructure.clone());
            info!(project = %short_name, fields = fields.len(), "extracted case page");
            raw_records.push(fields);
        }
    }

    // ─── 4) normalize the batch against one anchor date ──────────────
    let today = Local::now().date_naive();
    let table = normalize::normalize(raw_records, &config.acronyms, today)?;
    for record in &table {
        info!(
            project = %record.project_name,
            days = record.time_taken,
            decided = record.date_signed.is_some(),
            "time under review"
        );
    }

    // ─── 5) render chart ─────────────────────────────────────────────
    let out_path = config.outputs_dir.join(&config.chart_file);
    chart::plot_time_taken(&table, today, &out_path)?;
    info!("done");
    Ok(())
}
