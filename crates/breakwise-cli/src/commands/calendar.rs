//! Calendar feed commands: fetch, inspect and clear the busy cache.

use chrono::Local;
use clap::Subcommand;

use breakwise_core::Config;

use crate::store;

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Fetch a calendar export and rebuild the busy cache
    Load {
        /// URL or file path; defaults to the configured calendar_url
        source: Option<String>,
    },
    /// Show the last refresh status and cached busy intervals
    Status,
    /// Forget the calendar link and empty the busy cache
    Clear,
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CalendarAction::Load { source } => {
            let mut config = Config::load_or_default();
            let source = source.unwrap_or_else(|| config.calendar_url.clone());
            let mut state = store::load()?;
            let now = Local::now().naive_local();

            let fetched = fetch(&source);
            let status = match &fetched {
                Ok(text) => state.session.refresh_busy_intervals(Ok(text.as_str()), now),
                Err(reason) => state
                    .session
                    .refresh_busy_intervals(Err(reason.as_str()), now),
            };
            println!("{status}");

            if fetched.is_ok() && is_url(&source) && config.calendar_url != source {
                config.calendar_url = source;
                config.save()?;
            }
            store::save(&state)?;
        }
        CalendarAction::Status => {
            let state = store::load()?;
            if state.session.calendar_status.is_empty() {
                println!("No calendar loaded.");
            } else {
                println!("{}", state.session.calendar_status);
            }
            for interval in &state.session.busy {
                println!(
                    "  {} .. {}  {}",
                    interval.start.format("%Y-%m-%d %H:%M"),
                    interval.end.format("%Y-%m-%d %H:%M"),
                    interval.summary.as_deref().unwrap_or("(busy)")
                );
            }
        }
        CalendarAction::Clear => {
            let mut config = Config::load_or_default();
            config.calendar_url.clear();
            config.save()?;

            let mut state = store::load()?;
            state.session.busy.clear();
            state.session.calendar_status = "Cleared.".to_string();
            store::save(&state)?;
            println!("Cleared.");
        }
    }
    Ok(())
}

fn is_url(source: &str) -> bool {
    url::Url::parse(source)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Resolve the export text from a URL or local file. Failures become the
/// human-readable reason the core records in its status string.
fn fetch(source: &str) -> Result<String, String> {
    if source.trim().is_empty() {
        return Err("No calendar URL set.".to_string());
    }
    if is_url(source) {
        fetch_url(source)
    } else {
        std::fs::read_to_string(source).map_err(|e| e.to_string())
    }
}

fn fetch_url(url: &str) -> Result<String, String> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime.block_on(async {
        let response = reqwest::get(url).await.map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.text().await.map_err(|e| e.to_string())
    })
}
