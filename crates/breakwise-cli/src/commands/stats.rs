//! Learned activity statistics.

use clap::Subcommand;
use serde_json::json;

use crate::store;

#[derive(Subcommand)]
pub enum StatsAction {
    /// List learned per-activity stats
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StatsAction::List { json: as_json } => {
            let state = store::load()?;
            let mut rows: Vec<(String, u32, f64)> = state
                .session
                .model
                .iter()
                .map(|(activity, stats)| (activity.to_string(), stats.count, stats.value))
                .collect();
            rows.sort_by(|a, b| a.0.cmp(&b.0));

            if as_json {
                let entries: Vec<_> = rows
                    .iter()
                    .map(|(activity, count, value)| {
                        json!({ "activity": activity, "count": count, "value": value })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if rows.is_empty() {
                println!("Nothing learned yet.");
            } else {
                for (activity, count, value) in rows {
                    println!("{activity}: {count} report(s), value {value:.2}");
                }
            }
        }
    }
    Ok(())
}
