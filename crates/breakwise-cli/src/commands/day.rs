//! Demo day overview and advancement.

use chrono::Local;
use clap::Subcommand;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use crate::demo;
use crate::store::{self, CliState};

#[derive(Subcommand)]
pub enum DayAction {
    /// Show today's stress overview
    Show,
    /// Advance to the next demo day
    Next,
}

pub fn run(action: DayAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DayAction::Show => {
            let mut state = store::load()?;
            ensure_series(&mut state);
            store::save(&state)?;

            let now = Local::now().naive_local();
            let day = state.session.demo_now(now);
            println!(
                "{} (demo day +{})",
                day.format("%a %d %b"),
                state.session.day_offset
            );
            if let Some(series) = &state.stress_series {
                println!("{}", demo::sparkline(series));
            }
            println!("Peaks today: {}", state.stress_peaks);
            if demo::is_high_stress(state.stress_peaks) {
                println!("High stress detected -- a break is recommended.");
            } else {
                println!("No excess stress -- schedule a break anyway, or skip to the next day.");
            }
            if state.session.busy.is_empty() {
                println!("No calendar linked.");
            } else {
                println!("Calendar linked ({} busy events).", state.session.busy.len());
            }
        }
        DayAction::Next => {
            let mut state = store::load()?;
            state.session.next_day();
            ensure_series(&mut state);
            store::save(&state)?;
            println!("Advanced to demo day +{}.", state.session.day_offset);
        }
    }
    Ok(())
}

/// Regenerate the stress series when the demo day has moved past it.
fn ensure_series(state: &mut CliState) {
    if state.series_day_offset == Some(state.session.day_offset) && state.stress_series.is_some() {
        return;
    }
    let mut rng = Mcg128Xsl64::from_entropy();
    let peaks = demo::draw_peak_count(&mut rng);
    state.stress_series = Some(demo::generate_series(peaks, &mut rng));
    state.stress_peaks = peaks;
    state.series_day_offset = Some(state.session.day_offset);
}
