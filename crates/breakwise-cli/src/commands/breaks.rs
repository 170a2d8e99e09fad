//! Break recommendation lifecycle commands.
//!
//! Each subcommand drives one transition of the core state machine; the
//! session snapshot is saved after every mutation so the flow can span
//! CLI invocations.

use chrono::{Local, NaiveTime};
use clap::Subcommand;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use breakwise_core::{export_event, ActivityStats, Config, Recommendation};

use crate::store;

#[derive(Subcommand)]
pub enum BreakAction {
    /// Recommend a break activity
    Suggest {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Ask for a different activity (more exploratory draw)
    Reroll {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Accept the proposed activity and move on to scheduling
    Accept,
    /// List free start times for the current demo day
    Slots {
        /// Break length in minutes (15-60)
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Choose a start time for the accepted break
    Schedule {
        /// Start time as HH:MM on the current demo day
        start: String,
        /// Break length in minutes (15-60)
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Export the scheduled break as an .ics file
    Export {
        /// Output path; defaults to break_<activity>.ics
        #[arg(long)]
        output: Option<String>,
    },
    /// Mark the scheduled break as done
    Done,
    /// Report how the break went and advance the day
    Feedback {
        /// Stress change, -5 (much worse) to +5 (much better)
        #[arg(long, allow_hyphen_values = true)]
        delta: i32,
        /// Experience rating, 1 to 10
        #[arg(long)]
        experience: i32,
    },
    /// Show the recommendation in flight
    Show,
    /// Step one stage back
    Back,
    /// Drop the recommendation entirely
    Abandon,
}

pub fn run(action: BreakAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BreakAction::Suggest { seed } => {
            let mut state = store::load()?;
            let rec = state.session.suggest(&mut rng_from(seed))?;
            print_proposal(&rec, state.session.model.stats(&rec.activity));
            store::save(&state)?;
        }
        BreakAction::Reroll { seed } => {
            let mut state = store::load()?;
            let rec = state.session.reroll(&mut rng_from(seed))?;
            print_proposal(&rec, state.session.model.stats(&rec.activity));
            store::save(&state)?;
        }
        BreakAction::Accept => {
            let mut state = store::load()?;
            state.session.accept()?;
            println!("Accepted. Pick a slot with `break slots` and `break schedule`.");
            store::save(&state)?;
        }
        BreakAction::Slots { duration } => {
            let state = store::load()?;
            let duration = resolve_duration(duration)?;
            let now = Local::now().naive_local();
            let day = state.session.demo_now(now).date();

            let slots = state.session.available_slots(day, duration, now);
            if slots.is_empty() {
                println!(
                    "No free whole/half-hour slots on {day} between 08:00-22:00 for {duration} minutes."
                );
            } else {
                println!("Free {duration}-minute slots on {day}:");
                for slot in slots {
                    println!("  {}", slot.format("%H:%M"));
                }
            }
        }
        BreakAction::Schedule { start, duration } => {
            let mut state = store::load()?;
            let duration = resolve_duration(duration)?;
            let time = NaiveTime::parse_from_str(&start, "%H:%M")
                .map_err(|_| format!("invalid start time '{start}', expected HH:MM"))?;
            let now = Local::now().naive_local();
            let day = state.session.demo_now(now).date();
            let slot = day.and_time(time);

            let open = state.session.available_slots(day, duration, now);
            if !open.contains(&slot) {
                return Err(format!("{start} is not an available slot on {day}").into());
            }

            state.session.schedule(slot, duration)?;
            println!(
                "Break scheduled at {} for {duration} minutes.",
                slot.format("%Y-%m-%d %H:%M")
            );
            store::save(&state)?;
        }
        BreakAction::Export { output } => {
            let state = store::load()?;
            let Some(rec) = state.session.recommendation.as_ref() else {
                return Err("no recommendation in flight".into());
            };
            let (Some(start), Some(duration)) = (rec.start, rec.duration_minutes) else {
                return Err("no slot chosen yet; run `break schedule` first".into());
            };

            let bytes = export_event(
                &format!("Break: {}", rec.activity),
                start,
                duration,
                "Suggested by Breakwise.",
            );
            let path = output
                .unwrap_or_else(|| format!("break_{}.ics", rec.activity.replace(' ', "_")));
            std::fs::write(&path, bytes)?;
            println!("Wrote {path}");
        }
        BreakAction::Done => {
            let mut state = store::load()?;
            state.session.complete()?;
            println!("Nice. Report how it went with `break feedback`.");
            store::save(&state)?;
        }
        BreakAction::Feedback { delta, experience } => {
            if !(-5..=5).contains(&delta) {
                return Err("delta must be between -5 and 5".into());
            }
            if !(1..=10).contains(&experience) {
                return Err("experience must be between 1 and 10".into());
            }
            let mut state = store::load()?;
            let activity = state
                .session
                .recommendation
                .as_ref()
                .map(|r| r.activity.clone())
                .unwrap_or_default();
            let stats = state.session.submit_feedback(delta, experience)?;
            println!(
                "Thanks. {activity}: tried {} time(s), learned value {:.2}.",
                stats.count, stats.value
            );
            println!("On to the next day.");
            store::save(&state)?;
        }
        BreakAction::Show => {
            let state = store::load()?;
            match state.session.recommendation.as_ref() {
                None => println!("No recommendation in flight."),
                Some(rec) => {
                    println!("Stage:    {}", rec.stage.name());
                    println!("Activity: {}", rec.activity);
                    if let Some(start) = rec.start {
                        println!("Start:    {}", start.format("%Y-%m-%d %H:%M"));
                    }
                    if let Some(duration) = rec.duration_minutes {
                        println!("Duration: {duration} min");
                    }
                    println!(
                        "Outlook:  {}",
                        expectation_text(state.session.model.stats(&rec.activity))
                    );
                }
            }
        }
        BreakAction::Back => {
            let mut state = store::load()?;
            state.session.back();
            println!("Now at stage: {}", state.session.stage().name());
            store::save(&state)?;
        }
        BreakAction::Abandon => {
            let mut state = store::load()?;
            state.session.abandon();
            println!("Recommendation dropped.");
            store::save(&state)?;
        }
    }
    Ok(())
}

fn rng_from(seed: Option<u64>) -> Mcg128Xsl64 {
    match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    }
}

fn resolve_duration(duration: Option<i64>) -> Result<i64, Box<dyn std::error::Error>> {
    let duration = duration.unwrap_or_else(|| Config::load_or_default().default_duration_minutes);
    if !(15..=60).contains(&duration) {
        return Err("duration must be between 15 and 60 minutes".into());
    }
    Ok(duration)
}

fn print_proposal(rec: &Recommendation, stats: ActivityStats) {
    println!("Recommended break: {}", rec.activity);
    println!("{}", expectation_text(stats));
}

/// Friendly wording for an activity's learned mean; no numbers on purpose.
fn expectation_text(stats: ActivityStats) -> &'static str {
    if stats.count == 0 {
        return "I don't know yet -- let's try this and learn what works for you.";
    }
    let mean = stats.value;
    if mean <= -2.5 {
        "May increase stress for you; consider alternatives."
    } else if mean < -0.5 {
        "Tends to feel counter-productive based on past feedback."
    } else if mean < 0.5 {
        "Mixed effects so far -- might help, might not."
    } else if mean < 2.5 {
        "Expected to provide a modest drop in stress."
    } else if mean < 4.0 {
        "Expected to provide a noticeable drop in stress."
    } else {
        "Often provides a strong reduction in stress."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(count: u32, value: f64) -> ActivityStats {
        ActivityStats { count, value }
    }

    #[test]
    fn expectation_bands_cover_the_scale() {
        assert!(expectation_text(stats(0, 0.0)).contains("don't know"));
        assert!(expectation_text(stats(3, -4.0)).contains("increase stress"));
        assert!(expectation_text(stats(3, -1.0)).contains("counter-productive"));
        assert!(expectation_text(stats(3, 0.0)).contains("Mixed"));
        assert!(expectation_text(stats(3, 1.0)).contains("modest"));
        assert!(expectation_text(stats(3, 3.0)).contains("noticeable"));
        assert!(expectation_text(stats(3, 4.5)).contains("strong"));
    }

    #[test]
    fn duration_bounds_are_enforced() {
        assert!(resolve_duration(Some(15)).is_ok());
        assert!(resolve_duration(Some(60)).is_ok());
        assert!(resolve_duration(Some(10)).is_err());
        assert!(resolve_duration(Some(61)).is_err());
    }
}
