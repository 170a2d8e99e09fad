//! Session context and recommendation lifecycle.
//!
//! One [`SessionContext`] owns everything mutable for a single user and
//! day horizon: the learned value model, the busy-interval cache and the
//! in-flight recommendation. Callers in a multi-session host must keep one
//! context per session; the context itself needs no locking.
//!
//! The recommendation moves through a small state machine:
//!
//! ```text
//! Idle -suggest-> Proposed -accept-> Scheduling -complete-> Completed
//!        ^            |  ^                |                     |
//!        |         reroll-+         (choose slot)        submit_feedback
//!        +----------------------- back / abandon ---------------+
//! ```
//!
//! Only `submit_feedback` touches the value model, and only
//! `refresh_busy_intervals` touches the busy cache.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bandit::{choose_activity, ActivityStats, SelectionConfig, ValueModel};
use crate::ics;
use crate::slots::{available_slots, BusyInterval, SlotConfig};

/// How far ahead of "now" busy events are kept, in days.
pub const BUSY_HORIZON_DAYS: i64 = 30;

/// Where a recommendation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No recommendation in flight.
    Idle,
    /// An activity is chosen, no slot yet.
    Proposed,
    /// The user accepted; duration and slot selection are open.
    Scheduling,
    /// The break happened; feedback may be submitted.
    Completed,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Proposed => "proposed",
            Stage::Scheduling => "scheduling",
            Stage::Completed => "completed",
        }
    }
}

/// A break recommendation in flight. Short-lived: cleared on feedback,
/// abandon, or day advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity: String,
    /// Set once a slot is chosen in the Scheduling stage.
    pub start: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub stage: Stage,
}

/// Recommendation lifecycle errors. All recoverable; the caller retries
/// from a legal stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while the recommendation is {stage}")]
    InvalidStage {
        action: &'static str,
        stage: &'static str,
    },

    #[error("no favorite activities configured")]
    NoFavorites,

    #[error("no slot chosen for the break yet")]
    SlotNotChosen,

    #[error("break duration must be positive, got {0}")]
    InvalidDuration(i64),
}

/// All mutable state for one user session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub model: ValueModel,
    pub favorites: Vec<String>,
    /// Busy intervals overlapping the look-ahead horizon, sorted by start.
    /// Replaced wholesale on every calendar refresh.
    pub busy: Vec<BusyInterval>,
    pub calendar_status: String,
    pub recommendation: Option<Recommendation>,
    /// Demo day advance, in days past the real current day.
    pub day_offset: i64,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub slots: SlotConfig,
}

impl SessionContext {
    /// New context with the given favorite activities. Each favorite gets
    /// a zeroed model entry up front.
    pub fn new(favorites: Vec<String>) -> Self {
        let mut model = ValueModel::new();
        for activity in &favorites {
            model.ensure(activity);
        }
        Self {
            model,
            favorites,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.recommendation
            .as_ref()
            .map_or(Stage::Idle, |r| r.stage)
    }

    /// Local "now" shifted by the demo day offset.
    pub fn demo_now(&self, real_now: NaiveDateTime) -> NaiveDateTime {
        real_now + Duration::days(self.day_offset)
    }

    /// Parse a calendar export (or record its fetch failure) and replace
    /// the busy-interval cache wholesale.
    ///
    /// `fetch` is the collaborator's already-resolved outcome: the raw
    /// text, or a human-readable failure reason. Failure empties the
    /// cache. Returns the new status message.
    pub fn refresh_busy_intervals(
        &mut self,
        fetch: Result<&str, &str>,
        now: NaiveDateTime,
    ) -> &str {
        match fetch {
            Ok(text) => {
                let horizon = now + Duration::days(BUSY_HORIZON_DAYS);
                let mut busy: Vec<BusyInterval> = ics::parse_calendar(text)
                    .into_iter()
                    .filter(|e| e.busy && e.end >= now && e.start <= horizon)
                    .map(|e| BusyInterval {
                        start: e.start,
                        end: e.end,
                        summary: e.summary,
                    })
                    .collect();
                busy.sort_by_key(|b| b.start);
                self.calendar_status = format!("Loaded {} busy events.", busy.len());
                self.busy = busy;
            }
            Err(reason) => {
                self.busy = Vec::new();
                self.calendar_status = format!("Failed to load calendar: {reason}");
            }
        }
        &self.calendar_status
    }

    /// Candidate start times for a break of `duration_minutes` on `day`.
    pub fn available_slots(
        &self,
        day: NaiveDate,
        duration_minutes: i64,
        now: NaiveDateTime,
    ) -> Vec<NaiveDateTime> {
        available_slots(day, duration_minutes, &self.busy, now, &self.slots)
    }

    /// Idle -> Proposed: pick an activity from the favorites.
    pub fn suggest<R: rand::Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Recommendation, SessionError> {
        if self.stage() != Stage::Idle {
            return Err(self.invalid("suggest"));
        }
        let selection = self.pick(self.selection, rng)?;
        let rec = Recommendation {
            activity: selection,
            start: None,
            duration_minutes: None,
            stage: Stage::Proposed,
        };
        self.recommendation = Some(rec.clone());
        Ok(rec)
    }

    /// Proposed -> Proposed: pick again with boosted exploration,
    /// discarding any slot choice.
    pub fn reroll<R: rand::Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Recommendation, SessionError> {
        if self.stage() != Stage::Proposed {
            return Err(self.invalid("reroll"));
        }
        let selection = self.pick(self.selection.boosted(), rng)?;
        let rec = Recommendation {
            activity: selection,
            start: None,
            duration_minutes: None,
            stage: Stage::Proposed,
        };
        self.recommendation = Some(rec.clone());
        Ok(rec)
    }

    /// Proposed -> Scheduling.
    pub fn accept(&mut self) -> Result<(), SessionError> {
        if self.stage() != Stage::Proposed {
            return Err(self.invalid("accept"));
        }
        if let Some(rec) = self.recommendation.as_mut() {
            rec.stage = Stage::Scheduling;
        }
        Ok(())
    }

    /// Scheduling: record the chosen slot.
    pub fn schedule(
        &mut self,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Result<(), SessionError> {
        if duration_minutes <= 0 {
            return Err(SessionError::InvalidDuration(duration_minutes));
        }
        if self.stage() != Stage::Scheduling {
            return Err(self.invalid("schedule"));
        }
        if let Some(rec) = self.recommendation.as_mut() {
            rec.start = Some(start);
            rec.duration_minutes = Some(duration_minutes);
        }
        Ok(())
    }

    /// Scheduling -> Completed. The slot must have been chosen.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        if self.stage() != Stage::Scheduling {
            return Err(self.invalid("complete"));
        }
        if let Some(rec) = self.recommendation.as_mut() {
            if rec.start.is_none() || rec.duration_minutes.is_none() {
                return Err(SessionError::SlotNotChosen);
            }
            rec.stage = Stage::Completed;
        }
        Ok(())
    }

    /// Completed -> Idle: fold the outcome into the value model, clear
    /// the recommendation and advance the day. The only operation that
    /// mutates the model.
    pub fn submit_feedback(
        &mut self,
        stress_delta: i32,
        experience: i32,
    ) -> Result<ActivityStats, SessionError> {
        let activity = match self.recommendation.as_ref() {
            Some(rec) if rec.stage == Stage::Completed => rec.activity.clone(),
            _ => return Err(self.invalid("submit feedback")),
        };
        self.model.record_feedback(&activity, stress_delta, experience);
        self.recommendation = None;
        self.day_offset += 1;
        Ok(self.model.stats(&activity))
    }

    /// Step one stage back, discarding in-progress slot choices. A no-op
    /// when already idle.
    pub fn back(&mut self) {
        match self.stage() {
            Stage::Idle => {}
            Stage::Proposed => self.recommendation = None,
            Stage::Scheduling => {
                if let Some(rec) = self.recommendation.as_mut() {
                    rec.start = None;
                    rec.duration_minutes = None;
                    rec.stage = Stage::Proposed;
                }
            }
            Stage::Completed => {
                if let Some(rec) = self.recommendation.as_mut() {
                    rec.stage = Stage::Scheduling;
                }
            }
        }
    }

    /// Drop the in-flight recommendation entirely.
    pub fn abandon(&mut self) {
        self.recommendation = None;
    }

    /// Advance the demo day without feedback, clearing any recommendation.
    pub fn next_day(&mut self) {
        self.day_offset += 1;
        self.recommendation = None;
    }

    fn pick<R: rand::Rng + ?Sized>(
        &mut self,
        config: SelectionConfig,
        rng: &mut R,
    ) -> Result<String, SessionError> {
        for activity in &self.favorites {
            self.model.ensure(activity);
        }
        choose_activity(&self.favorites, &config, &self.model, rng)
            .activity
            .ok_or(SessionError::NoFavorites)
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidStage {
            action,
            stage: self.stage().name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(11)
    }

    fn ctx() -> SessionContext {
        SessionContext::new(vec![
            "Walk outside".to_string(),
            "Stretch".to_string(),
            "Tea break".to_string(),
        ])
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn happy_path_reaches_idle_again() {
        let mut ctx = ctx();
        let mut rng = rng();

        let rec = ctx.suggest(&mut rng).unwrap();
        assert_eq!(ctx.stage(), Stage::Proposed);
        assert!(rec.start.is_none());

        ctx.accept().unwrap();
        assert_eq!(ctx.stage(), Stage::Scheduling);

        ctx.schedule(at(10, 0), 20).unwrap();
        ctx.complete().unwrap();
        assert_eq!(ctx.stage(), Stage::Completed);

        let stats = ctx.submit_feedback(3, 8).unwrap();
        assert_eq!(stats.count, 1);
        assert!((stats.value - 3.6).abs() < 1e-9);
        assert_eq!(ctx.stage(), Stage::Idle);
        assert_eq!(ctx.day_offset, 1);
    }

    #[test]
    fn suggest_requires_idle() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        let err = ctx.suggest(&mut rng).unwrap_err();
        assert!(matches!(err, SessionError::InvalidStage { stage: "proposed", .. }));
    }

    #[test]
    fn suggest_with_no_favorites_fails_cleanly() {
        let mut ctx = SessionContext::new(Vec::new());
        assert_eq!(ctx.suggest(&mut rng()).unwrap_err(), SessionError::NoFavorites);
        assert_eq!(ctx.stage(), Stage::Idle);
    }

    #[test]
    fn reroll_replaces_activity_and_keeps_stage() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        let rec = ctx.reroll(&mut rng).unwrap();
        assert_eq!(ctx.stage(), Stage::Proposed);
        assert!(ctx.favorites.contains(&rec.activity));
        assert!(rec.start.is_none());
    }

    #[test]
    fn reroll_outside_proposed_is_rejected() {
        let mut ctx = ctx();
        let mut rng = rng();
        assert!(ctx.reroll(&mut rng).is_err());
        ctx.suggest(&mut rng).unwrap();
        ctx.accept().unwrap();
        assert!(ctx.reroll(&mut rng).is_err());
    }

    #[test]
    fn complete_without_slot_is_rejected() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.accept().unwrap();
        assert_eq!(ctx.complete().unwrap_err(), SessionError::SlotNotChosen);
    }

    #[test]
    fn schedule_rejects_nonpositive_duration() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.accept().unwrap();
        assert_eq!(
            ctx.schedule(at(10, 0), 0).unwrap_err(),
            SessionError::InvalidDuration(0)
        );
    }

    #[test]
    fn selecting_never_mutates_the_model() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.reroll(&mut rng).unwrap();
        for activity in ctx.favorites.clone() {
            assert_eq!(ctx.model.stats(&activity).count, 0);
        }
    }

    #[test]
    fn back_walks_the_stages_and_discards_slot() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.accept().unwrap();
        ctx.schedule(at(10, 0), 20).unwrap();
        ctx.complete().unwrap();

        ctx.back();
        assert_eq!(ctx.stage(), Stage::Scheduling);

        ctx.back();
        assert_eq!(ctx.stage(), Stage::Proposed);
        let rec = ctx.recommendation.as_ref().unwrap();
        assert!(rec.start.is_none() && rec.duration_minutes.is_none());

        ctx.back();
        assert_eq!(ctx.stage(), Stage::Idle);

        // Idle: nothing left to step back from.
        ctx.back();
        assert_eq!(ctx.stage(), Stage::Idle);
    }

    #[test]
    fn next_day_clears_recommendation() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.next_day();
        assert_eq!(ctx.stage(), Stage::Idle);
        assert_eq!(ctx.day_offset, 1);
        assert_eq!(ctx.demo_now(at(9, 0)), at(9, 0) + Duration::days(1));
    }

    #[test]
    fn refresh_keeps_only_busy_events_in_horizon() {
        let mut ctx = ctx();
        let now = at(8, 0);
        let text = "BEGIN:VEVENT\n\
                    DTSTART:20240611T090000\n\
                    DTEND:20240611T100000\n\
                    SUMMARY:In horizon\n\
                    END:VEVENT\n\
                    BEGIN:VEVENT\n\
                    DTSTART:20240609T090000\n\
                    DTEND:20240609T100000\n\
                    SUMMARY:Already over\n\
                    END:VEVENT\n\
                    BEGIN:VEVENT\n\
                    DTSTART:20240901T090000\n\
                    DTEND:20240901T100000\n\
                    SUMMARY:Past horizon\n\
                    END:VEVENT\n\
                    BEGIN:VEVENT\n\
                    DTSTART:20240611T110000\n\
                    DTEND:20240611T120000\n\
                    TRANSP:TRANSPARENT\n\
                    SUMMARY:Free anyway\n\
                    END:VEVENT\n";

        let status = ctx.refresh_busy_intervals(Ok(text), now).to_string();
        assert_eq!(status, "Loaded 1 busy events.");
        assert_eq!(ctx.busy.len(), 1);
        assert_eq!(ctx.busy[0].summary.as_deref(), Some("In horizon"));
    }

    #[test]
    fn refresh_sorts_by_start() {
        let mut ctx = ctx();
        let text = "BEGIN:VEVENT\n\
                    DTSTART:20240612T090000\n\
                    END:VEVENT\n\
                    BEGIN:VEVENT\n\
                    DTSTART:20240611T090000\n\
                    END:VEVENT\n";
        ctx.refresh_busy_intervals(Ok(text), at(8, 0));
        assert_eq!(ctx.busy.len(), 2);
        assert!(ctx.busy[0].start < ctx.busy[1].start);
    }

    #[test]
    fn refresh_failure_empties_cache_with_status() {
        let mut ctx = ctx();
        ctx.refresh_busy_intervals(
            Ok("BEGIN:VEVENT\nDTSTART:20240611T090000\nEND:VEVENT\n"),
            at(8, 0),
        );
        assert!(!ctx.busy.is_empty());

        let status = ctx
            .refresh_busy_intervals(Err("connection timed out"), at(8, 0))
            .to_string();
        assert!(ctx.busy.is_empty());
        assert_eq!(status, "Failed to load calendar: connection timed out");
    }

    #[test]
    fn slots_use_the_refreshed_cache() {
        let mut ctx = ctx();
        let now = at(8, 0);
        ctx.refresh_busy_intervals(
            Ok("BEGIN:VEVENT\nDTSTART:20240610T090000\nDTEND:20240610T100000\nEND:VEVENT\n"),
            now,
        );
        let slots = ctx.available_slots(now.date(), 30, now);
        assert!(slots.contains(&at(8, 0)));
        assert!(!slots.contains(&at(9, 0)));
        assert!(!slots.contains(&at(9, 30)));
        assert!(slots.contains(&at(10, 0)));
    }

    #[test]
    fn context_survives_a_json_round_trip() {
        let mut ctx = ctx();
        let mut rng = rng();
        ctx.suggest(&mut rng).unwrap();
        ctx.model.record_feedback("Stretch", 2, 6);

        let json = serde_json::to_string(&ctx).unwrap();
        let restored: SessionContext = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.stage(), Stage::Proposed);
        assert_eq!(restored.model.stats("Stretch").count, 1);
        assert_eq!(restored.favorites, ctx.favorites);
    }
}
