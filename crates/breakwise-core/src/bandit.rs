//! Activity value model and explore/exploit selection policy.
//!
//! Each activity carries a running mean of the rewards reported for it.
//! Selection is epsilon-greedy on top of temperature-controlled softmax
//! sampling: with probability epsilon the pick is uniform at random,
//! otherwise activities are sampled proportionally to the exponentiated
//! (max-shifted) value. The random source is injected so selection is
//! deterministic under test.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Running reward estimate for one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    /// Number of feedback reports applied.
    pub count: u32,
    /// Arithmetic mean of all rewards applied. Unbounded sign.
    pub value: f64,
}

/// Mapping from activity identifier to its learned stats.
///
/// Entries are created lazily with `{count: 0, value: 0.0}` and never
/// deleted within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueModel {
    stats: HashMap<String, ActivityStats>,
}

impl ValueModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for an activity, defaulting to zero for unseen ones.
    pub fn stats(&self, activity: &str) -> ActivityStats {
        self.stats.get(activity).copied().unwrap_or_default()
    }

    /// Make sure an activity has an entry, without touching its stats.
    pub fn ensure(&mut self, activity: &str) {
        self.stats.entry(activity.to_string()).or_default();
    }

    /// Reward signal for one feedback report: stress delta (-5..=5,
    /// positive means stress went down) plus a small experience term
    /// (0.2 per point away from the neutral 5). May be negative; it is
    /// deliberately not clamped.
    pub fn reward(stress_delta: i32, experience: i32) -> f64 {
        f64::from(stress_delta) + 0.2 * (f64::from(experience) - 5.0)
    }

    /// Fold one feedback report into the running mean for `activity`.
    pub fn record_feedback(&mut self, activity: &str, stress_delta: i32, experience: i32) {
        let reward = Self::reward(stress_delta, experience);
        let stats = self.stats.entry(activity.to_string()).or_default();
        let n = stats.count + 1;
        stats.value += (reward - stats.value) / f64::from(n);
        stats.count = n;
    }

    /// All known activities with their stats, for display.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActivityStats)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Explore/exploit parameters for [`choose_activity`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Probability of a uniform random pick.
    pub epsilon: f64,
    /// Softmax temperature. Lower concentrates on the best value.
    pub tau: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.05,
            tau: 0.8,
        }
    }
}

impl SelectionConfig {
    /// The "suggest something different" variant: epsilon raised by 0.2,
    /// capped at 0.5, same temperature.
    pub fn boosted(self) -> Self {
        Self {
            epsilon: (self.epsilon + 0.2).min(0.5),
            tau: self.tau,
        }
    }
}

/// Outcome of one selection draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Chosen activity; `None` only when the candidate set was empty.
    pub activity: Option<String>,
    /// Score snapshot for every candidate, in enumeration order.
    pub scores: Vec<(String, f64)>,
}

/// Pick one activity from `candidates`.
///
/// Total over all inputs: an empty candidate set yields
/// `Selection { activity: None, .. }` rather than an error, and rounding
/// edge cases in the cumulative draw fall back to the last candidate.
pub fn choose_activity<R: Rng + ?Sized>(
    candidates: &[String],
    config: &SelectionConfig,
    model: &ValueModel,
    rng: &mut R,
) -> Selection {
    let scores: Vec<(String, f64)> = candidates
        .iter()
        .map(|a| (a.clone(), model.stats(a).value))
        .collect();

    if scores.is_empty() {
        return Selection {
            activity: None,
            scores,
        };
    }

    if rng.gen::<f64>() < config.epsilon {
        let idx = rng.gen_range(0..scores.len());
        return Selection {
            activity: Some(scores[idx].0.clone()),
            scores,
        };
    }

    let tau = config.tau.max(1e-6);
    let max = scores
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = scores.iter().map(|(_, s)| ((s - max) / tau).exp()).collect();
    let total: f64 = weights.iter().sum();
    let total = if total > 0.0 { total } else { 1.0 };

    let draw = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for ((activity, _), weight) in scores.iter().zip(&weights) {
        cumulative += weight / total;
        if draw <= cumulative {
            return Selection {
                activity: Some(activity.clone()),
                scores,
            };
        }
    }

    // Rounding left the draw above the final cumulative probability.
    let last = scores.last().map(|(a, _)| a.clone());
    Selection {
        activity: last,
        scores,
    }
}
