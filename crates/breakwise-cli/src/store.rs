//! JSON-backed session persistence between CLI invocations.
//!
//! The core keeps one in-memory [`SessionContext`] per session; the CLI is
//! a new process every time, so the context (plus the demo stress series)
//! is snapshotted to `session.json` in the data directory after every
//! mutating command.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use breakwise_core::{data_dir, Config, SessionContext};

/// Everything the CLI persists between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliState {
    pub session: SessionContext,
    /// Synthetic stress series for the current demo day, if generated.
    #[serde(default)]
    pub stress_series: Option<Vec<f64>>,
    /// Number of stress peaks in the current series.
    #[serde(default)]
    pub stress_peaks: usize,
    /// Day offset the series was generated for; regenerated when it lags.
    #[serde(default)]
    pub series_day_offset: Option<i64>,
}

fn state_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("session.json"))
}

/// Load the persisted state, or start a fresh session from the config.
///
/// The config stays authoritative for favorites and the explore/exploit
/// parameters, so edits via `config set` and `favorite add` apply on the
/// next invocation.
pub fn load() -> Result<CliState, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut state: CliState = match std::fs::read_to_string(state_path()?) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
        Err(_) => CliState::default(),
    };

    state.session.favorites = config.favorites.clone();
    for activity in &state.session.favorites {
        state.session.model.ensure(activity);
    }
    state.session.selection.epsilon = config.epsilon;
    state.session.selection.tau = config.tau;
    Ok(state)
}

/// Persist the state snapshot, replacing the previous one.
pub fn save(state: &CliState) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(state_path()?, json)?;
    Ok(())
}
