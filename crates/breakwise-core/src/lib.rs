//! # Breakwise Core Library
//!
//! Core decision logic for Breakwise, a stress-aware break scheduler.
//! All operations are synchronous and free of I/O; the CLI (or any other
//! front end) owns fetching, persistence and rendering, and hands this
//! library already-resolved text and clock values.
//!
//! ## Key Components
//!
//! - [`ics`]: calendar export parsing and single-event serialization
//! - [`slots`]: free-slot search over a day's bookable window
//! - [`bandit`]: per-activity reward estimates and explore/exploit selection
//! - [`SessionContext`]: one user's mutable state and the recommendation
//!   lifecycle state machine

pub mod bandit;
pub mod config;
pub mod error;
pub mod ics;
pub mod session;
pub mod slots;

pub use bandit::{choose_activity, ActivityStats, Selection, SelectionConfig, ValueModel};
pub use config::{data_dir, Config};
pub use error::ConfigError;
pub use ics::{export_event, parse_calendar, ParsedEvent};
pub use session::{Recommendation, SessionContext, SessionError, Stage};
pub use slots::{available_slots, BusyInterval, SlotConfig};
