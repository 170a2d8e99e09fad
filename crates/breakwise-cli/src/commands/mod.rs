pub mod breaks;
pub mod calendar;
pub mod config;
pub mod day;
pub mod favorites;
pub mod stats;
