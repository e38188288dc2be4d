//! Domain types and models

pub mod attribution;
pub mod client;
pub mod phase;

pub use attribution::{ClientSummary, DayAttribution, MatchField, PhaseMatch};
pub use client::{ClientRule, DetectionField, DetectionPatterns};
pub use phase::{ActivityPhase, CommitActivity, DailyRecord, PhaseCategory};
