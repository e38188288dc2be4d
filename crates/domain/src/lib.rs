//! # TimeStory Domain
//!
//! Business domain types and models for TimeStory client attribution.
//!
//! This crate contains:
//! - Domain data types (ClientRule, ActivityPhase, DailyRecord, etc.)
//! - Domain error types and Result definitions
//! - The client configuration file model maintained by the external editor
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other TimeStory crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::ClientConfigFile;
pub use errors::{Result, TimeStoryError};
pub use types::{
    ActivityPhase, ClientRule, ClientSummary, CommitActivity, DailyRecord, DayAttribution,
    DetectionField, DetectionPatterns, MatchField, PhaseCategory, PhaseMatch,
};
