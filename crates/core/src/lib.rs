//! # TimeStory Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The rule store: ordered client detection rules plus one default
//! - The attribution engine: per-phase classification, category rewrite,
//!   and per-day aggregation
//!
//! ## Architecture Principles
//! - Only depends on `timestory-domain`
//! - No database, HTTP, or platform code
//! - Pure, testable business logic: loading rule configs and daily records
//!   is the caller's responsibility

pub mod attribution;

// Re-export specific items to avoid ambiguity
pub use attribution::classifier::classify_phase;
pub use attribution::engine::AttributionEngine;
pub use attribution::rule_store::RuleStore;
