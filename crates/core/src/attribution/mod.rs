//! Client attribution domain
//!
//! Decides, for each recorded activity phase in a day, which client the
//! work belongs to, and rolls the per-phase decisions up into per-client
//! summaries and day totals.

pub mod classifier;
pub mod engine;
pub mod rule_store;

pub use classifier::classify_phase;
pub use engine::AttributionEngine;
pub use rule_store::RuleStore;
