//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Client identifiers
pub const DEFAULT_CLIENT_ID: &str = "personal";
pub const MULTIPLE_CLIENTS_ID: &str = "multiple";

// Presentation defaults (mirrors the configuration editor's fallback color)
pub const DEFAULT_CLIENT_COLOR: &str = "#4ECDC4";

// Aggregation
pub const MINUTES_PER_HOUR: f64 = 60.0;

// Configuration file
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
