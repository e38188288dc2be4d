//! Attribution result types
//!
//! Output side of the engine: the per-phase match decision and the per-day
//! rollup handed to the report renderer and import pipeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::MINUTES_PER_HOUR;

/// Which signal produced a phase's client assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    /// Project name substring match
    Project,
    /// Description/folder substring match
    Folder,
    /// Ticket reference prefix match
    TicketPrefix,
    /// Tag intersection match
    Tag,
    /// Day-level commit activity corroboration
    CommitActivity,
    /// No rule matched; fell through to the default client
    Default,
}

/// Per-phase classification decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMatch {
    /// Owning client id
    pub client_id: String,

    /// Signal that decided the assignment
    pub matched_by: MatchField,
}

/// Per-client rollup of one day's attributed time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    /// Client id this summary belongs to
    pub client_id: String,

    /// Attributed minutes (positive durations only)
    pub total_minutes: i64,

    /// Attributed hours, rounded to one decimal
    pub hours: f64,

    /// Project names seen on attributed phases
    pub projects: BTreeSet<String>,

    /// Ticket references seen on attributed phases
    pub tickets: BTreeSet<String>,
}

impl ClientSummary {
    /// Empty summary for a client
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            total_minutes: 0,
            hours: 0.0,
            projects: BTreeSet::new(),
            tickets: BTreeSet::new(),
        }
    }
}

/// Day-level attribution output: per-client summaries plus derived totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAttribution {
    /// Per-client rollups, keyed by client id (clients with attributed time
    /// only)
    pub client_summaries: BTreeMap<String, ClientSummary>,

    /// Hours per non-default client, rounded to one decimal
    pub client_hours: BTreeMap<String, f64>,

    /// Total hours across non-default clients, rounded to one decimal
    pub billable_hours: f64,

    /// Default client's hours, rounded to one decimal
    pub side_project_hours: f64,

    /// Default client's id if no client work, the sole client's id if
    /// exactly one, or the "multiple" sentinel otherwise
    pub primary_client_id: String,
}

/// Round minutes to hours with one decimal, half away from zero
pub fn minutes_to_hours(minutes: i64) -> f64 {
    (minutes as f64 / MINUTES_PER_HOUR * 10.0).round() / 10.0
}
