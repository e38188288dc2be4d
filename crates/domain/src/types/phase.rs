//! Activity phase and daily record types
//!
//! A phase is a contiguous block of recorded activity within a day, the
//! atomic unit of attribution. The daily record is the ordered sequence of
//! phases plus day-level metadata, produced externally (schedule generators,
//! real trackers) and handed to the engine as plain structured data.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Phase category, an open tag set
///
/// Only `client_work` and `meeting` participate in attribution; everything
/// else passes through the engine untouched. Unknown values deserialize to
/// `Other` carrying the raw tag so records round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhaseCategory {
    ClientWork,
    SideProject,
    Meeting,
    Break,
    Planning,
    Health,
    Other(String),
}

impl PhaseCategory {
    /// Whether phases of this category are classified by the engine
    ///
    /// Non-work phases carry no billing semantics and are excluded from
    /// attribution.
    pub fn is_attributable(&self) -> bool {
        matches!(self, Self::ClientWork | Self::Meeting)
    }
}

impl From<String> for PhaseCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "client_work" => Self::ClientWork,
            "side_project" => Self::SideProject,
            "meeting" => Self::Meeting,
            "break" => Self::Break,
            "planning" => Self::Planning,
            "health" => Self::Health,
            _ => Self::Other(raw),
        }
    }
}

impl From<PhaseCategory> for String {
    fn from(category: PhaseCategory) -> Self {
        match category {
            PhaseCategory::ClientWork => "client_work".to_string(),
            PhaseCategory::SideProject => "side_project".to_string(),
            PhaseCategory::Meeting => "meeting".to_string(),
            PhaseCategory::Break => "break".to_string(),
            PhaseCategory::Planning => "planning".to_string(),
            PhaseCategory::Health => "health".to_string(),
            PhaseCategory::Other(raw) => raw,
        }
    }
}

/// One recorded activity phase within a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPhase {
    /// Human-readable phase title (e.g. "Development: Acme App")
    pub title: String,

    /// Wall-clock start, "HH:MM"
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,

    /// Wall-clock end, "HH:MM"
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    /// Phase duration; derived, must equal the end/start span
    pub duration_minutes: i64,

    /// Phase category; rewritten by the engine after attribution
    pub category: PhaseCategory,

    /// Project label, if the tracker recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Free-text description of the work
    #[serde(default)]
    pub description: String,

    /// Ticket reference (e.g. "ACME-123"), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_reference: Option<String>,

    /// Tag set recorded with the phase
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Owning client id, written by the engine; absent before classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl ActivityPhase {
    /// End/start span in minutes, negative if the end precedes the start
    pub fn span_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Day-level commit activity sourced from an external forge
///
/// Used only as a secondary corroboration signal during classification,
/// never overriding a direct phase match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitActivity {
    /// Project names with commits on this day
    pub projects_worked_on: Vec<String>,

    /// Commit count, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_commits: Option<i64>,
}

/// One day's activity record: ordered phases plus day metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Record date
    pub date: NaiveDate,

    /// IANA timezone name the times are local to (e.g. "Europe/Brussels")
    #[serde(default)]
    pub timezone: String,

    /// Ordered activity phases
    #[serde(rename = "timelinePhases", default)]
    pub phases: Vec<ActivityPhase>,

    /// Optional externally-sourced commit activity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_activity: Option<CommitActivity>,
}

impl DailyRecord {
    /// Project names from the day-level commit activity, if present
    pub fn projects_worked_on(&self) -> &[String] {
        self.commit_activity.as_ref().map_or(&[], |activity| activity.projects_worked_on.as_slice())
    }
}

/// Serde adapter for "HH:MM" wall-clock times used by the external record
/// format
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(start: &str, end: &str, duration: i64) -> ActivityPhase {
        ActivityPhase {
            title: "Development".to_string(),
            start_time: NaiveTime::parse_from_str(start, "%H:%M").expect("start"),
            end_time: NaiveTime::parse_from_str(end, "%H:%M").expect("end"),
            duration_minutes: duration,
            category: PhaseCategory::ClientWork,
            project_name: None,
            description: String::new(),
            ticket_reference: None,
            tags: BTreeSet::new(),
            client_id: None,
        }
    }

    #[test]
    fn test_span_minutes_matches_times() {
        let phase = phase("09:00", "10:30", 90);
        assert_eq!(phase.span_minutes(), 90);
    }

    #[test]
    fn test_span_minutes_negative_when_end_precedes_start() {
        let phase = phase("10:30", "09:00", 90);
        assert_eq!(phase.span_minutes(), -90);
    }

    #[test]
    fn test_category_attributability() {
        assert!(PhaseCategory::ClientWork.is_attributable());
        assert!(PhaseCategory::Meeting.is_attributable());
        assert!(!PhaseCategory::SideProject.is_attributable());
        assert!(!PhaseCategory::Break.is_attributable());
        assert!(!PhaseCategory::Other("learning".to_string()).is_attributable());
    }

    #[test]
    fn test_unknown_category_round_trips_raw_tag() {
        let category: PhaseCategory = serde_json::from_str("\"learning\"").expect("category");
        assert_eq!(category, PhaseCategory::Other("learning".to_string()));

        let json = serde_json::to_string(&category).expect("serialize");
        assert_eq!(json, "\"learning\"");
    }

    #[test]
    fn test_phase_round_trips_hhmm_times() {
        let json = serde_json::to_value(phase("09:15", "11:00", 105)).expect("serialize");
        assert_eq!(json["startTime"], "09:15");
        assert_eq!(json["endTime"], "11:00");

        let back: ActivityPhase = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.duration_minutes, 105);
    }

    #[test]
    fn test_daily_record_parses_external_format() {
        let json = r#"{
            "date": "2025-06-02",
            "timezone": "Europe/Brussels",
            "timelinePhases": [
                {
                    "title": "Morning Standup & Planning",
                    "startTime": "09:00",
                    "endTime": "09:30",
                    "durationMinutes": 30,
                    "category": "meeting",
                    "description": "Daily sync with team and priority setting",
                    "tags": ["meeting", "planning", "team"]
                }
            ],
            "commitActivity": {
                "projectsWorkedOn": ["Acme App"],
                "totalCommits": 4
            }
        }"#;

        let record: DailyRecord = serde_json::from_str(json).expect("record");
        assert_eq!(record.phases.len(), 1);
        assert_eq!(record.phases[0].category, PhaseCategory::Meeting);
        assert_eq!(record.projects_worked_on(), ["Acme App".to_string()]);
    }

    #[test]
    fn test_projects_worked_on_empty_without_commit_activity() {
        let record = DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).expect("date"),
            timezone: String::new(),
            phases: vec![],
            commit_activity: None,
        };
        assert!(record.projects_worked_on().is_empty());
    }
}
