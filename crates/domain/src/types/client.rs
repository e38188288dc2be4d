//! Client rule types
//!
//! A client rule pairs presentation metadata with the detection patterns the
//! attribution engine matches phases against. Rules are maintained by the
//! external configuration editor and held in priority order by the rule
//! store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CLIENT_COLOR;

/// Detection patterns for one client, across four independent fields
///
/// Sets are `BTreeSet` so overlapping appends from the editor dedupe and
/// iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionPatterns {
    /// Case-insensitive substrings matched against a phase's project name
    pub projects: BTreeSet<String>,

    /// Case-insensitive substrings matched against a phase's free-text
    /// description (historically folder names)
    pub folders: BTreeSet<String>,

    /// Case-sensitive prefixes matched against a phase's ticket reference
    pub ticket_prefixes: BTreeSet<String>,

    /// Exact members intersected with a phase's tag set
    pub tags: BTreeSet<String>,
}

impl DetectionPatterns {
    /// True if no field carries any pattern
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.folders.is_empty()
            && self.ticket_prefixes.is_empty()
            && self.tags.is_empty()
    }

    /// Mutable access to one pattern set by field
    pub fn field_mut(&mut self, field: DetectionField) -> &mut BTreeSet<String> {
        match field {
            DetectionField::Projects => &mut self.projects,
            DetectionField::Folders => &mut self.folders,
            DetectionField::TicketPrefixes => &mut self.ticket_prefixes,
            DetectionField::Tags => &mut self.tags,
        }
    }
}

/// The four detection fields, in the order the classifier tests them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionField {
    /// Project name substrings (strongest signal)
    Projects,
    /// Description/folder substrings
    Folders,
    /// Ticket reference prefixes
    TicketPrefixes,
    /// Exact tag membership (weakest signal)
    Tags,
}

/// One client definition: identity, presentation, detection patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRule {
    /// Unique lowercase token, stable key (e.g. "acme")
    pub id: String,

    /// Short name for compact rendering (e.g. "ACME")
    pub name: String,

    /// Full name for reports (e.g. "ACME Corporation")
    pub display_name: String,

    /// Display color (hex)
    #[serde(default = "default_color")]
    pub color: String,

    /// Exactly one rule per store is the default/fallback client
    #[serde(default)]
    pub is_default: bool,

    /// Detection patterns tested by the attribution engine
    #[serde(default)]
    pub detection: DetectionPatterns,
}

fn default_color() -> String {
    DEFAULT_CLIENT_COLOR.to_string()
}

impl ClientRule {
    /// Create a non-default rule with empty detection patterns
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            name,
            color: default_color(),
            is_default: false,
            detection: DetectionPatterns::default(),
        }
    }

    /// Create the default/fallback rule (conventionally "personal")
    pub fn new_default(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { is_default: true, ..Self::new(id, name) }
    }

    /// Builder-style helper to set project name patterns
    #[must_use]
    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detection.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper to set folder/description patterns
    #[must_use]
    pub fn with_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detection.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper to set ticket reference prefixes
    #[must_use]
    pub fn with_ticket_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detection.ticket_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper to set tag patterns
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detection.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
