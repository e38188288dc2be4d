//! Client configuration file model
//!
//! Mirrors the JSON document maintained by the external configuration
//! editor. The engine never reads the file itself; callers deserialize it,
//! flatten it into an ordered rule list via [`ClientConfigFile::into_rules`],
//! and build a rule store from that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_SCHEMA_VERSION, DEFAULT_CLIENT_COLOR, DEFAULT_CLIENT_ID};
use crate::errors::{Result, TimeStoryError};
use crate::types::{ClientRule, DetectionPatterns};

/// One client entry in the configuration file (the map key is the id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigEntry {
    /// Short name (e.g. "ACME")
    pub name: String,

    /// Full name (e.g. "ACME Corporation")
    pub display_name: String,

    /// Display color (hex)
    #[serde(default = "default_color")]
    pub color: String,

    /// Default/fallback marker; the `settings.defaultClient` id is treated
    /// as default even when this flag is missing
    #[serde(default)]
    pub is_default: bool,

    /// Detection patterns; unknown legacy fields in the file are ignored
    #[serde(default)]
    pub detection: DetectionPatterns,
}

fn default_color() -> String {
    DEFAULT_CLIENT_COLOR.to_string()
}

/// Engine-relevant settings block of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigSettings {
    /// Fallback client id
    pub default_client: String,

    /// Editor setting, informational for the engine
    pub allow_multiple_clients_per_day: bool,

    /// Editor setting, informational for the engine
    pub minimum_billable_minutes: i64,

    /// Editor setting, informational for the engine
    pub round_billable_to_nearest: i64,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            default_client: DEFAULT_CLIENT_ID.to_string(),
            allow_multiple_clients_per_day: true,
            minimum_billable_minutes: 15,
            round_billable_to_nearest: 15,
        }
    }
}

/// The configuration file as written by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigFile {
    /// Schema version
    pub version: String,

    /// Last edit date, maintained by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Clients keyed by id
    pub clients: BTreeMap<String, ClientConfigEntry>,

    /// Client ids in detection priority order
    #[serde(default)]
    pub detection_priority: Vec<String>,

    /// Settings block
    #[serde(default)]
    pub settings: ConfigSettings,
}

impl ClientConfigFile {
    /// The editor's default template: a lone personal client
    pub fn default_template() -> Self {
        let personal = ClientConfigEntry {
            name: "Personal".to_string(),
            display_name: "Personal/Side Projects".to_string(),
            color: "#95E1D3".to_string(),
            is_default: true,
            detection: DetectionPatterns {
                tags: ["personal", "side-project", "non-billable"]
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                ..DetectionPatterns::default()
            },
        };

        Self {
            version: CONFIG_SCHEMA_VERSION.to_string(),
            last_updated: None,
            clients: BTreeMap::from([(DEFAULT_CLIENT_ID.to_string(), personal)]),
            detection_priority: vec![DEFAULT_CLIENT_ID.to_string()],
            settings: ConfigSettings::default(),
        }
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| TimeStoryError::Config(format!("invalid client config: {err}")))
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| TimeStoryError::Internal(format!("serialize client config: {err}")))
    }

    /// Flatten into the ordered rule list consumed by the rule store
    ///
    /// Order follows `detectionPriority`; clients missing from the priority
    /// list are appended after it (the store places the default last
    /// regardless of this order). An id in the priority list with no client
    /// entry is a configuration error.
    pub fn into_rules(self) -> Result<Vec<ClientRule>> {
        let Self { mut clients, detection_priority, settings, .. } = self;
        let mut rules = Vec::with_capacity(clients.len());

        for id in &detection_priority {
            let entry = clients.remove(id).ok_or_else(|| {
                TimeStoryError::Config(format!(
                    "detectionPriority references unknown client '{id}'"
                ))
            })?;
            rules.push(entry_to_rule(id.clone(), entry, &settings));
        }

        // Clients the editor never prioritized; BTreeMap order keeps this
        // deterministic
        for (id, entry) in clients {
            rules.push(entry_to_rule(id, entry, &settings));
        }

        Ok(rules)
    }
}

fn entry_to_rule(id: String, entry: ClientConfigEntry, settings: &ConfigSettings) -> ClientRule {
    let is_default = entry.is_default || id == settings.default_client;
    ClientRule {
        id,
        name: entry.name,
        display_name: entry.display_name,
        color: entry.color,
        is_default,
        detection: entry.detection,
    }
}
