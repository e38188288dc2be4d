//! Rule store: ordered client detection rules plus one default
//!
//! The store owns the priority order the classifier iterates. Non-default
//! rule order is caller-visible and stable across edits; the default rule
//! is always evaluated last regardless of where the configuration listed
//! it. The store is immutable for the duration of any batch of
//! classification calls - the engine only ever borrows it.

use timestory_domain::constants::DEFAULT_CLIENT_ID;
use timestory_domain::{
    ClientConfigFile, ClientRule, DetectionField, Result, TimeStoryError,
};

/// Ordered collection of client detection rules, exactly one of them the
/// default/fallback client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStore {
    /// Non-default rules in priority order
    rules: Vec<ClientRule>,
    /// The fallback client, evaluated last
    default: ClientRule,
}

impl RuleStore {
    /// Build a store from an ordered rule list
    ///
    /// # Errors
    /// Rejects stores with zero or multiple default rules, duplicate ids,
    /// ids that are not lowercase tokens, or a non-default rule claiming
    /// the reserved default id.
    pub fn new(rules: Vec<ClientRule>) -> Result<Self> {
        let mut default = None;
        let mut non_default = Vec::with_capacity(rules.len().saturating_sub(1));

        for rule in rules {
            validate_id(&rule)?;
            if rule.is_default {
                if default.is_some() {
                    return Err(TimeStoryError::Config(
                        "rule store has more than one default client".to_string(),
                    ));
                }
                default = Some(rule);
            } else {
                non_default.push(rule);
            }
        }

        let default = default.ok_or_else(|| {
            TimeStoryError::Config("rule store has no default client".to_string())
        })?;

        let store = Self { rules: non_default, default };
        store.check_unique_ids()?;
        Ok(store)
    }

    /// Build a store straight from the editor's configuration file
    pub fn from_config(config: ClientConfigFile) -> Result<Self> {
        Self::new(config.into_rules()?)
    }

    /// All rules in evaluation order: non-default rules first, default last
    pub fn rules_in_priority_order(&self) -> impl Iterator<Item = &ClientRule> {
        self.rules.iter().chain(std::iter::once(&self.default))
    }

    /// Non-default rules in priority order
    pub fn non_default_rules(&self) -> &[ClientRule] {
        &self.rules
    }

    /// The fallback client
    pub fn default_rule(&self) -> &ClientRule {
        &self.default
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&ClientRule> {
        self.rules_in_priority_order().find(|rule| rule.id == id)
    }

    /// Total rule count, default included
    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    /// A store always holds at least the default rule
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Insert a non-default rule immediately before the default
    ///
    /// # Errors
    /// Rejects id collisions, invalid ids, and rules flagged as default
    /// (the store already has one).
    pub fn insert_rule(&mut self, rule: ClientRule) -> Result<()> {
        let index = self.rules.len();
        self.insert_rule_at(rule, index)
    }

    /// Insert a non-default rule at a caller-specified priority position
    pub fn insert_rule_at(&mut self, rule: ClientRule, index: usize) -> Result<()> {
        if rule.is_default {
            return Err(TimeStoryError::Config(format!(
                "rule store already has a default client ('{}')",
                self.default.id
            )));
        }
        validate_id(&rule)?;
        if self.get(&rule.id).is_some() {
            return Err(TimeStoryError::Config(format!(
                "client id '{}' already exists",
                rule.id
            )));
        }
        if index > self.rules.len() {
            return Err(TimeStoryError::InvalidInput(format!(
                "priority position {index} out of range (0..={})",
                self.rules.len()
            )));
        }
        self.rules.insert(index, rule);
        Ok(())
    }

    /// Append detection patterns to one field of an existing rule
    ///
    /// Pattern sets are true sets: overlapping appends dedupe.
    pub fn append_patterns<I, S>(&mut self, id: &str, field: DetectionField, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = self.get_mut(id)?;
        rule.detection.field_mut(field).extend(values.into_iter().map(Into::into));
        Ok(())
    }

    /// Move a non-default rule to a new priority position
    pub fn move_rule(&mut self, id: &str, index: usize) -> Result<()> {
        if index >= self.rules.len() {
            return Err(TimeStoryError::InvalidInput(format!(
                "priority position {index} out of range (0..{})",
                self.rules.len()
            )));
        }
        let current = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| TimeStoryError::NotFound(format!("non-default client '{id}'")))?;
        let rule = self.rules.remove(current);
        self.rules.insert(index, rule);
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ClientRule> {
        if self.default.id == id {
            return Ok(&mut self.default);
        }
        self.rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| TimeStoryError::NotFound(format!("client '{id}'")))
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for rule in self.rules_in_priority_order() {
            if !seen.insert(rule.id.as_str()) {
                return Err(TimeStoryError::Config(format!(
                    "duplicate client id '{}'",
                    rule.id
                )));
            }
        }
        Ok(())
    }
}

fn validate_id(rule: &ClientRule) -> Result<()> {
    let id = rule.id.as_str();
    let is_token = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !is_token {
        return Err(TimeStoryError::Config(format!(
            "client id '{id}' is not a lowercase token"
        )));
    }
    if !rule.is_default && id == DEFAULT_CLIENT_ID {
        return Err(TimeStoryError::Config(format!(
            "'{DEFAULT_CLIENT_ID}' is reserved for the default client"
        )));
    }
    Ok(())
}
