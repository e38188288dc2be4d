//! Per-phase client classification
//!
//! Iterates non-default rules in priority order and, per rule, tests the
//! four detection fields in decreasing signal reliability: a project name
//! match is a stronger intent signal than an incidental tag. The first hit
//! wins. When no rule matches directly, a second pass consults the
//! day-level commit activity; only then does the phase fall through to the
//! default client.

use timestory_domain::{ActivityPhase, ClientRule, MatchField, PhaseMatch};
use tracing::debug;

use super::rule_store::RuleStore;

/// Classify one phase against the store's rules
///
/// `day_projects` is the day-level commit activity list. It is consulted in
/// a second pass, only after every rule has had its chance at a direct
/// phase match, so it can never override one and never causes an earlier
/// rule to be skipped.
pub fn classify_phase(
    phase: &ActivityPhase,
    day_projects: &[String],
    store: &RuleStore,
) -> PhaseMatch {
    for rule in store.non_default_rules() {
        if let Some(matched_by) = phase_fields_match(rule, phase) {
            debug!(
                client_id = %rule.id,
                matched_by = ?matched_by,
                title = %phase.title,
                "phase matched client rule"
            );
            return PhaseMatch { client_id: rule.id.clone(), matched_by };
        }
    }

    for rule in store.non_default_rules() {
        if commit_corroborates(rule, day_projects) {
            debug!(
                client_id = %rule.id,
                title = %phase.title,
                "phase attributed via day-level commit activity"
            );
            return PhaseMatch {
                client_id: rule.id.clone(),
                matched_by: MatchField::CommitActivity,
            };
        }
    }

    PhaseMatch { client_id: store.default_rule().id.clone(), matched_by: MatchField::Default }
}

/// Test one rule's phase-level fields, in fixed order, first hit wins
fn phase_fields_match(rule: &ClientRule, phase: &ActivityPhase) -> Option<MatchField> {
    let detection = &rule.detection;

    // 1. Project name: case-insensitive substring; an empty project name
    //    never matches
    if let Some(project_name) = phase.project_name.as_deref() {
        if !project_name.is_empty() {
            let haystack = project_name.to_lowercase();
            if detection.projects.iter().any(|p| haystack.contains(&p.to_lowercase())) {
                return Some(MatchField::Project);
            }
        }
    }

    // 2. Description: case-insensitive substring against the folder patterns
    if !phase.description.is_empty() {
        let haystack = phase.description.to_lowercase();
        if detection.folders.iter().any(|f| haystack.contains(&f.to_lowercase())) {
            return Some(MatchField::Folder);
        }
    }

    // 3. Ticket reference: case-sensitive prefix
    if let Some(ticket) = phase.ticket_reference.as_deref() {
        if detection.ticket_prefixes.iter().any(|prefix| ticket.starts_with(prefix.as_str())) {
            return Some(MatchField::TicketPrefix);
        }
    }

    // 4. Tags: exact membership intersection
    if phase.tags.iter().any(|tag| detection.tags.contains(tag)) {
        return Some(MatchField::Tag);
    }

    None
}

/// A commit project equal (case-insensitively) to one of the rule's project
/// patterns corroborates the rule
fn commit_corroborates(rule: &ClientRule, day_projects: &[String]) -> bool {
    day_projects
        .iter()
        .any(|project| rule.detection.projects.iter().any(|p| p.eq_ignore_ascii_case(project)))
}
