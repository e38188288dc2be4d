//! Attribution engine: classification, category rewrite, aggregation
//!
//! Single synchronous pass over a day's phases. The record is validated
//! before any mutation so a rejected day is handed back untouched; after
//! that, eligible phases get their owning client id written in place, their
//! category rewritten to match the attribution decision, and their minutes
//! rolled up into per-client summaries and day totals.

use std::collections::BTreeMap;

use timestory_domain::constants::MULTIPLE_CLIENTS_ID;
use timestory_domain::types::attribution::minutes_to_hours;
use timestory_domain::{
    ClientSummary, DailyRecord, DayAttribution, PhaseCategory, Result, TimeStoryError,
};
use tracing::warn;

use super::classifier::classify_phase;
use super::rule_store::RuleStore;

/// Attribution engine over one rule store
///
/// The store is borrowed read-only; one store may serve any number of
/// records.
pub struct AttributionEngine<'a> {
    store: &'a RuleStore,
}

impl<'a> AttributionEngine<'a> {
    /// Create an engine over a validated rule store
    pub fn new(store: &'a RuleStore) -> Self {
        Self { store }
    }

    /// Attribute one day's record
    ///
    /// Writes `client_id` and the rewritten category into each eligible
    /// phase and returns the day rollup.
    ///
    /// # Errors
    /// Rejects the record unmodified when an eligible phase's
    /// `duration_minutes` disagrees with its start/end span.
    pub fn attribute(&self, record: &mut DailyRecord) -> Result<DayAttribution> {
        validate(record)?;

        let day_projects = record.projects_worked_on().to_vec();
        let default_id = self.store.default_rule().id.clone();
        let mut summaries: BTreeMap<String, ClientSummary> = BTreeMap::new();

        for phase in &mut record.phases {
            if !phase.category.is_attributable() {
                continue;
            }

            let decision = classify_phase(phase, &day_projects, self.store);

            // Attribution is authoritative over category
            phase.category = if decision.client_id == default_id {
                PhaseCategory::SideProject
            } else {
                PhaseCategory::ClientWork
            };
            phase.client_id = Some(decision.client_id.clone());

            let minutes = if phase.duration_minutes > 0 {
                phase.duration_minutes
            } else {
                warn!(
                    title = %phase.title,
                    duration_minutes = phase.duration_minutes,
                    "non-positive phase duration, contributes zero to attribution"
                );
                0
            };

            let summary = summaries
                .entry(decision.client_id.clone())
                .or_insert_with(|| ClientSummary::new(decision.client_id.clone()));
            summary.total_minutes += minutes;
            if let Some(project) = phase.project_name.as_deref() {
                if !project.is_empty() {
                    summary.projects.insert(project.to_string());
                }
            }
            if let Some(ticket) = phase.ticket_reference.as_deref() {
                if !ticket.is_empty() {
                    summary.tickets.insert(ticket.to_string());
                }
            }
        }

        Ok(roll_up(summaries, &default_id))
    }
}

/// Pre-mutation validation: all-or-nothing per record
fn validate(record: &DailyRecord) -> Result<()> {
    for phase in &record.phases {
        if !phase.category.is_attributable() {
            continue;
        }
        let span = phase.span_minutes();
        if phase.duration_minutes != span {
            return Err(TimeStoryError::InvalidInput(format!(
                "{}: phase '{}' claims {} minutes but spans {} ({} - {})",
                record.date,
                phase.title,
                phase.duration_minutes,
                span,
                phase.start_time.format("%H:%M"),
                phase.end_time.format("%H:%M"),
            )));
        }
    }
    Ok(())
}

/// Derive the day totals from the accumulated per-client summaries
fn roll_up(mut summaries: BTreeMap<String, ClientSummary>, default_id: &str) -> DayAttribution {
    // A zero-minute default summary carries no information; non-default
    // summaries stay so the report renderer sees every touched client
    summaries.retain(|id, summary| id != default_id || summary.total_minutes > 0);

    for summary in summaries.values_mut() {
        summary.hours = minutes_to_hours(summary.total_minutes);
    }

    let mut billable_minutes = 0_i64;
    let mut side_project_minutes = 0_i64;
    let mut client_hours = BTreeMap::new();
    let mut active_clients: Vec<&str> = Vec::new();

    for summary in summaries.values() {
        if summary.client_id == default_id {
            side_project_minutes = summary.total_minutes;
        } else {
            billable_minutes += summary.total_minutes;
            client_hours.insert(summary.client_id.clone(), summary.hours);
            if summary.total_minutes > 0 {
                active_clients.push(&summary.client_id);
            }
        }
    }

    let primary_client_id = match active_clients.as_slice() {
        [] => default_id.to_string(),
        [sole] => (*sole).to_string(),
        _ => MULTIPLE_CLIENTS_ID.to_string(),
    };

    DayAttribution {
        client_summaries: summaries,
        client_hours,
        billable_hours: minutes_to_hours(billable_minutes),
        side_project_hours: minutes_to_hours(side_project_minutes),
        primary_client_id,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{NaiveDate, NaiveTime};
    use timestory_domain::{ActivityPhase, ClientRule};

    use super::*;

    fn phase(
        title: &str,
        start: (u32, u32),
        end: (u32, u32),
        duration: i64,
        category: PhaseCategory,
    ) -> ActivityPhase {
        ActivityPhase {
            title: title.to_string(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("start"),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("end"),
            duration_minutes: duration,
            category,
            project_name: None,
            description: String::new(),
            ticket_reference: None,
            tags: BTreeSet::new(),
            client_id: None,
        }
    }

    fn record(phases: Vec<ActivityPhase>) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).expect("date"),
            timezone: "Europe/Brussels".to_string(),
            phases,
            commit_activity: None,
        }
    }

    fn acme_store() -> RuleStore {
        RuleStore::new(vec![
            ClientRule::new("acme", "ACME").with_projects(["Acme App"]),
            ClientRule::new_default("personal", "Personal"),
        ])
        .expect("valid store")
    }

    #[test]
    fn test_project_match_keeps_client_work_category() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Development", (9, 0), (10, 30), 90, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App Redesign".to_string());
        let mut day = record(vec![work]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        assert_eq!(day.phases[0].client_id.as_deref(), Some("acme"));
        assert_eq!(day.phases[0].category, PhaseCategory::ClientWork);
        assert_eq!(attribution.client_summaries["acme"].total_minutes, 90);
    }

    #[test]
    fn test_fallthrough_rewrites_to_side_project() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut side = phase("Tinkering", (13, 0), (14, 0), 60, PhaseCategory::ClientWork);
        side.project_name = Some(String::new());
        side.description = "working on personal side project".to_string();
        let mut day = record(vec![side]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        assert_eq!(day.phases[0].client_id.as_deref(), Some("personal"));
        assert_eq!(day.phases[0].category, PhaseCategory::SideProject);
        assert_eq!(attribution.side_project_hours, 1.0);
    }

    #[test]
    fn test_day_totals_and_primary_client() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Development", (9, 0), (10, 30), 90, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        let side = phase("Blog", (11, 0), (12, 0), 60, PhaseCategory::ClientWork);
        let mut day = record(vec![work, side]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        assert_eq!(attribution.billable_hours, 1.5);
        assert_eq!(attribution.side_project_hours, 1.0);
        assert_eq!(attribution.primary_client_id, "acme");
        assert_eq!(attribution.client_hours["acme"], 1.5);
    }

    #[test]
    fn test_primary_client_multiple_sentinel() {
        let store = RuleStore::new(vec![
            ClientRule::new("acme", "ACME").with_projects(["Acme App"]),
            ClientRule::new("globex", "Globex").with_projects(["Globex Portal"]),
            ClientRule::new_default("personal", "Personal"),
        ])
        .expect("valid store");
        let engine = AttributionEngine::new(&store);

        let mut first = phase("Dev", (9, 0), (10, 0), 60, PhaseCategory::ClientWork);
        first.project_name = Some("Acme App".to_string());
        let mut second = phase("Dev", (10, 0), (11, 0), 60, PhaseCategory::Meeting);
        second.project_name = Some("Globex Portal".to_string());
        let mut day = record(vec![first, second]);

        let attribution = engine.attribute(&mut day).expect("attribute");
        assert_eq!(attribution.primary_client_id, "multiple");
        assert_eq!(attribution.billable_hours, 2.0);
    }

    #[test]
    fn test_primary_client_defaults_without_client_work() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let side = phase("Blog", (11, 0), (12, 0), 60, PhaseCategory::ClientWork);
        let mut day = record(vec![side]);

        let attribution = engine.attribute(&mut day).expect("attribute");
        assert_eq!(attribution.primary_client_id, "personal");
        assert_eq!(attribution.billable_hours, 0.0);
    }

    #[test]
    fn test_non_attributable_phases_pass_through() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        // Span deliberately disagrees with the claimed duration; a break is
        // never validated or classified
        let lunch = phase("Lunch Break", (12, 0), (13, 0), 45, PhaseCategory::Break);
        let mut day = record(vec![lunch.clone()]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        assert_eq!(day.phases[0], lunch);
        assert!(attribution.client_summaries.is_empty());
        assert_eq!(attribution.primary_client_id, "personal");
    }

    #[test]
    fn test_conservation_of_minutes() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Dev", (9, 0), (10, 30), 90, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        let meeting = phase("Standup", (10, 30), (11, 0), 30, PhaseCategory::Meeting);
        let side = phase("Blog", (11, 0), (12, 0), 60, PhaseCategory::ClientWork);
        let lunch = phase("Lunch", (12, 0), (13, 0), 60, PhaseCategory::Break);
        let mut day = record(vec![work, meeting, side, lunch]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        let attributed: i64 =
            attribution.client_summaries.values().map(|s| s.total_minutes).sum();
        let eligible: i64 = day
            .phases
            .iter()
            .filter(|p| p.client_id.is_some())
            .map(|p| p.duration_minutes)
            .sum();
        assert_eq!(attributed, eligible);
        assert_eq!(attributed, 180);
    }

    #[test]
    fn test_duration_span_mismatch_rejects_record_unmodified() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Dev", (9, 0), (10, 0), 90, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        let mut day = record(vec![work]);
        let before = day.clone();

        let err = engine.attribute(&mut day).expect_err("mismatch must fail");
        assert!(matches!(err, TimeStoryError::InvalidInput(_)));
        assert_eq!(day, before);
    }

    #[test]
    fn test_zero_duration_phase_contributes_zero() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut blip = phase("Glitch", (9, 0), (9, 0), 0, PhaseCategory::ClientWork);
        blip.project_name = Some("Acme App".to_string());
        let mut work = phase("Dev", (9, 0), (10, 0), 60, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        let mut day = record(vec![blip, work]);

        let attribution = engine.attribute(&mut day).expect("attribute");

        // Classified (client id written) but zero minutes attributed
        assert_eq!(day.phases[0].client_id.as_deref(), Some("acme"));
        assert_eq!(attribution.client_summaries["acme"].total_minutes, 60);
        assert_eq!(attribution.billable_hours, 1.0);
    }

    #[test]
    fn test_classify_and_rewrite_idempotent_per_phase() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Dev", (9, 0), (10, 30), 90, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        let side = phase("Blog", (11, 0), (12, 0), 60, PhaseCategory::ClientWork);
        let mut day = record(vec![work, side]);

        engine.attribute(&mut day).expect("first run");
        let after_first = day.phases.clone();

        engine.attribute(&mut day).expect("second run");
        assert_eq!(day.phases, after_first);
    }

    #[test]
    fn test_summary_collects_projects_and_tickets() {
        let store = acme_store();
        let engine = AttributionEngine::new(&store);

        let mut work = phase("Dev", (9, 0), (10, 0), 60, PhaseCategory::ClientWork);
        work.project_name = Some("Acme App".to_string());
        work.ticket_reference = Some("ACME-123".to_string());
        let mut fix = phase("Fix", (10, 0), (11, 0), 60, PhaseCategory::ClientWork);
        fix.project_name = Some("Acme App".to_string());
        fix.ticket_reference = Some("ACME-456".to_string());
        let mut day = record(vec![work, fix]);

        let attribution = engine.attribute(&mut day).expect("attribute");
        let summary = &attribution.client_summaries["acme"];

        assert_eq!(summary.projects.len(), 1);
        assert_eq!(summary.tickets.len(), 2);
        assert_eq!(summary.hours, 2.0);
    }
}
