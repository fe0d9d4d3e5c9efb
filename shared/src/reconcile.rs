//! Calendar event reconciliation.
//!
//! An external calendar event carries a status and a free-text address.
//! Reconciliation finds the stored assignment whose address best matches
//! the event's, then sets its scheduled flag from the event status.

use tracing::info;

use crate::matcher::{self, Scorer};
use crate::models::{Assignment, CalendarEvent, STATUS_CONFIRMED};
use crate::store::AssignmentStore;
use crate::{Error, Result};

/// Apply a calendar event to the best-matching assignment.
///
/// Loads every assignment as a match target, ranks the addresses against
/// the event address, and updates the winner's scheduled flag: a
/// "confirmed" status schedules it, any other status (recognized or not)
/// unschedules it. Exactly one store update happens, and only on a
/// successful match.
///
/// The load and the update are two store calls with no lock between them;
/// concurrent reconciliations of the same address are last-write-wins.
pub async fn reconcile(
    store: &dyn AssignmentStore,
    scorer: &dyn Scorer,
    event: &CalendarEvent,
) -> Result<Assignment> {
    let assignments = store.list_all().await?;
    let addresses: Vec<String> = assignments.iter().map(|a| a.address.clone()).collect();

    let matched = matcher::best_match(scorer, &event.address, &addresses).ok_or_else(|| {
        Error::NotFound("no assignment matches the event address".to_string())
    })?;

    let assignment = &assignments[matched.index];
    let scheduled = event.status == STATUS_CONFIRMED;
    info!(
        assignment_id = %assignment.id,
        address = %assignment.address,
        score = matched.score,
        status = %event.status,
        scheduled,
        "reconciling calendar event"
    );

    store
        .set_scheduled(assignment.id, scheduled)
        .await?
        .ok_or_else(|| Error::NotFound("matched assignment no longer exists".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::NucleoScorer;
    use crate::models::NewAssignment;
    use crate::store::testing::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn new_assignment(address: &str) -> NewAssignment {
        NewAssignment {
            agent: "Desiree Staples".to_string(),
            address: address.to_string(),
            submitted_on: Utc.with_ymd_and_hms(2022, 8, 28, 15, 51, 56).unwrap(),
            scheduled: false,
            hidden: false,
        }
    }

    async fn seeded_store() -> MemoryStore {
        MemoryStore::seeded(vec![
            new_assignment("92 Elm Court"),
            new_assignment("317 North 19th Street"),
            new_assignment("8 Ocean Parkway"),
        ])
        .await
    }

    fn event(status: &str) -> CalendarEvent {
        CalendarEvent {
            status: status.to_string(),
            address: "317 N 19th St".to_string(),
        }
    }

    #[tokio::test]
    async fn confirmed_event_schedules_matched_assignment() {
        let store = seeded_store().await;

        let updated = reconcile(&store, &NucleoScorer, &event("confirmed"))
            .await
            .unwrap();

        assert_eq!(updated.address, "317 North 19th Street");
        assert!(updated.scheduled);

        let persisted = store.find(updated.id).await.unwrap().unwrap();
        assert!(persisted.scheduled);
    }

    #[tokio::test]
    async fn cancelled_event_unschedules_matched_assignment() {
        let store = seeded_store().await;
        let target = store.list_all().await.unwrap()[1].id;
        store.set_scheduled(target, true).await.unwrap();

        let updated = reconcile(&store, &NucleoScorer, &event("cancelled"))
            .await
            .unwrap();

        assert_eq!(updated.id, target);
        assert!(!updated.scheduled);
    }

    #[tokio::test]
    async fn unknown_status_defaults_to_unscheduled() {
        let store = seeded_store().await;

        let updated = reconcile(&store, &NucleoScorer, &event("rescheduled"))
            .await
            .unwrap();

        assert_eq!(updated.address, "317 North 19th Street");
        assert!(!updated.scheduled);
    }

    #[tokio::test]
    async fn empty_store_is_not_found_without_mutation() {
        let store = MemoryStore::new();

        let result = reconcile(&store, &NucleoScorer, &event("confirmed")).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unmatchable_address_is_not_found_without_mutation() {
        let store = seeded_store().await;

        let unmatchable = CalendarEvent {
            status: "confirmed".to_string(),
            address: "zzzz".to_string(),
        };
        let result = reconcile(&store, &NucleoScorer, &unmatchable).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        for assignment in store.list_all().await.unwrap() {
            assert!(!assignment.scheduled);
        }
    }

    #[tokio::test]
    async fn reapplying_a_confirmed_event_is_idempotent() {
        let store = seeded_store().await;

        let first = reconcile(&store, &NucleoScorer, &event("confirmed"))
            .await
            .unwrap();
        assert!(first.scheduled);

        let second = reconcile(&store, &NucleoScorer, &event("confirmed"))
            .await
            .unwrap();
        assert!(second.scheduled);
        assert_eq!(first.id, second.id);
    }
}
