mod common;

use std::sync::Arc;

use uuid::Uuid;

use appointment_cell::models::AppointmentStatus;
use appointment_cell::services::conflict::ConflictDetectionService;
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};

use common::{appointment, dt};

fn detector(store: &Arc<InMemoryAppointmentStore>) -> ConflictDetectionService {
    ConflictDetectionService::new(Arc::clone(store) as Arc<dyn AppointmentStore>)
}

#[test]
fn interval_overlap_edge_cases() {
    // Touching endpoints do not conflict (half-open intervals).
    assert!(!ConflictDetectionService::intervals_overlap(
        dt(2, 9, 0),
        dt(2, 10, 0),
        dt(2, 10, 0),
        dt(2, 11, 0)
    ));
    assert!(!ConflictDetectionService::intervals_overlap(
        dt(2, 10, 0),
        dt(2, 11, 0),
        dt(2, 9, 0),
        dt(2, 10, 0)
    ));
    // Partial overlap, both directions.
    assert!(ConflictDetectionService::intervals_overlap(
        dt(2, 9, 30),
        dt(2, 10, 30),
        dt(2, 10, 0),
        dt(2, 11, 0)
    ));
    // Full containment conflicts both ways.
    assert!(ConflictDetectionService::intervals_overlap(
        dt(2, 9, 0),
        dt(2, 12, 0),
        dt(2, 10, 0),
        dt(2, 10, 30)
    ));
    assert!(ConflictDetectionService::intervals_overlap(
        dt(2, 10, 0),
        dt(2, 10, 30),
        dt(2, 9, 0),
        dt(2, 12, 0)
    ));
    // Identical intervals conflict.
    assert!(ConflictDetectionService::intervals_overlap(
        dt(2, 10, 0),
        dt(2, 10, 30),
        dt(2, 10, 0),
        dt(2, 10, 30)
    ));
}

#[tokio::test]
async fn only_active_statuses_block_a_slot() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let detector = detector(&store);
    let doctor_id = Uuid::new_v4();

    for status in [
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
    ] {
        store
            .insert(appointment(doctor_id, dt(2, 10, 0), 30, status))
            .await;
    }
    assert!(
        !detector
            .has_conflict(doctor_id, dt(2, 10, 0), dt(2, 10, 30), None)
            .await
    );

    for status in [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
    ] {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let detector = ConflictDetectionService::new(
            Arc::clone(&store) as Arc<dyn AppointmentStore>
        );
        store
            .insert(appointment(doctor_id, dt(2, 10, 0), 30, status))
            .await;
        assert!(
            detector
                .has_conflict(doctor_id, dt(2, 10, 0), dt(2, 10, 30), None)
                .await
        );
    }
}

#[tokio::test]
async fn exclusion_skips_the_record_being_edited() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let detector = detector(&store);
    let doctor_id = Uuid::new_v4();

    let existing = appointment(doctor_id, dt(2, 10, 0), 30, AppointmentStatus::Scheduled);
    store.insert(existing.clone()).await;

    // A no-op time edit must not self-conflict.
    assert!(
        !detector
            .has_conflict(doctor_id, dt(2, 10, 0), dt(2, 10, 30), Some(existing.id))
            .await
    );
    // Another record still conflicts even when one id is excluded.
    let other = appointment(doctor_id, dt(2, 10, 15), 30, AppointmentStatus::Scheduled);
    store.insert(other.clone()).await;
    let conflict = detector
        .find_conflict(doctor_id, dt(2, 10, 0), dt(2, 10, 30), Some(existing.id))
        .await
        .expect("other appointment should conflict");
    assert_eq!(conflict.id, other.id);
}

#[tokio::test]
async fn appointments_of_other_doctors_never_conflict() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let detector = detector(&store);
    let doctor_id = Uuid::new_v4();

    store
        .insert(appointment(
            Uuid::new_v4(),
            dt(2, 10, 0),
            30,
            AppointmentStatus::Scheduled,
        ))
        .await;

    assert!(
        !detector
            .has_conflict(doctor_id, dt(2, 10, 0), dt(2, 10, 30), None)
            .await
    );
}

#[tokio::test]
async fn long_appointment_reaching_into_the_range_is_found() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let detector = detector(&store);
    let doctor_id = Uuid::new_v4();

    // Starts well before the queried window but runs into it.
    store
        .insert(appointment(
            doctor_id,
            dt(2, 8, 0),
            180,
            AppointmentStatus::Confirmed,
        ))
        .await;

    assert!(
        detector
            .has_conflict(doctor_id, dt(2, 10, 30), dt(2, 11, 0), None)
            .await
    );
}
