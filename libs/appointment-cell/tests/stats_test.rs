mod common;

use std::sync::Arc;

use uuid::Uuid;

use appointment_cell::models::AppointmentStatus;
use appointment_cell::services::stats::StatisticsService;
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};

use common::{appointment, dt};

fn service(store: &Arc<InMemoryAppointmentStore>) -> StatisticsService {
    StatisticsService::new(Arc::clone(store) as Arc<dyn AppointmentStore>)
}

// Reference time for all stats tests: Wednesday 2025-06-04 noon. The Monday
// week runs 2025-06-02 through 2025-06-08.

#[tokio::test]
async fn buckets_split_on_monday_week_boundaries() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let stats = service(&store);
    let doctor_id = Uuid::new_v4();

    // Today: one earlier, one later, mixed statuses.
    store
        .insert(appointment(doctor_id, dt(4, 9, 0), 30, AppointmentStatus::Completed))
        .await;
    store
        .insert(appointment(doctor_id, dt(4, 15, 0), 30, AppointmentStatus::Confirmed))
        .await;
    // Elsewhere in this week.
    store
        .insert(appointment(doctor_id, dt(2, 10, 0), 30, AppointmentStatus::Completed))
        .await;
    store
        .insert(appointment(doctor_id, dt(6, 10, 0), 30, AppointmentStatus::Cancelled))
        .await;
    // Next week.
    store
        .insert(appointment(doctor_id, dt(10, 10, 0), 30, AppointmentStatus::Scheduled))
        .await;
    // Sunday of this week is still this week; the Monday after next is
    // outside both buckets.
    store
        .insert(appointment(doctor_id, dt(8, 10, 0), 30, AppointmentStatus::Scheduled))
        .await;
    store
        .insert(appointment(doctor_id, dt(16, 10, 0), 30, AppointmentStatus::Scheduled))
        .await;

    let result = stats.stats_at(dt(4, 12, 0), None).await;

    assert_eq!(result.today.total, 2);
    assert_eq!(result.today.completed, 1);
    assert_eq!(result.today.confirmed, 1);

    assert_eq!(result.this_week.total, 5);
    assert_eq!(result.this_week.completed, 2);
    assert_eq!(result.this_week.cancelled, 1);
    assert_eq!(result.this_week.scheduled, 1);

    assert_eq!(result.next_week.total, 1);
    assert_eq!(result.next_week.scheduled, 1);
}

#[tokio::test]
async fn urgent_upcoming_counts_only_future_active_urgent() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let stats = service(&store);
    let doctor_id = Uuid::new_v4();

    // Future, urgent, active: counted.
    let mut counted = appointment(doctor_id, dt(5, 10, 0), 30, AppointmentStatus::Scheduled);
    counted.is_urgent = true;
    store.insert(counted).await;

    // Future, urgent, but cancelled: not counted.
    let mut cancelled = appointment(doctor_id, dt(5, 11, 0), 30, AppointmentStatus::Cancelled);
    cancelled.is_urgent = true;
    store.insert(cancelled).await;

    // Past, urgent: not counted.
    let mut past = appointment(doctor_id, dt(3, 10, 0), 30, AppointmentStatus::Confirmed);
    past.is_urgent = true;
    store.insert(past).await;

    // Future, not urgent: not counted.
    store
        .insert(appointment(doctor_id, dt(5, 14, 0), 30, AppointmentStatus::Scheduled))
        .await;

    let result = stats.stats_at(dt(4, 12, 0), None).await;
    assert_eq!(result.urgent_upcoming, 1);
}

#[tokio::test]
async fn facility_scope_narrows_every_bucket() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let stats = service(&store);
    let doctor_id = Uuid::new_v4();
    let facility = Uuid::new_v4();

    let mut scoped = appointment(doctor_id, dt(4, 10, 0), 30, AppointmentStatus::Scheduled);
    scoped.facility_id = Some(facility);
    scoped.is_urgent = true;
    store.insert(scoped).await;

    let mut elsewhere = appointment(doctor_id, dt(4, 14, 0), 30, AppointmentStatus::Scheduled);
    elsewhere.facility_id = Some(Uuid::new_v4());
    store.insert(elsewhere).await;

    store
        .insert(appointment(doctor_id, dt(4, 15, 0), 30, AppointmentStatus::Scheduled))
        .await;

    let scoped_stats = stats.stats_at(dt(4, 9, 0), Some(facility)).await;
    assert_eq!(scoped_stats.today.total, 1);
    assert_eq!(scoped_stats.this_week.total, 1);
    assert_eq!(scoped_stats.urgent_upcoming, 1);

    let global = stats.stats_at(dt(4, 9, 0), None).await;
    assert_eq!(global.today.total, 3);
}

#[tokio::test]
async fn empty_store_yields_zeroed_stats() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let stats = service(&store);

    let result = stats.stats_at(dt(4, 12, 0), None).await;
    assert_eq!(result.today.total, 0);
    assert_eq!(result.this_week.total, 0);
    assert_eq!(result.next_week.total, 0);
    assert_eq!(result.urgent_upcoming, 0);
}
