#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, AppointmentType, BookingChannel,
    CreateAppointmentRequest, SchedulingError,
};
use appointment_cell::services::booking::AppointmentBookingService;
use appointment_cell::services::notifications::{LoggingNotificationHook, NotificationHook};
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};
use schedule_cell::models::CreateScheduleRequest;
use schedule_cell::services::availability::AvailabilityService;
use schedule_cell::store::InMemoryScheduleStore;

pub struct TestEngine {
    pub availability: Arc<AvailabilityService>,
    pub store: Arc<InMemoryAppointmentStore>,
    pub booking: Arc<AppointmentBookingService>,
}

pub fn engine() -> TestEngine {
    engine_with_hook(Arc::new(LoggingNotificationHook))
}

pub fn engine_with_hook(hook: Arc<dyn NotificationHook>) -> TestEngine {
    let schedule_store = Arc::new(InMemoryScheduleStore::new());
    let store = Arc::new(InMemoryAppointmentStore::new());
    let availability = Arc::new(AvailabilityService::new(schedule_store));
    let booking = Arc::new(AppointmentBookingService::new(
        Arc::clone(&store) as Arc<dyn AppointmentStore>,
        Arc::clone(&availability),
        hook,
    ));
    TestEngine {
        availability,
        store,
        booking,
    }
}

/// Store wrapper that delays reads, widening the window between a record
/// fetch and its commit so interleaving tests can race two mutations.
pub struct DelayedReadStore(pub Arc<InMemoryAppointmentStore>);

#[async_trait]
impl AppointmentStore for DelayedReadStore {
    async fn insert(&self, appointment: Appointment) {
        self.0.insert(appointment).await
    }

    async fn get(&self, id: Uuid) -> Option<Appointment> {
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.0.get(id).await
    }

    async fn update(&self, appointment: Appointment) -> Result<(), SchedulingError> {
        self.0.update(appointment).await
    }

    async fn for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.0.for_doctor_in_range(doctor_id, from, to).await
    }

    async fn starting_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        self.0.starting_in_range(from, to).await
    }

    async fn search(&self, query: &AppointmentSearchQuery) -> Vec<Appointment> {
        self.0.search(query).await
    }

    async fn commit_reschedule(
        &self,
        original: Appointment,
        replacement: Appointment,
    ) -> Result<(), SchedulingError> {
        self.0.commit_reschedule(original, replacement).await
    }
}

/// Engine whose booking service reads through a `DelayedReadStore`; the
/// returned `store` handle is the undelayed inner store for inspection.
pub fn engine_with_delayed_reads() -> TestEngine {
    let schedule_store = Arc::new(InMemoryScheduleStore::new());
    let store = Arc::new(InMemoryAppointmentStore::new());
    let availability = Arc::new(AvailabilityService::new(schedule_store));
    let booking = Arc::new(AppointmentBookingService::new(
        Arc::new(DelayedReadStore(Arc::clone(&store))) as Arc<dyn AppointmentStore>,
        Arc::clone(&availability),
        Arc::new(LoggingNotificationHook),
    ));
    TestEngine {
        availability,
        store,
        booking,
    }
}

/// 2025-06-02 is a Monday; all fixtures live in that June.
pub fn dt(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
}

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Monday 09:00-17:00 with a 12:00-13:00 break.
pub async fn seed_monday_schedule(engine: &TestEngine, doctor_id: Uuid) {
    engine
        .availability
        .create_schedule(
            doctor_id,
            CreateScheduleRequest {
                day_of_week: 1,
                start_time: time(9, 0),
                end_time: time(17, 0),
                break_start: Some(time(12, 0)),
                break_end: Some(time(13, 0)),
                facility_id: None,
            },
        )
        .await
        .expect("seed schedule");
}

pub fn create_request(
    patient_id: Uuid,
    doctor_id: Uuid,
    scheduled_at: DateTime<Utc>,
) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id,
        doctor_id,
        appointment_type: AppointmentType::GeneralConsultation,
        scheduled_at,
        duration_minutes: Some(30),
        reason: Some("checkup".to_string()),
        notes: None,
        is_urgent: false,
        channel: BookingChannel::Web,
        external_id: None,
        facility_id: None,
    }
}

/// Bare appointment row for direct store seeding in read-side tests.
pub fn appointment(
    doctor_id: Uuid,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i64,
    status: AppointmentStatus,
) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id,
        appointment_type: AppointmentType::GeneralConsultation,
        scheduled_at,
        duration_minutes,
        status,
        reason: None,
        notes: None,
        is_urgent: false,
        confirmation_method: None,
        confirmed_at: None,
        cancellation_reason: None,
        cancelled_by: None,
        cancelled_at: None,
        rescheduled_from: None,
        rescheduled_to: None,
        channel: BookingChannel::Web,
        external_id: None,
        facility_id: None,
        created_at: now,
        updated_at: now,
    }
}
