// libs/appointment-cell/src/store.rs
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentSearchQuery, SchedulingError, MAX_APPOINTMENT_MINUTES,
};

/// Persistence boundary for appointments. Appointments are keyed by id with a
/// secondary `(doctor_id, scheduled_at)` ordering so conflict scans and slot
/// generation are range reads.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: Appointment);
    async fn get(&self, id: Uuid) -> Option<Appointment>;
    async fn update(&self, appointment: Appointment) -> Result<(), SchedulingError>;

    /// Appointments for a doctor whose interval intersects `[from, to)`.
    async fn for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment>;

    /// Appointments, any doctor, whose start falls in `[from, to)`.
    async fn starting_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>)
        -> Vec<Appointment>;

    async fn search(&self, query: &AppointmentSearchQuery) -> Vec<Appointment>;

    /// Atomically mark `original` rescheduled and insert its `replacement`.
    /// Either both records land or neither does.
    async fn commit_reschedule(
        &self,
        original: Appointment,
        replacement: Appointment,
    ) -> Result<(), SchedulingError>;
}

/// In-memory appointment store. A single `RwLock` over both indexes gives the
/// write paths the atomicity the reschedule chain requires.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    inner: RwLock<AppointmentStoreInner>,
}

#[derive(Default)]
struct AppointmentStoreInner {
    by_id: HashMap<Uuid, Appointment>,
    // (scheduled_at, id) keys tolerate identical start times.
    by_doctor: HashMap<Uuid, BTreeMap<(DateTime<Utc>, Uuid), Uuid>>,
}

impl AppointmentStoreInner {
    fn index(&mut self, appointment: &Appointment) {
        self.by_doctor
            .entry(appointment.doctor_id)
            .or_default()
            .insert((appointment.scheduled_at, appointment.id), appointment.id);
    }

    fn unindex(&mut self, appointment: &Appointment) {
        if let Some(timeline) = self.by_doctor.get_mut(&appointment.doctor_id) {
            timeline.remove(&(appointment.scheduled_at, appointment.id));
        }
    }

    fn put(&mut self, appointment: Appointment) {
        if let Some(previous) = self.by_id.get(&appointment.id).cloned() {
            self.unindex(&previous);
        }
        self.index(&appointment);
        self.by_id.insert(appointment.id, appointment);
    }
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) {
        let mut inner = self.inner.write().await;
        inner.put(appointment);
    }

    async fn get(&self, id: Uuid) -> Option<Appointment> {
        let inner = self.inner.read().await;
        inner.by_id.get(&id).cloned()
    }

    async fn update(&self, appointment: Appointment) -> Result<(), SchedulingError> {
        let mut inner = self.inner.write().await;
        if !inner.by_id.contains_key(&appointment.id) {
            return Err(SchedulingError::NotFound);
        }
        inner.put(appointment);
        Ok(())
    }

    async fn for_doctor_in_range(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let inner = self.inner.read().await;
        let Some(timeline) = inner.by_doctor.get(&doctor_id) else {
            return vec![];
        };

        // Appointments starting before `from` can still reach into the range;
        // the scan starts one maximum duration early and filters on end time.
        let scan_from = from - Duration::minutes(MAX_APPOINTMENT_MINUTES);
        timeline
            .range((scan_from, Uuid::nil())..(to, Uuid::nil()))
            .filter_map(|(_, id)| inner.by_id.get(id))
            .filter(|appointment| appointment.scheduled_end_time() > from)
            .cloned()
            .collect()
    }

    async fn starting_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .by_id
            .values()
            .filter(|a| a.scheduled_at >= from && a.scheduled_at < to)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.scheduled_at);
        appointments
    }

    async fn search(&self, query: &AppointmentSearchQuery) -> Vec<Appointment> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Appointment> = inner
            .by_id
            .values()
            .filter(|a| query.patient_id.map_or(true, |id| a.patient_id == id))
            .filter(|a| query.doctor_id.map_or(true, |id| a.doctor_id == id))
            .filter(|a| query.status.map_or(true, |status| a.status == status))
            .filter(|a| query.from_date.map_or(true, |from| a.scheduled_at >= from))
            .filter(|a| query.to_date.map_or(true, |to| a.scheduled_at < to))
            .filter(|a| query.facility_id.map_or(true, |f| a.facility_id == Some(f)))
            .cloned()
            .collect();
        matches.sort_by_key(|a| a.scheduled_at);

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        matches.into_iter().skip(offset).take(limit).collect()
    }

    async fn commit_reschedule(
        &self,
        original: Appointment,
        replacement: Appointment,
    ) -> Result<(), SchedulingError> {
        let mut inner = self.inner.write().await;
        if !inner.by_id.contains_key(&original.id) {
            return Err(SchedulingError::NotFound);
        }
        inner.put(original);
        inner.put(replacement);
        Ok(())
    }
}
