// libs/appointment-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::availability::AvailabilityService;

use crate::models::{
    Appointment, AppointmentSearchQuery, AppointmentStatus, CancelAppointmentRequest,
    ConfirmAppointmentRequest, CreateAppointmentRequest, RescheduleAppointmentRequest,
    SchedulingError, UpdateAppointmentRequest, MAX_APPOINTMENT_MINUTES, MIN_APPOINTMENT_MINUTES,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::notifications::{AppointmentEvent, NotificationHook};
use crate::store::AppointmentStore;

/// Per-doctor mutual exclusion for check-then-commit sequences. The in-memory
/// store offers no transactional isolation, so every booking mutation for a
/// doctor runs under that doctor's mutex. The registry holds one entry per
/// doctor ever booked and never evicts; its size is bounded by the doctor
/// population.
#[derive(Default)]
struct DoctorLocks {
    inner: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl DoctorLocks {
    fn for_doctor(&self, doctor_id: Uuid) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.entry(doctor_id).or_default().clone()
    }
}

/// The Appointment Lifecycle Manager: orchestrates create, update, confirm,
/// cancel, and reschedule, consulting the Availability Resolver and Conflict
/// Detector before committing any time change.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    availability: Arc<AvailabilityService>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: AppointmentLifecycleService,
    notifier: Arc<dyn NotificationHook>,
    locks: DoctorLocks,
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        availability: Arc<AvailabilityService>,
        notifier: Arc<dyn NotificationHook>,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&store));
        Self {
            store,
            availability,
            conflict_service,
            lifecycle_service: AppointmentLifecycleService::new(),
            notifier,
            locks: DoctorLocks::default(),
        }
    }

    pub fn conflict_service(&self) -> &ConflictDetectionService {
        &self.conflict_service
    }

    /// Book a new appointment. The requested interval must fall inside the
    /// doctor's resolved working window, clear of breaks and blocks, and must
    /// not overlap any active appointment.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Booking appointment for patient {} with doctor {} at {}",
            request.patient_id, request.doctor_id, request.scheduled_at
        );

        let duration_minutes = Self::validate_duration(
            request
                .duration_minutes
                .unwrap_or_else(|| request.appointment_type.default_duration_minutes()),
        )?;
        let start = request.scheduled_at;
        let end = start + Duration::minutes(duration_minutes);

        let lock = self.locks.for_doctor(request.doctor_id);
        let _guard = lock.lock().await;

        self.check_bookable(request.doctor_id, start, end, None).await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_type: request.appointment_type,
            scheduled_at: start,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            reason: request.reason,
            notes: request.notes,
            is_urgent: request.is_urgent,
            confirmation_method: None,
            confirmed_at: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            rescheduled_from: None,
            rescheduled_to: None,
            channel: request.channel,
            external_id: request.external_id,
            facility_id: request.facility_id,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(appointment.clone()).await;
        drop(_guard);

        info!("Appointment {} booked with doctor {}", appointment.id, appointment.doctor_id);
        self.notify(AppointmentEvent::Created, &appointment);
        Ok(appointment)
    }

    /// Apply a patch. Timing changes re-run the availability and conflict
    /// checks excluding the record's own id; status changes go through the
    /// state machine. Only the operational forward steps (`in_progress`,
    /// `completed`) may be patched in — confirm, cancel, and reschedule have
    /// dedicated operations that record their bookkeeping.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        facility_id: Option<Uuid>,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Updating appointment {}", appointment_id);

        let changes_timing = request.changes_timing();
        let existing = self.get_appointment(appointment_id, facility_id).await?;

        let lock = self.locks.for_doctor(existing.doctor_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent mutation may have landed
        // between the fetch above and lock acquisition.
        let mut appointment = self.get_appointment(appointment_id, facility_id).await?;

        if let Some(new_status) = request.status {
            if !matches!(
                new_status,
                AppointmentStatus::InProgress | AppointmentStatus::Completed
            ) {
                return Err(SchedulingError::InvalidTransition {
                    from: appointment.status,
                    to: new_status,
                });
            }
            self.lifecycle_service
                .validate_status_transition(appointment.status, new_status)?;
            appointment.status = new_status;
        }
        if let Some(reason) = request.reason {
            appointment.reason = Some(reason);
        }
        if let Some(notes) = request.notes {
            appointment.notes = Some(notes);
        }
        if let Some(is_urgent) = request.is_urgent {
            appointment.is_urgent = is_urgent;
        }

        if changes_timing {
            let new_start = request.scheduled_at.unwrap_or(appointment.scheduled_at);
            let new_duration = Self::validate_duration(
                request.duration_minutes.unwrap_or(appointment.duration_minutes),
            )?;
            let new_end = new_start + Duration::minutes(new_duration);

            self.check_bookable(appointment.doctor_id, new_start, new_end, Some(appointment_id))
                .await?;

            appointment.scheduled_at = new_start;
            appointment.duration_minutes = new_duration;
        }

        appointment.updated_at = Utc::now();
        self.store.update(appointment.clone()).await?;

        info!("Appointment {} updated", appointment_id);
        Ok(appointment)
    }

    /// Confirm a scheduled appointment, recording the method and timestamp.
    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
        request: ConfirmAppointmentRequest,
        facility_id: Option<Uuid>,
    ) -> Result<Appointment, SchedulingError> {
        let existing = self.get_appointment(appointment_id, facility_id).await?;

        let lock = self.locks.for_doctor(existing.doctor_id);
        let _guard = lock.lock().await;

        // Re-validate under the lock so concurrent confirms serialize.
        let mut appointment = self.get_appointment(appointment_id, facility_id).await?;
        self.lifecycle_service
            .validate_status_transition(appointment.status, AppointmentStatus::Confirmed)?;

        appointment.status = AppointmentStatus::Confirmed;
        appointment.confirmation_method = Some(request.method);
        appointment.confirmed_at = Some(Utc::now());
        appointment.updated_at = Utc::now();
        self.store.update(appointment.clone()).await?;

        info!("Appointment {} confirmed", appointment_id);
        Ok(appointment)
    }

    /// Cancel an appointment, recording reason, actor, and timestamp.
    /// Illegal from terminal states.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
        facility_id: Option<Uuid>,
    ) -> Result<Appointment, SchedulingError> {
        let existing = self.get_appointment(appointment_id, facility_id).await?;

        let lock = self.locks.for_doctor(existing.doctor_id);
        let _guard = lock.lock().await;

        let mut appointment = self.get_appointment(appointment_id, facility_id).await?;
        self.lifecycle_service
            .validate_status_transition(appointment.status, AppointmentStatus::Cancelled)?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = Some(request.reason);
        appointment.cancelled_by = Some(request.cancelled_by);
        appointment.cancelled_at = Some(Utc::now());
        appointment.updated_at = Utc::now();
        self.store.update(appointment.clone()).await?;

        info!("Appointment {} cancelled", appointment_id);
        self.notify(AppointmentEvent::Cancelled, &appointment);
        Ok(appointment)
    }

    /// Reschedule: book a replacement at the new time and mark the original
    /// `rescheduled`, chained via `rescheduled_from`/`rescheduled_to`. Both
    /// records land atomically or the original is left untouched.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        facility_id: Option<Uuid>,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let existing = self.get_appointment(appointment_id, facility_id).await?;

        let lock = self.locks.for_doctor(existing.doctor_id);
        let _guard = lock.lock().await;

        // Re-read and re-validate under the lock; a concurrent reschedule of
        // the same record must find it already superseded.
        let original = self.get_appointment(appointment_id, facility_id).await?;
        self.lifecycle_service
            .validate_status_transition(original.status, AppointmentStatus::Rescheduled)?;

        let duration_minutes = Self::validate_duration(
            request
                .new_duration_minutes
                .unwrap_or(original.duration_minutes),
        )?;
        let new_start = request.new_scheduled_at;
        let new_end = new_start + Duration::minutes(duration_minutes);

        // The original still occupies its old time; excluding it lets a swap
        // onto an overlapping interval go through.
        self.check_bookable(original.doctor_id, new_start, new_end, Some(original.id))
            .await?;

        let now = Utc::now();
        let replacement = Appointment {
            id: Uuid::new_v4(),
            patient_id: original.patient_id,
            doctor_id: original.doctor_id,
            appointment_type: original.appointment_type,
            scheduled_at: new_start,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            reason: original.reason.clone(),
            notes: original.notes.clone(),
            is_urgent: original.is_urgent,
            confirmation_method: None,
            confirmed_at: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            rescheduled_from: Some(original.id),
            rescheduled_to: None,
            channel: original.channel,
            external_id: None,
            facility_id: original.facility_id,
            created_at: now,
            updated_at: now,
        };

        let mut superseded = original;
        superseded.status = AppointmentStatus::Rescheduled;
        superseded.rescheduled_to = Some(replacement.id);
        superseded.cancellation_reason = Some(request.reason);
        superseded.cancelled_by = Some(request.requested_by);
        superseded.cancelled_at = Some(now);
        superseded.updated_at = now;

        self.store
            .commit_reschedule(superseded, replacement.clone())
            .await?;
        drop(_guard);

        info!(
            "Appointment {} rescheduled to {} as {}",
            appointment_id, new_start, replacement.id
        );
        self.notify(AppointmentEvent::Rescheduled, &replacement);
        Ok(replacement)
    }

    /// Fetch an appointment within the caller's facility scope. An id that
    /// resolves outside the scope reads as not found.
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        facility_id: Option<Uuid>,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self
            .store
            .get(appointment_id)
            .await
            .ok_or(SchedulingError::NotFound)?;

        if let Some(facility) = facility_id {
            if appointment.facility_id != Some(facility) {
                return Err(SchedulingError::NotFound);
            }
        }
        Ok(appointment)
    }

    pub async fn search_appointments(&self, query: &AppointmentSearchQuery) -> Vec<Appointment> {
        self.store.search(query).await
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    /// Availability and conflict checks shared by create, timed update, and
    /// reschedule. Must be called with the doctor's lock held.
    async fn check_bookable(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), SchedulingError> {
        let date = start.date_naive();
        let window = self
            .availability
            .resolve_working_window(doctor_id, date)
            .await
            .ok_or_else(|| SchedulingError::DoctorUnavailable {
                doctor_id,
                detail: format!("no working hours on {}", date),
            })?;

        if !window.contains(start, end) {
            return Err(SchedulingError::DoctorUnavailable {
                doctor_id,
                detail: format!(
                    "requested {}-{} outside working window {}-{}",
                    start, end, window.start, window.end
                ),
            });
        }
        if window.overlaps_break(start, end) {
            return Err(SchedulingError::DoctorUnavailable {
                doctor_id,
                detail: "requested time overlaps the doctor's break".to_string(),
            });
        }

        let blocked = self.availability.blocked_intervals(doctor_id, date).await;
        if blocked
            .iter()
            .any(|(b_start, b_end)| ConflictDetectionService::intervals_overlap(start, end, *b_start, *b_end))
        {
            return Err(SchedulingError::DoctorUnavailable {
                doctor_id,
                detail: "requested time falls in a blocked interval".to_string(),
            });
        }

        if let Some(conflict) = self
            .conflict_service
            .find_conflict(doctor_id, start, end, exclude_appointment_id)
            .await
        {
            warn!(
                "Booking rejected: doctor {} conflict with appointment {}",
                doctor_id, conflict.id
            );
            return Err(SchedulingError::ScheduleConflict {
                conflicting_appointment_id: conflict.id,
            });
        }

        Ok(())
    }

    fn validate_duration(duration_minutes: i64) -> Result<i64, SchedulingError> {
        if duration_minutes < MIN_APPOINTMENT_MINUTES {
            return Err(SchedulingError::InvalidInterval(format!(
                "duration must be at least {} minutes",
                MIN_APPOINTMENT_MINUTES
            )));
        }
        if duration_minutes > MAX_APPOINTMENT_MINUTES {
            return Err(SchedulingError::InvalidInterval(format!(
                "duration must be at most {} minutes",
                MAX_APPOINTMENT_MINUTES
            )));
        }
        Ok(duration_minutes)
    }

    /// Best-effort hook dispatch; never blocks or fails the transaction.
    fn notify(&self, event: AppointmentEvent, appointment: &Appointment) {
        let hook = Arc::clone(&self.notifier);
        let appointment = appointment.clone();
        tokio::spawn(async move {
            hook.appointment_event(event, appointment).await;
        });
    }
}
