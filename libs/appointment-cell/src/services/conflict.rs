// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Appointment;
use crate::store::AppointmentStore;

/// Detects overlaps between a candidate interval and a doctor's active
/// appointments. Cancelled, completed, and rescheduled-away appointments
/// never block a slot.
pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// First active appointment conflicting with `[start, end)`, if any.
    /// `exclude_appointment_id` omits a record from the scan so a no-op time
    /// edit does not conflict with itself.
    pub async fn find_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> Option<Appointment> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start, end
        );

        let existing = self.store.for_doctor_in_range(doctor_id, start, end).await;

        let conflict = existing.into_iter().find(|appointment| {
            appointment.is_active()
                && exclude_appointment_id != Some(appointment.id)
                && Self::intervals_overlap(
                    start,
                    end,
                    appointment.scheduled_at,
                    appointment.scheduled_end_time(),
                )
        });

        if let Some(appointment) = &conflict {
            warn!(
                "Conflict detected for doctor {}: appointment {} occupies {}-{}",
                doctor_id,
                appointment.id,
                appointment.scheduled_at,
                appointment.scheduled_end_time()
            );
        }

        conflict
    }

    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment_id: Option<Uuid>,
    ) -> bool {
        self.find_conflict(doctor_id, start, end, exclude_appointment_id)
            .await
            .is_some()
    }

    /// Half-open interval overlap: touching endpoints do not conflict.
    pub fn intervals_overlap(
        start_a: DateTime<Utc>,
        end_a: DateTime<Utc>,
        start_b: DateTime<Utc>,
        end_b: DateTime<Utc>,
    ) -> bool {
        start_a < end_b && end_a > start_b
    }
}
