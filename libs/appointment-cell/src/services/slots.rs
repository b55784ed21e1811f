// libs/appointment-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use schedule_cell::services::availability::AvailabilityService;

use crate::models::{
    Appointment, AppointmentType, SchedulingError, Slot, SlotUnavailableReason,
    DEFAULT_SLOT_MINUTES, MAX_APPOINTMENT_MINUTES, MIN_APPOINTMENT_MINUTES, SLOT_STEP_MINUTES,
};
use crate::services::conflict::ConflictDetectionService;
use crate::store::AppointmentStore;

/// Enumerates candidate start times across a doctor's working window at a
/// fixed step granularity. The step is independent from the slot duration so
/// callers can offer finer-grained start-time choice than the appointment's
/// own length. Results are recomputed fresh on every call.
pub struct SlotGeneratorService {
    availability: Arc<AvailabilityService>,
    store: Arc<dyn AppointmentStore>,
    default_slot_minutes: i64,
    step_minutes: i64,
}

impl SlotGeneratorService {
    pub fn new(availability: Arc<AvailabilityService>, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            availability,
            store,
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
            step_minutes: SLOT_STEP_MINUTES,
        }
    }

    /// Override the built-in slot duration and step, typically from
    /// `AppConfig`. Non-positive values are ignored: a zero or negative step
    /// would stall the generation loop.
    pub fn with_granularity(mut self, default_slot_minutes: i64, step_minutes: i64) -> Self {
        if default_slot_minutes > 0 {
            self.default_slot_minutes = default_slot_minutes;
        } else {
            warn!(
                "Ignoring non-positive default slot duration {}",
                default_slot_minutes
            );
        }
        if step_minutes > 0 {
            self.step_minutes = step_minutes;
        } else {
            warn!("Ignoring non-positive slot step {}", step_minutes);
        }
        self
    }

    /// Resolve the slot duration for a request: explicit duration first, then
    /// the appointment type's default, then the configured default. The
    /// result is bounds-checked like any bookable duration.
    pub fn resolve_slot_duration(
        &self,
        appointment_type: Option<AppointmentType>,
        duration_minutes: Option<i64>,
    ) -> Result<i64, SchedulingError> {
        let minutes = duration_minutes
            .or_else(|| appointment_type.map(|t| t.default_duration_minutes()))
            .unwrap_or(self.default_slot_minutes);

        if !(MIN_APPOINTMENT_MINUTES..=MAX_APPOINTMENT_MINUTES).contains(&minutes) {
            return Err(SchedulingError::InvalidInterval(format!(
                "slot duration must be between {} and {} minutes",
                MIN_APPOINTMENT_MINUTES, MAX_APPOINTMENT_MINUTES
            )));
        }
        Ok(minutes)
    }

    /// Generate the ordered slot sequence for a doctor and date. Returns an
    /// empty sequence when the doctor has no working window that day.
    pub async fn generate_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot_duration_minutes: i64,
    ) -> Vec<Slot> {
        if slot_duration_minutes < 1 {
            warn!("Rejecting slot generation with duration {}", slot_duration_minutes);
            return vec![];
        }

        let Some(window) = self
            .availability
            .resolve_working_window(doctor_id, date)
            .await
        else {
            debug!("No working window for doctor {} on {}", doctor_id, date);
            return vec![];
        };

        let blocked = self.availability.blocked_intervals(doctor_id, date).await;
        let booked: Vec<Appointment> = self
            .store
            .for_doctor_in_range(doctor_id, window.start, window.end)
            .await
            .into_iter()
            .filter(|a| a.is_active())
            .collect();

        let slot_duration = Duration::minutes(slot_duration_minutes);
        let step = Duration::minutes(self.step_minutes);

        let mut slots = Vec::new();
        let mut cursor = window.start;
        while cursor + slot_duration <= window.end {
            let slot_end = cursor + slot_duration;
            let (available, reason) = if window.overlaps_break(cursor, slot_end) {
                (false, Some(SlotUnavailableReason::Break))
            } else if Self::overlaps_any(cursor, slot_end, &blocked) {
                (false, Some(SlotUnavailableReason::Blocked))
            } else if Self::overlaps_booked(cursor, slot_end, &booked) {
                (false, Some(SlotUnavailableReason::Booked))
            } else {
                (true, None)
            };

            slots.push(Slot {
                start: cursor,
                end: slot_end,
                available,
                reason,
            });
            cursor += step;
        }

        debug!(
            "Generated {} slots for doctor {} on {} ({} available)",
            slots.len(),
            doctor_id,
            date,
            slots.iter().filter(|s| s.available).count()
        );
        slots
    }

    fn overlaps_any(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> bool {
        intervals
            .iter()
            .any(|(b_start, b_end)| ConflictDetectionService::intervals_overlap(start, end, *b_start, *b_end))
    }

    fn overlaps_booked(start: DateTime<Utc>, end: DateTime<Utc>, booked: &[Appointment]) -> bool {
        booked.iter().any(|appointment| {
            ConflictDetectionService::intervals_overlap(
                start,
                end,
                appointment.scheduled_at,
                appointment.scheduled_end_time(),
            )
        })
    }
}
