// libs/appointment-cell/src/services/notifications.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Appointment;

/// Events handed to downstream subsystems (reminders, search indexing) after
/// a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentEvent {
    Created,
    Cancelled,
    Rescheduled,
}

/// Outbound hook invoked best-effort after create/cancel/reschedule. Failures
/// here never affect the committed booking.
#[async_trait]
pub trait NotificationHook: Send + Sync {
    async fn appointment_event(&self, event: AppointmentEvent, appointment: Appointment);
}

/// Default hook: logs the event and does nothing else.
#[derive(Default)]
pub struct LoggingNotificationHook;

#[async_trait]
impl NotificationHook for LoggingNotificationHook {
    async fn appointment_event(&self, event: AppointmentEvent, appointment: Appointment) {
        info!(
            "Appointment event {:?} for appointment {} (doctor {}, patient {})",
            event, appointment.id, appointment.doctor_id, appointment.patient_id
        );
    }
}
