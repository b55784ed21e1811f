// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shortest bookable appointment.
pub const MIN_APPOINTMENT_MINUTES: i64 = 15;
/// Longest bookable appointment; also bounds the conflict scan lookback.
pub const MAX_APPOINTMENT_MINUTES: i64 = 480;
/// Slot duration used when neither the request nor the appointment type
/// supplies one.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;
/// Fixed start-time granularity of the slot generator, independent from the
/// slot duration.
pub const SLOT_STEP_MINUTES: i64 = 15;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_type: AppointmentType,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub is_urgent: bool,
    pub confirmation_method: Option<ConfirmationMethod>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<AppointmentActor>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Back-reference to the appointment this one replaced.
    pub rescheduled_from: Option<Uuid>,
    /// Forward pointer set on the original when it is superseded.
    pub rescheduled_to: Option<Uuid>,
    pub channel: BookingChannel,
    pub external_id: Option<String>,
    pub facility_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn scheduled_end_time(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes)
    }

    /// Whether this appointment occupies its doctor's timeline for conflict
    /// purposes.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    /// Active statuses are the only ones that can conflict with a new
    /// booking.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Confirmed
                | AppointmentStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed
                | AppointmentStatus::Cancelled
                | AppointmentStatus::Rescheduled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

/// Appointment type catalog. Each type carries a default duration and a
/// calendar label/color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    InitialConsultation,
    FollowUp,
    GeneralConsultation,
    UrgentCare,
    Procedure,
    Telehealth,
}

impl AppointmentType {
    pub fn default_duration_minutes(&self) -> i64 {
        match self {
            AppointmentType::InitialConsultation => 45,
            AppointmentType::FollowUp => 20,
            AppointmentType::GeneralConsultation => 30,
            AppointmentType::UrgentCare => 20,
            AppointmentType::Procedure => 60,
            AppointmentType::Telehealth => 30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::InitialConsultation => "Initial Consultation",
            AppointmentType::FollowUp => "Follow-up",
            AppointmentType::GeneralConsultation => "General Consultation",
            AppointmentType::UrgentCare => "Urgent Care",
            AppointmentType::Procedure => "Procedure",
            AppointmentType::Telehealth => "Telehealth",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AppointmentType::InitialConsultation => "#4F86C6",
            AppointmentType::FollowUp => "#6FBF73",
            AppointmentType::GeneralConsultation => "#8E8EA8",
            AppointmentType::UrgentCare => "#D9534F",
            AppointmentType::Procedure => "#C28BD4",
            AppointmentType::Telehealth => "#45B5AA",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMethod {
    Phone,
    Email,
    Sms,
    InPerson,
}

/// Who performed a cancellation or requested a reschedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentActor {
    Patient,
    Doctor,
    Staff,
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    Web,
    Phone,
    WalkIn,
    External,
}

impl Default for BookingChannel {
    fn default() -> Self {
        BookingChannel::Web
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_type: AppointmentType,
    pub scheduled_at: DateTime<Utc>,
    /// Defaults to the appointment type's configured duration.
    pub duration_minutes: Option<i64>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub channel: BookingChannel,
    pub external_id: Option<String>,
    pub facility_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub is_urgent: Option<bool>,
}

impl UpdateAppointmentRequest {
    /// Whether the patch moves the appointment on its doctor's timeline.
    pub fn changes_timing(&self) -> bool {
        self.scheduled_at.is_some() || self.duration_minutes.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmAppointmentRequest {
    pub method: ConfirmationMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
    pub cancelled_by: AppointmentActor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_scheduled_at: DateTime<Utc>,
    pub new_duration_minutes: Option<i64>,
    pub reason: String,
    pub requested_by: AppointmentActor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub facility_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub appointment_type: Option<AppointmentType>,
    pub duration_minutes: Option<i64>,
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotUnavailableReason {
    Break,
    Blocked,
    Booked,
}

/// One candidate bookable interval in a doctor's day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotUnavailableReason>,
}

// ==============================================================================
// STATISTICS MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub total: u64,
    pub scheduled: u64,
    pub confirmed: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub rescheduled: u64,
}

impl StatusBreakdown {
    pub fn tally<'a>(appointments: impl Iterator<Item = &'a Appointment>) -> Self {
        let mut breakdown = Self::default();
        for appointment in appointments {
            breakdown.total += 1;
            match appointment.status {
                AppointmentStatus::Scheduled => breakdown.scheduled += 1,
                AppointmentStatus::Confirmed => breakdown.confirmed += 1,
                AppointmentStatus::InProgress => breakdown.in_progress += 1,
                AppointmentStatus::Completed => breakdown.completed += 1,
                AppointmentStatus::Cancelled => breakdown.cancelled += 1,
                AppointmentStatus::Rescheduled => breakdown.rescheduled += 1,
            }
        }
        breakdown
    }
}

/// Operational dashboard counts over fixed calendar windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub today: StatusBreakdown,
    pub this_week: StatusBreakdown,
    pub next_week: StatusBreakdown,
    /// Urgent appointments scheduled in the future with non-terminal status.
    pub urgent_upcoming: u64,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Doctor {doctor_id} is not available: {detail}")]
    DoctorUnavailable { doctor_id: Uuid, detail: String },

    #[error("Requested time conflicts with appointment {conflicting_appointment_id}")]
    ScheduleConflict { conflicting_appointment_id: Uuid },

    #[error("Status transition from {from} to {to} is not permitted")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment not found")]
    NotFound,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}
