// libs/schedule-cell/src/models.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// RECURRING WEEKLY SCHEDULES
// ==============================================================================

/// One recurring weekly working window for a doctor.
///
/// `day_of_week` uses 0 = Sunday through 6 = Saturday. Rows are soft-disabled
/// via `is_active` rather than deleted so historical appointments keep their
/// referential meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub is_active: bool,
    pub facility_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorSchedule {
    /// Validate the entity invariants: day in range, start < end, and a break
    /// (when both bounds are present) strictly inside the working window.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.day_of_week > 6 {
            return Err(ScheduleError::InvalidInterval(
                "day_of_week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(ScheduleError::InvalidInterval(
                "start_time must be before end_time".to_string(),
            ));
        }
        match (self.break_start, self.break_end) {
            (None, None) => {}
            (Some(bs), Some(be)) => {
                if bs >= be {
                    return Err(ScheduleError::InvalidInterval(
                        "break_start must be before break_end".to_string(),
                    ));
                }
                if bs < self.start_time || be > self.end_time {
                    return Err(ScheduleError::InvalidInterval(
                        "break must lie within the working window".to_string(),
                    ));
                }
            }
            _ => {
                return Err(ScheduleError::InvalidInterval(
                    "break_start and break_end must be provided together".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn break_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        match (self.break_start, self.break_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// Map a calendar date onto the 0 = Sunday day-of-week encoding used by
/// `DoctorSchedule`.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A doctor's resolved working window for a concrete date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub break_start: Option<DateTime<Utc>>,
    pub break_end: Option<DateTime<Utc>>,
}

impl WorkingWindow {
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }

    /// Whether the interval intersects the break sub-interval.
    pub fn overlaps_break(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match (self.break_start, self.break_end) {
            (Some(bs), Some(be)) => start < be && end > bs,
            _ => false,
        }
    }
}

// ==============================================================================
// AD-HOC SCHEDULE BLOCKS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Recurrence descriptor for a repeating schedule block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRecurrence {
    pub frequency: BlockFrequency,
    /// Repeat every `interval` periods (1 = every day/week/month).
    pub interval: u32,
    pub until: Option<NaiveDate>,
    #[serde(default)]
    pub exceptions: Vec<NaiveDate>,
}

/// An explicit unavailability interval for a doctor (vacation, meeting, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub recurrence: Option<BlockRecurrence>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleBlock {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.start_at >= self.end_at {
            return Err(ScheduleError::InvalidInterval(
                "block start must be before block end".to_string(),
            ));
        }
        if let Some(recurrence) = &self.recurrence {
            if recurrence.interval == 0 {
                return Err(ScheduleError::InvalidInterval(
                    "recurrence interval must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Materialize the effective blocked intervals of this block on a target
    /// date, honoring the recurrence descriptor and its exception dates.
    ///
    /// Non-recurring blocks are returned whole whenever they intersect the
    /// day; recurring blocks project the base interval's wall-clock times onto
    /// each matching occurrence date.
    pub fn intervals_on(&self, date: NaiveDate) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let day_start = match date.and_hms_opt(0, 0, 0) {
            Some(start) => start.and_utc(),
            None => return vec![],
        };
        let day_end = day_start + Duration::days(1);

        let Some(recurrence) = &self.recurrence else {
            if self.start_at < day_end && self.end_at > day_start {
                return vec![(self.start_at, self.end_at)];
            }
            return vec![];
        };

        let base_date = self.start_at.date_naive();
        if date < base_date {
            return vec![];
        }
        if let Some(until) = recurrence.until {
            if date > until {
                return vec![];
            }
        }
        if recurrence.exceptions.contains(&date) {
            return vec![];
        }
        if !Self::occurs_on(recurrence, base_date, date) {
            return vec![];
        }

        let occurrence_start = date.and_time(self.start_at.time()).and_utc();
        let occurrence_end = occurrence_start + (self.end_at - self.start_at);
        vec![(occurrence_start, occurrence_end)]
    }

    fn occurs_on(recurrence: &BlockRecurrence, base: NaiveDate, date: NaiveDate) -> bool {
        let interval = recurrence.interval as i64;
        match recurrence.frequency {
            BlockFrequency::Daily => (date - base).num_days() % interval == 0,
            BlockFrequency::Weekly => {
                let days = (date - base).num_days();
                days % 7 == 0 && (days / 7) % interval == 0
            }
            BlockFrequency::Monthly => {
                if date.day() != base.day() {
                    return false;
                }
                let months = (date.year() - base.year()) * 12
                    + (date.month() as i32 - base.month() as i32);
                months >= 0 && months as i64 % interval == 0
            }
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub facility_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScheduleRequest {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockRequest {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub recurrence: Option<BlockRecurrence>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Schedule not found")]
    NotFound,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("An active schedule already exists for that day of week")]
    Overlap,
}
