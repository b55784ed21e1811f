// libs/schedule-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    day_of_week, CreateBlockRequest, CreateScheduleRequest, DoctorSchedule, ScheduleBlock,
    ScheduleError, UpdateScheduleRequest, WorkingWindow,
};
use crate::store::ScheduleStore;

/// The Availability Resolver plus administrative CRUD over schedules and
/// blocks. Read paths are pure functions of stored schedule data and fail
/// closed: no matching schedule row means the doctor is unavailable.
pub struct AvailabilityService {
    store: Arc<dyn ScheduleStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Resolve a doctor's working window for a concrete date. Returns `None`
    /// when no active schedule row matches the date's day of week.
    pub async fn resolve_working_window(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Option<WorkingWindow> {
        let schedule = self
            .store
            .active_schedule_for_day(doctor_id, day_of_week(date))
            .await?;

        debug!(
            "Resolved working window for doctor {} on {}: {}-{}",
            doctor_id, date, schedule.start_time, schedule.end_time
        );

        Some(WorkingWindow {
            start: date.and_time(schedule.start_time).and_utc(),
            end: date.and_time(schedule.end_time).and_utc(),
            break_start: schedule.break_start.map(|t| date.and_time(t).and_utc()),
            break_end: schedule.break_end.map(|t| date.and_time(t).and_utc()),
        })
    }

    /// Effective blocked intervals for a doctor on a date, recurring blocks
    /// materialized. Overlapping blocks are unioned, not deduplicated.
    pub async fn blocked_intervals(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let blocks = self.store.blocks_for_doctor(doctor_id).await;
        blocks
            .iter()
            .flat_map(|block| block.intervals_on(date))
            .collect()
    }

    // ==========================================================================
    // SCHEDULE ADMINISTRATION
    // ==========================================================================

    pub async fn create_schedule(
        &self,
        doctor_id: Uuid,
        request: CreateScheduleRequest,
    ) -> Result<DoctorSchedule, ScheduleError> {
        debug!(
            "Creating schedule for doctor {} on day {}",
            doctor_id, request.day_of_week
        );

        let now = Utc::now();
        let schedule = DoctorSchedule {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            break_start: request.break_start,
            break_end: request.break_end,
            is_active: true,
            facility_id: request.facility_id,
            created_at: now,
            updated_at: now,
        };
        schedule.validate()?;

        // One recurring window per doctor per day of week.
        if self
            .store
            .active_schedule_for_day(doctor_id, request.day_of_week)
            .await
            .is_some()
        {
            return Err(ScheduleError::Overlap);
        }

        self.store.upsert_schedule(schedule.clone()).await;
        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        schedule_id: Uuid,
        request: UpdateScheduleRequest,
    ) -> Result<DoctorSchedule, ScheduleError> {
        let mut schedule = self
            .store
            .get_schedule(schedule_id)
            .await
            .ok_or(ScheduleError::NotFound)?;

        if let Some(start_time) = request.start_time {
            schedule.start_time = start_time;
        }
        if let Some(end_time) = request.end_time {
            schedule.end_time = end_time;
        }
        if let Some(break_start) = request.break_start {
            schedule.break_start = Some(break_start);
        }
        if let Some(break_end) = request.break_end {
            schedule.break_end = Some(break_end);
        }
        if let Some(is_active) = request.is_active {
            schedule.is_active = is_active;
        }
        schedule.updated_at = Utc::now();
        schedule.validate()?;

        self.store.upsert_schedule(schedule.clone()).await;
        Ok(schedule)
    }

    pub async fn list_schedules(&self, doctor_id: Uuid) -> Vec<DoctorSchedule> {
        self.store.schedules_for_doctor(doctor_id).await
    }

    // ==========================================================================
    // BLOCK ADMINISTRATION
    // ==========================================================================

    pub async fn create_block(
        &self,
        doctor_id: Uuid,
        request: CreateBlockRequest,
    ) -> Result<ScheduleBlock, ScheduleError> {
        let block = ScheduleBlock {
            id: Uuid::new_v4(),
            doctor_id,
            start_at: request.start_at,
            end_at: request.end_at,
            reason: request.reason,
            recurrence: request.recurrence,
            created_at: Utc::now(),
        };
        block.validate()?;

        debug!(
            "Creating schedule block for doctor {} from {} to {}",
            doctor_id, block.start_at, block.end_at
        );
        self.store.insert_block(block.clone()).await;
        Ok(block)
    }

    pub async fn list_blocks(&self, doctor_id: Uuid) -> Vec<ScheduleBlock> {
        self.store.blocks_for_doctor(doctor_id).await
    }

    pub async fn delete_block(&self, block_id: Uuid) -> Result<(), ScheduleError> {
        if self.store.delete_block(block_id).await {
            Ok(())
        } else {
            Err(ScheduleError::NotFound)
        }
    }
}
