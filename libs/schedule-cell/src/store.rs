// libs/schedule-cell/src/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{DoctorSchedule, ScheduleBlock};

/// Persistence boundary for recurring schedules and ad-hoc blocks. Injected
/// into services so the engine never reaches for a concrete database.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn upsert_schedule(&self, schedule: DoctorSchedule);
    async fn get_schedule(&self, schedule_id: Uuid) -> Option<DoctorSchedule>;
    async fn schedules_for_doctor(&self, doctor_id: Uuid) -> Vec<DoctorSchedule>;
    /// Active schedule row for a doctor on a day of week (0 = Sunday).
    async fn active_schedule_for_day(&self, doctor_id: Uuid, day_of_week: u8)
        -> Option<DoctorSchedule>;

    async fn insert_block(&self, block: ScheduleBlock);
    async fn blocks_for_doctor(&self, doctor_id: Uuid) -> Vec<ScheduleBlock>;
    async fn delete_block(&self, block_id: Uuid) -> bool;
}

/// In-memory schedule store keyed by doctor, suitable for tests and
/// single-process deployments.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    inner: RwLock<ScheduleStoreInner>,
}

#[derive(Default)]
struct ScheduleStoreInner {
    schedules: HashMap<Uuid, DoctorSchedule>,
    blocks: HashMap<Uuid, Vec<ScheduleBlock>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn upsert_schedule(&self, schedule: DoctorSchedule) {
        let mut inner = self.inner.write().await;
        inner.schedules.insert(schedule.id, schedule);
    }

    async fn get_schedule(&self, schedule_id: Uuid) -> Option<DoctorSchedule> {
        let inner = self.inner.read().await;
        inner.schedules.get(&schedule_id).cloned()
    }

    async fn schedules_for_doctor(&self, doctor_id: Uuid) -> Vec<DoctorSchedule> {
        let inner = self.inner.read().await;
        let mut schedules: Vec<DoctorSchedule> = inner
            .schedules
            .values()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| (s.day_of_week, s.start_time));
        schedules
    }

    async fn active_schedule_for_day(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Option<DoctorSchedule> {
        let inner = self.inner.read().await;
        inner
            .schedules
            .values()
            .find(|s| s.doctor_id == doctor_id && s.day_of_week == day_of_week && s.is_active)
            .cloned()
    }

    async fn insert_block(&self, block: ScheduleBlock) {
        let mut inner = self.inner.write().await;
        inner.blocks.entry(block.doctor_id).or_default().push(block);
    }

    async fn blocks_for_doctor(&self, doctor_id: Uuid) -> Vec<ScheduleBlock> {
        let inner = self.inner.read().await;
        inner.blocks.get(&doctor_id).cloned().unwrap_or_default()
    }

    async fn delete_block(&self, block_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        for blocks in inner.blocks.values_mut() {
            if let Some(pos) = blocks.iter().position(|b| b.id == block_id) {
                blocks.remove(pos);
                return true;
            }
        }
        false
    }
}
