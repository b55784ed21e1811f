pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

use std::sync::Arc;

use schedule_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;

use services::booking::AppointmentBookingService;
use services::notifications::NotificationHook;
use services::slots::SlotGeneratorService;
use services::stats::StatisticsService;
use store::AppointmentStore;

/// Shared state for the appointment cell router.
pub struct AppointmentState {
    pub booking: AppointmentBookingService,
    pub slots: SlotGeneratorService,
    pub stats: StatisticsService,
}

impl AppointmentState {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        availability: Arc<AvailabilityService>,
        notifier: Arc<dyn NotificationHook>,
        config: &AppConfig,
    ) -> Self {
        Self {
            booking: AppointmentBookingService::new(
                Arc::clone(&store),
                Arc::clone(&availability),
                notifier,
            ),
            slots: SlotGeneratorService::new(availability, Arc::clone(&store))
                .with_granularity(config.default_slot_minutes, config.slot_step_minutes),
            stats: StatisticsService::new(store),
        }
    }
}
