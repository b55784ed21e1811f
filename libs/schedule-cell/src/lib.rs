pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::availability::AvailabilityService;

/// Shared state for the schedule cell router.
pub struct ScheduleState {
    pub availability: Arc<AvailabilityService>,
}
