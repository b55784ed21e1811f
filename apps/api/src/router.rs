use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentState;
use schedule_cell::router::schedule_routes;
use schedule_cell::ScheduleState;

pub fn create_router(
    schedule_state: Arc<ScheduleState>,
    appointment_state: Arc<AppointmentState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/schedules", schedule_routes(schedule_state))
        .nest("/appointments", appointment_routes(appointment_state))
}
