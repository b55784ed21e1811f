// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers;
use crate::ScheduleState;

pub fn schedule_routes(state: Arc<ScheduleState>) -> Router {
    Router::new()
        .route("/doctors/{doctor_id}", post(handlers::create_schedule))
        .route("/doctors/{doctor_id}", get(handlers::list_schedules))
        .route("/{schedule_id}", put(handlers::update_schedule))
        .route("/doctors/{doctor_id}/blocks", post(handlers::create_block))
        .route("/doctors/{doctor_id}/blocks", get(handlers::list_blocks))
        .route("/blocks/{block_id}", delete(handlers::delete_block))
        .with_state(state)
}
