// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    CreateBlockRequest, CreateScheduleRequest, ScheduleError, UpdateScheduleRequest,
};
use crate::ScheduleState;

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotFound => AppError::NotFound(err.to_string()),
            ScheduleError::InvalidInterval(_) => AppError::ValidationError(err.to_string()),
            ScheduleError::Overlap => AppError::Conflict(err.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<ScheduleState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let schedule = state
        .availability
        .create_schedule(doctor_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ScheduleState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedules = state.availability.list_schedules(doctor_id).await;

    Ok(Json(json!({
        "count": schedules.len(),
        "schedules": schedules
    })))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ScheduleState>>,
    Path(schedule_id): Path<Uuid>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let schedule = state
        .availability
        .update_schedule(schedule_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn create_block(
    State(state): State<Arc<ScheduleState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<CreateBlockRequest>,
) -> Result<Json<Value>, AppError> {
    let block = state.availability.create_block(doctor_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "block": block
    })))
}

#[axum::debug_handler]
pub async fn list_blocks(
    State(state): State<Arc<ScheduleState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let blocks = state.availability.list_blocks(doctor_id).await;

    Ok(Json(json!({
        "count": blocks.len(),
        "blocks": blocks
    })))
}

#[axum::debug_handler]
pub async fn delete_block(
    State(state): State<Arc<ScheduleState>>,
    Path(block_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.availability.delete_block(block_id).await?;

    Ok(Json(json!({
        "success": true
    })))
}
