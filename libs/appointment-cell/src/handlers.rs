// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentSearchQuery, AvailabilityQuery, CancelAppointmentRequest,
    ConfirmAppointmentRequest, CreateAppointmentRequest, RescheduleAppointmentRequest,
    SchedulingError, UpdateAppointmentRequest,
};
use crate::AppointmentState;

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match &err {
            SchedulingError::DoctorUnavailable { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::ScheduleConflict { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            SchedulingError::NotFound => AppError::NotFound(err.to_string()),
            SchedulingError::InvalidInterval(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

/// Facility scope supplied by the caller; `None` means an unscoped
/// (internal) caller.
#[derive(Debug, Deserialize)]
pub struct ScopeParams {
    pub facility_id: Option<Uuid>,
}

// ==============================================================================
// APPOINTMENT LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentState>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.create_appointment(request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Query(scope): Query<ScopeParams>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .get_appointment(appointment_id, scope.facility_id)
        .await?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Query(scope): Query<ScopeParams>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .update_appointment(appointment_id, request, scope.facility_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Query(scope): Query<ScopeParams>,
    Json(request): Json<ConfirmAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .confirm_appointment(appointment_id, request, scope.facility_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Query(scope): Query<ScopeParams>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .cancel_appointment(appointment_id, request, scope.facility_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<Uuid>,
    Query(scope): Query<ScopeParams>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .reschedule_appointment(appointment_id, request, scope.facility_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// READ-SIDE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.search_appointments(&query).await;

    Ok(Json(json!({
        "count": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppointmentState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let slot_minutes = state
        .slots
        .resolve_slot_duration(query.appointment_type, query.duration_minutes)?;
    let slots = state
        .slots
        .generate_slots(query.doctor_id, query.date, slot_minutes)
        .await;

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "date": query.date,
        "slot_duration_minutes": slot_minutes,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<Arc<AppointmentState>>,
    Query(scope): Query<ScopeParams>,
) -> Result<Json<Value>, AppError> {
    let stats = state.stats.get_stats(scope.facility_id).await;

    Ok(Json(json!({ "stats": stats })))
}
