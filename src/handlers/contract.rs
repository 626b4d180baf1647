//! Contract detail and ledger read endpoints, plus the paid-flag flip —
//! the only mutation a schedule event ever receives.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};

use crate::entities::{prelude::*, schedule_events};
use crate::models::contract::ContractResponse;
use crate::models::ErrorResponse;
use crate::AppState;

pub async fn get_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<i32>,
) -> Result<Json<ContractResponse>, (StatusCode, Json<ErrorResponse>)> {
    let contract = Contracts::find_by_id(contract_id)
        .one(state.db.as_ref())
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(format!("Contract {} not found", contract_id)))?;

    Ok(Json(ContractResponse::new(contract)))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    Path(contract_id): Path<i32>,
) -> Result<Json<Vec<schedule_events::Model>>, (StatusCode, Json<ErrorResponse>)> {
    let events = ScheduleEvents::find()
        .filter(schedule_events::Column::ContractId.eq(contract_id))
        .order_by_asc(schedule_events::Column::Sequence)
        .all(state.db.as_ref())
        .await
        .map_err(db_error)?;

    Ok(Json(events))
}

pub async fn mark_event_paid(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Json<schedule_events::Model>, (StatusCode, Json<ErrorResponse>)> {
    let event = ScheduleEvents::find_by_id(event_id)
        .one(state.db.as_ref())
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(format!("Schedule event {} not found", event_id)))?;

    let mut active = event.into_active_model();
    active.paid = Set(true);
    let updated = active.update(state.db.as_ref()).await.map_err(db_error)?;

    tracing::info!(
        event_id,
        contract_id = updated.contract_id,
        "Schedule event marked paid"
    );

    Ok(Json(updated))
}

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn not_found(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
}
