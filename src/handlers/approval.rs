//! Approval pipeline endpoints
//!
//! POST /api/contracts/{id}/approval/step — record one verification step
//! POST /api/contracts/{id}/approval/finalize — approve or reject the
//! whole process; approval activates the contract and writes its ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::models::approval::{FinalizeRequest, FinalizeResponse, LedgerSummary, StepUpdateRequest};
use crate::models::contract::ContractResponse;
use crate::models::ErrorResponse;
use crate::services::activation::{self, ActivationError, FinalizeDecision};
use crate::services::approval::{self, StepUpdateError};
use crate::AppState;

pub async fn update_step(
    State(state): State<AppState>,
    Path(contract_id): Path<i32>,
    Json(payload): Json<StepUpdateRequest>,
) -> Result<Json<ContractResponse>, (StatusCode, Json<ErrorResponse>)> {
    let contract = approval::set_step_outcome(
        &state.db,
        contract_id,
        payload.step,
        payload.status,
        payload.reason,
    )
    .await
    .map_err(step_error)?;

    Ok(Json(ContractResponse::new(contract)))
}

pub async fn finalize(
    State(state): State<AppState>,
    Path(contract_id): Path<i32>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let decision = if payload.approved {
        FinalizeDecision::Approve
    } else {
        FinalizeDecision::Reject
    };

    let outcome = activation::finalize(
        &state.db,
        state.approval_policy,
        contract_id,
        decision,
        payload.activation_date,
        payload.observation,
    )
    .await
    .map_err(activation_error)?;

    Ok(Json(FinalizeResponse {
        contract: ContractResponse::new(outcome.contract),
        ledger: outcome
            .events_written
            .map(|events_written| LedgerSummary { events_written }),
    }))
}

fn step_error(e: StepUpdateError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        StepUpdateError::ContractNotFound(_) => StatusCode::NOT_FOUND,
        StepUpdateError::InvalidOutcome(_) => StatusCode::BAD_REQUEST,
        StepUpdateError::ContractFrozen(_) => StatusCode::CONFLICT,
        StepUpdateError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn activation_error(e: ActivationError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ActivationError::ContractNotFound(_) => StatusCode::NOT_FOUND,
        ActivationError::AlreadyFinalized(_) => StatusCode::CONFLICT,
        ActivationError::InvalidContractState(_)
        | ActivationError::StepsNotApproved(_)
        | ActivationError::Schedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ActivationError::LedgerWrite(_) | ActivationError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
