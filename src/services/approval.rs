//! Approval step tracker
//!
//! Records the approve/reject outcome of the three independent verification
//! steps (proof of payment, investor profile, contract signature). Steps
//! are independent flags, not a chained state machine: no step blocks
//! another, and none of them changes the overall contract status.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

use crate::entities::{contracts, prelude::Contracts};
use crate::models::contract::{ApprovalStep, ContractStatus, StepOutcome};
use crate::services::notifier;

#[derive(Debug)]
pub enum StepUpdateError {
    ContractNotFound(i32),
    /// A step can be approved or rejected, never reset to pending
    InvalidOutcome(String),
    /// Steps are frozen once the contract leaves the pre-activation statuses
    ContractFrozen(String),
    Database(String),
}

impl std::fmt::Display for StepUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepUpdateError::ContractNotFound(id) => write!(f, "Contract {} not found", id),
            StepUpdateError::InvalidOutcome(msg) => write!(f, "Invalid outcome: {}", msg),
            StepUpdateError::ContractFrozen(msg) => write!(f, "Contract frozen: {}", msg),
            StepUpdateError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StepUpdateError {}

/// Persist the outcome of one verification step.
///
/// Touches only the named step column (and its reason); on rejection the
/// contract's consultant is notified with the failed step and reason.
pub async fn set_step_outcome(
    db: &DatabaseConnection,
    contract_id: i32,
    step: ApprovalStep,
    outcome: StepOutcome,
    reason: Option<String>,
) -> Result<contracts::Model, StepUpdateError> {
    if outcome == StepOutcome::Pending {
        return Err(StepUpdateError::InvalidOutcome(
            "a step outcome must be approved or rejected".to_string(),
        ));
    }

    let contract = Contracts::find_by_id(contract_id)
        .one(db)
        .await
        .map_err(|e| StepUpdateError::Database(e.to_string()))?
        .ok_or(StepUpdateError::ContractNotFound(contract_id))?;

    let status: ContractStatus = contract
        .status
        .parse()
        .map_err(StepUpdateError::Database)?;
    if !status.is_finalizable() {
        return Err(StepUpdateError::ContractFrozen(format!(
            "contract {} is {}, approval steps can no longer change",
            contract_id, status
        )));
    }

    let consultant_id = contract.consultant_id;
    let mut active = contract.into_active_model();
    match step {
        ApprovalStep::Proof => {
            active.proof_status = Set(outcome.to_string());
            active.proof_reason = Set(reason.clone());
        }
        ApprovalStep::Profile => {
            active.profile_status = Set(outcome.to_string());
            active.profile_reason = Set(reason.clone());
        }
        ApprovalStep::Signature => {
            active.signature_status = Set(outcome.to_string());
            active.signature_reason = Set(reason.clone());
        }
    }
    active.updated_at = Set(Some(Utc::now().fixed_offset()));

    let updated = active
        .update(db)
        .await
        .map_err(|e| StepUpdateError::Database(e.to_string()))?;

    tracing::info!(
        contract_id,
        step = %step,
        outcome = %outcome,
        "Approval step updated"
    );

    if outcome == StepOutcome::Rejected {
        let body = match reason {
            Some(reason) => format!(
                "The {} check for contract #{} was rejected: {}",
                step.describe(),
                contract_id,
                reason
            ),
            None => format!(
                "The {} check for contract #{} was rejected.",
                step.describe(),
                contract_id
            ),
        };
        notifier::notify(db, consultant_id, "Approval step rejected", &body).await;
    }

    Ok(updated)
}
