//! Ledger persister: durably stores a generated schedule as append-only rows
//!
//! Runs on the activation transaction so the contract's status flip and its
//! schedule land together or not at all. The pre-check plus the unique
//! (contract_id, kind, sequence) index guarantee a schedule is written at
//! most once per contract.

use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::{contracts, schedule_events};
use crate::models::schedule::Beneficiary;
use crate::services::schedule_generator::ScheduleEventDraft;

#[derive(Debug)]
pub enum LedgerError {
    /// A schedule already exists for this contract
    AlreadyPersisted(i32),
    /// The batch insert failed; the surrounding transaction must roll back
    Write(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::AlreadyPersisted(id) => {
                write!(f, "Ledger already written for contract {}", id)
            }
            LedgerError::Write(msg) => write!(f, "Ledger write error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Resolve the party a draft pays out to
fn beneficiary_id(
    contract: &contracts::Model,
    beneficiary: Beneficiary,
) -> Result<Uuid, LedgerError> {
    match beneficiary {
        Beneficiary::Client => Ok(contract.client_id),
        Beneficiary::Consultant => Ok(contract.consultant_id),
        Beneficiary::Leader => contract.leader_id.ok_or_else(|| {
            LedgerError::Write(format!(
                "Leader event generated for contract {} without a leader",
                contract.id
            ))
        }),
    }
}

/// Write all drafts for a contract as one atomic batch.
///
/// Returns the number of rows written, used for logging and confirmation.
pub async fn persist(
    txn: &DatabaseTransaction,
    contract: &contracts::Model,
    drafts: &[ScheduleEventDraft],
) -> Result<u64, LedgerError> {
    let existing = schedule_events::Entity::find()
        .filter(schedule_events::Column::ContractId.eq(contract.id))
        .count(txn)
        .await
        .map_err(|e| LedgerError::Write(format!("Pre-check failed: {}", e)))?;

    if existing > 0 {
        return Err(LedgerError::AlreadyPersisted(contract.id));
    }

    let rows: Vec<schedule_events::ActiveModel> = drafts
        .iter()
        .map(|draft| {
            Ok(schedule_events::ActiveModel {
                contract_id: Set(contract.id),
                sequence: Set(draft.sequence),
                beneficiary: Set(draft.beneficiary.to_string()),
                beneficiary_id: Set(beneficiary_id(contract, draft.beneficiary)?),
                event_date: Set(draft.event_date),
                amount: Set(draft.amount),
                kind: Set(draft.kind.to_string()),
                paid: Set(false),
                label: Set(draft.label.clone()),
                ..Default::default()
            })
        })
        .collect::<Result<_, LedgerError>>()?;

    schedule_events::Entity::insert_many(rows)
        .exec(txn)
        .await
        .map_err(|e| LedgerError::Write(e.to_string()))?;

    tracing::info!(
        contract_id = contract.id,
        events = drafts.len(),
        "Ledger written"
    );

    Ok(drafts.len() as u64)
}
