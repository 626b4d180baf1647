//! Contract activator
//!
//! Turns a finalize decision into the contract's terminal approval state.
//! Approval computes the effective start/end dates, runs the pure schedule
//! generator, and writes the status flip and the full ledger inside one
//! database transaction: a contract is never left active without its
//! schedule. Rejection is terminal and writes no ledger rows.
//!
//! Double-activation guards, layered:
//! - per-contract in-process mutex serializes concurrent finalize calls
//! - the status transition is a conditional update (draft/pending only),
//!   checked by rows_affected
//! - the ledger pre-check and the unique (contract_id, kind, sequence)
//!   index reject a second schedule outright

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tokio::sync::Mutex;

use crate::entities::{contracts, prelude::Contracts};
use crate::models::contract::{ApprovalProcess, ContractStatus};
use crate::services::ledger::{self, LedgerError};
use crate::services::notifier;
use crate::services::schedule_generator::{
    self, compute_end_date, ContractTerms, ScheduleError,
};

/// Whether the three verification steps gate activation.
///
/// Some operators want a strict pipeline, others keep a manual override
/// for administrators, so the gate is explicit configuration rather than
/// hardcoded either way. Rejection is never gated.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalPolicy {
    pub require_all_steps_approved: bool,
}

impl ApprovalPolicy {
    /// Read from REQUIRE_ALL_STEPS_APPROVED; defaults to true
    pub fn from_env() -> Self {
        let require = env::var("REQUIRE_ALL_STEPS_APPROVED")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);
        Self {
            require_all_steps_approved: require,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeDecision {
    Approve,
    Reject,
}

#[derive(Debug)]
pub enum ActivationError {
    ContractNotFound(i32),
    /// Contract row is unreadable or violates its own invariants
    InvalidContractState(String),
    /// Policy gate: not all verification steps are approved
    StepsNotApproved(i32),
    /// The contract already left the finalizable statuses
    AlreadyFinalized(String),
    Schedule(ScheduleError),
    LedgerWrite(String),
    Database(String),
}

impl std::fmt::Display for ActivationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationError::ContractNotFound(id) => write!(f, "Contract {} not found", id),
            ActivationError::InvalidContractState(msg) => {
                write!(f, "Invalid contract state: {}", msg)
            }
            ActivationError::StepsNotApproved(id) => write!(
                f,
                "Contract {} cannot be activated: not all approval steps are approved",
                id
            ),
            ActivationError::AlreadyFinalized(msg) => write!(f, "Already finalized: {}", msg),
            ActivationError::Schedule(e) => write!(f, "Schedule generation failed: {}", e),
            ActivationError::LedgerWrite(msg) => write!(f, "Ledger write failed: {}", msg),
            ActivationError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for ActivationError {}

impl From<LedgerError> for ActivationError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::AlreadyPersisted(id) => ActivationError::AlreadyFinalized(format!(
                "ledger already written for contract {}",
                id
            )),
            LedgerError::Write(msg) => ActivationError::LedgerWrite(msg),
        }
    }
}

#[derive(Debug)]
pub struct FinalizeOutcome {
    pub contract: contracts::Model,
    /// Present only on approval
    pub events_written: Option<u64>,
}

lazy_static::lazy_static! {
    static ref FINALIZE_LOCKS: Mutex<HashMap<i32, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

async fn contract_lock(contract_id: i32) -> Arc<Mutex<()>> {
    let mut locks = FINALIZE_LOCKS.lock().await;
    locks
        .entry(contract_id)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Drop the map entry once no other caller holds a clone of it. The map
/// mutex is held during the count check, so no new clone can appear
/// in between.
async fn release_contract_lock(contract_id: i32) {
    let mut locks = FINALIZE_LOCKS.lock().await;
    if let Some(entry) = locks.get(&contract_id) {
        if Arc::strong_count(entry) == 1 {
            locks.remove(&contract_id);
        }
    }
}

/// Finalize a contract's approval process.
pub async fn finalize(
    db: &DatabaseConnection,
    policy: ApprovalPolicy,
    contract_id: i32,
    decision: FinalizeDecision,
    activation_date: Option<NaiveDate>,
    note: Option<String>,
) -> Result<FinalizeOutcome, ActivationError> {
    let lock = contract_lock(contract_id).await;
    let result = {
        let _guard = lock.lock().await;
        finalize_locked(db, policy, contract_id, decision, activation_date, note).await
    };
    drop(lock);
    release_contract_lock(contract_id).await;
    result
}

async fn finalize_locked(
    db: &DatabaseConnection,
    policy: ApprovalPolicy,
    contract_id: i32,
    decision: FinalizeDecision,
    activation_date: Option<NaiveDate>,
    note: Option<String>,
) -> Result<FinalizeOutcome, ActivationError> {
    let contract = Contracts::find_by_id(contract_id)
        .one(db)
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?
        .ok_or(ActivationError::ContractNotFound(contract_id))?;

    let status: ContractStatus = contract
        .status
        .parse()
        .map_err(ActivationError::InvalidContractState)?;
    if !status.is_finalizable() {
        return Err(ActivationError::AlreadyFinalized(format!(
            "contract {} is {}",
            contract_id, status
        )));
    }

    match decision {
        FinalizeDecision::Approve => approve(db, policy, contract, activation_date, note).await,
        FinalizeDecision::Reject => reject(db, contract, note).await,
    }
}

async fn reject(
    db: &DatabaseConnection,
    contract: contracts::Model,
    note: Option<String>,
) -> Result<FinalizeOutcome, ActivationError> {
    let now = Utc::now().fixed_offset();
    let result = Contracts::update_many()
        .col_expr(
            contracts::Column::Status,
            Expr::value(ContractStatus::Rejected.to_string()),
        )
        .col_expr(contracts::Column::ApprovalNote, Expr::value(note.clone()))
        .col_expr(contracts::Column::ApprovalDecidedAt, Expr::value(now))
        .col_expr(contracts::Column::UpdatedAt, Expr::value(now))
        .filter(contracts::Column::Id.eq(contract.id))
        .filter(contracts::Column::Status.is_in(finalizable_statuses()))
        .exec(db)
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?;

    if result.rows_affected != 1 {
        return Err(ActivationError::AlreadyFinalized(format!(
            "contract {} was finalized concurrently",
            contract.id
        )));
    }

    tracing::info!(contract_id = contract.id, "Contract rejected");

    let body = match &note {
        Some(note) => format!("Contract #{} was rejected: {}", contract.id, note),
        None => format!("Contract #{} was rejected.", contract.id),
    };
    notifier::notify(db, contract.client_id, "Contract rejected", &body).await;
    notifier::notify(db, contract.consultant_id, "Contract rejected", &body).await;

    let refreshed = reload(db, contract.id).await?;
    Ok(FinalizeOutcome {
        contract: refreshed,
        events_written: None,
    })
}

async fn approve(
    db: &DatabaseConnection,
    policy: ApprovalPolicy,
    contract: contracts::Model,
    activation_date: Option<NaiveDate>,
    note: Option<String>,
) -> Result<FinalizeOutcome, ActivationError> {
    if policy.require_all_steps_approved
        && !ApprovalProcess::from_contract(&contract).all_steps_approved()
    {
        return Err(ActivationError::StepsNotApproved(contract.id));
    }

    let effective_start = activation_date.unwrap_or_else(|| Utc::now().date_naive());
    let terms = ContractTerms {
        principal: contract.principal,
        monthly_rate: contract.monthly_rate,
        term_months: contract.term_months,
        start_date: effective_start,
        with_consultant: true,
        with_leader: contract.leader_id.is_some(),
    };

    // Pure validation and generation before any write
    let drafts = schedule_generator::generate(&terms).map_err(ActivationError::Schedule)?;
    let end_date =
        compute_end_date(effective_start, contract.term_months).map_err(ActivationError::Schedule)?;

    let txn = db
        .begin()
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?;

    // Conditional transition: only one caller ever moves the row to active.
    // Losing callers see zero rows affected and bail before touching the
    // ledger; the uncommitted transaction rolls back on drop.
    let now = Utc::now().fixed_offset();
    let result = Contracts::update_many()
        .col_expr(
            contracts::Column::Status,
            Expr::value(ContractStatus::Active.to_string()),
        )
        .col_expr(
            contracts::Column::EffectiveStartDate,
            Expr::value(Some(effective_start)),
        )
        .col_expr(contracts::Column::EndDate, Expr::value(Some(end_date)))
        .col_expr(contracts::Column::ApprovalNote, Expr::value(note.clone()))
        .col_expr(contracts::Column::ApprovalDecidedAt, Expr::value(now))
        .col_expr(contracts::Column::UpdatedAt, Expr::value(now))
        .filter(contracts::Column::Id.eq(contract.id))
        .filter(contracts::Column::Status.is_in(finalizable_statuses()))
        .exec(&txn)
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?;

    if result.rows_affected != 1 {
        return Err(ActivationError::AlreadyFinalized(format!(
            "contract {} was finalized concurrently",
            contract.id
        )));
    }

    let events_written = ledger::persist(&txn, &contract, &drafts).await?;

    txn.commit()
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?;

    tracing::info!(
        contract_id = contract.id,
        events = events_written,
        start = %effective_start,
        end = %end_date,
        "Contract activated"
    );

    // Post-commit fan-out; delivery failures never undo the activation
    let summary = format!(
        "Contract #{} was activated on {}. {} schedule events were generated through {}.",
        contract.id, effective_start, events_written, end_date
    );
    notifier::notify(db, contract.client_id, "Contract activated", &summary).await;
    notifier::notify(db, contract.consultant_id, "Contract activated", &summary).await;
    if let Some(leader_id) = contract.leader_id {
        notifier::notify(db, leader_id, "Contract activated", &summary).await;
    }
    notifier::notify_admins(db, "Contract activated", &summary).await;

    let refreshed = reload(db, contract.id).await?;
    Ok(FinalizeOutcome {
        contract: refreshed,
        events_written: Some(events_written),
    })
}

fn finalizable_statuses() -> Vec<String> {
    vec![
        ContractStatus::Draft.to_string(),
        ContractStatus::Pending.to_string(),
    ]
}

async fn reload(
    db: &DatabaseConnection,
    contract_id: i32,
) -> Result<contracts::Model, ActivationError> {
    Contracts::find_by_id(contract_id)
        .one(db)
        .await
        .map_err(|e| ActivationError::Database(e.to_string()))?
        .ok_or(ActivationError::ContractNotFound(contract_id))
}
