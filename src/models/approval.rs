//! Request/response models for the approval endpoints

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contract::{ApprovalStep, ContractResponse, StepOutcome};

/// Body of POST /api/contracts/{id}/approval/step
#[derive(Debug, Clone, Deserialize)]
pub struct StepUpdateRequest {
    pub step: ApprovalStep,
    /// Must be approved or rejected; a step cannot be reset to pending
    pub status: StepOutcome,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of POST /api/contracts/{id}/approval/finalize
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizeRequest {
    pub approved: bool,
    /// Effective start date; defaults to today (UTC) when omitted
    #[serde(default)]
    pub activation_date: Option<NaiveDate>,
    #[serde(default)]
    pub observation: Option<String>,
}

/// Ledger write confirmation, used purely for logging/display
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub events_written: u64,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    #[serde(flatten)]
    pub contract: ContractResponse,
    /// Present only on approval; rejection writes no ledger rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger: Option<LedgerSummary>,
}
