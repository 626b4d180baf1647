//! Contract status and approval-step enums plus response models
//!
//! Status progresses: draft → pending → {active, rejected}
//! Active contracts may later move to cancelled/completed, driven by
//! contract-management screens outside the approval core.

use serde::{Deserialize, Serialize};

use crate::entities::contracts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Pending,
    Active,
    Rejected,
    Cancelled,
    Completed,
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "draft"),
            ContractStatus::Pending => write!(f, "pending"),
            ContractStatus::Active => write!(f, "active"),
            ContractStatus::Rejected => write!(f, "rejected"),
            ContractStatus::Cancelled => write!(f, "cancelled"),
            ContractStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ContractStatus::Draft),
            "pending" => Ok(ContractStatus::Pending),
            "active" => Ok(ContractStatus::Active),
            "rejected" => Ok(ContractStatus::Rejected),
            "cancelled" => Ok(ContractStatus::Cancelled),
            "completed" => Ok(ContractStatus::Completed),
            _ => Err(format!("Unknown contract status: {}", s)),
        }
    }
}

impl ContractStatus {
    /// Statuses from which finalize (approve or reject) is still allowed
    pub fn is_finalizable(&self) -> bool {
        matches!(self, ContractStatus::Draft | ContractStatus::Pending)
    }
}

/// The three independent verification steps of the approval process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStep {
    /// Proof-of-payment check
    Proof,
    /// Investor profile / KYC check
    Profile,
    /// Contract signature check
    Signature,
}

impl std::fmt::Display for ApprovalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStep::Proof => write!(f, "proof"),
            ApprovalStep::Profile => write!(f, "profile"),
            ApprovalStep::Signature => write!(f, "signature"),
        }
    }
}

impl std::str::FromStr for ApprovalStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proof" => Ok(ApprovalStep::Proof),
            "profile" => Ok(ApprovalStep::Profile),
            "signature" => Ok(ApprovalStep::Signature),
            _ => Err(format!("Unknown approval step: {}", s)),
        }
    }
}

impl ApprovalStep {
    /// Human-readable name used in notification texts
    pub fn describe(&self) -> &'static str {
        match self {
            ApprovalStep::Proof => "proof of payment",
            ApprovalStep::Profile => "investor profile",
            ApprovalStep::Signature => "contract signature",
        }
    }
}

/// Outcome of a single verification step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Pending => write!(f, "pending"),
            StepOutcome::Approved => write!(f, "approved"),
            StepOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for StepOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(StepOutcome::Pending),
            "approved" => Ok(StepOutcome::Approved),
            "rejected" => Ok(StepOutcome::Rejected),
            _ => Err(format!("Unknown step outcome: {}", s)),
        }
    }
}

/// Derived view over a contract's three step outcomes plus the overall
/// decision. Not persisted separately: computed from contract columns.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalProcess {
    pub proof: StepOutcome,
    pub profile: StepOutcome,
    pub signature: StepOutcome,
    pub decided_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub note: Option<String>,
}

impl ApprovalProcess {
    pub fn from_contract(contract: &contracts::Model) -> Self {
        let parse = |s: &str| s.parse().unwrap_or(StepOutcome::Pending);
        Self {
            proof: parse(&contract.proof_status),
            profile: parse(&contract.profile_status),
            signature: parse(&contract.signature_status),
            decided_at: contract.approval_decided_at,
            note: contract.approval_note.clone(),
        }
    }

    pub fn all_steps_approved(&self) -> bool {
        self.proof == StepOutcome::Approved
            && self.profile == StepOutcome::Approved
            && self.signature == StepOutcome::Approved
    }
}

/// Contract detail payload: the row plus its derived approval view
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    #[serde(flatten)]
    pub contract: contracts::Model,
    pub approval: ApprovalProcess,
}

impl ContractResponse {
    pub fn new(contract: contracts::Model) -> Self {
        let approval = ApprovalProcess::from_contract(&contract);
        Self { contract, approval }
    }
}
