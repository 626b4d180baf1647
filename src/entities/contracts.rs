//! SeaORM Entity for contracts
//!
//! Investment terms plus the approval pipeline state. Once status reaches
//! "active" the term fields are frozen: the ledger has already been derived
//! from them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: Uuid,
    pub consultant_id: Uuid,
    /// Optional senior party entitled to a one-time participation fee
    pub leader_id: Option<Uuid>,
    /// Invested principal, currency units
    pub principal: Decimal,
    /// Monthly yield rate as a percentage (e.g. 2.00 = 2% per month)
    pub monthly_rate: Decimal,
    pub term_months: i32,
    /// Proposed start date, replaced by effective_start_date on activation
    pub start_date: Date,
    pub effective_start_date: Option<Date>,
    /// effective_start_date + term_months, day clamped; set on activation
    pub end_date: Option<Date>,
    /// draft | pending | active | rejected | cancelled | completed
    pub status: String,
    /// Proof-of-payment verification: pending | approved | rejected
    pub proof_status: String,
    pub proof_reason: Option<String>,
    /// Investor profile / KYC verification
    pub profile_status: String,
    pub profile_reason: Option<String>,
    /// Contract signature verification
    pub signature_status: String,
    pub signature_reason: Option<String>,
    /// Free-text note recorded with the finalize decision
    pub approval_note: Option<String>,
    pub approval_decided_at: Option<DateTimeWithTimeZone>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::schedule_events::Entity")]
    ScheduleEvents,
}

impl Related<super::schedule_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
