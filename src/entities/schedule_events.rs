//! SeaORM Entity for schedule_events (the financial ledger)
//!
//! Rows are written exactly once by the activation pipeline and are
//! immutable afterwards except the paid flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub contract_id: i32,
    /// Emission order within the contract's schedule
    pub sequence: i32,
    /// client | consultant | leader
    pub beneficiary: String,
    pub beneficiary_id: Uuid,
    pub event_date: Date,
    /// Always >= 0, rounded to 2 decimal places
    pub amount: Decimal,
    /// pro_rata_dividend | monthly_dividend | consultant_commission |
    /// leader_commission | capital_return
    pub kind: String,
    pub paid: bool,
    pub label: String,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contracts,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
