//! Migration to create the schedule_events ledger table
//!
//! Append-only: rows are written once by the activation pipeline and never
//! mutated afterwards except the paid flag. The unique
//! (contract_id, kind, sequence) index is the idempotency backstop against
//! a retried activation appending a second full schedule.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduleEvents::Table)
                    .if_not_exists()
                    .col(pk_auto(ScheduleEvents::Id))
                    .col(integer(ScheduleEvents::ContractId))
                    .col(integer(ScheduleEvents::Sequence))
                    .col(string(ScheduleEvents::Beneficiary))
                    .col(uuid(ScheduleEvents::BeneficiaryId))
                    .col(date(ScheduleEvents::EventDate))
                    .col(decimal_len(ScheduleEvents::Amount, 18, 2))
                    .col(string(ScheduleEvents::Kind))
                    .col(boolean(ScheduleEvents::Paid).default(false))
                    .col(string(ScheduleEvents::Label))
                    .col(timestamp_with_time_zone(ScheduleEvents::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Unique per contract: a schedule can only be written once
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_events_contract_kind_seq")
                    .table(ScheduleEvents::Table)
                    .col(ScheduleEvents::ContractId)
                    .col(ScheduleEvents::Kind)
                    .col(ScheduleEvents::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index for calendar queries by date
        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_events_event_date")
                    .table(ScheduleEvents::Table)
                    .col(ScheduleEvents::EventDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduleEvents {
    Table,
    Id,
    ContractId,
    Sequence,
    Beneficiary,
    BeneficiaryId,
    EventDate,
    Amount,
    Kind,
    Paid,
    Label,
    CreatedAt,
}
