//! Migration to create the contracts table
//!
//! Holds the investment terms, the three independent approval step
//! outcomes, and the overall activation decision metadata.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(pk_auto(Contracts::Id))
                    .col(uuid(Contracts::ClientId))
                    .col(uuid(Contracts::ConsultantId))
                    .col(uuid_null(Contracts::LeaderId))
                    .col(decimal_len(Contracts::Principal, 18, 2))
                    .col(decimal_len(Contracts::MonthlyRate, 8, 4))
                    .col(integer(Contracts::TermMonths))
                    .col(date(Contracts::StartDate))
                    .col(date_null(Contracts::EffectiveStartDate))
                    .col(date_null(Contracts::EndDate))
                    .col(string(Contracts::Status).default("draft"))
                    .col(string(Contracts::ProofStatus).default("pending"))
                    .col(string_null(Contracts::ProofReason))
                    .col(string(Contracts::ProfileStatus).default("pending"))
                    .col(string_null(Contracts::ProfileReason))
                    .col(string(Contracts::SignatureStatus).default("pending"))
                    .col(string_null(Contracts::SignatureReason))
                    .col(string_null(Contracts::ApprovalNote))
                    .col(timestamp_with_time_zone_null(Contracts::ApprovalDecidedAt))
                    .col(timestamp_with_time_zone(Contracts::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Contracts::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Index for the approval queue (pending contracts per consultant)
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .col(Contracts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_consultant")
                    .table(Contracts::Table)
                    .col(Contracts::ConsultantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    ClientId,
    ConsultantId,
    LeaderId,
    Principal,
    MonthlyRate,
    TermMonths,
    StartDate,
    EffectiveStartDate,
    EndDate,
    Status,
    ProofStatus,
    ProofReason,
    ProfileStatus,
    ProfileReason,
    SignatureStatus,
    SignatureReason,
    ApprovalNote,
    ApprovalDecidedAt,
    CreatedAt,
    UpdatedAt,
}
