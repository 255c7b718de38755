//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Mizan:
//!
//! - `users`: authentication
//! - `projects`: budget containers with denormalized balances
//! - `admin_funds`: the undistributed admin pool (single row, seeded here)
//! - `expense_types`: classification definitions
//! - `transactions`: financial operations with metadata
//! - `ledger_entries`: one posted entry per money-movement event
//! - `deferred_payments`: beneficiary installment plans
//! - `installments`: individual installment events with transfer state

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    NameNorm,
    Balance,
    TotalIncome,
    TotalExpenses,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum AdminFunds {
    Table,
    Id,
    Balance,
}

#[derive(Iden)]
enum ExpenseTypes {
    Table,
    Id,
    Name,
    NameNorm,
    Description,
    IsActive,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Kind,
    OccurredAt,
    Description,
    AmountMinor,
    ProjectId,
    ExpenseTypeLabel,
    CreatedBy,
    CreatedAt,
    IdempotencyKey,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    OccurredAt,
    SourceEventId,
    TransactionId,
    ExpenseTypeId,
    ProjectId,
    Beneficiary,
    AmountMinor,
    Description,
    Kind,
}

#[derive(Iden)]
enum DeferredPayments {
    Table,
    Id,
    BeneficiaryName,
    TotalAmountMinor,
    PaidAmountMinor,
    RemainingAmountMinor,
    Status,
    ProjectId,
    DueDate,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Installments {
    Table,
    Id,
    DeferredPaymentId,
    AmountMinor,
    PaidAt,
    Transferred,
    TransferredAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("accountant"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Projects
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::NameNorm).string().not_null())
                    .col(ColumnDef::new(Projects::Balance).big_integer().not_null())
                    .col(
                        ColumnDef::new(Projects::TotalIncome)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::TotalExpenses)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-projects-name_norm-unique")
                    .table(Projects::Table)
                    .col(Projects::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Admin funds (singleton pool row)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AdminFunds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminFunds::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminFunds::Balance)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        let seed_pool = Query::insert()
            .into_table(AdminFunds::Table)
            .columns([AdminFunds::Id, AdminFunds::Balance])
            .values_panic([1.into(), 0i64.into()])
            .to_owned();
        manager.exec_stmt(seed_pool).await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense types
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseTypes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseTypes::Name).string().not_null())
                    .col(ColumnDef::new(ExpenseTypes::NameNorm).string().not_null())
                    .col(ColumnDef::new(ExpenseTypes::Description).string())
                    .col(
                        ColumnDef::new(ExpenseTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_types-name_norm-unique")
                    .table(ExpenseTypes::Table)
                    .col(ExpenseTypes::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ProjectId).string())
                    .col(ColumnDef::new(Transactions::ExpenseTypeLabel).string())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::IdempotencyKey).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-project_id")
                            .from(Transactions::Table, Transactions::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-project_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::ProjectId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-idempotency_key")
                    .table(Transactions::Table)
                    .col(Transactions::CreatedBy)
                    .col(Transactions::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::SourceEventId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::TransactionId).string())
                    .col(ColumnDef::new(LedgerEntries::ExpenseTypeId).string())
                    .col(ColumnDef::new(LedgerEntries::ProjectId).string())
                    .col(ColumnDef::new(LedgerEntries::Beneficiary).string())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .to_owned(),
            )
            .await?;

        // One entry per source event; this is the store-level idempotency
        // guard for classification and transfer.
        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-source_event_id-unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::SourceEventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-kind-beneficiary")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Kind)
                    .col(LedgerEntries::Beneficiary)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Deferred payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DeferredPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeferredPayments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::BeneficiaryName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::PaidAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::RemainingAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(DeferredPayments::ProjectId).string())
                    .col(ColumnDef::new(DeferredPayments::DueDate).timestamp())
                    .col(
                        ColumnDef::new(DeferredPayments::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredPayments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-deferred_payments-project_id")
                            .from(DeferredPayments::Table, DeferredPayments::ProjectId)
                            .to(Projects::Table, Projects::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deferred_payments-beneficiary_name")
                    .table(DeferredPayments::Table)
                    .col(DeferredPayments::BeneficiaryName)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Installments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Installments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Installments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Installments::DeferredPaymentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Installments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Installments::PaidAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Installments::Transferred)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Installments::TransferredAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-installments-deferred_payment_id")
                            .from(Installments::Table, Installments::DeferredPaymentId)
                            .to(DeferredPayments::Table, DeferredPayments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-installments-deferred_payment_id")
                    .table(Installments::Table)
                    .col(Installments::DeferredPaymentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-installments-transferred")
                    .table(Installments::Table)
                    .col(Installments::Transferred)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Installments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeferredPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminFunds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
