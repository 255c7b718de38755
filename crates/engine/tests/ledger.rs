use chrono::{Duration, Timelike, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    DeferredPaymentCmd, DeferredStatus, DepositCmd, Engine, EngineError, EntryKind,
    RecordTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn funded_engine(amount_minor: i64) -> (Engine, DatabaseConnection) {
    let (engine, db) = engine_with_db().await;
    engine
        .deposit_admin_funds(DepositCmd::new(
            "alice",
            amount_minor,
            Utc::now() - Duration::hours(3),
        ))
        .await
        .unwrap();
    (engine, db)
}

fn income_cmd(project_id: uuid::Uuid, amount_minor: i64) -> RecordTransactionCmd {
    RecordTransactionCmd::new(
        TransactionKind::Income,
        project_id,
        "alice",
        amount_minor,
        "funding allocation",
        Utc::now() - Duration::hours(2),
    )
}

fn expense_cmd(project_id: uuid::Uuid, amount_minor: i64) -> RecordTransactionCmd {
    RecordTransactionCmd::new(
        TransactionKind::Expense,
        project_id,
        "alice",
        amount_minor,
        "site expenses",
        Utc::now() - Duration::hours(1),
    )
}

#[tokio::test]
async fn deposit_income_expense_delete_scenario() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();

    let income = engine
        .record_transaction(income_cmd(project.id, 200_000))
        .await
        .unwrap();
    assert_eq!(income.balances.admin_balance, 800_000);
    assert_eq!(income.balances.project.balance, 200_000);
    assert_eq!(income.balances.project.total_income, 200_000);

    let expense = engine
        .record_transaction(expense_cmd(project.id, 50_000))
        .await
        .unwrap();
    assert_eq!(expense.balances.project.balance, 150_000);
    assert_eq!(expense.balances.project.total_expenses, 50_000);
    assert_eq!(expense.balances.admin_balance, 800_000);

    engine
        .delete_transaction(expense.transaction.id)
        .await
        .unwrap();

    let project = engine.project(project.id).await.unwrap();
    assert_eq!(project.balance, 200_000);
    assert_eq!(project.total_expenses, 0);
    assert_eq!(engine.admin_balance().await.unwrap(), 800_000);

    // The expense's ledger entry went away with it.
    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.grand_total, 0);
    assert_eq!(summary.classified.count + summary.general_expense.count, 0);
}

#[tokio::test]
async fn income_rejected_when_pool_short() {
    let (engine, _db) = funded_engine(100).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();

    let err = engine
        .record_transaction(income_cmd(project.id, 200))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // A rejected transaction leaves nothing behind.
    assert_eq!(engine.admin_balance().await.unwrap(), 100);
    let project = engine.project(project.id).await.unwrap();
    assert_eq!(project.balance, 0);
    assert_eq!(engine.list_transactions(None, 10).await.unwrap().len(), 1); // the deposit
}

#[tokio::test]
async fn expense_rejected_beyond_project_balance() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine
        .record_transaction(income_cmd(project.id, 10_000))
        .await
        .unwrap();

    let err = engine
        .record_transaction(expense_cmd(project.id, 10_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientProjectBalance(_)));

    let project = engine.project(project.id).await.unwrap();
    assert_eq!(project.balance, 10_000);
    assert_eq!(project.total_expenses, 0);
    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.grand_total, 0);
}

#[tokio::test]
async fn conservation_across_applies_and_deletes() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project_a = engine.create_project("Project A", "alice").await.unwrap();
    let project_b = engine.create_project("Project B", "alice").await.unwrap();

    engine
        .record_transaction(income_cmd(project_a.id, 300_000))
        .await
        .unwrap();
    engine
        .record_transaction(income_cmd(project_b.id, 200_000))
        .await
        .unwrap();

    // Internal transfers never change the total held across the system.
    let total = engine.admin_balance().await.unwrap()
        + engine.project(project_a.id).await.unwrap().balance
        + engine.project(project_b.id).await.unwrap().balance;
    assert_eq!(total, 1_000_000);

    let expense = engine
        .record_transaction(expense_cmd(project_a.id, 100_000))
        .await
        .unwrap();
    let total = engine.admin_balance().await.unwrap()
        + engine.project(project_a.id).await.unwrap().balance
        + engine.project(project_b.id).await.unwrap().balance;
    assert_eq!(total, 900_000);

    engine
        .delete_transaction(expense.transaction.id)
        .await
        .unwrap();
    let total = engine.admin_balance().await.unwrap()
        + engine.project(project_a.id).await.unwrap().balance
        + engine.project(project_b.id).await.unwrap().balance;
    assert_eq!(total, 1_000_000);
}

#[tokio::test]
async fn delete_income_already_spent_is_refused() {
    let (engine, _db) = funded_engine(1_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    let income = engine
        .record_transaction(income_cmd(project.id, 500))
        .await
        .unwrap();
    engine
        .record_transaction(expense_cmd(project.id, 400))
        .await
        .unwrap();

    let err = engine
        .delete_transaction(income.transaction.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientProjectBalance(_)));

    // The refused reversal left both balances alone.
    assert_eq!(engine.admin_balance().await.unwrap(), 500);
    assert_eq!(engine.project(project.id).await.unwrap().balance, 100);
}

#[tokio::test]
async fn idempotency_key_replays_single_transaction() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();

    let cmd = income_cmd(project.id, 200_000).idempotency_key("form-submit-42");
    let first = engine.record_transaction(cmd.clone()).await.unwrap();
    let second = engine.record_transaction(cmd).await.unwrap();

    assert_eq!(first.transaction.id, second.transaction.id);
    assert_eq!(second.balances.admin_balance, 800_000);
    assert_eq!(second.balances.project.balance, 200_000);
    assert_eq!(engine.list_transactions(Some(project.id), 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn expense_classification_and_summary_identity() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine
        .record_transaction(income_cmd(project.id, 500_000))
        .await
        .unwrap();
    engine
        .create_expense_type("رواتب", Some("الرواتب الشهرية"))
        .await
        .unwrap();

    engine
        .record_transaction(expense_cmd(project.id, 50_000).expense_type("رواتب"))
        .await
        .unwrap();
    engine
        .record_transaction(expense_cmd(project.id, 20_000).expense_type("مصروف عام"))
        .await
        .unwrap();

    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.classified.count, 1);
    assert_eq!(summary.classified.total, 50_000);
    assert_eq!(summary.general_expense.count, 1);
    assert_eq!(summary.general_expense.total, 20_000);
    assert_eq!(
        summary.grand_total,
        summary.classified.total + summary.general_expense.total
    );
    assert!(summary.classified.entries[0].expense_type_id.is_some());
    assert_eq!(
        summary.general_expense.entries[0].kind,
        EntryKind::GeneralExpense
    );
}

#[tokio::test]
async fn reclassify_flips_general_to_classified() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine
        .record_transaction(income_cmd(project.id, 500_000))
        .await
        .unwrap();

    // Whole-second timestamp so the equality below survives storage.
    let occurred_at = Utc::now().with_nanosecond(0).unwrap() - Duration::hours(1);
    engine
        .record_transaction(
            RecordTransactionCmd::new(
                TransactionKind::Expense,
                project.id,
                "alice",
                50_000,
                "site expenses",
                occurred_at,
            )
            .expense_type("مصروف عام"),
        )
        .await
        .unwrap();

    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.general_expense.count, 1);

    // Activating a matching type and re-running moves the same entry over.
    engine.create_expense_type("مصروف عام", None).await.unwrap();
    assert_eq!(engine.reclassify_transactions().await.unwrap(), 1);

    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.classified.count, 1);
    assert_eq!(summary.general_expense.count, 0);
    let entry = &summary.classified.entries[0];
    assert_eq!(entry.amount_minor, 50_000);
    assert_eq!(entry.occurred_at, occurred_at);
    assert_eq!(entry.project_id, Some(project.id));

    // A second pass has nothing left to change.
    assert_eq!(engine.reclassify_transactions().await.unwrap(), 0);
}

#[tokio::test]
async fn deferred_payment_lifecycle_and_idempotent_transfer() {
    let (engine, _db) = engine_with_db().await;

    let payment = engine
        .create_deferred_payment(DeferredPaymentCmd::new("مقاول الكهرباء", "alice", 5_000))
        .await
        .unwrap();
    assert_eq!(payment.status, DeferredStatus::Pending);

    let paid_at = Utc::now() - Duration::days(2);
    let payment = engine
        .pay_installment(payment.id, 3_000, paid_at)
        .await
        .unwrap();
    assert_eq!(payment.paid_amount_minor, 3_000);
    assert_eq!(payment.remaining_amount_minor, 2_000);
    assert_eq!(payment.status, DeferredStatus::Pending);

    let payment = engine
        .pay_installment(payment.id, 2_000, paid_at + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(payment.remaining_amount_minor, 0);
    assert_eq!(payment.status, DeferredStatus::Completed);

    let err = engine
        .pay_installment(payment.id, 1, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // Paying installments never touched the ledger.
    assert_eq!(engine.ledger_summary().await.unwrap().grand_total, 0);

    let (_, installments) = engine.deferred_payment(payment.id).await.unwrap();
    let ids: Vec<_> = installments.iter().map(|event| event.id).collect();
    assert_eq!(ids.len(), 2);

    // Transferring twice produces exactly one entry per installment.
    assert_eq!(engine.transfer_receivables(&ids).await.unwrap(), 2);
    assert_eq!(engine.transfer_receivables(&ids).await.unwrap(), 0);

    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(summary.general_expense.count, 2);
    assert_eq!(summary.grand_total, 5_000);

    let (_, installments) = engine.deferred_payment(payment.id).await.unwrap();
    assert!(installments.iter().all(|event| event.transferred));
}

#[tokio::test]
async fn transfer_by_beneficiary_and_statement_fold() {
    let (engine, _db) = engine_with_db().await;

    let payment = engine
        .create_deferred_payment(DeferredPaymentCmd::new("مقاول الكهرباء", "alice", 5_000))
        .await
        .unwrap();
    let first_paid_at = Utc::now() - Duration::days(3);
    engine
        .pay_installment(payment.id, 3_000, first_paid_at)
        .await
        .unwrap();
    engine
        .pay_installment(payment.id, 2_000, first_paid_at + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(
        engine
            .transfer_beneficiary_receivables("مقاول الكهرباء")
            .await
            .unwrap(),
        2
    );
    // Retrying the beneficiary transfer is a no-op.
    assert_eq!(
        engine
            .transfer_beneficiary_receivables("مقاول الكهرباء")
            .await
            .unwrap(),
        0
    );

    let lines = engine
        .beneficiary_statement("مقاول الكهرباء")
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].entry.amount_minor, 3_000);
    assert_eq!(lines[0].running_balance, 3_000);
    assert_eq!(lines[1].entry.amount_minor, 2_000);
    assert_eq!(lines[1].running_balance, 5_000);
    assert!(lines.iter().all(|line| line.entry.kind == EntryKind::Deferred));
}

#[tokio::test]
async fn transfer_unknown_installment_fails_whole_batch() {
    let (engine, _db) = engine_with_db().await;

    let payment = engine
        .create_deferred_payment(DeferredPaymentCmd::new("مورد الحديد", "alice", 1_000))
        .await
        .unwrap();
    engine
        .pay_installment(payment.id, 1_000, Utc::now())
        .await
        .unwrap();
    let (_, installments) = engine.deferred_payment(payment.id).await.unwrap();

    let err = engine
        .transfer_receivables(&[installments[0].id, uuid::Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // All-or-nothing: the valid installment was not transferred either.
    assert_eq!(engine.ledger_summary().await.unwrap().grand_total, 0);
    let (_, installments) = engine.deferred_payment(payment.id).await.unwrap();
    assert!(!installments[0].transferred);
}

#[tokio::test]
async fn reconciliation_identity_with_deferred_installments() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine
        .record_transaction(income_cmd(project.id, 500_000))
        .await
        .unwrap();
    engine.create_expense_type("رواتب", None).await.unwrap();

    engine
        .record_transaction(expense_cmd(project.id, 50_000).expense_type("رواتب"))
        .await
        .unwrap();
    engine
        .record_transaction(expense_cmd(project.id, 20_000))
        .await
        .unwrap();

    let payment = engine
        .create_deferred_payment(DeferredPaymentCmd::new("مقاول الكهرباء", "alice", 5_000))
        .await
        .unwrap();
    engine
        .pay_installment(payment.id, 3_000, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    engine
        .pay_installment(payment.id, 2_000, Utc::now())
        .await
        .unwrap();
    engine
        .transfer_beneficiary_receivables("مقاول الكهرباء")
        .await
        .unwrap();

    let summary = engine.ledger_summary().await.unwrap();
    assert_eq!(
        summary.grand_total,
        summary.classified.total + summary.general_expense.total
    );
    // grand total == expense transactions + transferred installments
    assert_eq!(summary.grand_total, 50_000 + 20_000 + 5_000);
}

#[tokio::test]
async fn archived_project_refuses_new_transactions() {
    let (engine, _db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine.archive_project(project.id).await.unwrap();

    let err = engine
        .record_transaction(income_cmd(project.id, 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidProject(_)));

    assert!(engine.list_projects(false).await.unwrap().is_empty());
    assert_eq!(engine.list_projects(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_project_name_rejected_across_presentation_forms() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_project("مشروع  التوسعة", "alice")
        .await
        .unwrap();

    let err = engine
        .create_project("مشروع التوسعة", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateName(_)));
}

#[tokio::test]
async fn recompute_restores_tampered_aggregates() {
    let (engine, db) = funded_engine(1_000_000).await;
    let project = engine.create_project("Project A", "alice").await.unwrap();
    engine
        .record_transaction(income_cmd(project.id, 200_000))
        .await
        .unwrap();
    engine
        .record_transaction(expense_cmd(project.id, 50_000))
        .await
        .unwrap();

    // Corrupt the cached aggregates behind the engine's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE projects SET balance = 999999, total_income = 1 WHERE id = ?",
        vec![project.id.to_string().into()],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE admin_funds SET balance = 0",
        Vec::<sea_orm::Value>::new(),
    ))
    .await
    .unwrap();

    engine.recompute_balances().await.unwrap();

    assert_eq!(engine.admin_balance().await.unwrap(), 800_000);
    let project = engine.project(project.id).await.unwrap();
    assert_eq!(project.balance, 150_000);
    assert_eq!(project.total_income, 200_000);
    assert_eq!(project.total_expenses, 50_000);
}
