//! Integration tests for dailyspend-core
//!
//! These tests exercise the ledger → profile → insight workflow against a
//! JSON file store and a mock completion server.

use std::time::Duration;

use chrono::NaiveDate;
use dailyspend_core::{
    test_utils::{CompletionMode, MockCompletionServer},
    AddOutcome, Config, DuplicateReason, Error, Expense, ExpenseCategory, Income, IncomeType,
    InsightPipeline, InsightSource, InsightType, JsonFileStore, Ledger, Priority, RefreshOutcome,
    StorageError,
};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn open_ledger(dir: &TempDir) -> Ledger {
    Ledger::open(JsonFileStore::new(dir.path()).unwrap()).unwrap()
}

/// Income 2500, expenses 3000 across three categories
fn seed(ledger: &Ledger) {
    ledger
        .add_income(Income::on(day(1), "Acme Corp", IncomeType::Salary, 2500.0).unwrap())
        .unwrap();
    ledger
        .add_expense(Expense::on(day(2), "Rent", ExpenseCategory::Utilities, 1800.0).unwrap())
        .unwrap();
    ledger
        .add_expense(Expense::on(day(5), "Groceries", ExpenseCategory::Market, 700.0).unwrap())
        .unwrap();
    ledger
        .add_expense(Expense::on(day(9), "Dinner", ExpenseCategory::Food, 500.0).unwrap())
        .unwrap();
}

fn remote_config(server: &MockCompletionServer) -> Config {
    let mut config = Config::default();
    config.ai.use_remote = true;
    config.ai.api_key = "sk-integration".to_string();
    config.ai.base_url = server.url();
    config.ai.timeout_secs = 5;
    config
}

// =============================================================================
// Ledger persistence
// =============================================================================

#[test]
fn test_ledger_round_trips_through_json_files() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = open_ledger(&dir);
        seed(&ledger);
    }

    assert!(dir.path().join("expenses.json").exists());
    assert!(dir.path().join("incomes.json").exists());

    let reopened = open_ledger(&dir);
    let snapshot = reopened.snapshot().unwrap();
    assert_eq!(snapshot.expenses.len(), 3);
    assert_eq!(snapshot.incomes.len(), 1);
    assert_eq!(snapshot.expenses[0].name, "Rent");
    assert_eq!(snapshot.expenses[0].calendar_date(), day(2));

    let history = reopened.history().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].label(), "Dinner");
}

#[test]
fn test_duplicate_content_not_persisted() {
    let dir = TempDir::new().unwrap();
    let ledger = open_ledger(&dir);
    seed(&ledger);

    let again = Expense::on(day(9), " dinner ", ExpenseCategory::Food, 500.0).unwrap();
    assert_eq!(
        ledger.add_expense(again).unwrap(),
        AddOutcome::Duplicate(DuplicateReason::SameContent)
    );

    let reopened = open_ledger(&dir);
    assert_eq!(reopened.snapshot().unwrap().expenses.len(), 3);
}

#[test]
fn test_corrupt_document_is_storage_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("expenses.json"), "[{not json").unwrap();

    let err = Ledger::open(JsonFileStore::new(dir.path()).unwrap()).err().unwrap();
    assert!(matches!(err, Error::Storage(StorageError::Json { .. })));
}

#[test]
fn test_remove_persists() {
    let dir = TempDir::new().unwrap();
    let ledger = open_ledger(&dir);
    seed(&ledger);

    let rent = ledger.snapshot().unwrap().expenses[0].id;
    assert!(ledger.remove(rent).unwrap());
    assert!(!ledger.remove(rent).unwrap());

    let reopened = open_ledger(&dir);
    assert!(reopened.snapshot().unwrap().expenses.iter().all(|e| e.id != rent));
}

#[test]
fn test_failed_save_does_not_leak_into_other_document() {
    let dir = TempDir::new().unwrap();
    let ledger = open_ledger(&dir);
    seed(&ledger);

    let expenses_path = dir.path().join("expenses.json");
    let incomes_path = dir.path().join("incomes.json");
    let expenses_before = std::fs::read_to_string(&expenses_path).unwrap();
    let incomes_before = std::fs::read_to_string(&incomes_path).unwrap();

    // A directory in place of incomes.json makes its rename fail
    std::fs::remove_file(&incomes_path).unwrap();
    std::fs::create_dir(&incomes_path).unwrap();

    let bonus = Income::on(day(15), "Bonus", IncomeType::Gift, 300.0).unwrap();
    assert!(ledger.add_income(bonus).is_err());
    assert_eq!(ledger.snapshot().unwrap().incomes.len(), 1);
    assert_eq!(std::fs::read_to_string(&expenses_path).unwrap(), expenses_before);

    // Expense adds only touch expenses.json and still succeed
    let taxi = Expense::on(day(16), "Taxi", ExpenseCategory::Transportation, 25.0).unwrap();
    assert!(ledger.add_expense(taxi).unwrap().is_added());

    std::fs::remove_dir(&incomes_path).unwrap();
    std::fs::write(&incomes_path, incomes_before).unwrap();

    let reopened = open_ledger(&dir).snapshot().unwrap();
    assert_eq!(reopened.expenses.len(), 4);
    assert!(reopened.expenses.iter().any(|e| e.name == "Taxi"));
    assert_eq!(reopened.incomes.len(), 1);
    assert!(reopened.incomes.iter().all(|i| i.source != "Bonus"));
}

// =============================================================================
// Insight pipeline
// =============================================================================

#[tokio::test]
async fn test_rule_based_refresh_over_file_ledger() {
    let dir = TempDir::new().unwrap();
    let ledger = open_ledger(&dir);
    seed(&ledger);

    let pipeline = InsightPipeline::new(&Config::default());
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.source, InsightSource::Backend);

    let insights = pipeline.insights();
    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0].insight_type, InsightType::Warning);
    assert!(insights[0].message.contains("$500.00"));
    assert!(insights[1].message.contains("60.0% of your budget on Utilities"));
    assert_eq!(insights[2].insight_type, InsightType::Saving);
}

#[tokio::test]
async fn test_remote_structured_reply() {
    let server = MockCompletionServer::start(CompletionMode::structured()).await;
    let dir = TempDir::new().unwrap();
    let ledger = open_ledger(&dir);
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.source, InsightSource::Backend);
    assert_eq!(report.count, 2);

    let insights = pipeline.insights();
    assert_eq!(insights[0].title, "Dining out is climbing");
    assert_eq!(insights[0].priority, Priority::High);
    assert_eq!(insights[1].insight_type, InsightType::Saving);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer sk-integration")
    );
    assert_eq!(requests[0].body["model"], "gpt-3.5-turbo");
    assert_eq!(requests[0].body["max_tokens"], 1000);
    let temperature = requests[0].body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);

    let prompt = requests[0].prompt().unwrap();
    assert!(prompt.contains("Monthly Income: $2500.00"));
    assert!(prompt.contains("Net Income: $-500.00"));
    assert!(prompt.contains("Utilities: $1800.00"));
    assert!(prompt.contains("October 2026: $3000.00"));
}

#[tokio::test]
async fn test_remote_plain_text_degrades_to_single_insight() {
    let text = "Honestly, just spend less on dinners out.";
    let server = MockCompletionServer::start(CompletionMode::plain_text(text)).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    assert_eq!(outcome.report().unwrap().source, InsightSource::Backend);

    let insights = pipeline.insights();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].title, "AI Analysis Complete");
    assert_eq!(insights[0].message, text);
    assert_eq!(insights[0].insight_type, InsightType::Budget);
    assert_eq!(insights[0].priority, Priority::Medium);
    assert!(pipeline.last_error().is_none());
}

#[tokio::test]
async fn test_http_error_falls_back_to_rules() {
    let server = MockCompletionServer::start(CompletionMode::Status(500)).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.source, InsightSource::Fallback);
    assert!(report.error.as_deref().unwrap().contains("HTTP 500"));

    let insights = pipeline.insights();
    assert_eq!(insights.len(), 3);
    assert_eq!(insights[0].id, "rule:overspending");
    assert!(pipeline.last_error().is_some());
}

#[tokio::test]
async fn test_malformed_envelope_falls_back_to_rules() {
    let server = MockCompletionServer::start(CompletionMode::MalformedEnvelope).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.source, InsightSource::Fallback);
    assert!(report.error.as_deref().unwrap().contains("unexpected response shape"));
}

#[tokio::test]
async fn test_slow_server_times_out_to_rules() {
    let server = MockCompletionServer::start(CompletionMode::structured()).await;
    server.set_delay(Duration::from_secs(3));
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    pipeline.set_timeout(Duration::from_millis(200));
    let outcome = pipeline.refresh_at(&ledger, today()).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.source, InsightSource::Fallback);
    assert!(report.error.as_deref().unwrap().contains("timed out after 200ms"));
    assert_eq!(pipeline.insights().len(), 3);
}

#[tokio::test]
async fn test_failed_refresh_replaces_previous_insights() {
    let server = MockCompletionServer::start(CompletionMode::structured()).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    pipeline.refresh_at(&ledger, today()).await.unwrap();
    assert_eq!(pipeline.insights()[0].title, "Dining out is climbing");

    server.set_mode(CompletionMode::Status(503));
    pipeline.refresh_at(&ledger, today()).await.unwrap();
    let insights = pipeline.insights();
    assert!(insights.iter().all(|i| i.id.starts_with("rule:")));
}

#[tokio::test]
async fn test_stale_remote_refresh_is_discarded() {
    let server = MockCompletionServer::start(CompletionMode::structured()).await;
    server.set_delay(Duration::from_millis(400));
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let (stale, fresh) = tokio::join!(pipeline.refresh_at(&ledger, today()), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        pipeline.update_backend(&Config::default());
        pipeline.refresh_at(&ledger, today()).await
    });

    assert!(matches!(stale.unwrap(), RefreshOutcome::Superseded { sequence: 1 }));
    assert_eq!(fresh.unwrap().report().unwrap().sequence, 2);
    assert!(pipeline.insights().iter().all(|i| i.id.starts_with("rule:")));
}

#[tokio::test]
async fn test_advice_does_not_clear_refresh_error() {
    let server = MockCompletionServer::start(CompletionMode::Status(500)).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    pipeline.refresh_at(&ledger, today()).await.unwrap();
    assert!(pipeline.last_error().unwrap().contains("HTTP 500"));

    server.set_mode(CompletionMode::plain_text("Cook at home more."));
    let advice = pipeline.advise_at(&ledger, today()).await.unwrap();
    assert_eq!(advice.source, InsightSource::Backend);

    assert!(pipeline.last_error().unwrap().contains("HTTP 500"));
    assert!(pipeline.last_advice_error().is_none());
    assert!(pipeline.insights().iter().all(|i| i.id.starts_with("rule:")));
}

#[tokio::test]
async fn test_remote_advice_and_connection_check() {
    let server =
        MockCompletionServer::start(CompletionMode::plain_text("Keep saving steadily.")).await;
    let ledger = Ledger::in_memory();
    seed(&ledger);

    let pipeline = InsightPipeline::new(&remote_config(&server));
    let advice = pipeline.advise_at(&ledger, today()).await.unwrap();
    assert_eq!(advice.source, InsightSource::Backend);
    assert_eq!(advice.text, "Keep saving steadily.");

    let prompt = server.requests()[0].prompt().unwrap().to_string();
    assert!(prompt.contains("Top Spending: Utilities, Market, Food"));

    let backend = dailyspend_core::LanguageModelBackend::new(&remote_config(&server).ai).unwrap();
    assert_eq!(backend.test_connection().await.unwrap(), "Keep saving steadily.");
    assert!(server.requests()[1]
        .prompt()
        .unwrap()
        .contains("Monthly Income: $3000.00"));
}
