//! DailySpend Core Library
//!
//! Shared functionality for the DailySpend budgeting tool:
//! - Expense and income ledger with JSON persistence and duplicate detection
//! - Monthly aggregation and trend series
//! - Financial profile construction
//! - Pluggable insight backends (local rules, remote language model)
//! - Insight pipeline with fallback to rules
//! - Prompt library for customizable AI prompts

pub mod aggregate;
pub mod ai;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod pipeline;
pub mod profile;
pub mod prompts;

/// Test utilities including a mock completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{category_breakdown, monthly_summary, spending_by_month, trend_series};
pub use ai::{
    BackendInfo, BackendKind, InsightBackend, InsightClient, LanguageModelBackend,
    RuleBasedBackend,
};
pub use config::{AiConfig, Config, StorageConfig};
pub use error::{BackendError, Error, ParseError, Result, StorageError};
pub use ledger::{
    AddOutcome, Changed, DuplicateReason, JsonFileStore, Ledger, LedgerSnapshot, LedgerStore,
    MemoryStore,
};
pub use models::{
    CategoryShare, CategoryTotal, Expense, ExpenseCategory, FinancialProfile, Income, IncomeType,
    Insight, InsightType, MonthKey, MonthlySummary, Priority, Transaction, TrendPoint,
    MAX_TREND_MONTHS,
};
pub use pipeline::{
    Advice, InsightPipeline, InsightSource, PipelineStatus, RefreshOutcome, RefreshReport,
};
pub use profile::build_profile;
pub use prompts::{Prompt, PromptId, PromptLibrary};
