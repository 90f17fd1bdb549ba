//! Insight pipeline
//!
//! Recomputes the current month's summary and profile from the ledger,
//! asks the active backend for insights and publishes the result. Backend
//! failures (including timeouts) never leave the previous insight list in
//! place: the rule-based result is published instead and the error is
//! recorded for display.
//!
//! Every refresh is tagged with a sequence number. A refresh whose backend
//! call resolves after a newer refresh has started is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate::monthly_summary;
use crate::ai::{BackendInfo, InsightBackend, InsightClient, RuleBasedBackend};
use crate::config::Config;
use crate::error::{BackendError, Result};
use crate::ledger::Ledger;
use crate::models::{FinancialProfile, Insight};
use crate::profile::build_profile;

/// Where published insights came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    /// The active backend answered
    Backend,
    /// The backend failed and local rules were used
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub sequence: u64,
    pub source: InsightSource,
    pub count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Published(RefreshReport),
    /// A newer refresh started before this one resolved; nothing was published
    Superseded { sequence: u64 },
}

impl RefreshOutcome {
    pub fn report(&self) -> Option<&RefreshReport> {
        match self {
            RefreshOutcome::Published(report) => Some(report),
            RefreshOutcome::Superseded { .. } => None,
        }
    }
}

/// Coaching text plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub text: String,
    pub source: InsightSource,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub backend: BackendInfo,
    pub timeout_secs: u64,
    pub last_refresh: Option<DateTime<Utc>>,
    pub insight_count: usize,
    pub last_error: Option<String>,
    pub last_advice_error: Option<String>,
}

#[derive(Clone)]
struct ActiveBackend {
    client: InsightClient,
    timeout: Duration,
}

#[derive(Default)]
struct Published {
    insights: Vec<Insight>,
    last_error: Option<String>,
    last_advice_error: Option<String>,
    last_refresh: Option<DateTime<Utc>>,
}

pub struct InsightPipeline {
    active: RwLock<ActiveBackend>,
    sequence: AtomicU64,
    state: Mutex<Published>,
}

impl InsightPipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_client(InsightClient::from_config(config), config.ai.timeout())
    }

    pub fn with_client(client: InsightClient, timeout: Duration) -> Self {
        Self {
            active: RwLock::new(ActiveBackend { client, timeout }),
            sequence: AtomicU64::new(0),
            state: Mutex::new(Published::default()),
        }
    }

    /// Swap the backend after a configuration change
    pub fn update_backend(&self, config: &Config) {
        let client = InsightClient::from_config(config);
        tracing::info!(
            backend = client.kind().as_str(),
            model = client.model(),
            "Insight backend updated"
        );
        let mut active = self.write_active();
        active.client = client;
        active.timeout = config.ai.timeout();
    }

    pub fn set_client(&self, client: InsightClient) {
        self.write_active().client = client;
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.write_active().timeout = timeout;
    }

    /// Refresh insights for the current local month
    pub async fn refresh(&self, ledger: &Ledger) -> Result<RefreshOutcome> {
        self.refresh_at(ledger, Local::now().date_naive()).await
    }

    /// Refresh insights for the month containing `today`
    ///
    /// Only storage errors are returned; backend errors are recovered.
    pub async fn refresh_at(&self, ledger: &Ledger, today: NaiveDate) -> Result<RefreshOutcome> {
        let profile = current_profile(ledger, today)?;
        Ok(self.refresh_profile(&profile).await)
    }

    /// Run the backend over an already-built profile and publish
    pub async fn refresh_profile(&self, profile: &FinancialProfile) -> RefreshOutcome {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let active = self.read_active();

        let (insights, source, error) =
            match run_with_timeout(active.timeout, active.client.analyze(profile)).await {
                Ok(insights) => (insights, InsightSource::Backend, None),
                Err(e) => {
                    tracing::warn!(
                        sequence,
                        backend = active.client.kind().as_str(),
                        error = %e,
                        "Insight backend failed, using rule-based insights"
                    );
                    (
                        RuleBasedBackend::analyze_profile(profile),
                        InsightSource::Fallback,
                        Some(e.to_string()),
                    )
                }
            };

        let mut state = self.lock_state();
        let latest = self.sequence.load(Ordering::SeqCst);
        if latest != sequence {
            tracing::debug!(sequence, latest, "Discarding superseded refresh");
            return RefreshOutcome::Superseded { sequence };
        }

        let report = RefreshReport {
            sequence,
            source,
            count: insights.len(),
            error: error.clone(),
        };
        state.insights = insights;
        state.last_error = error;
        state.last_refresh = Some(Utc::now());

        tracing::info!(
            sequence,
            count = report.count,
            source = ?report.source,
            "Insights refreshed"
        );
        RefreshOutcome::Published(report)
    }

    /// Free-text coaching for the current local month
    pub async fn advise(&self, ledger: &Ledger) -> Result<Advice> {
        self.advise_at(ledger, Local::now().date_naive()).await
    }

    pub async fn advise_at(&self, ledger: &Ledger, today: NaiveDate) -> Result<Advice> {
        let profile = current_profile(ledger, today)?;
        let active = self.read_active();

        let advice = match run_with_timeout(active.timeout, active.client.advise(&profile)).await {
            Ok(text) => Advice {
                text,
                source: InsightSource::Backend,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Advice backend failed, using canned advice");
                Advice {
                    text: RuleBasedBackend::advice_for(&profile),
                    source: InsightSource::Fallback,
                    error: Some(e.to_string()),
                }
            }
        };

        self.lock_state().last_advice_error = advice.error.clone();
        Ok(advice)
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.lock_state().insights.clone()
    }

    /// Error from the most recent published refresh
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Error from the most recent advice request
    pub fn last_advice_error(&self) -> Option<String> {
        self.lock_state().last_advice_error.clone()
    }

    pub fn status(&self) -> PipelineStatus {
        let active = self.read_active();
        let state = self.lock_state();
        PipelineStatus {
            backend: active.client.info(),
            timeout_secs: active.timeout.as_secs(),
            last_refresh: state.last_refresh,
            insight_count: state.insights.len(),
            last_error: state.last_error.clone(),
            last_advice_error: state.last_advice_error.clone(),
        }
    }

    // The guarded data is replaced wholesale, so a poisoned lock still holds a
    // consistent value.
    fn lock_state(&self) -> MutexGuard<'_, Published> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_active(&self) -> ActiveBackend {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn write_active(&self) -> std::sync::RwLockWriteGuard<'_, ActiveBackend> {
        self.active.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Summary and profile for the month containing `today`
pub fn current_profile(ledger: &Ledger, today: NaiveDate) -> Result<FinancialProfile> {
    let snapshot = ledger.snapshot()?;
    let summary = monthly_summary(
        &snapshot.expenses,
        &snapshot.incomes,
        today.month(),
        today.year(),
    );
    Ok(build_profile(
        &snapshot.expenses,
        &snapshot.incomes,
        &summary,
        today,
    ))
}

async fn run_with_timeout<T, F>(timeout: Duration, call: F) -> std::result::Result<T, BackendError>
where
    F: std::future::Future<Output = std::result::Result<T, BackendError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(timeout)),
    }
}
