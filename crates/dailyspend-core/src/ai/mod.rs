//! Pluggable insight backends
//!
//! # Architecture
//!
//! - `InsightBackend` trait: turns a `FinancialProfile` into insights and advice
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `RuleBasedBackend`, `LanguageModelBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = InsightClient::from_config(&config);
//! let insights = client.analyze(&profile).await?;
//! ```

mod language_model;
pub mod parsing;
mod rule_based;
pub mod types;

pub use language_model::{advice_vars, insight_vars, sample_profile, LanguageModelBackend};
pub use rule_based::{RuleBasedBackend, TARGET_SAVINGS_RATE};
pub use types::*;

use async_trait::async_trait;
use tracing::warn;

use crate::config::Config;
use crate::error::BackendError;
use crate::models::{FinancialProfile, Insight};

/// Interface shared by all insight backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Produce an ordered list of insights for a profile
    async fn analyze(&self, profile: &FinancialProfile) -> Result<Vec<Insight>, BackendError>;

    /// Free-text coaching for a profile
    async fn advise(&self, profile: &FinancialProfile) -> Result<String, BackendError>;

    fn kind(&self) -> BackendKind;

    /// Get the model name (for status output)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    fn info(&self) -> BackendInfo {
        BackendInfo {
            kind: self.kind(),
            model: self.model().to_string(),
            host: self.host().to_string(),
        }
    }
}

/// Concrete insight client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum InsightClient {
    RuleBased(RuleBasedBackend),
    LanguageModel(LanguageModelBackend),
}

impl InsightClient {
    /// Select the backend described by `config`
    ///
    /// Remote settings that cannot produce a working client fall back to rules.
    pub fn from_config(config: &Config) -> Self {
        let rules = RuleBasedBackend::with_latency(config.ai.simulated_latency());
        match config.backend_kind() {
            BackendKind::RuleBased => InsightClient::RuleBased(rules),
            BackendKind::LanguageModel => match LanguageModelBackend::new(&config.ai) {
                Ok(backend) => InsightClient::LanguageModel(backend),
                Err(e) => {
                    warn!("Cannot use remote AI ({}), falling back to rules", e);
                    InsightClient::RuleBased(rules)
                }
            },
        }
    }

    pub fn rule_based() -> Self {
        InsightClient::RuleBased(RuleBasedBackend::new())
    }
}

// Implement InsightBackend for InsightClient by delegating to the inner backend
#[async_trait]
impl InsightBackend for InsightClient {
    async fn analyze(&self, profile: &FinancialProfile) -> Result<Vec<Insight>, BackendError> {
        match self {
            InsightClient::RuleBased(b) => b.analyze(profile).await,
            InsightClient::LanguageModel(b) => b.analyze(profile).await,
        }
    }

    async fn advise(&self, profile: &FinancialProfile) -> Result<String, BackendError> {
        match self {
            InsightClient::RuleBased(b) => b.advise(profile).await,
            InsightClient::LanguageModel(b) => b.advise(profile).await,
        }
    }

    fn kind(&self) -> BackendKind {
        match self {
            InsightClient::RuleBased(b) => b.kind(),
            InsightClient::LanguageModel(b) => b.kind(),
        }
    }

    fn model(&self) -> &str {
        match self {
            InsightClient::RuleBased(b) => b.model(),
            InsightClient::LanguageModel(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            InsightClient::RuleBased(b) => b.host(),
            InsightClient::LanguageModel(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config_is_rule_based() {
        let client = InsightClient::from_config(&Config::default());
        assert_eq!(client.kind(), BackendKind::RuleBased);
        assert_eq!(client.info().host, "local");
    }

    #[test]
    fn test_remote_without_key_is_rule_based() {
        let mut config = Config::default();
        config.ai.use_remote = true;
        let client = InsightClient::from_config(&config);
        assert_eq!(client.kind(), BackendKind::RuleBased);
    }

    #[test]
    fn test_remote_with_key() {
        let mut config = Config::default();
        config.ai.use_remote = true;
        config.ai.api_key = "sk-test".to_string();
        config.ai.model = "gpt-4o-mini".to_string();
        let client = InsightClient::from_config(&config);
        let info = client.info();
        assert_eq!(info.kind, BackendKind::LanguageModel);
        assert_eq!(info.model, "gpt-4o-mini");
        assert_eq!(info.host, "https://api.openai.com");
    }

    #[tokio::test]
    async fn test_client_delegates_to_rules() {
        let client = InsightClient::rule_based();
        let profile = sample_profile();
        let insights = client.analyze(&profile).await.unwrap();
        assert_eq!(insights, RuleBasedBackend::analyze_profile(&profile));
    }
}
