//! Types shared by the insight backends

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which backend produces insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Deterministic local rules
    RuleBased,
    /// Remote chat-completion model
    LanguageModel,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::LanguageModel => "language_model",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes the active backend for status output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub kind: BackendKind,
    pub model: String,
    pub host: String,
}

/// Reply schema requested from the model
///
/// Every field is required; `type` and `priority` are free strings that
/// are mapped leniently afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInsightList {
    pub insights: Vec<RawInsight>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsight {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub insight_type: String,
    pub priority: String,
    pub action_items: Vec<String>,
}
