//! Remote language-model backend
//!
//! Talks to any server implementing the OpenAI `/v1/chat/completions` API
//! (api.openai.com by default). Requests carry a bearer token; the reply
//! text is taken from `choices[0].message.content`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AiConfig;
use crate::error::BackendError;
use crate::models::{CategoryTotal, ExpenseCategory, FinancialProfile, Insight, MonthKey};
use crate::prompts::{PromptId, PromptLibrary};

use super::parsing::insights_or_fallback;
use super::types::BackendKind;
use super::InsightBackend;

/// Number of category names included in the advice prompt
const ADVICE_CATEGORY_COUNT: usize = 3;

/// OpenAI-compatible chat completion backend
#[derive(Clone)]
pub struct LanguageModelBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl LanguageModelBackend {
    /// Build a backend from the `[ai]` settings
    ///
    /// Fails with `MissingCredential` when the API key is blank.
    pub fn new(settings: &AiConfig) -> Result<Self, BackendError> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(BackendError::MissingCredential);
        }

        let timeout = settings.timeout();
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::TransportFailure(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        })
    }

    /// Use a specific prompt library (tests, custom override dirs)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Round-trip an advice request over a fixed sample profile
    pub async fn test_connection(&self) -> Result<String, BackendError> {
        info!("Testing connection to {} ({})", self.base_url, self.model);
        self.advise(&sample_profile()).await
    }

    fn render(&self, id: PromptId, vars: &HashMap<&str, &str>) -> Result<String, BackendError> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| BackendError::Prompt("prompt library lock poisoned".into()))?;
        let prompt = prompts
            .get(id)
            .map_err(|e| BackendError::Prompt(e.to_string()))?;
        Ok(prompt.render_user(vars))
    }

    /// Make a chat completion request and return the reply text
    async fn chat_completion(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("Sending {} prompt chars to {}", prompt.len(), self.base_url);

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let chat_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponseShape(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BackendError::InvalidResponseShape("no choices in response".into()))?;

        debug!("Model replied with {} chars", content.len());
        Ok(content)
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::TransportFailure(e.to_string())
        }
    }
}

#[async_trait]
impl InsightBackend for LanguageModelBackend {
    async fn analyze(&self, profile: &FinancialProfile) -> Result<Vec<Insight>, BackendError> {
        let vars = insight_vars(profile);
        let borrowed: HashMap<&str, &str> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let prompt = self.render(PromptId::FinancialInsights, &borrowed)?;

        let reply = self.chat_completion(&prompt).await?;
        Ok(insights_or_fallback(&reply))
    }

    async fn advise(&self, profile: &FinancialProfile) -> Result<String, BackendError> {
        let vars = advice_vars(profile);
        let borrowed: HashMap<&str, &str> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let prompt = self.render(PromptId::PersonalizedAdvice, &borrowed)?;

        self.chat_completion(&prompt).await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::LanguageModel
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Template variables for the structured insights prompt
pub fn insight_vars(profile: &FinancialProfile) -> Vec<(&'static str, String)> {
    vec![
        ("income", format!("{:.2}", profile.total_monthly_income)),
        ("expenses", format!("{:.2}", profile.total_monthly_expenses)),
        ("net_income", format!("{:.2}", profile.net_income)),
        ("top_categories", format_categories(&profile.top_spending_categories)),
        ("spending_trends", format_trends(&profile.spending_trends)),
        ("user_goals", profile.user_goals.join(", ")),
    ]
}

/// Template variables for the coaching prompt
pub fn advice_vars(profile: &FinancialProfile) -> Vec<(&'static str, String)> {
    let top_spending = profile
        .top_spending_categories
        .iter()
        .take(ADVICE_CATEGORY_COUNT)
        .map(|c| c.category.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        ("income", format!("{:.2}", profile.total_monthly_income)),
        ("expenses", format!("{:.2}", profile.total_monthly_expenses)),
        ("net_income", format!("{:.2}", profile.net_income)),
        ("top_spending", top_spending),
        ("user_goals", profile.user_goals.join(", ")),
    ]
}

fn format_categories(categories: &[CategoryTotal]) -> String {
    if categories.is_empty() {
        return "none".to_string();
    }
    categories
        .iter()
        .map(|c| format!("{}: ${:.2}", c.category, c.amount))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_trends(trends: &BTreeMap<MonthKey, f64>) -> String {
    if trends.is_empty() {
        return "none".to_string();
    }
    trends
        .iter()
        .map(|(month, amount)| format!("{}: ${:.2}", month.label(), amount))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Profile used by `test_connection`
pub fn sample_profile() -> FinancialProfile {
    FinancialProfile {
        period: MonthKey { year: 2024, month: 1 },
        total_monthly_income: 3000.0,
        total_monthly_expenses: 2500.0,
        net_income: 500.0,
        top_spending_categories: vec![
            CategoryTotal {
                category: ExpenseCategory::Utilities,
                amount: 1200.0,
            },
            CategoryTotal {
                category: ExpenseCategory::Food,
                amount: 500.0,
            },
        ],
        spending_trends: BTreeMap::new(),
        income_trends: BTreeMap::new(),
        user_goals: Vec::new(),
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
