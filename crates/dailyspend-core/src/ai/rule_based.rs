//! Deterministic rule-based backend
//!
//! Used when no remote model is configured and as the recovery path when
//! the remote model fails. Three independent rules, always evaluated in
//! the same order:
//! 1. Overspending (net income below zero)
//! 2. Largest spending category share
//! 3. Savings rate under 20%

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::models::{FinancialProfile, Insight, InsightType, Priority};

use super::types::BackendKind;
use super::InsightBackend;

/// Savings rate (percent of income) below which the savings rule fires
pub const TARGET_SAVINGS_RATE: f64 = 20.0;

const OVERSPENDING_ADVICE: &str = "I notice you're spending more than you earn this month. This is a critical situation that needs immediate attention.

Here's what I recommend: First, create a detailed budget that accounts for every dollar. Cut non-essential expenses immediately. Look for ways to increase your income through side gigs or freelance work. Consider using the envelope method to control spending in problem categories.

Remember, small changes compound over time. Even saving $50-100 per month can make a significant difference in your financial health.";

const POSITIVE_ADVICE: &str = "Great job on maintaining a positive cash flow! You're on the right track to building wealth.

To optimize your financial situation further, consider automating your savings and investments. Set up automatic transfers to a high-yield savings account and consider investing in low-cost index funds. Track your spending patterns to identify areas where you can optimize without sacrificing your lifestyle.

Keep up the excellent work, and remember that consistency is key to long-term financial success!";

/// Rule-based insight backend
#[derive(Debug, Clone, Default)]
pub struct RuleBasedBackend {
    latency: Duration,
}

impl RuleBasedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` (mirrors a remote round trip in demos)
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Evaluate the rules without any simulated delay
    pub fn analyze_profile(profile: &FinancialProfile) -> Vec<Insight> {
        let mut insights = Vec::new();

        if profile.net_income < 0.0 {
            insights.push(Insight {
                id: "rule:overspending".to_string(),
                title: "⚠️ Overspending Alert".to_string(),
                message: format!(
                    "You're spending ${:.2} more than you earn. This is unsustainable long-term.",
                    profile.net_income.abs()
                ),
                insight_type: InsightType::Warning,
                priority: Priority::High,
                action_items: vec![
                    "Review and eliminate unnecessary expenses".to_string(),
                    "Look for ways to increase income".to_string(),
                    "Create a strict monthly budget".to_string(),
                ],
            });
        }

        if let Some(top) = profile.top_category() {
            let share = if profile.total_monthly_expenses > 0.0 {
                top.amount / profile.total_monthly_expenses * 100.0
            } else {
                0.0
            };
            insights.push(Insight {
                id: "rule:top-category".to_string(),
                title: "Top Spending Category".to_string(),
                message: format!(
                    "You spend {:.1}% of your budget on {}. Consider if this aligns with your priorities.",
                    share, top.category
                ),
                insight_type: InsightType::Spending,
                priority: Priority::Medium,
                action_items: vec![
                    format!("Set a monthly limit for {}", top.category),
                    "Track daily spending in this category".to_string(),
                    "Look for ways to reduce costs".to_string(),
                ],
            });
        }

        if let Some(rate) = profile.savings_rate() {
            if rate < TARGET_SAVINGS_RATE {
                insights.push(Insight {
                    id: "rule:savings-rate".to_string(),
                    title: "Savings Opportunity".to_string(),
                    message: format!(
                        "You're saving {:.1}% of your income. Financial experts recommend saving at least 20%.",
                        rate
                    ),
                    insight_type: InsightType::Saving,
                    priority: Priority::Medium,
                    action_items: vec![
                        "Set up automatic savings transfers".to_string(),
                        "Review expenses to find savings opportunities".to_string(),
                        "Consider the 50/30/20 budget rule".to_string(),
                    ],
                });
            }
        }

        insights
    }

    /// Canned coaching text, chosen by the sign of net income
    pub fn advice_for(profile: &FinancialProfile) -> String {
        if profile.net_income < 0.0 {
            OVERSPENDING_ADVICE.to_string()
        } else {
            POSITIVE_ADVICE.to_string()
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl InsightBackend for RuleBasedBackend {
    async fn analyze(&self, profile: &FinancialProfile) -> Result<Vec<Insight>, BackendError> {
        self.simulate_latency().await;
        Ok(Self::analyze_profile(profile))
    }

    async fn advise(&self, profile: &FinancialProfile) -> Result<String, BackendError> {
        self.simulate_latency().await;
        Ok(Self::advice_for(profile))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::RuleBased
    }

    fn model(&self) -> &str {
        "rules"
    }

    fn host(&self) -> &str {
        "local"
    }
}
