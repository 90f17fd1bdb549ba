//! JSON parsing for model replies
//!
//! Models often wrap the JSON payload in prose or code fences, so the
//! outermost `{...}` span is extracted before deserializing.

use tracing::warn;
use uuid::Uuid;

use crate::error::ParseError;
use crate::models::{Insight, InsightType, Priority};

use super::types::{RawInsight, RawInsightList};

pub const FALLBACK_TITLE: &str = "AI Analysis Complete";

const FALLBACK_ACTIONS: [&str; 2] = [
    "Review the analysis above",
    "Consider implementing suggested changes",
];

/// Parse the structured insight list out of a model reply
pub fn parse_insights(response: &str) -> Result<Vec<Insight>, ParseError> {
    let json_str = extract_json(response).ok_or(ParseError::NoJson)?;
    let raw: RawInsightList = serde_json::from_str(json_str)
        .map_err(|e| ParseError::Schema(format!("{} | Raw: {}", e, truncate(json_str, 200))))?;
    Ok(raw.insights.into_iter().map(into_insight).collect())
}

/// Parse a reply, degrading to a single generic insight on failure
pub fn insights_or_fallback(response: &str) -> Vec<Insight> {
    match parse_insights(response) {
        Ok(insights) => insights,
        Err(e) => {
            warn!("Could not parse model insights, keeping raw reply: {}", e);
            vec![fallback_insight(response)]
        }
    }
}

/// The degraded insight carrying the raw reply text
pub fn fallback_insight(response: &str) -> Insight {
    Insight {
        id: Uuid::new_v4().to_string(),
        title: FALLBACK_TITLE.to_string(),
        message: response.to_string(),
        insight_type: InsightType::Budget,
        priority: Priority::Medium,
        action_items: FALLBACK_ACTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

fn into_insight(raw: RawInsight) -> Insight {
    Insight {
        id: Uuid::new_v4().to_string(),
        title: raw.title,
        message: raw.message,
        insight_type: InsightType::parse_lenient(&raw.insight_type),
        priority: Priority::parse_lenient(&raw.priority),
        action_items: raw.action_items,
    }
}

fn extract_json(response: &str) -> Option<&str> {
    let response = response.trim();
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}
