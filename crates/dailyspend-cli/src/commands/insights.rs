//! Insight command implementations (insights, advise, ai test)

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use dailyspend_core::{
    BackendKind, Config, InsightPipeline, InsightSource, LanguageModelBackend, Ledger, Priority,
    RefreshOutcome,
};

pub async fn cmd_insights(
    ledger: &Ledger,
    pipeline: &InsightPipeline,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let outcome = pipeline.refresh_at(ledger, today).await?;
    let report = match outcome {
        RefreshOutcome::Published(report) => report,
        RefreshOutcome::Superseded { sequence } => {
            tracing::warn!(sequence, "Insight refresh superseded");
            bail!("Refresh {} was superseded by a newer request", sequence)
        }
    };

    let insights = pipeline.insights();
    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    let status = pipeline.status();
    println!();
    println!("💡 Insights ({} via {})", insights.len(), status.backend.kind);
    if report.source == InsightSource::Fallback {
        if let Some(ref error) = report.error {
            println!("   ⚠️  AI backend failed: {}", error);
            println!("      Showing rule-based insights instead.");
        }
    }
    println!();

    if insights.is_empty() {
        println!("   Nothing to report. Record some income and expenses first.");
        return Ok(());
    }

    for insight in &insights {
        let icon = match insight.priority {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        };
        println!("{} {} [{}]", icon, insight.title, insight.insight_type);
        println!("   {}", insight.message);
        for item in &insight.action_items {
            println!("   • {}", item);
        }
        println!();
    }

    Ok(())
}

pub async fn cmd_advise(ledger: &Ledger, pipeline: &InsightPipeline, today: NaiveDate) -> Result<()> {
    let advice = pipeline.advise_at(ledger, today).await?;

    println!();
    println!("🧭 Personalized advice");
    if let Some(ref error) = advice.error {
        println!("   ⚠️  AI backend failed: {}", error);
    }
    println!();
    println!("{}", advice.text);
    println!();

    Ok(())
}

pub async fn cmd_ai_test(config: &Config) -> Result<()> {
    if config.backend_kind() != BackendKind::LanguageModel {
        println!("ℹ️  Remote AI is not active; insights use the built-in rules.");
        println!("   Enable it with: dailyspend config set-remote on --api-key <KEY>");
        return Ok(());
    }

    println!("🔌 Testing {} at {}...", config.ai.model, config.ai.base_url);
    let backend = LanguageModelBackend::new(&config.ai)?;
    let reply = backend
        .test_connection()
        .await
        .context("AI connection test failed")?;

    println!("✅ Connection OK");
    println!();
    println!("{}", reply);
    Ok(())
}
