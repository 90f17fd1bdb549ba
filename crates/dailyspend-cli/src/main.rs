//! DailySpend CLI - Track daily spending and get insights
//!
//! Usage:
//!   dailyspend init                              Create data directory and config
//!   dailyspend add-expense "Lunch" 12.50 -c Food Record an expense
//!   dailyspend summary --month 10                Monthly totals and categories
//!   dailyspend insights                          Generate financial insights

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use dailyspend_core::InsightPipeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Init => {
            let path = commands::resolve_config_path(cli.config.as_deref())?;
            commands::cmd_init(&config, &path)
        }
        Commands::AddExpense {
            name,
            amount,
            category,
            date,
            note,
        } => {
            let ledger = commands::open_ledger(&config)?;
            commands::cmd_add_expense(&ledger, &name, amount, &category, date.as_deref(), &note)
        }
        Commands::AddIncome {
            source,
            amount,
            income_type,
            date,
            note,
        } => {
            let ledger = commands::open_ledger(&config)?;
            commands::cmd_add_income(
                &ledger,
                &source,
                amount,
                &income_type,
                date.as_deref(),
                &note,
            )
        }
        Commands::Remove { id } => {
            let ledger = commands::open_ledger(&config)?;
            commands::cmd_remove(&ledger, id)
        }
        Commands::History { month, year, limit } => {
            let ledger = commands::open_ledger(&config)?;
            let filter = match (month, year) {
                (None, None) => None,
                _ => Some(commands::resolve_month(month, year, commands::today())?),
            };
            commands::cmd_history(&ledger, filter, limit)
        }
        Commands::Summary { month, year } => {
            let ledger = commands::open_ledger(&config)?;
            let key = commands::resolve_month(month, year, commands::today())?;
            commands::cmd_summary(&ledger, key)
        }
        Commands::Trend { months } => {
            let ledger = commands::open_ledger(&config)?;
            commands::cmd_trend(&ledger, months, commands::today())
        }
        Commands::Insights { json } => {
            let ledger = commands::open_ledger(&config)?;
            let pipeline = InsightPipeline::new(&config);
            commands::cmd_insights(&ledger, &pipeline, commands::today(), json).await
        }
        Commands::Advise => {
            let ledger = commands::open_ledger(&config)?;
            let pipeline = InsightPipeline::new(&config);
            commands::cmd_advise(&ledger, &pipeline, commands::today()).await
        }
        Commands::Ai { action } => match action {
            AiAction::Test => commands::cmd_ai_test(&config).await,
        },
        Commands::Config { action } => {
            let path = commands::resolve_config_path(cli.config.as_deref())?;
            match action {
                ConfigAction::Show => commands::cmd_config_show(&config, &path),
                ConfigAction::SetRemote { state, api_key } => {
                    commands::cmd_config_set_remote(&path, state.enabled(), api_key.as_deref())
                        .map(|_| ())
                }
            }
        }
    }
}
