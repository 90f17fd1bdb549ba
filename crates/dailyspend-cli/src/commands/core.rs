//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration from file, environment and flags
//! - `open_ledger` - Shared utility to open the JSON ledger
//! - `cmd_init` - Create the data directory and a configuration file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use dailyspend_core::config::default_config_path;
use dailyspend_core::{Config, JsonFileStore, Ledger, MonthKey};

/// Load configuration, letting `--data-dir` override the file
pub fn load_config(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        tracing::debug!("Data directory overridden to {}", dir.display());
        config.storage.data_dir = Some(dir.to_path_buf());
    }
    tracing::debug!(
        use_remote = config.ai.use_remote,
        model = %config.ai.model,
        "Configuration loaded"
    );
    Ok(config)
}

/// Where `config set-remote` and `init` write the configuration
pub fn resolve_config_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path().context("Could not determine a configuration path"),
    }
}

/// Open the JSON ledger in the configured data directory
pub fn open_ledger(config: &Config) -> Result<Ledger> {
    let data_dir = config.data_dir()?;
    let store = JsonFileStore::new(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    Ledger::open(store).context("Failed to load ledger")
}

pub fn cmd_init(config: &Config, config_path: &Path) -> Result<()> {
    let data_dir = config.data_dir()?;
    println!("🔧 Initializing DailySpend at {}...", data_dir.display());

    let ledger = open_ledger(config)?;
    let snapshot = ledger.snapshot()?;
    println!(
        "   Ledger: {} expenses, {} incomes",
        snapshot.expenses.len(),
        snapshot.incomes.len()
    );

    if config_path.exists() {
        println!("   Config: {} (kept)", config_path.display());
    } else {
        config
            .save(config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("   Config: {} (created)", config_path.display());
    }

    println!("✅ DailySpend initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record spending: dailyspend add-expense \"Coffee\" 4.50 --category Drink");
    println!("  2. Get insights:    dailyspend insights");

    Ok(())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a YYYY-MM-DD argument, defaulting to today
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", d)),
        None => Ok(today()),
    }
}

/// Resolve optional --month/--year against the current month
pub fn resolve_month(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<MonthKey> {
    let key = MonthKey::new(
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
    )?;
    Ok(key)
}
