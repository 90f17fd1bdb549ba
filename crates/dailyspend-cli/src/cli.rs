//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

/// DailySpend - Track daily spending and get insights
#[derive(Parser)]
#[command(name = "dailyspend")]
#[command(about = "Personal expense tracker with spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding expenses.json and incomes.json
    ///
    /// Overrides `[storage] data_dir` from the configuration file.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (default: ~/.local/share/dailyspend/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a configuration file
    Init,

    /// Record an expense
    AddExpense {
        /// What the money was spent on
        name: String,

        /// Amount spent
        amount: f64,

        /// Category: Gas, Food, Drink, Market, Entertainment, Transportation,
        /// Healthcare, Education, Shopping, Utilities, Other
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Record an income
    AddIncome {
        /// Where the money came from
        source: String,

        /// Amount received
        amount: f64,

        /// Type: Salary, Freelance, Investment, Business, Gift, Bonus, Other
        #[arg(short = 't', long = "type", default_value = "Salary")]
        income_type: String,

        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Remove an expense or income by id
    Remove {
        /// Transaction id (shown by `history`)
        id: Uuid,
    },

    /// List transactions, newest first
    History {
        /// Only show this month (1-12, requires or defaults --year)
        #[arg(long)]
        month: Option<u32>,

        /// Year for --month (default: current year)
        #[arg(long)]
        year: Option<i32>,

        /// Maximum number of rows
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show income, expenses and category breakdown for a month
    Summary {
        /// Month (1-12, default: current month)
        #[arg(long)]
        month: Option<u32>,

        /// Year (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show monthly expense/income totals for recent months
    Trend {
        /// Number of months, ending with the current one
        #[arg(short, long, default_value = "6")]
        months: usize,
    },

    /// Generate financial insights for the current month
    Insights {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get personalized coaching for the current month
    Advise,

    /// AI backend commands
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Send a sample request to the remote model
    Test,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Turn the remote language model on or off
    SetRemote {
        state: Toggle,

        /// API key for the completion endpoint
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
