//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Configuration commands (show, set-remote)
//! - `core` - Init and shared utilities (load_config, open_ledger, date parsing)
//! - `insights` - Insight and advice generation, AI connection test
//! - `ledger` - Ledger commands (add-expense, add-income, remove, history)
//! - `reports` - Report commands (summary, trend)

pub mod config;
pub mod core;
pub mod insights;
pub mod ledger;
pub mod reports;

// Re-export command functions for main.rs
pub use config::*;
pub use core::*;
pub use insights::*;
pub use ledger::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
