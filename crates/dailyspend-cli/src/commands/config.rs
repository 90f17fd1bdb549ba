//! Configuration command implementations

use std::path::Path;

use anyhow::{Context, Result};
use dailyspend_core::Config;

pub fn cmd_config_show(config: &Config, config_path: &Path) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    println!("   ─────────────────────────────────────────────");
    if config_path.exists() {
        println!("   File:        {}", config_path.display());
    } else {
        println!("   File:        (built-in defaults)");
    }
    println!("   Data dir:    {}", config.data_dir()?.display());
    println!();
    println!("   Backend:     {}", config.backend_kind());
    println!("   Use remote:  {}", config.ai.use_remote);
    println!("   API key:     {}", config.ai.masked_api_key());
    println!("   Base URL:    {}", config.ai.base_url);
    println!("   Model:       {}", config.ai.model);
    println!("   Max tokens:  {}", config.ai.max_tokens);
    println!("   Temperature: {}", config.ai.temperature);
    println!("   Timeout:     {}s", config.ai.timeout_secs);
    println!();
    Ok(())
}

/// Toggle the remote backend in the configuration file
///
/// Reads the file without environment overrides so they are not persisted.
pub fn cmd_config_set_remote(
    config_path: &Path,
    enabled: bool,
    api_key: Option<&str>,
) -> Result<Config> {
    let mut config = Config::load_file(Some(config_path)).context("Failed to load configuration")?;
    config.ai.use_remote = enabled;
    if let Some(key) = api_key {
        config.ai.api_key = key.trim().to_string();
    }
    config
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if enabled && !config.ai.has_api_key() {
        println!("⚠️  Remote AI enabled but no API key is set; rule-based insights will be used.");
        println!("   Add one with: dailyspend config set-remote on --api-key <KEY>");
    } else if enabled {
        println!("✅ Remote AI enabled ({})", config.ai.model);
    } else {
        println!("✅ Remote AI disabled; using rule-based insights");
    }

    Ok(config)
}
