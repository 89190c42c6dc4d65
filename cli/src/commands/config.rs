// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use ci_api_core::domain::api_config::ApiConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML (secrets masked)
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    }
}

/// Copy of `config` safe to print
pub fn masked(config: &ApiConfig) -> ApiConfig {
    let mut masked = config.clone();
    masked.insights.auth_token = mask(&config.insights.auth_token);
    masked.encryption.key = mask(&config.encryption.key);
    masked
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = ApiConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. CI_API_CONFIG_PATH: {}",
            std::env::var("CI_API_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./ci-api-config.yaml");
        println!("  4. ~/.ci-api/config.yaml");
        println!("  5. /etc/ci-api/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&masked(&config)).context("Failed to render configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Site:".bold());
    println!("  {}", config.site);
    println!();

    println!("{}", "HTTP:".bold());
    println!("  Listen: {}", config.bind_address());
    println!();

    println!("{}", "Insights:".bold());
    println!(
        "  Endpoint: {}",
        if config.insights.endpoint.is_empty() {
            "(not set)"
        } else {
            config.insights.endpoint.as_str()
        }
    );
    println!("  Auth token: {}", mask(&config.insights.auth_token));
    println!("  Timeout: {}s", config.insights.timeout_seconds);
    println!();

    println!("{}", "Encryption:".bold());
    println!("  Key: {}", mask(&config.encryption.key));
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ApiConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_masked_hides_secrets() {
        let mut config = ApiConfig::default();
        config.insights.auth_token = "secret".to_string();

        let masked = masked(&config);
        assert_eq!(masked.insights.auth_token, "********");
        assert_eq!(masked.encryption.key, "(not set)");

        let yaml = serde_yaml::to_string(&masked).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[tokio::test]
    async fn test_validate_rejects_incomplete_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "site: com\ninsights:\n  endpoint: http://localhost:9999\n").unwrap();

        assert!(validate(Some(file.path().to_path_buf())).await.is_err());
    }
}
