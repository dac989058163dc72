// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use client_role_core::domain::config::{OverlayConfig, BLOG_ENABLED_ENV, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./client-role.yaml)
        #[arg(short, long, default_value = "./client-role.yaml")]
        output: PathBuf,

        /// Include companion examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = OverlayConfig::load_or_default(config_override.clone()).context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./client-role.yaml");
        println!("  4. ~/.client-role/config.yaml");
        println!("  5. /etc/client-role/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Role:".bold());
    println!("  Name: {}", config.role.name);
    println!("  Display name: {}", config.role.display_name);
    println!();

    println!("{}", "Blog:".bold());
    println!("  Enabled: {}", config.blog.enabled);
    if std::env::var(BLOG_ENABLED_ENV).is_ok() {
        println!("  {}", format!("(overridden by {})", BLOG_ENABLED_ENV).dimmed());
    }
    println!();

    println!("{}", "Companions:".bold());
    if config.companions.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for companion in &config.companions {
        let state = if companion.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!("  {} ({})", companion.extension.to_string().bold(), state);
        for cap in &companion.capabilities {
            println!("    - {}", cap);
        }
    }
    println!();

    println!("{}", "Triggers:".bold());
    println!("  Reset parameter: {}", config.triggers.reset_parameter);
    println!("  Listing page: {}", config.triggers.listing_page);
    println!("  Upgrade types: {}", config.triggers.upgrade_types.join(", "));
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = OverlayConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    if with_examples {
        std::fs::write(&output, include_str!("../../templates/client-role-with-examples.yaml"))
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    } else {
        OverlayConfig::default()
            .to_yaml_file(&output)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    info!(path = %output.display(), examples = with_examples, "Configuration written");
    println!("{}", format!("✓ Configuration generated: {}", output.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_template_is_valid() {
        let config =
            OverlayConfig::from_yaml_str(include_str!("../../templates/client-role-with-examples.yaml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.companions.len(), 3);
        assert!(!config.companions[1].enabled);
    }

    #[tokio::test]
    async fn test_generate_minimal_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("client-role.yaml");

        generate(output.clone(), false).await.unwrap();

        let config = OverlayConfig::from_yaml_file(&output).unwrap();
        assert_eq!(config.role.name, "client");
        assert!(config.blog.enabled);
    }
}
