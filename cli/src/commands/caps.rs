// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Capability set inspection
//!
//! Commands: show

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use client_role_core::application::CapabilityAggregator;
use client_role_core::domain::capability::CapabilitySet;
use client_role_core::domain::config::OverlayConfig;
use client_role_core::domain::filters::CapabilityFilters;
use client_role_core::domain::provider::{
    BlogCapabilityProvider, CapabilityProvider, DefaultCapabilityProvider,
};

#[derive(Subcommand)]
pub enum CapsCommand {
    /// Print the capability set the current configuration produces
    Show {
        /// Emit JSON instead of a list
        #[arg(long)]
        json: bool,

        /// Break the set down by contributing source
        #[arg(long)]
        sources: bool,
    },
}

/// One contributing source and what it adds.
#[derive(Debug, Serialize)]
pub struct Contribution {
    pub source: String,
    pub capabilities: CapabilitySet,
}

#[derive(Debug, Serialize)]
pub struct CapabilityBreakdown {
    pub role: String,
    pub blog_enabled: bool,
    pub capabilities: CapabilitySet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Contribution>,
}

pub async fn handle_command(command: CapsCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        CapsCommand::Show { json, sources } => show(config_override, json, sources).await,
    }
}

/// Aggregator for `config` with no host filters registered.
pub fn aggregator_for(config: &OverlayConfig) -> CapabilityAggregator {
    CapabilityAggregator::from_config(config, Arc::new(CapabilityFilters::new()))
}

pub fn breakdown(config: &OverlayConfig, with_sources: bool) -> CapabilityBreakdown {
    let filters = Arc::new(CapabilityFilters::new());
    let aggregator = CapabilityAggregator::from_config(config, filters.clone());

    let mut sources = Vec::new();
    if with_sources {
        sources.push(Contribution {
            source: "defaults".to_string(),
            capabilities: DefaultCapabilityProvider::new(filters.clone()).capabilities(),
        });
        sources.push(Contribution {
            source: "blog".to_string(),
            capabilities: BlogCapabilityProvider::new(config.blog.enabled, filters).capabilities(),
        });
        for (extension, provider) in aggregator.companions().registered() {
            sources.push(Contribution {
                source: extension.to_string(),
                capabilities: provider.capabilities(),
            });
        }
    }

    CapabilityBreakdown {
        role: config.role.name.clone(),
        blog_enabled: aggregator.blog_enabled(),
        capabilities: aggregator.compute_capability_set(),
        sources,
    }
}

async fn show(config_override: Option<PathBuf>, json: bool, with_sources: bool) -> Result<()> {
    let config = OverlayConfig::load_or_default(config_override).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let breakdown = breakdown(&config, with_sources);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&breakdown).context("Failed to serialize capability set")?
        );
        return Ok(());
    }

    println!(
        "{} {} ({} capabilities, blog {})",
        "Role:".bold(),
        breakdown.role,
        breakdown.capabilities.len(),
        if breakdown.blog_enabled { "enabled" } else { "disabled" }
    );
    for cap in breakdown.capabilities.iter() {
        println!("  {}", cap);
    }

    for contribution in &breakdown.sources {
        println!();
        println!("{}", format!("{}:", contribution.source).bold());
        if contribution.capabilities.is_empty() {
            println!("  {}", "(nothing)".dimmed());
        }
        for cap in contribution.capabilities.iter() {
            println!("  {}", cap);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_role_core::domain::capability::BLOG_CAPS;

    fn config(yaml: &str) -> OverlayConfig {
        OverlayConfig::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_breakdown_without_sources() {
        let result = breakdown(&OverlayConfig::default(), false);
        assert_eq!(result.role, "client");
        assert!(result.capabilities.contains("edit_posts"));
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_breakdown_lists_each_source() {
        let result = breakdown(
            &config(
                r#"
blog:
  enabled: false
companions:
  - extension: wordpress_seo
    capabilities: [wpseo_manage_options]
  - extension: gravity_forms
    enabled: false
    capabilities: [gform_full_access]
"#,
            ),
            true,
        );

        let names: Vec<_> = result.sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["defaults", "blog", "wordpress_seo"]);
        assert!(result.sources[1].capabilities.is_empty());
        for cap in BLOG_CAPS {
            assert!(!result.capabilities.contains(cap));
        }
        assert!(result.capabilities.contains("wpseo_manage_options"));
        assert!(!result.capabilities.contains("gform_full_access"));
    }
}
