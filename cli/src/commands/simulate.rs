// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Host event replay
//!
//! Runs a sequence of host events through the default trigger dispatcher
//! against an in-memory role store seeded with the standard roles, then
//! prints what each event did and the role's final grants.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use client_role_core::application::{ReconcileReport, RoleProvision, RoleSynchronizer, TriggerDispatcher};
use client_role_core::domain::capability::CapabilitySet;
use client_role_core::domain::config::OverlayConfig;
use client_role_core::domain::events::RoleEvent;
use client_role_core::infrastructure::{EventBus, InMemoryRoleRepository};
use client_role_core::presentation::admin::render_notice;

use super::caps::aggregator_for;
use crate::host_event::parse_event;

/// Roles every simulated site starts with.
pub const STANDARD_ROLES: [&str; 5] = ["administrator", "editor", "author", "contributor", "subscriber"];

#[derive(Args)]
pub struct SimulateArgs {
    /// Events to replay in order (activate, deactivate, upgrade:<type>,
    /// admin-init:<page>?<query>, listing:<page>?<query>)
    #[arg(required = true, value_name = "EVENT")]
    events: Vec<String>,

    /// Start with the managed role already present (and empty)
    #[arg(long)]
    existing_role: bool,

    /// Also print the role events published during the run
    #[arg(long)]
    trace_events: bool,

    /// Emit JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<ReconcileReport>,
    pub role_destroyed: bool,
    pub role_missing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl StepReport {
    fn summary(&self) -> String {
        let mut parts = Vec::new();
        match self.provision.as_deref() {
            Some("created") => parts.push("role created".to_string()),
            Some(_) => parts.push("role present".to_string()),
            None => {}
        }
        if let Some(report) = &self.reconciled {
            parts.push(format!(
                "reconciled ({} caps, +{} -{})",
                report.capabilities.len(),
                report.granted.len(),
                report.revoked.len()
            ));
        }
        if self.role_missing {
            parts.push("role missing, skipped".to_string());
        }
        if self.role_destroyed {
            parts.push("role removed".to_string());
        }
        if self.notice.is_some() {
            parts.push("notice shown".to_string());
        }
        if parts.is_empty() {
            "no-op".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Simulation {
    pub steps: Vec<StepReport>,
    /// Final grants, absent when the role does not exist
    pub capabilities: Option<CapabilitySet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_events: Vec<RoleEvent>,
}

pub async fn execute(args: SimulateArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = OverlayConfig::load_or_default(config_override).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let simulation = run(&config, &args.events, args.existing_role, args.trace_events).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&simulation).context("Failed to serialize simulation")?
        );
        return Ok(());
    }

    for (index, step) in simulation.steps.iter().enumerate() {
        println!("{:>3}. {} → {}", index + 1, step.event.bold(), step.summary());
        if let Some(html) = &step.notice {
            println!("     {}", html.dimmed());
        }
    }
    println!();

    match &simulation.capabilities {
        Some(caps) => {
            println!("{} {} capabilities", format!("Role '{}':", config.role.name).bold(), caps.len());
            for cap in caps.iter() {
                println!("  {}", cap);
            }
        }
        None => println!("{}", format!("Role '{}' does not exist", config.role.name).yellow()),
    }

    if !simulation.role_events.is_empty() {
        println!();
        println!("{}", "Role events:".bold());
        for event in &simulation.role_events {
            println!("  {}", serde_json::to_string(event).context("Failed to serialize role event")?);
        }
    }

    Ok(())
}

pub async fn run(
    config: &OverlayConfig,
    event_args: &[String],
    existing_role: bool,
    trace_events: bool,
) -> Result<Simulation> {
    let events = event_args
        .iter()
        .map(|arg| parse_event(arg))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = events.len(), existing_role, "Replaying host events");

    let repo = if existing_role {
        InMemoryRoleRepository::with_roles(STANDARD_ROLES.iter().copied().chain([config.role.name.as_str()]))
    } else {
        InMemoryRoleRepository::with_roles(STANDARD_ROLES)
    };

    let bus = EventBus::with_default_capacity();
    let mut receiver = bus.subscribe();
    let synchronizer = Arc::new(RoleSynchronizer::from_config(Arc::new(repo), config, bus));
    let dispatcher = TriggerDispatcher::with_default_handlers(
        Arc::new(aggregator_for(config)),
        synchronizer.clone(),
        config.triggers.clone(),
    );

    let mut steps = Vec::with_capacity(events.len());
    for (arg, event) in event_args.iter().zip(events) {
        let outcome = dispatcher
            .dispatch(event)
            .await
            .with_context(|| format!("Event '{}' failed", arg))?;
        steps.push(StepReport {
            event: arg.clone(),
            provision: outcome.provision.map(|p| match p {
                RoleProvision::Created => "created".to_string(),
                RoleProvision::AlreadyPresent => "already_present".to_string(),
            }),
            reconciled: outcome.reconciled,
            role_destroyed: outcome.role_destroyed,
            role_missing: outcome.role_missing,
            notice: outcome.notice.as_ref().map(render_notice),
        });
    }

    let capabilities = synchronizer.role_capabilities().await?.map(|table| {
        table
            .into_iter()
            .filter_map(|(cap, granted)| granted.then_some(cap))
            .collect::<CapabilitySet>()
    });

    info!(
        role = %config.role.name,
        steps = steps.len(),
        present = capabilities.is_some(),
        "Simulation finished"
    );

    let role_events = if trace_events { receiver.drain() } else { Vec::new() };

    Ok(Simulation {
        steps,
        capabilities,
        role_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_activate_then_reset() {
        let sim = run(
            &OverlayConfig::default(),
            &args(&["activate", "listing:plugins.php?reset-client-role=1"]),
            false,
            true,
        )
        .await
        .unwrap();

        assert_eq!(sim.steps[0].provision.as_deref(), Some("created"));
        assert!(sim.steps[1].reconciled.as_ref().unwrap().granted.is_empty());
        assert!(sim.steps[1].notice.as_ref().unwrap().contains("Client role reset"));
        assert!(sim.capabilities.unwrap().contains("edit_theme_options"));
        assert_eq!(sim.role_events.len(), 3);
    }

    #[tokio::test]
    async fn test_reconcile_without_role_is_skipped() {
        let sim = run(&OverlayConfig::default(), &args(&["upgrade:plugin"]), false, false)
            .await
            .unwrap();

        assert!(sim.steps[0].role_missing);
        assert_eq!(sim.steps[0].summary(), "role missing, skipped");
        assert!(sim.capabilities.is_none());
    }

    #[tokio::test]
    async fn test_existing_role_filled_by_upgrade() {
        let sim = run(&OverlayConfig::default(), &args(&["upgrade:theme"]), true, false)
            .await
            .unwrap();

        let report = sim.steps[0].reconciled.as_ref().unwrap();
        assert_eq!(report.granted.len(), report.capabilities.len());
        assert!(sim.capabilities.is_some());
    }

    #[tokio::test]
    async fn test_deactivate_removes_role() {
        let sim = run(&OverlayConfig::default(), &args(&["activate", "deactivate"]), false, false)
            .await
            .unwrap();

        assert!(sim.steps[1].role_destroyed);
        assert!(sim.capabilities.is_none());
    }

    #[tokio::test]
    async fn test_invalid_event_rejected() {
        assert!(run(&OverlayConfig::default(), &args(&["reboot"]), false, false).await.is_err());
    }
}
