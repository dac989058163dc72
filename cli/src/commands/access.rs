// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! User management checks
//!
//! Commands: roles, check

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use client_role_core::application::{AccessContainmentFilter, NOT_ALLOWED_CAP};
use client_role_core::domain::config::OverlayConfig;
use client_role_core::domain::role::RoleName;
use client_role_core::domain::user::{ManagementOperation, User, UserId};
use client_role_core::infrastructure::{EventBus, InMemoryRoleRepository, InMemoryUserRepository};

use super::simulate::STANDARD_ROLES;

const ACTOR_ID: UserId = UserId(1);
const TARGET_ID: UserId = UserId(2);

#[derive(Subcommand)]
pub enum AccessCommand {
    /// List the roles a user holding ACTOR roles may view and assign
    Roles {
        /// Comma-separated roles of the acting user
        #[arg(long, value_delimiter = ',', required = true)]
        actor: Vec<String>,
    },

    /// Decide whether one user may edit or delete another
    Check {
        /// Comma-separated roles of the acting user
        #[arg(long, value_delimiter = ',', required = true)]
        actor: Vec<String>,

        /// Comma-separated roles of the target user
        #[arg(long, value_delimiter = ',', required = true)]
        target: Vec<String>,

        #[arg(long, value_enum, default_value = "edit")]
        operation: Operation,

        /// Acting user and target are the same account
        #[arg(long)]
        same_user: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Edit,
    Delete,
}

impl Operation {
    pub fn meta_cap(self) -> &'static str {
        match self {
            Operation::Edit => "edit_user",
            Operation::Delete => "delete_user",
        }
    }
}

impl From<Operation> for ManagementOperation {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Edit => ManagementOperation::Edit,
            Operation::Delete => ManagementOperation::Delete,
        }
    }
}

pub async fn handle_command(command: AccessCommand, config_override: Option<PathBuf>) -> Result<()> {
    let config = OverlayConfig::load_or_default(config_override).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    match command {
        AccessCommand::Roles { actor } => {
            let roles = allowed_roles(&config, &actor).await?;
            println!("{}", format!("Roles manageable by [{}]:", actor.join(", ")).bold());
            if roles.is_empty() {
                println!("  {}", "(none)".dimmed());
            }
            for role in roles {
                println!("  {}", role);
            }
            Ok(())
        }
        AccessCommand::Check {
            actor,
            target,
            operation,
            same_user,
        } => {
            let required = check(&config, &actor, &target, operation, same_user).await?;
            let denied = required.iter().any(|cap| cap == NOT_ALLOWED_CAP);
            let verdict = if denied { "✗ denied".red() } else { "✓ allowed".green() };
            println!(
                "{} {} [{}] → [{}] (requires: {})",
                verdict,
                ManagementOperation::from(operation),
                actor.join(", "),
                target.join(", "),
                required.join(", ")
            );
            Ok(())
        }
    }
}

fn containment(config: &OverlayConfig, users: &InMemoryUserRepository) -> AccessContainmentFilter {
    let roles = InMemoryRoleRepository::with_roles(STANDARD_ROLES.iter().copied().chain([config.role.name.as_str()]));
    AccessContainmentFilter::new(
        Arc::new(roles),
        Arc::new(users.clone()),
        config.role_name(),
        EventBus::default(),
    )
}

fn user(id: UserId, login: &str, roles: &[String]) -> User {
    roles
        .iter()
        .fold(User::new(id, login), |user, role| user.with_role(role.as_str()))
}

pub async fn allowed_roles(config: &OverlayConfig, actor_roles: &[String]) -> Result<BTreeSet<RoleName>> {
    let users = InMemoryUserRepository::new();
    let filter = containment(config, &users);
    Ok(filter.allowed_roles(&user(ACTOR_ID, "actor", actor_roles)).await?)
}

/// Primitive capabilities the host would require for the operation.
pub async fn check(
    config: &OverlayConfig,
    actor_roles: &[String],
    target_roles: &[String],
    operation: Operation,
    same_user: bool,
) -> Result<Vec<String>> {
    let users = InMemoryUserRepository::new();
    users.insert(user(ACTOR_ID, "actor", actor_roles));
    let target_id = if same_user {
        ACTOR_ID
    } else {
        users.insert(user(TARGET_ID, "target", target_roles));
        TARGET_ID
    };

    let filter = containment(config, &users);
    let required = filter
        .map_meta_cap(vec!["edit_users".to_string()], operation.meta_cap(), ACTOR_ID, &[target_id])
        .await?;
    Ok(required)
}
