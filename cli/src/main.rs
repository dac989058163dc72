// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Client Role CLI
//!
//! The `client-role` binary drives the overlay outside a host: it computes
//! the capability set a configuration produces, replays host events against
//! an in-memory role store, and evaluates management decisions.
//!
//! ## Commands
//!
//! - `client-role config show|validate|generate` - Configuration management
//! - `client-role caps show` - Print the computed capability set
//! - `client-role simulate <EVENT>...` - Replay host events
//! - `client-role access check` - Evaluate a user management decision

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use client_role_cli::commands::{self, AccessCommand, CapsCommand, ConfigCommand, SimulateArgs};

/// Client role overlay - capability reconciliation and access containment
#[derive(Parser)]
#[command(name = "client-role")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "CLIENT_ROLE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CLIENT_ROLE_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Capability set inspection
    #[command(name = "caps")]
    Caps {
        #[command(subcommand)]
        command: CapsCommand,
    },

    /// Replay host events against an in-memory role store
    #[command(name = "simulate")]
    Simulate {
        #[command(flatten)]
        args: SimulateArgs,
    },

    /// User management checks
    #[command(name = "access")]
    Access {
        #[command(subcommand)]
        command: AccessCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        Some(Commands::Caps { command }) => commands::caps::handle_command(command, cli.config).await,
        Some(Commands::Simulate { args }) => commands::simulate::execute(args, cli.config).await,
        Some(Commands::Access { command }) => commands::access::handle_command(command, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
