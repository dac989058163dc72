// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the client role CLI

pub mod access;
pub mod caps;
pub mod config;
pub mod simulate;

pub use self::access::AccessCommand;
pub use self::caps::CapsCommand;
pub use self::config::ConfigCommand;
pub use self::simulate::SimulateArgs;
