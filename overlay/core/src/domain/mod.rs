// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Value objects, entities and persistence contracts for the client role.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types; no I/O

pub mod capability;
pub mod config;
pub mod events;
pub mod filters;
pub mod provider;
pub mod repository;
pub mod request;
pub mod role;
pub mod user;
