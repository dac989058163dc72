// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Client Role Core
//!
//! Keeps a dedicated, restricted `client` role in step with the capability
//! contributions of the extensions installed next to it, and limits which
//! user accounts a member of that role may manage.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Capability reconciliation and access containment
//!
//! | Layer | Contents |
//! |-------|----------|
//! | [`domain`] | Role, capability set, providers, filters, config, repository traits |
//! | [`application`] | Aggregator, synchronizer, trigger dispatcher, containment filter |
//! | [`infrastructure`] | In-memory stores, event bus |
//! | [`presentation`] | Admin-facing reset link and notices |

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
