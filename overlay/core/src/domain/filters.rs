// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Filters
//!
//! Extension points that let the host (or any other collaborator) adjust the
//! capability computation without touching this crate. Each point is a chain
//! of pure transforms applied in registration order:
//!
//! | Point | Applied to |
//! |-------|-----------|
//! | `default_caps` | default list, after blog capabilities are subtracted |
//! | `blog_enabled` | the configured blog toggle |
//! | `blog_caps` | the blog reference list |
//! | `final_caps` | the union of every contribution |
//!
//! With nothing registered every point is the identity.

use std::fmt;

use super::capability::CapabilitySet;

pub type CapsFilter = Box<dyn Fn(CapabilitySet) -> CapabilitySet + Send + Sync>;
pub type FlagFilter = Box<dyn Fn(bool) -> bool + Send + Sync>;

#[derive(Default)]
pub struct CapabilityFilters {
    default_caps: Vec<CapsFilter>,
    blog_enabled: Vec<FlagFilter>,
    blog_caps: Vec<CapsFilter>,
    final_caps: Vec<CapsFilter>,
}

impl CapabilityFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_default_caps<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(CapabilitySet) -> CapabilitySet + Send + Sync + 'static,
    {
        self.default_caps.push(Box::new(filter));
        self
    }

    pub fn on_blog_enabled<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(bool) -> bool + Send + Sync + 'static,
    {
        self.blog_enabled.push(Box::new(filter));
        self
    }

    pub fn on_blog_caps<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(CapabilitySet) -> CapabilitySet + Send + Sync + 'static,
    {
        self.blog_caps.push(Box::new(filter));
        self
    }

    pub fn on_final_caps<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(CapabilitySet) -> CapabilitySet + Send + Sync + 'static,
    {
        self.final_caps.push(Box::new(filter));
        self
    }

    pub fn default_caps(&self, caps: CapabilitySet) -> CapabilitySet {
        Self::chain(&self.default_caps, caps)
    }

    pub fn blog_enabled(&self, enabled: bool) -> bool {
        self.blog_enabled.iter().fold(enabled, |acc, filter| filter(acc))
    }

    pub fn blog_caps(&self, caps: CapabilitySet) -> CapabilitySet {
        Self::chain(&self.blog_caps, caps)
    }

    pub fn final_caps(&self, caps: CapabilitySet) -> CapabilitySet {
        Self::chain(&self.final_caps, caps)
    }

    fn chain(filters: &[CapsFilter], caps: CapabilitySet) -> CapabilitySet {
        filters.iter().fold(caps, |acc, filter| filter(acc))
    }
}

impl fmt::Debug for CapabilityFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityFilters")
            .field("default_caps", &self.default_caps.len())
            .field("blog_enabled", &self.blog_enabled.len())
            .field("blog_caps", &self.blog_caps.len())
            .field("final_caps", &self.final_caps.len())
            .finish()
    }
}
