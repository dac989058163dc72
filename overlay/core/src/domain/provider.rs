// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Providers
//!
//! Sources of capability names for the aggregator. The built-in
//! [`DefaultCapabilityProvider`] and [`BlogCapabilityProvider`] are always
//! present; companion extensions plug in through [`ProviderRegistry`] and
//! contribute nothing when they are not registered.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::capability::{CapabilitySet, BLOG_CAPS, DEFAULT_CLIENT_CAPS};
use super::filters::CapabilityFilters;

/// Anything that yields a flat set of capability names.
///
/// Implemented for zero-argument closures so a companion integration can be
/// registered as `registry.register(ext, || caps.clone())`.
pub trait CapabilityProvider: Send + Sync {
    fn capabilities(&self) -> CapabilitySet;
}

impl<F> CapabilityProvider for F
where
    F: Fn() -> CapabilitySet + Send + Sync,
{
    fn capabilities(&self) -> CapabilitySet {
        self()
    }
}

/// Fixed list, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilityProvider {
    caps: CapabilitySet,
}

impl StaticCapabilityProvider {
    pub fn new(caps: CapabilitySet) -> Self {
        Self { caps }
    }
}

impl CapabilityProvider for StaticCapabilityProvider {
    fn capabilities(&self) -> CapabilitySet {
        self.caps.clone()
    }
}

/// Default list minus the (filtered) blog reference list, then the
/// `default_caps` filter. Blog capabilities are always subtracted here; they
/// come back through [`BlogCapabilityProvider`] when the blog is enabled.
#[derive(Debug, Clone)]
pub struct DefaultCapabilityProvider {
    filters: Arc<CapabilityFilters>,
}

impl DefaultCapabilityProvider {
    pub fn new(filters: Arc<CapabilityFilters>) -> Self {
        Self { filters }
    }
}

impl CapabilityProvider for DefaultCapabilityProvider {
    fn capabilities(&self) -> CapabilitySet {
        let defaults: CapabilitySet = DEFAULT_CLIENT_CAPS.iter().copied().collect();
        let blog = BlogCapabilityProvider::reference(&self.filters);
        self.filters.default_caps(defaults.difference(&blog))
    }
}

#[derive(Debug, Clone)]
pub struct BlogCapabilityProvider {
    enabled: bool,
    filters: Arc<CapabilityFilters>,
}

impl BlogCapabilityProvider {
    pub fn new(enabled: bool, filters: Arc<CapabilityFilters>) -> Self {
        Self { enabled, filters }
    }

    /// Configured toggle after the `blog_enabled` filter.
    pub fn is_enabled(&self) -> bool {
        self.filters.blog_enabled(self.enabled)
    }

    /// The blog list regardless of the toggle.
    pub fn reference(filters: &CapabilityFilters) -> CapabilitySet {
        filters.blog_caps(BLOG_CAPS.iter().copied().collect())
    }
}

impl CapabilityProvider for BlogCapabilityProvider {
    fn capabilities(&self) -> CapabilitySet {
        if !self.is_enabled() {
            return CapabilitySet::new();
        }
        Self::reference(&self.filters)
    }
}

/// Companion extensions with a capability integration.
///
/// The declaration order is the merge precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionExtension {
    GravityForms,
    ContactAdvertisements,
    WordpressSeo,
}

impl CompanionExtension {
    pub const PRECEDENCE: [CompanionExtension; 3] = [
        CompanionExtension::GravityForms,
        CompanionExtension::ContactAdvertisements,
        CompanionExtension::WordpressSeo,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            CompanionExtension::GravityForms => "gravity_forms",
            CompanionExtension::ContactAdvertisements => "contact_advertisements",
            CompanionExtension::WordpressSeo => "wordpress_seo",
        }
    }
}

impl fmt::Display for CompanionExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Optional companion providers, keyed (and therefore ordered) by extension.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    companions: BTreeMap<CompanionExtension, Arc<dyn CapabilityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the provider for `extension`.
    pub fn register<P>(&mut self, extension: CompanionExtension, provider: P) -> &mut Self
    where
        P: CapabilityProvider + 'static,
    {
        debug!(companion = %extension, "Registering companion capability provider");
        self.companions.insert(extension, Arc::new(provider));
        self
    }

    pub fn unregister(&mut self, extension: CompanionExtension) -> bool {
        self.companions.remove(&extension).is_some()
    }

    pub fn is_registered(&self, extension: CompanionExtension) -> bool {
        self.companions.contains_key(&extension)
    }

    /// Output of `extension`'s provider, or the empty set if it is absent.
    pub fn contribution(&self, extension: CompanionExtension) -> CapabilitySet {
        self.companions
            .get(&extension)
            .map(|provider| provider.capabilities())
            .unwrap_or_default()
    }

    /// Registered providers in precedence order.
    pub fn registered(&self) -> impl Iterator<Item = (CompanionExtension, &dyn CapabilityProvider)> + '_ {
        self.companions
            .iter()
            .map(|(extension, provider)| (*extension, provider.as_ref()))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.companions.keys()).finish()
    }
}
