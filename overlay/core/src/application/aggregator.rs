// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Capability Aggregator
//!
//! Merges every provider's output into the capability set the client role
//! should hold:
//!
//! 1. Default list, blog capabilities subtracted, `default_caps` filter
//! 2. ∪ blog list when the (filtered) blog toggle is on
//! 3. ∪ each registered companion, in [`CompanionExtension::PRECEDENCE`] order
//! 4. `final_caps` filter
//!
//! The result is a set, so step 4 output is already de-duplicated. With
//! unchanged inputs the computation always yields the same set.
//!
//! Companion contributions are not filtered by the blog toggle.

use std::sync::Arc;

use tracing::debug;

use crate::domain::capability::CapabilitySet;
use crate::domain::config::OverlayConfig;
use crate::domain::filters::CapabilityFilters;
use crate::domain::provider::{
    BlogCapabilityProvider, CapabilityProvider, CompanionExtension, DefaultCapabilityProvider,
    ProviderRegistry, StaticCapabilityProvider,
};

#[derive(Debug)]
pub struct CapabilityAggregator {
    default_provider: DefaultCapabilityProvider,
    blog_provider: BlogCapabilityProvider,
    companions: ProviderRegistry,
    filters: Arc<CapabilityFilters>,
}

impl CapabilityAggregator {
    pub fn new(blog_enabled: bool, companions: ProviderRegistry, filters: Arc<CapabilityFilters>) -> Self {
        Self {
            default_provider: DefaultCapabilityProvider::new(filters.clone()),
            blog_provider: BlogCapabilityProvider::new(blog_enabled, filters.clone()),
            companions,
            filters,
        }
    }

    /// Builds the aggregator from configuration; enabled companion entries are
    /// registered as static providers.
    pub fn from_config(config: &OverlayConfig, filters: Arc<CapabilityFilters>) -> Self {
        let mut companions = ProviderRegistry::new();
        for companion in config.companions.iter().filter(|c| c.enabled) {
            companions.register(
                companion.extension,
                StaticCapabilityProvider::new(companion.capability_set()),
            );
        }
        Self::new(config.blog.enabled, companions, filters)
    }

    pub fn companions(&self) -> &ProviderRegistry {
        &self.companions
    }

    pub fn companions_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.companions
    }

    pub fn blog_enabled(&self) -> bool {
        self.blog_provider.is_enabled()
    }

    pub fn compute_capability_set(&self) -> CapabilitySet {
        let mut caps = self.default_provider.capabilities();
        debug!(count = caps.len(), "Default capability contribution");

        let blog = self.blog_provider.capabilities();
        debug!(count = blog.len(), enabled = self.blog_provider.is_enabled(), "Blog capability contribution");
        caps.merge(blog);

        for extension in CompanionExtension::PRECEDENCE {
            if !self.companions.is_registered(extension) {
                continue;
            }
            let contribution = self.companions.contribution(extension);
            debug!(companion = %extension, count = contribution.len(), "Companion capability contribution");
            caps.merge(contribution);
        }

        let caps = self.filters.final_caps(caps);
        debug!(count = caps.len(), "Capability set computed");
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::{BLOG_CAPS, DEFAULT_CLIENT_CAPS};
    use crate::domain::config::CompanionConfig;

    fn aggregator(blog_enabled: bool, companions: ProviderRegistry) -> CapabilityAggregator {
        CapabilityAggregator::new(blog_enabled, companions, Arc::new(CapabilityFilters::new()))
    }

    #[test]
    fn test_blog_enabled_restores_full_default_list() {
        let caps = aggregator(true, ProviderRegistry::new()).compute_capability_set();
        let expected: CapabilitySet = DEFAULT_CLIENT_CAPS.iter().copied().collect();
        assert_eq!(caps, expected);
    }

    #[test]
    fn test_blog_disabled_removes_blog_caps() {
        let caps = aggregator(false, ProviderRegistry::new()).compute_capability_set();
        for cap in BLOG_CAPS {
            assert!(!caps.contains(cap));
        }
        assert!(caps.contains("edit_pages"));
    }

    #[test]
    fn test_companion_caps_survive_blog_toggle() {
        let mut companions = ProviderRegistry::new();
        companions.register(CompanionExtension::ContactAdvertisements, || -> CapabilitySet {
            ["edit_posts", "edit_advertisements"].into_iter().collect()
        });

        let caps = aggregator(false, companions).compute_capability_set();
        assert!(caps.contains("edit_posts"));
        assert!(caps.contains("edit_advertisements"));
        assert!(!caps.contains("moderate_comments"));
    }

    #[test]
    fn test_repeated_computation_is_stable() {
        let mut companions = ProviderRegistry::new();
        companions.register(CompanionExtension::GravityForms, || -> CapabilitySet {
            ["gform_full_access"].into_iter().collect()
        });
        let aggregator = aggregator(true, companions);

        let first = aggregator.compute_capability_set();
        for _ in 0..5 {
            assert_eq!(aggregator.compute_capability_set(), first);
        }
    }

    #[test]
    fn test_registration_order_does_not_change_result() {
        let seo = || -> CapabilitySet { ["wpseo_manage_options", "read"].into_iter().collect() };
        let forms = || -> CapabilitySet { ["gform_full_access"].into_iter().collect() };

        let mut a = ProviderRegistry::new();
        a.register(CompanionExtension::WordpressSeo, seo).register(CompanionExtension::GravityForms, forms);
        let mut b = ProviderRegistry::new();
        b.register(CompanionExtension::GravityForms, forms).register(CompanionExtension::WordpressSeo, seo);

        assert_eq!(
            aggregator(true, a).compute_capability_set(),
            aggregator(true, b).compute_capability_set()
        );
    }

    #[test]
    fn test_default_filter_applies_before_union() {
        let mut filters = CapabilityFilters::new();
        filters.on_default_caps(|mut caps| {
            caps.remove("export");
            caps
        });
        let aggregator = CapabilityAggregator::new(true, ProviderRegistry::new(), Arc::new(filters));
        assert!(!aggregator.compute_capability_set().contains("export"));
    }

    #[test]
    fn test_from_config_skips_disabled_companions() {
        let mut config = OverlayConfig::default();
        config.companions = vec![
            CompanionConfig {
                extension: CompanionExtension::GravityForms,
                enabled: true,
                capabilities: vec!["gform_full_access".to_string()],
            },
            CompanionConfig {
                extension: CompanionExtension::WordpressSeo,
                enabled: false,
                capabilities: vec!["wpseo_bulk_edit".to_string()],
            },
        ];

        let aggregator = CapabilityAggregator::from_config(&config, Arc::new(CapabilityFilters::new()));
        let caps = aggregator.compute_capability_set();
        assert!(caps.contains("gform_full_access"));
        assert!(!caps.contains("wpseo_bulk_edit"));
        assert!(!aggregator.companions().is_registered(CompanionExtension::WordpressSeo));
    }
}
