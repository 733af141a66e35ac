//! Plugin-based provider registry
//!
//! DNS providers register a factory under their type name so the daemon can
//! build whichever one the configuration names without an if-else chain.
//!
//! ## Registration
//!
//! ```rust,ignore
//! // In the syncip-provider-cloudflare crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("cloudflare", Box::new(CloudflareFactory));
//! }
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of DNS provider factories keyed by provider type name
///
/// ## Thread Safety
///
/// Interior mutability with `RwLock`: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), Arc::from(factory));
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error::Config)`: If the provider type is not registered
    /// - `Err(Error)`: Whatever the factory reports (e.g. zone lookup failure)
    pub async fn create_provider(
        &self,
        config: &ProviderConfig,
        zone_name: &str,
    ) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();

        // Release the lock before awaiting the factory
        let factory = {
            let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
            providers
                .get(provider_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?
        };

        factory.create(config, zone_name).await
    }

    /// List all registered provider types, sorted
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }
}
