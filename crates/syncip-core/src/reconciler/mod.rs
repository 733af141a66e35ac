//! Reconciler: one compare-and-update cycle
//!
//! ## Cycle
//!
//! ```text
//! Discover ──► Resolve ──► Compare ──equal──► NoChange
//!    │            │           │
//!    ✗            ✗        differ
//!    │            │           ▼
//!  Failed       Failed     Locate ──► Update ──► Updated
//!                             │          │
//!                             ✗          ✗
//!                           Failed     Failed
//! ```
//!
//! The steps run strictly in order and the first failure ends the cycle with
//! that step's error. The record is never touched unless discovery and
//! resolution both succeeded and disagree. Nothing is carried over from one
//! cycle to the next.

use crate::address::Address;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, HostResolver, IpDiscovery};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Published address already matches the discovered one
    NoChange {
        /// The address both sides agree on
        address: Address,
    },

    /// The A record was rewritten
    Updated {
        /// Address the resolver returned before the update
        previous: Address,
        /// Address written to the record
        current: Address,
        /// Provider identifier of the updated record
        record_id: String,
    },
}

/// Flat classification of a cycle, for counters and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    NoChange,
    Updated,
    Failed,
}

impl Outcome {
    pub fn of(result: &Result<CycleOutcome>) -> Self {
        match result {
            Ok(CycleOutcome::NoChange { .. }) => Outcome::NoChange,
            Ok(CycleOutcome::Updated { .. }) => Outcome::Updated,
            Err(_) => Outcome::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NoChange => "no-change",
            Outcome::Updated => "updated",
            Outcome::Failed => "failed",
        }
    }
}

/// Orchestrates discovery, resolution and the provider for one cycle
///
/// Collaborators are passed in explicitly; the reconciler owns no global
/// state and can be cloned cheaply.
#[derive(Clone)]
pub struct Reconciler {
    /// Source of the actual public address
    discovery: Arc<dyn IpDiscovery>,

    /// Lookup of the currently published address
    resolver: Arc<dyn HostResolver>,

    /// Record store holding the managed A record
    provider: Arc<dyn DnsProvider>,

    /// Immutable configuration
    config: Arc<SyncConfig>,
}

impl Reconciler {
    pub fn new(
        discovery: Arc<dyn IpDiscovery>,
        resolver: Arc<dyn HostResolver>,
        provider: Arc<dyn DnsProvider>,
        config: Arc<SyncConfig>,
    ) -> Self {
        Self {
            discovery,
            resolver,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one reconcile cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome::NoChange)`: Addresses match, no provider call was made
    /// - `Ok(CycleOutcome::Updated)`: Exactly one update was sent
    /// - `Err(Error)`: The error of the first failing step
    pub async fn reconcile(&self) -> Result<CycleOutcome> {
        let fqdn = self.config.fqdn();

        let actual = self.discovery.current_ip().await?;
        debug!(
            "Retrieved current IP via {}: {}",
            self.discovery.source_name(),
            actual
        );

        let published = self.resolver.resolve_host(&fqdn).await?;
        debug!("Retrieved IP for FQDN {}: {}", fqdn, published);

        if published == actual {
            info!("No IP change for {} ({})", fqdn, actual);
            return Ok(CycleOutcome::NoChange { address: actual });
        }

        let record = self.provider.find_a_record(&fqdn).await?;
        debug!(
            "Found A record {} for {} via {}",
            record.id,
            fqdn,
            self.provider.provider_name()
        );

        info!(
            "Updating IP address for FQDN {}: {} -> {}",
            fqdn, published, actual
        );
        self.provider.update_record(&record, &actual).await?;
        info!("IP updated successfully for {}", fqdn);

        Ok(CycleOutcome::Updated {
            previous: published,
            current: actual,
            record_id: record.id,
        })
    }
}
