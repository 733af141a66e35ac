// # DNS Provider Trait
//
// Defines the interface for reading and updating the managed "A" record via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `syncip-provider-cloudflare` crate
// - Future: Route53, DigitalOcean, etc.
//
// ## Usage
//
// ```rust,ignore
// use syncip_core::{Address, DnsProvider};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let record = provider.find_a_record("home.example.com").await?;
//     provider.update_record(&record, &Address::from("203.0.113.9")).await?;
//
//     Ok(())
// }
// ```

use crate::address::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record type managed by syncip
pub const A_RECORD: &str = "A";

/// Reference to an existing DNS record at the provider
///
/// Obtained by lookup immediately before use and never cached across cycles,
/// since the record may be edited out-of-band between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    /// Provider-specific record identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type (always "A")
    pub record_type: String,
    /// Content currently stored at the provider
    pub content: Address,
}

impl RecordRef {
    /// Create a reference to an A record
    pub fn a(id: impl Into<String>, name: impl Into<String>, content: impl Into<Address>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: A_RECORD.to_string(),
            content: content.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the next tick is the retry)
/// - ❌ Spawn tasks (violates shutdown determinism)
/// - ❌ Cache record identifiers between calls
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Create or delete records
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the A records named `fqdn` in the managed zone
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<RecordRef>)`: Every matching record, possibly none
    /// - `Err(Error::RecordLookup)`: If the listing request failed
    async fn list_a_records(&self, fqdn: &str) -> Result<Vec<RecordRef>, crate::Error>;

    /// Find the single A record named `fqdn`
    ///
    /// Exactly one match is required so that the following update targets an
    /// unambiguous record.
    ///
    /// # Returns
    ///
    /// - `Ok(RecordRef)`: The one matching record
    /// - `Err(Error::RecordLookup)`: Listing failed, nothing matched, or several matched
    async fn find_a_record(&self, fqdn: &str) -> Result<RecordRef, crate::Error> {
        let mut records = self.list_a_records(fqdn).await?;
        match records.len() {
            0 => Err(crate::Error::record_lookup(format!(
                "no A records found for {}",
                fqdn
            ))),
            1 => Ok(records.remove(0)),
            _ => Err(crate::Error::record_lookup(format!(
                "multiple A records found for {}",
                fqdn
            ))),
        }
    }

    /// Overwrite the content of `record` with `address`
    ///
    /// The record keeps type "A" and its name. This is the only state-mutating
    /// external call in the system.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the new content
    /// - `Err(Error::Update)`: If the update failed
    async fn update_record(&self, record: &RecordRef, address: &Address)
    -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
///
/// Construction is async because providers may need to resolve their zone
/// identifier before the first cycle.
#[async_trait]
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    /// - `zone_name`: The managed zone
    async fn create(
        &self,
        config: &crate::config::ProviderConfig,
        zone_name: &str,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
