// # IP Discovery Trait
//
// Defines the interface for learning the caller's externally visible address.
//
// ## Implementations
//
// - HTTP "what is my IP" services: `syncip-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use syncip_core::IpDiscovery;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let discovery = /* IpDiscovery implementation */;
//     let actual = discovery.current_ip().await?;
//     println!("public address: {}", actual);
//     Ok(())
// }
// ```

use crate::address::Address;
use async_trait::async_trait;

/// Trait for IP discovery implementations
///
/// # Trust Level: Untrusted
///
/// Discovery clients are single-shot observers:
///
/// - ✅ Issue exactly one request per call
/// - ✅ Return the address or a [`crate::Error::Discovery`]
/// - ❌ Retry, cache, or sleep (the scheduler owns timing; the next tick is the retry)
/// - ❌ Decide whether DNS needs updating (owned by `Reconciler`)
#[async_trait]
pub trait IpDiscovery: Send + Sync {
    /// Fetch the current externally visible address
    ///
    /// # Returns
    ///
    /// - `Ok(Address)`: The address text as reported by the service
    /// - `Err(Error::Discovery)`: Transport failure, non-success status, or unreadable body
    async fn current_ip(&self) -> Result<Address, crate::Error>;

    /// Name of the discovery mechanism (for logging)
    fn source_name(&self) -> &'static str {
        "unknown"
    }
}
