// # Host Resolver Trait
//
// Looks up what the world currently sees for the managed FQDN, through an
// explicitly chosen recursive resolver rather than the host's default one.
//
// ## Implementations
//
// - hickory-resolver against a fixed nameserver: `syncip-resolver` crate

use crate::address::Address;
use async_trait::async_trait;

/// Trait for hostname lookups
///
/// Implementations only list what the resolver returned. The single-result
/// policy lives in [`HostResolver::resolve_host`] so that every resolver
/// enforces it the same way.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Return every address published for `fqdn`
    ///
    /// A name that exists with no address records, or does not exist at all,
    /// yields an empty list rather than an error.
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<Address>, crate::Error>;

    /// Resolve `fqdn` to exactly one address
    ///
    /// Zero or several addresses are both errors. The system refuses to pick
    /// one of several candidates.
    async fn resolve_host(&self, fqdn: &str) -> Result<Address, crate::Error> {
        let mut addresses = self.lookup_host(fqdn).await?;
        match addresses.len() {
            0 => Err(crate::Error::resolution(format!(
                "failed to lookup IP for {}: no address returned",
                fqdn
            ))),
            1 => Ok(addresses.remove(0)),
            n => Err(crate::Error::resolution(format!(
                "failed to lookup IP for {}: ambiguous result ({} addresses returned)",
                fqdn, n
            ))),
        }
    }
}
