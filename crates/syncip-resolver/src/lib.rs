// # Host Resolver
//
// Resolves the managed FQDN through one explicitly configured recursive
// resolver, bypassing the host's resolv.conf, hosts file and any cache.
//
// ## Nameserver
//
// The resolver endpoint is part of the configuration (default 1.1.1.1:53).
// Answers must match what public resolvers see for the name.
//
// ## Timeouts
//
// Each query gets one attempt with a short timeout (1s by default). A dead
// resolver fails the cycle quickly instead of holding it.

use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver, TokioResolver};
use syncip_core::traits::HostResolver;
use syncip_core::{Address, Error, Result};

use std::net::SocketAddr;
use std::time::Duration;

/// Default per-query timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Hostname resolver using hickory-resolver against a single nameserver
pub struct HickoryHostResolver {
    nameserver: SocketAddr,
    resolver: TokioResolver,
}

impl HickoryHostResolver {
    /// Resolver querying `nameserver` with the default timeout
    pub fn new(nameserver: SocketAddr) -> Self {
        Self::with_timeout(nameserver, DEFAULT_TIMEOUT)
    }

    /// Resolver querying `nameserver` with a custom per-query timeout
    pub fn with_timeout(nameserver: SocketAddr, timeout: Duration) -> Self {
        let group =
            NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        let resolver = Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build();

        Self {
            nameserver,
            resolver,
        }
    }

    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }
}

#[async_trait::async_trait]
impl HostResolver for HickoryHostResolver {
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<Address>> {
        // Absolute name: no search-domain expansion
        let query = if fqdn.ends_with('.') {
            fqdn.to_string()
        } else {
            format!("{}.", fqdn)
        };

        match self.resolver.lookup_ip(query.as_str()).await {
            Ok(lookup) => {
                let addresses: Vec<Address> = lookup.iter().map(Address::from).collect();
                tracing::debug!(
                    "Resolved {} via {}: {:?}",
                    fqdn,
                    self.nameserver,
                    addresses
                );
                Ok(addresses)
            }
            Err(e) if e.is_no_records_found() => {
                tracing::debug!("No address records for {} via {}", fqdn, self.nameserver);
                Ok(Vec::new())
            }
            Err(e) => Err(Error::resolution(format!(
                "failed to lookup IP for {}: {}",
                fqdn, e
            ))),
        }
    }
}
