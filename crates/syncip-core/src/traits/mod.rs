//! Core traits for the syncip system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpDiscovery`]: Learn the caller's public address
//! - [`HostResolver`]: Look up the published address for a name
//! - [`DnsProvider`]: Read and update the managed A record

pub mod ip_source;
pub mod resolver;
pub mod dns_provider;

pub use ip_source::IpDiscovery;
pub use resolver::HostResolver;
pub use dns_provider::{A_RECORD, DnsProvider, DnsProviderFactory, RecordRef};
