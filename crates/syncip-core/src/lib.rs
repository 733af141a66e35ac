// # syncip-core
//
// Core library for the syncip dynamic DNS synchronizer.
//
// ## Architecture Overview
//
// - **IpDiscovery**: Trait for learning the caller's public address
// - **HostResolver**: Trait for looking up the currently published address
// - **DnsProvider**: Trait for finding and updating the managed A record
// - **Reconciler**: One discover → resolve → compare → (locate → update) cycle
// - **Scheduler**: Runs the reconciler on a fixed period until shutdown
// - **SyncMetrics**: Atomic cycle counters with Prometheus text rendering
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Stateless Cycles**: Everything is re-derived from DNS on every tick
// 3. **Single-Result Policy**: Zero or several candidates is an error, never a guess
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod address;
pub mod traits;
pub mod reconciler;
pub mod scheduler;
pub mod metrics;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use address::Address;
pub use traits::{DnsProvider, HostResolver, IpDiscovery, RecordRef};
pub use reconciler::{CycleOutcome, Outcome, Reconciler};
pub use scheduler::Scheduler;
pub use metrics::SyncMetrics;
pub use registry::ProviderRegistry;
pub use config::{ProviderConfig, SyncConfig};
pub use error::{Error, Result};
