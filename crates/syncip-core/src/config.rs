//! Configuration types for the syncip system
//!
//! The daemon builds a [`SyncConfig`] once at startup; the core treats it as
//! immutable from then on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Record name meaning "the zone apex"
pub const APEX: &str = "@";

/// Default port for the recursive resolver
pub const DNS_PORT: u16 = 53;

/// Main syncip configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Time between reconcile cycles
    #[serde(with = "duration_secs")]
    pub interval: Duration,

    /// URL of the IP discovery service
    pub ip_service_url: String,

    /// Recursive resolver used instead of the system resolver
    pub resolver_addr: SocketAddr,

    /// Timeout for a single resolver query
    #[serde(with = "duration_secs", default = "default_resolver_timeout")]
    pub resolver_timeout: Duration,

    /// Timeout for HTTP requests to the discovery service
    #[serde(with = "duration_secs", default = "default_http_timeout")]
    pub http_timeout: Duration,

    /// Managed zone (e.g. "example.com")
    pub zone_name: String,

    /// Record name relative to the zone; `@` is the apex
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Bind address of the health endpoint
    pub healthz_addr: SocketAddr,

    /// Bind address of the metrics endpoint
    pub metrics_addr: SocketAddr,
}

impl SyncConfig {
    /// Create a configuration for `zone_name` with defaults everywhere else
    pub fn new(zone_name: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            interval: Duration::from_secs(10),
            ip_service_url: "https://api.ipify.org".to_string(),
            resolver_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), DNS_PORT),
            resolver_timeout: default_resolver_timeout(),
            http_timeout: default_http_timeout(),
            zone_name: zone_name.into(),
            record_name: default_record_name(),
            provider,
            healthz_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080),
            metrics_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 58288),
        }
    }

    /// Set the record name
    pub fn with_record_name(mut self, record_name: impl Into<String>) -> Self {
        self.record_name = record_name.into();
        self
    }

    /// Set the reconcile interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Fully-qualified domain name of the managed record
    ///
    /// Recomputed on every call. The apex sentinel (or an empty record name)
    /// maps to the zone itself.
    pub fn fqdn(&self) -> String {
        let zone = self.zone_name.trim_end_matches('.');
        let record = self.record_name.trim_end_matches('.');

        if record.is_empty() || record == APEX {
            return zone.to_string();
        }
        if record == zone || record.ends_with(&format!(".{}", zone)) {
            return record.to_string();
        }
        format!("{}.{}", record, zone)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_name.trim().is_empty() {
            return Err(crate::Error::config("DNS zone name is required"));
        }
        if self.interval.is_zero() {
            return Err(crate::Error::config("Refresh interval must be > 0"));
        }
        if self.resolver_timeout.is_zero() {
            return Err(crate::Error::config("Resolver timeout must be > 0"));
        }
        if self.ip_service_url.is_empty() {
            return Err(crate::Error::config("IP service URL cannot be empty"));
        }
        if !self.ip_service_url.starts_with("https://")
            && !self.ip_service_url.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "IP service URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_service_url
            )));
        }

        self.provider.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Zone ID (optional, looked up by zone name when absent)
        zone_id: Option<String>,
        /// Perform lookups but skip the update
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

// Keeps the API token out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                zone_id, dry_run, ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_id", zone_id)
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

/// Parse a duration such as `10s`, `500ms`, `5m`, `1h` or `1m30s`
///
/// Units: `ms`, `s`, `m`, `h`. Every number needs a unit.
pub fn parse_duration(input: &str) -> Result<Duration, crate::Error> {
    let text = input.trim();
    if text.is_empty() {
        return Err(crate::Error::config("Duration cannot be empty"));
    }

    let invalid = || crate::Error::config(format!("Invalid duration: {}", input));
    let mut total = Duration::ZERO;
    let mut rest = text;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let step = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(invalid)?),
            "h" => Duration::from_secs(value.checked_mul(3600).ok_or_else(invalid)?),
            _ => return Err(invalid()),
        };
        total = total.checked_add(step).ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}

fn default_record_name() -> String {
    APEX.to_string()
}

fn default_resolver_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
