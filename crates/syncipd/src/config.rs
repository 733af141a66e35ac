//! Command-line and environment configuration for syncipd
//!
//! Every flag can also be set through the environment variable named next to
//! it. Parsing here only turns strings into typed values; semantic checks live
//! in [`SyncConfig::validate`].

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use syncip_core::config::{DNS_PORT, parse_duration};
use syncip_core::{ProviderConfig, SyncConfig};
use syncip_ip_http::DEFAULT_IP_SERVICE_URL;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "syncipd")]
#[command(about = "Keep a DNS A record in sync with this host's public IP", long_about = None)]
#[command(version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Time between sync cycles, e.g. 10s, 5m, 1m30s
    #[arg(long, env = "REFRESH_INTERVAL", default_value = "10s")]
    pub refresh_interval: String,

    /// Service returning the public IP as plain text
    #[arg(long, env = "IP_SERVICE_URL", default_value = DEFAULT_IP_SERVICE_URL)]
    pub ip_service_url: String,

    /// Recursive resolver to query, as IP or IP:port
    #[arg(long, env = "RESOLVER_IP", default_value = "1.1.1.1")]
    pub resolver_ip: String,

    /// Zone holding the managed record
    #[arg(long, env = "DNS_ZONE_NAME")]
    pub dns_zone_name: String,

    /// Record name within the zone; @ is the apex
    #[arg(long, env = "DNS_RECORD_NAME", default_value = "@")]
    pub dns_record_name: String,

    /// Registered DNS provider to use
    #[arg(long, env = "DNS_PROVIDER", default_value = "cloudflare")]
    pub provider: String,

    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub cloudflare_api_token: Option<String>,

    /// Skip the zone lookup when set
    #[arg(long, env = "CLOUDFLARE_ZONE_ID")]
    pub cloudflare_zone_id: Option<String>,

    /// Look records up but never modify them
    #[arg(long, env = "SYNCIP_DRY_RUN")]
    pub dry_run: bool,

    #[arg(long, env = "HEALTHZ_ADDR", default_value = ":8080")]
    pub healthz_addr: String,

    #[arg(long, env = "METRICS_ADDR", default_value = ":58288")]
    pub metrics_addr: String,
}

impl Args {
    /// Build and validate the core configuration
    pub fn into_config(self) -> Result<SyncConfig> {
        let provider = match self.provider.as_str() {
            "cloudflare" => {
                let api_token = self.cloudflare_api_token.unwrap_or_default();
                if api_token.trim().is_empty() {
                    bail!(
                        "CLOUDFLARE_API_TOKEN is required for the cloudflare provider. \
                        Set it via: export CLOUDFLARE_API_TOKEN=your_token"
                    );
                }
                ProviderConfig::Cloudflare {
                    api_token,
                    zone_id: self.cloudflare_zone_id.filter(|id| !id.is_empty()),
                    dry_run: self.dry_run,
                }
            }
            other => ProviderConfig::Custom {
                factory: other.to_string(),
                config: serde_json::json!({ "dry_run": self.dry_run }),
            },
        };

        let mut config = SyncConfig::new(self.dns_zone_name, provider)
            .with_record_name(self.dns_record_name)
            .with_interval(
                parse_duration(&self.refresh_interval).context("invalid REFRESH_INTERVAL")?,
            );
        config.ip_service_url = self.ip_service_url;
        config.resolver_addr = parse_resolver_addr(&self.resolver_ip)?;
        config.healthz_addr = parse_bind_addr(&self.healthz_addr).context("invalid HEALTHZ_ADDR")?;
        config.metrics_addr = parse_bind_addr(&self.metrics_addr).context("invalid METRICS_ADDR")?;

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => bail!(
            "LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Resolver address; a bare IP gets port 53
pub fn parse_resolver_addr(input: &str) -> Result<SocketAddr> {
    let input = input.trim();
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let ip: IpAddr = input
        .parse()
        .with_context(|| format!("RESOLVER_IP '{}' is not an IP address", input))?;
    Ok(SocketAddr::new(ip, DNS_PORT))
}

/// Listen address; `:port` binds all interfaces
pub fn parse_bind_addr(input: &str) -> Result<SocketAddr> {
    let input = input.trim();
    if let Some(port) = input.strip_prefix(':') {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid port in '{}'", input))?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }
    input
        .parse()
        .with_context(|| format!("'{}' is not a socket address", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["syncipd", "--dns-zone-name", "example.com"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_produce_a_valid_config() {
        let config = args(&["--cloudflare-api-token", "token"]).into_config().unwrap();

        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.ip_service_url, "https://api.ipify.org");
        assert_eq!(config.resolver_addr, "1.1.1.1:53".parse().unwrap());
        assert_eq!(config.fqdn(), "example.com");
        assert_eq!(config.healthz_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.metrics_addr, "0.0.0.0:58288".parse().unwrap());
        assert!(matches!(
            config.provider,
            ProviderConfig::Cloudflare { zone_id: None, dry_run: false, .. }
        ));
    }

    #[test]
    fn flags_override_defaults() {
        let config = args(&[
            "--cloudflare-api-token",
            "token",
            "--dns-record-name",
            "home",
            "--refresh-interval",
            "1m30s",
            "--resolver-ip",
            "9.9.9.9:5353",
            "--healthz-addr",
            "127.0.0.1:9000",
            "--cloudflare-zone-id",
            "zone-123",
            "--dry-run",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.fqdn(), "home.example.com");
        assert_eq!(config.interval, Duration::from_secs(90));
        assert_eq!(config.resolver_addr, "9.9.9.9:5353".parse().unwrap());
        assert_eq!(config.healthz_addr, "127.0.0.1:9000".parse().unwrap());
        assert!(matches!(
            config.provider,
            ProviderConfig::Cloudflare {
                zone_id: Some(ref id),
                dry_run: true,
                ..
            } if id == "zone-123"
        ));
    }

    #[test]
    fn zone_name_is_required() {
        assert!(Args::try_parse_from(["syncipd"]).is_err());
    }

    #[test]
    fn cloudflare_requires_a_token() {
        assert!(args(&[]).into_config().is_err());
        assert!(args(&["--cloudflare-api-token", " "]).into_config().is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        let base = ["--cloudflare-api-token", "token"];
        for extra in [
            ["--refresh-interval", "0s"],
            ["--refresh-interval", "soon"],
            ["--resolver-ip", "not-an-ip"],
            ["--metrics-addr", ":http"],
            ["--ip-service-url", "ftp://example.com"],
        ] {
            let mut argv = base.to_vec();
            argv.extend_from_slice(&extra);
            assert!(args(&argv).into_config().is_err(), "accepted {:?}", extra);
        }
    }

    #[test]
    fn other_providers_go_through_the_registry() {
        let config = args(&["--provider", "route53"]).into_config().unwrap();
        assert_eq!(config.provider.type_name(), "route53");
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn bind_addresses() {
        assert_eq!(parse_bind_addr(":8080").unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(parse_bind_addr("[::1]:80").unwrap(), "[::1]:80".parse().unwrap());
        assert!(parse_bind_addr("8080").is_err());
    }

    #[test]
    fn resolver_addresses() {
        assert_eq!(parse_resolver_addr("8.8.8.8").unwrap(), "8.8.8.8:53".parse().unwrap());
        assert_eq!(parse_resolver_addr("2606:4700::1111").unwrap().port(), 53);
    }
}
