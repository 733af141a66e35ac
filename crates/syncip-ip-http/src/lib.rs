// # HTTP IP Discovery
//
// This crate provides the HTTP-based IP discovery client for syncip.
//
// ## Protocol
//
// One unauthenticated GET to a "what is my IP" service such as
// `https://api.ipify.org`. The response body is the literal address text, no
// JSON or XML envelope. The body is returned as-is; comparison in the core
// tolerates surrounding whitespace.
//
// ## Constraints
//
// - One request per call, no retry, no caching (the next tick is the retry)
// - Explicit request timeout so an unresponsive service cannot hang a cycle

use syncip_core::traits::IpDiscovery;
use syncip_core::{Address, Error, Result};

use std::time::Duration;

/// Default IP discovery service
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP discovery client
pub struct HttpIpDiscovery {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpDiscovery {
    /// Create a discovery client for `url` with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a discovery client with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl IpDiscovery for HttpIpDiscovery {
    async fn current_ip(&self) -> Result<Address> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::discovery(format!("failed to get current IP: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::discovery(format!(
                "failed to get current IP: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::discovery(format!("failed to read current IP: {}", e)))?;

        Ok(Address::new(body))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
