// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare record store for syncip.
//
// - ✅ Zone ID resolved once at startup (or taken from configuration)
// - ✅ One HTTP request per trait call, errors propagated as-is
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error messages for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry or backoff (the next tick is the retry)
// - ❌ NO record creation or deletion
// - ❌ NO caching of record identifiers across cycles
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=A`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use serde::Deserialize;
use syncip_core::config::ProviderConfig;
use syncip_core::traits::{A_RECORD, DnsProvider, DnsProviderFactory, RecordRef};
use syncip_core::{Address, Error, Result};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
}

/// Which API call a failure belongs to; decides the error kind
#[derive(Debug, Clone, Copy)]
enum Stage {
    ZoneLookup,
    RecordLookup,
    Update,
}

impl Stage {
    fn describe(self) -> &'static str {
        match self {
            Stage::ZoneLookup => "Zone lookup",
            Stage::RecordLookup => "Record lookup",
            Stage::Update => "Record update",
        }
    }

    fn error(self, message: String) -> Error {
        match self {
            Stage::ZoneLookup => Error::provider("cloudflare", message),
            Stage::RecordLookup => Error::record_lookup(message),
            Stage::Update => Error::update(message),
        }
    }
}

/// Map a non-success HTTP status to an error for `stage`
fn status_error(stage: Stage, status: reqwest::StatusCode, body: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => {
            let message = format!(
                "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
                status
            );
            if let Stage::ZoneLookup = stage {
                return Error::auth(message);
            }
            message
        }
        404 => format!("{} failed: not found. Status: {}", stage.describe(), status),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Cloudflare server error (transient): {} - {}", status, body),
        _ => format!("{} failed: {} - {}", stage.describe(), status, body),
    };
    stage.error(message)
}

fn api_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cloudflare DNS provider
///
/// Bound to one zone for its whole lifetime. Construct with
/// [`CloudflareProvider::connect`] to look the zone up by name, or with
/// [`CloudflareProvider::new`] when the zone ID is already known.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, record lookups still happen but the update is only
/// logged.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone the managed record lives in
    zone_id: String,

    /// API base URL (overridable for testing)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: look up but never modify
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider for a known zone ID
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token or zone ID is empty, or the HTTP client
    /// cannot be built.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        let zone_id = zone_id.into();
        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider by looking up the zone ID for `zone_name`
    ///
    /// This is the one-time startup lookup; failure here is fatal to the
    /// daemon.
    pub async fn connect(
        api_token: impl Into<String>,
        zone_name: &str,
        dry_run: bool,
    ) -> Result<Self> {
        Self::connect_with_base_url(api_token, zone_name, dry_run, CLOUDFLARE_API_BASE).await
    }

    /// [`CloudflareProvider::connect`] against a custom API base URL
    pub async fn connect_with_base_url(
        api_token: impl Into<String>,
        zone_name: &str,
        dry_run: bool,
        base_url: &str,
    ) -> Result<Self> {
        // Placeholder zone until the lookup below fills it in
        let mut provider = Self::new(api_token, "unresolved", dry_run)?.with_base_url(base_url);
        provider.zone_id = provider.lookup_zone_id(zone_name).await?;
        tracing::info!("Resolved Cloudflare zone {} to ID {}", zone_name, provider.zone_id);
        Ok(provider)
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the zone ID for a zone name
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn lookup_zone_id(&self, zone_name: &str) -> Result<String> {
        let zone_name = zone_name.trim_end_matches('.');
        tracing::debug!("Looking up zone ID for zone: {}", zone_name);

        let url = format!("{}/zones", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("name", zone_name)])
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let zones: Vec<Zone> = Self::parse(Stage::ZoneLookup, response).await?;

        match zones.as_slice() {
            [] => Err(Error::not_found(format!("Zone not found: {}", zone_name))),
            [zone] => Ok(zone.id.clone()),
            _ => Err(Error::provider(
                "cloudflare",
                format!("Multiple zones found for {}", zone_name),
            )),
        }
    }

    /// Check status and envelope, then extract `result`
    async fn parse<T: serde::de::DeserializeOwned>(
        stage: Stage,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(stage, status, &body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| stage.error(format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            return Err(stage.error(format!(
                "{} rejected: {}",
                stage.describe(),
                api_errors(&envelope.errors)
            )));
        }

        envelope
            .result
            .ok_or_else(|| stage.error("Invalid response format: missing result".to_string()))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn list_a_records(&self, fqdn: &str) -> Result<Vec<RecordRef>> {
        tracing::debug!("Listing A records for {}", fqdn);

        let url = format!("{}/zones/{}/dns_records", self.base_url, self.zone_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("name", fqdn), ("type", A_RECORD)])
            .send()
            .await
            .map_err(|e| Error::record_lookup(format!("HTTP request failed: {}", e)))?;

        let records: Vec<DnsRecord> = Self::parse(Stage::RecordLookup, response).await?;

        Ok(records
            .into_iter()
            .filter(|r| r.record_type == A_RECORD)
            .map(|r| RecordRef {
                id: r.id,
                name: r.name,
                record_type: r.record_type,
                content: Address::new(r.content),
            })
            .collect())
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "home.example.com", "content": "203.0.113.9" }
    /// ```
    ///
    /// PATCH leaves TTL and proxy settings untouched.
    async fn update_record(&self, record: &RecordRef, address: &Address) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, self.zone_id, record.id
        );
        let payload = serde_json::json!({
            "type": A_RECORD,
            "name": record.name,
            "content": address.canonical(),
        });

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                payload
            );
            return Ok(());
        }

        tracing::debug!("Updating Cloudflare record {} ({})", record.id, record.name);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::update(format!("HTTP request failed: {}", e)))?;

        let _: serde_json::Value = Self::parse(Stage::Update, response).await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

#[async_trait]
impl DnsProviderFactory for CloudflareFactory {
    async fn create(
        &self,
        config: &ProviderConfig,
        zone_name: &str,
    ) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                dry_run,
            } => {
                if api_token.is_empty() {
                    return Err(Error::config("Cloudflare API token is required"));
                }

                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                let provider = match zone_id {
                    Some(zone_id) => {
                        CloudflareProvider::new(api_token.clone(), zone_id.clone(), *dry_run)?
                    }
                    None => {
                        CloudflareProvider::connect(api_token.clone(), zone_name, *dry_run).await?
                    }
                };
                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
pub fn register(registry: &syncip_core::ProviderRegistry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}
