// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of
// `recsync_core::DnsProviderClient`.
//
// ## Scope
//
// - One HTTP request per trait call (paged listing aside)
// - Every failure surfaces as `Error::Transport { status, body }`
// - HTTP timeout configured per client (default 30 seconds)
// - Dry-run mode: lookups are real, mutations are logged and skipped
// - Zone auto-discovery or an explicit zone ID
// - No retries, no caching, no diffing (owned by `RecordSyncEngine`)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use recsync_core::traits::{DnsProviderClient, ObservedRecord, ZoneId};
use recsync_core::{DesiredRecord, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing a zone
const LIST_PAGE_SIZE: u32 = 100;

/// Construction options for [`CloudflareProvider`]
#[derive(Debug, Clone)]
pub struct CloudflareOptions {
    /// Zone ID to use instead of looking one up by domain
    pub zone_id: Option<String>,

    /// Perform lookups but skip create/update/delete
    pub dry_run: bool,

    /// Per-request HTTP timeout
    pub timeout: Duration,

    /// API base URL (overridden in tests)
    pub base_url: String,
}

impl Default for CloudflareOptions {
    fn default() -> Self {
        Self {
            zone_id: None,
            dry_run: false,
            timeout: DEFAULT_HTTP_TIMEOUT,
            base_url: CLOUDFLARE_API_BASE.to_string(),
        }
    }
}

/// Cloudflare DNS provider client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record lookup, listing)
/// - Log the intended POST / PUT / DELETE
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Pre-configured zone ID
    zone_id: Option<String>,

    /// Base URL without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip mutations
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

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

/// Body sent on create and update
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
}

impl<'a> From<&'a DesiredRecord> for RecordPayload<'a> {
    fn from(record: &'a DesiredRecord) -> Self {
        Self {
            record_type: &record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
            priority: record.priority,
            proxied: record.proxied,
        }
    }
}

/// Join envelope errors into one line, e.g. "[9109] Invalid access token"
fn error_text(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn http_error(err: reqwest::Error) -> Error {
    Error::transport(
        err.status().map(|s| s.as_u16()),
        format!("HTTP request failed: {}", err),
    )
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `options`: Zone override, dry-run flag, timeout and base URL
    ///
    /// # Errors
    ///
    /// - [`Error::AuthCredentialsMissing`] if the token is empty
    /// - [`Error::Config`] if the HTTP client cannot be built
    pub fn new(api_token: impl Into<String>, options: CloudflareOptions) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::AuthCredentialsMissing);
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if options.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_token,
            zone_id: options.zone_id,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            client,
            dry_run: options.dry_run,
        })
    }

    /// Whether mutations are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn records_url(&self, zone_id: &ZoneId) -> String {
        self.url(&format!("/zones/{}/dns_records", zone_id))
    }

    fn record_url(&self, zone_id: &ZoneId, record_id: &str) -> String {
        self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id))
    }

    /// Send a request and unwrap the v4 envelope
    ///
    /// Non-2xx statuses and `success: false` both become
    /// `Error::Transport` carrying the provider's error text.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        let parsed: std::result::Result<ApiResponse<T>, _> = serde_json::from_str(&body);

        if !status.is_success() {
            let text = match &parsed {
                Ok(envelope) if !envelope.errors.is_empty() => error_text(&envelope.errors),
                _ => body,
            };
            tracing::debug!("Cloudflare returned {}: {}", status, text);
            return Err(Error::transport(Some(status.as_u16()), text));
        }

        let envelope = parsed.map_err(|e| {
            Error::transport(
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })?;

        if !envelope.success {
            return Err(Error::transport(
                Some(status.as_u16()),
                error_text(&envelope.errors),
            ));
        }

        Ok(envelope)
    }

    /// Fetch one page of a zone's records
    async fn list_page(
        &self,
        zone_id: &ZoneId,
        page: u32,
    ) -> Result<(Vec<ObservedRecord>, Option<ResultInfo>)> {
        let request = self.client.get(self.records_url(zone_id)).query(&[
            ("per_page", LIST_PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ]);
        let envelope: ApiResponse<Vec<ObservedRecord>> = self.send(request).await?;
        Ok((envelope.result.unwrap_or_default(), envelope.result_info))
    }
}

#[async_trait]
impl DnsProviderClient for CloudflareProvider {
    /// Resolve the zone for a domain
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn get_zone_id(&self, domain: &str) -> Result<ZoneId> {
        if let Some(ref zone_id) = self.zone_id {
            tracing::debug!("Using pre-configured zone ID");
            return Ok(ZoneId::new(zone_id.as_str()));
        }

        tracing::debug!("Looking up zone ID for domain: {}", domain);

        let request = self
            .client
            .get(self.url("/zones"))
            .query(&[("name", domain)]);
        let envelope: ApiResponse<Vec<Zone>> = self.send(request).await?;

        let zone = envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", domain)))?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(ZoneId::new(zone.id))
    }

    async fn get_record(
        &self,
        zone_id: &ZoneId,
        record_type: &str,
        name: &str,
    ) -> Result<Option<ObservedRecord>> {
        tracing::debug!("Looking up record: {} (type: {})", name, record_type);

        let request = self
            .client
            .get(self.records_url(zone_id))
            .query(&[("type", record_type), ("name", name)]);
        let envelope: ApiResponse<Vec<ObservedRecord>> = self.send(request).await?;

        // The API may ignore an empty filter; only an exact match counts
        Ok(envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|r| {
                r.record_type.eq_ignore_ascii_case(record_type) && r.name.eq_ignore_ascii_case(name)
            }))
    }

    async fn create_record(&self, zone_id: &ZoneId, record: &DesiredRecord) -> Result<()> {
        let payload = RecordPayload::from(record);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                self.records_url(zone_id),
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        let request = self.client.post(self.records_url(zone_id)).json(&payload);
        let _: ApiResponse<serde_json::Value> = self.send(request).await?;

        tracing::debug!("Cloudflare record created: {}", record);
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &str,
        record: &DesiredRecord,
    ) -> Result<()> {
        let payload = RecordPayload::from(record);
        let url = self.record_url(zone_id, record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        let request = self.client.put(url).json(&payload);
        let _: ApiResponse<serde_json::Value> = self.send(request).await?;

        tracing::debug!("Cloudflare record updated: {} ({})", record, record_id);
        Ok(())
    }

    async fn delete_record(&self, zone_id: &ZoneId, record_id: &str) -> Result<()> {
        let url = self.record_url(zone_id, record_id);

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send DELETE request to {}", url);
            return Ok(());
        }

        let _: ApiResponse<serde_json::Value> = self.send(self.client.delete(url)).await?;

        tracing::debug!("Cloudflare record deleted: {}", record_id);
        Ok(())
    }

    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<ObservedRecord>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let (batch, info) = self.list_page(zone_id, page).await?;
            records.extend(batch);

            match info {
                Some(info) if info.page.max(page) < info.total_pages => page += 1,
                _ => break,
            }
        }

        tracing::debug!("Listed {} record(s) in zone {}", records.len(), zone_id);
        Ok(records)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
