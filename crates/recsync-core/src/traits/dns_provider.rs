// # DNS Provider Client Trait
//
// Defines the transport-level interface the engine uses to read and mutate
// records in a provider's hosted zone.
//
// ## Implementations
//
// - Cloudflare: `recsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use recsync_core::DnsProviderClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProviderClient implementation */;
//
//     let zone = provider.get_zone_id("example.com").await?;
//     if let Some(record) = provider.get_record(&zone, "A", "www.example.com").await? {
//         provider.delete_record(&zone, &record.id).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DesiredRecord;

/// Provider-assigned identifier of a hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a provider zone identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as it currently exists at the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// Current content, the only field compared against the desired record
    pub content: String,
    /// TTL in seconds
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Whether the record is proxied
    #[serde(default)]
    pub proxied: Option<bool>,
    /// Priority (MX, SRV, URI)
    #[serde(default)]
    pub priority: Option<u16>,
}

impl fmt::Display for ObservedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} (TTL: {}, Proxied: {})",
            self.record_type,
            self.name,
            self.content,
            self.ttl.map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.proxied.unwrap_or(false)
        )
    }
}

/// Trait for DNS provider clients
///
/// Implementations are thin transport wrappers: one remote call per method,
/// no retries, no caching, no decision about whether a change is needed.
/// All of that belongs to [`crate::RecordSyncEngine`].
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Errors
///
/// Any failed call should surface as [`crate::Error::Transport`] carrying the
/// HTTP status (when one was received) and the provider's error text.
#[async_trait]
pub trait DnsProviderClient: Send + Sync {
    /// Resolve the hosted zone for a domain
    async fn get_zone_id(&self, domain: &str) -> Result<ZoneId, crate::Error>;

    /// Fetch the record matching `(record_type, name)`, if any
    ///
    /// Only a record whose type and name both equal the request counts.
    /// When several match, the first one wins.
    async fn get_record(
        &self,
        zone_id: &ZoneId,
        record_type: &str,
        name: &str,
    ) -> Result<Option<ObservedRecord>, crate::Error>;

    /// Create a record from its desired state
    async fn create_record(
        &self,
        zone_id: &ZoneId,
        record: &DesiredRecord,
    ) -> Result<(), crate::Error>;

    /// Overwrite an existing record with the desired state
    ///
    /// Every attribute is re-sent, not only the content.
    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &str,
        record: &DesiredRecord,
    ) -> Result<(), crate::Error>;

    /// Delete a record by identifier
    async fn delete_record(&self, zone_id: &ZoneId, record_id: &str) -> Result<(), crate::Error>;

    /// List every record in the zone
    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<ObservedRecord>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
