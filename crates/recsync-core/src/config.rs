//! Configuration types for record reconciliation
//!
//! This module defines all configuration structures used throughout the crate.
//! Keys are camelCase so a config file reads like the deployment descriptor it
//! usually sits next to:
//!
//! ```json
//! {
//!   "domain": "example.com",
//!   "auth": { "apiToken": "..." },
//!   "stackName": "my-service-prod",
//!   "outputs": { "type": "file", "path": "stack-outputs.json" },
//!   "records": [
//!     { "type": "CNAME", "name": "cdn.example.com", "content": "#{cf:DistributionDomain}", "ttl": 300 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// When false, callers should skip the run entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Domain whose hosted zone holds the records
    #[serde(default)]
    pub domain: String,

    /// Provider credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Stack whose outputs back `#{cf:KEY}` placeholders
    ///
    /// Empty means "the first stack the lookup knows about".
    #[serde(default)]
    pub stack_name: Option<String>,

    /// Where stack outputs come from
    #[serde(default)]
    pub outputs: OutputsConfig,

    /// Desired records, in processing order
    #[serde(default)]
    pub records: Vec<DesiredRecord>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a new configuration for a domain and token
    pub fn new(domain: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            enabled: true,
            domain: domain.into(),
            auth: AuthConfig {
                api_token: api_token.into(),
            },
            stack_name: None,
            outputs: OutputsConfig::default(),
            records: Vec::new(),
            engine: EngineConfig::default(),
        }
    }

    /// Add a desired record
    pub fn with_record(mut self, record: DesiredRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Set the stack name used for placeholder resolution
    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    /// Parse a configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            records = config.records.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// The token check comes first: a missing token must fail before anything
    /// else is looked at.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;

        if self.domain.trim().is_empty() {
            return Err(Error::config("domain is required"));
        }

        self.outputs.validate()?;
        self.engine.validate()?;

        Ok(())
    }

    /// Stack name to pass to the output lookup
    pub fn stack(&self) -> &str {
        self.stack_name.as_deref().unwrap_or_default()
    }
}

fn default_enabled() -> bool {
    true
}

/// Provider credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Cloudflare API token with Zone:DNS:Edit permissions
    #[serde(default)]
    pub api_token: String,
}

impl AuthConfig {
    /// Fail with `AuthCredentialsMissing` unless a token is present
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::AuthCredentialsMissing);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

/// Stack output source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputsConfig {
    /// No outputs available; any placeholder fails to resolve
    #[default]
    None,

    /// Outputs read from a `describe-stacks` style JSON document
    File {
        /// Path to the document
        path: PathBuf,
    },

    /// Outputs given inline, keyed by stack then output key
    Static {
        /// stack name -> output key -> value
        values: HashMap<String, HashMap<String, String>>,
    },
}

impl OutputsConfig {
    /// Validate the outputs configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            OutputsConfig::File { path } if path.as_os_str().is_empty() => {
                Err(Error::config("outputs.path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// A record as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Record type (A, AAAA, CNAME, TXT, MX, ...); not checked locally
    #[serde(rename = "type", default)]
    pub record_type: String,

    /// Fully qualified record name
    #[serde(default)]
    pub name: String,

    /// Literal value or a `#{cf:KEY}` placeholder
    #[serde(default)]
    pub content: String,

    /// TTL in seconds; 1 means "automatic"
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Priority (MX, SRV, URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    /// Whether the record is proxied by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}

impl DesiredRecord {
    /// Create a new record with automatic TTL
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
            content: content.into(),
            ttl: default_ttl(),
            priority: None,
            proxied: None,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the proxied flag
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = Some(proxied);
        self
    }
}

impl std::fmt::Display for DesiredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.record_type, self.name)
    }
}

fn default_ttl() -> u32 {
    1
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound for each remote call (in seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Perform lookups but skip create/update/delete calls
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(Error::config(format!(
                "engine.requestTimeoutSecs must be between 1 and 300 seconds. Got: {}",
                self.request_timeout_secs
            )));
        }
        Ok(())
    }

    /// Per-call deadline
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            dry_run: false,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FULL: &str = r##"{
        "domain": "example.com",
        "auth": { "apiToken": "secret-token" },
        "stackName": "svc-prod",
        "outputs": { "type": "file", "path": "outputs.json" },
        "records": [
            { "type": "A", "name": "www.example.com", "content": "1.1.1.1", "ttl": 300 },
            { "type": "MX", "name": "example.com", "content": "mail.example.com", "priority": 10, "proxied": false },
            { "type": "CNAME", "name": "cdn.example.com", "content": "#{cf:CdnDomain}" }
        ],
        "engine": { "requestTimeoutSecs": 10 }
    }"##;

    #[test]
    fn test_parse_full_document() {
        let config = SyncConfig::from_json_str(FULL).unwrap();

        assert!(config.enabled);
        assert_eq!(config.domain, "example.com");
        assert_eq!(config.auth.api_token, "secret-token");
        assert_eq!(config.stack(), "svc-prod");
        assert_eq!(config.records.len(), 3);
        assert_eq!(config.records[0].record_type, "A");
        assert_eq!(config.records[0].ttl, 300);
        assert_eq!(config.records[1].priority, Some(10));
        assert_eq!(config.records[1].proxied, Some(false));
        assert_eq!(config.records[2].ttl, 1, "ttl defaults to automatic");
        assert_eq!(config.engine.request_timeout_secs, 10);
        assert!(!config.engine.dry_run);
        assert!(matches!(config.outputs, OutputsConfig::File { .. }));
        config.validate().unwrap();
    }

    #[test]
    fn test_record_without_type_still_loads() {
        let config = SyncConfig::from_json_str(
            r#"{
                "domain": "example.com",
                "auth": { "apiToken": "t" },
                "records": [
                    { "name": "untyped.example.com", "content": "1.1.1.1" },
                    { "type": "A", "name": "www.example.com", "content": "1.1.1.1" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.records.len(), 2);
        assert_eq!(config.records[0].record_type, "");
        assert_eq!(config.records[1].record_type, "A");
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_token_fails_first() {
        let mut config = SyncConfig::new("", "");
        assert!(matches!(config.validate(), Err(Error::AuthCredentialsMissing)));

        config.auth.api_token = "   ".to_string();
        assert!(matches!(config.validate(), Err(Error::AuthCredentialsMissing)));

        config.auth.api_token = "token".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_records_is_valid() {
        let config = SyncConfig::from_json_str(
            r#"{ "domain": "example.com", "auth": { "apiToken": "t" } }"#,
        )
        .unwrap();
        assert!(config.records.is_empty());
        assert!(matches!(config.outputs, OutputsConfig::None));
        assert_eq!(config.stack(), "");
        config.validate().unwrap();
    }

    #[test]
    fn test_timeout_range() {
        let mut config = SyncConfig::new("example.com", "token");
        config.engine.request_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.engine.request_timeout_secs = 301;
        assert!(config.validate().is_err());
        config.engine.request_timeout_secs = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_static_outputs() {
        let config = SyncConfig::from_json_str(
            r#"{
                "domain": "example.com",
                "auth": { "apiToken": "t" },
                "outputs": { "type": "static", "values": { "svc": { "Ip": "1.2.3.4" } } }
            }"#,
        )
        .unwrap();
        match config.outputs {
            OutputsConfig::Static { values } => assert_eq!(values["svc"]["Ip"], "1.2.3.4"),
            other => panic!("unexpected outputs config: {:?}", other),
        }
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let config = SyncConfig::new("example.com", "secret_token_12345");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recsync.json");
        std::fs::write(&path, FULL).unwrap();

        let config = SyncConfig::from_file(&path).unwrap();
        assert_eq!(config.records.len(), 3);

        let missing = SyncConfig::from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }

    #[test]
    fn test_record_builder_and_display() {
        let record = DesiredRecord::new("MX", "example.com", "mail.example.com")
            .with_ttl(600)
            .with_priority(5)
            .with_proxied(false);
        assert_eq!(record.ttl, 600);
        assert_eq!(record.priority, Some(5));
        assert_eq!(record.to_string(), "MX example.com");
    }
}
