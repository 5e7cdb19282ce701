//! Record reconciliation engine
//!
//! The RecordSyncEngine is responsible for:
//! - Resolving the hosted zone once per run
//! - Resolving `#{cf:KEY}` placeholders in each record's content
//! - Deciding create / update / skip / invalid per record
//! - Applying the decision through the DnsProviderClient
//! - Isolating per-record failures and reporting them in a RunResult
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────┐
//!   records ────────▶│ RecordSyncEngine │────────▶ RunResult
//!                    └──────────────────┘
//!                              │
//!         ┌────────────────────┼─────────────────────┐
//!         │                    │                     │
//!         ▼                    ▼                     ▼
//! ┌──────────────────┐ ┌──────────────┐ ┌───────────────────┐
//! │StackOutputLookup │ │   decision   │ │ DnsProviderClient │
//! │ (placeholders)   │ │ (pure diff)  │ │ (fetch / apply)   │
//! └──────────────────┘ └──────────────┘ └───────────────────┘
//! ```
//!
//! ## Record Flow (sync mode)
//!
//! 1. Resolve placeholder (exactly once)
//! 2. Validate; invalid records make no remote call
//! 3. Fetch the observed record for `(type, name)`
//! 4. Decide, then create / update / do nothing
//!
//! Records are processed sequentially in input order. Every remote call is
//! bounded by the configured request timeout.

pub mod decision;
pub mod placeholder;

pub use decision::{SyncDecision, decide, decide_forced, validate};

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::{DesiredRecord, SyncConfig};
use crate::error::{Error, Result};
use crate::traits::{DnsProviderClient, ObservedRecord, StackOutputLookup, ZoneId};

/// What a run does with each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Create missing records, update drifted ones, skip the rest
    Sync,
    /// Overwrite existing records unconditionally; never create
    Update,
    /// Delete the records that exist
    Delete,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncMode::Sync => "sync",
            SyncMode::Update => "update",
            SyncMode::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Sync or update mode decision (applied unless dry-run)
    Decided(SyncDecision),
    /// Delete mode: the record existed and was deleted
    Deleted,
    /// Delete mode: there was nothing to delete
    AlreadyAbsent,
}

impl fmt::Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordAction::Decided(decision) => write!(f, "{}", decision),
            RecordAction::Deleted => f.write_str("deleted"),
            RecordAction::AlreadyAbsent => f.write_str("already absent"),
        }
    }
}

/// Outcome for one input record
#[derive(Debug)]
pub struct RecordOutcome {
    /// The record as processed (content resolved when resolution succeeded)
    pub record: DesiredRecord,
    /// The action taken, or the error that stopped this record
    pub result: Result<RecordAction>,
}

impl RecordOutcome {
    /// Whether this record failed
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Per-record outcomes of one run, in input order
#[derive(Debug)]
pub struct RunResult {
    /// Mode the run executed in
    pub mode: SyncMode,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last record finished
    pub finished_at: DateTime<Utc>,
    /// Decisions were computed but no mutation was sent
    pub dry_run: bool,
    /// One entry per input record
    pub outcomes: Vec<RecordOutcome>,
}

impl RunResult {
    /// Outcomes that ended in an error
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// True when no record failed
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Number of records that ended with `action`
    pub fn count(&self, action: RecordAction) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(a) if a == action))
            .count()
    }

    /// Aggregated counts
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            dry_run: self.dry_run,
            created: self.count(RecordAction::Decided(SyncDecision::Create)),
            updated: self.count(RecordAction::Decided(SyncDecision::Update)),
            skipped: self.count(RecordAction::Decided(SyncDecision::Skip)),
            invalid: self.count(RecordAction::Decided(SyncDecision::Invalid)),
            deleted: self.count(RecordAction::Deleted),
            already_absent: self.count(RecordAction::AlreadyAbsent),
            failed: self.failures().count(),
        }
    }
}

/// Counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dry_run: bool,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub deleted: usize,
    pub already_absent: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            f.write_str("[DRY-RUN] nothing applied: ")?;
        }
        write!(
            f,
            "{} created, {} updated, {} skipped, {} invalid, {} deleted, {} already absent, {} failed",
            self.created,
            self.updated,
            self.skipped,
            self.invalid,
            self.deleted,
            self.already_absent,
            self.failed
        )
    }
}

/// Core reconciliation engine
///
/// Stateless between runs: observed records are fetched fresh each run and
/// the zone id lives only for the duration of one run.
///
/// ## Lifecycle
///
/// 1. Create with [`RecordSyncEngine::new()`] (validates config, no remote calls)
/// 2. Call [`RecordSyncEngine::run()`] with a [`SyncMode`]
/// 3. Inspect the returned [`RunResult`]
pub struct RecordSyncEngine {
    /// Provider client for zone and record calls
    provider: Box<dyn DnsProviderClient>,

    /// Output lookup for placeholders
    outputs: Box<dyn StackOutputLookup>,

    /// Domain whose zone holds the records
    domain: String,

    /// Stack passed to the output lookup
    stack_name: String,

    /// Configured records
    records: Vec<DesiredRecord>,

    /// Upper bound for each remote call
    request_timeout: Duration,

    /// Decide only; never call create/update/delete
    dry_run: bool,
}

impl RecordSyncEngine {
    /// Create a new engine
    ///
    /// Fails with [`Error::AuthCredentialsMissing`] before any remote call
    /// when no API token is configured.
    pub fn new(
        provider: Box<dyn DnsProviderClient>,
        outputs: Box<dyn StackOutputLookup>,
        config: &SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            outputs,
            domain: config.domain.clone(),
            stack_name: config.stack().to_string(),
            records: config.records.clone(),
            request_timeout: config.engine.request_timeout(),
            dry_run: config.engine.dry_run,
        })
    }

    /// Reconcile the configured records
    pub async fn run(&self, mode: SyncMode) -> Result<RunResult> {
        self.run_records(&self.records, mode).await
    }

    /// Reconcile an explicit record list
    ///
    /// # Returns
    ///
    /// - `Ok(RunResult)`: One outcome per record, failures included
    /// - `Err(Error::ZoneResolutionFailed)`: No record was touched
    pub async fn run_records(&self, records: &[DesiredRecord], mode: SyncMode) -> Result<RunResult> {
        let started_at = Utc::now();

        if records.is_empty() {
            info!("No records configured, nothing to {}", mode);
            return Ok(RunResult {
                mode,
                started_at,
                finished_at: Utc::now(),
                dry_run: self.dry_run,
                outcomes: Vec::new(),
            });
        }

        info!(
            "Starting {} of {} record(s) for {} via {}",
            mode,
            records.len(),
            self.domain,
            self.provider.provider_name()
        );

        let zone_id = self.resolve_zone().await?;

        let mut outcomes = Vec::with_capacity(records.len());
        for desired in records {
            let outcome = match mode {
                SyncMode::Sync | SyncMode::Update => self.sync_record(&zone_id, desired, mode).await,
                SyncMode::Delete => RecordOutcome {
                    record: desired.clone(),
                    result: self.delete_record(&zone_id, desired).await,
                },
            };

            match &outcome.result {
                Ok(action) => debug!("{}: {}", outcome.record, action),
                // Continue with other records
                Err(e) => warn!("Failed to {} record {}: {}", mode, outcome.record, e),
            }
            outcomes.push(outcome);
        }

        let result = RunResult {
            mode,
            started_at,
            finished_at: Utc::now(),
            dry_run: self.dry_run,
            outcomes,
        };
        info!("Finished {}: {}", mode, result.summary());
        Ok(result)
    }

    /// List every record in the configured zone
    pub async fn list(&self) -> Result<Vec<ObservedRecord>> {
        let zone_id = self.resolve_zone().await?;
        self.timed(self.provider.list_records(&zone_id)).await
    }

    /// Resolve the zone once; failure is fatal for the run
    async fn resolve_zone(&self) -> Result<ZoneId> {
        let zone_id = self
            .timed(self.provider.get_zone_id(&self.domain))
            .await
            .map_err(|e| {
                error!("Zone lookup for {} failed: {}", self.domain, e);
                Error::zone_resolution(&self.domain, e)
            })?;
        debug!("Resolved zone {} for {}", zone_id, self.domain);
        Ok(zone_id)
    }

    /// Resolve, validate, fetch, decide and apply for one record
    async fn sync_record(
        &self,
        zone_id: &ZoneId,
        desired: &DesiredRecord,
        mode: SyncMode,
    ) -> RecordOutcome {
        let mut record = desired.clone();

        let resolved = self
            .timed(placeholder::resolve(
                &record.content,
                &self.stack_name,
                self.outputs.as_ref(),
            ))
            .await;
        match resolved {
            Ok(content) => record.content = content,
            Err(e) => {
                return RecordOutcome {
                    record,
                    result: Err(e),
                };
            }
        }

        let result = self.apply(zone_id, &record, mode).await;
        RecordOutcome { record, result }
    }

    async fn apply(
        &self,
        zone_id: &ZoneId,
        record: &DesiredRecord,
        mode: SyncMode,
    ) -> Result<RecordAction> {
        if !validate(record) {
            warn!("Record {} has an empty name or content, not syncing", record);
            return Ok(RecordAction::Decided(SyncDecision::Invalid));
        }

        let observed = self
            .timed(
                self.provider
                    .get_record(zone_id, &record.record_type, &record.name),
            )
            .await?;

        let decision = match mode {
            SyncMode::Update => decide_forced(record, observed.as_ref())?,
            _ => decide(record, observed.as_ref()),
        };

        if self.dry_run && decision.mutates() {
            info!("[DRY-RUN] Would {} {} -> {}", decision, record, record.content);
            return Ok(RecordAction::Decided(decision));
        }

        match (decision, observed) {
            (SyncDecision::Create, _) => {
                self.timed(self.provider.create_record(zone_id, record))
                    .await?;
                info!("Created {} -> {}", record, record.content);
            }
            (SyncDecision::Update, Some(existing)) => {
                self.timed(self.provider.update_record(zone_id, &existing.id, record))
                    .await?;
                info!(
                    "Updated {} -> {} (was: {})",
                    record, record.content, existing.content
                );
            }
            (SyncDecision::Skip, _) => {
                debug!("Record {} already up to date", record);
            }
            _ => {}
        }

        Ok(RecordAction::Decided(decision))
    }

    /// Delete one record if it exists
    ///
    /// Content is not inspected, but an empty name would match nothing
    /// meaningful and is reported as invalid without a lookup.
    async fn delete_record(&self, zone_id: &ZoneId, desired: &DesiredRecord) -> Result<RecordAction> {
        if desired.name.is_empty() {
            warn!("Record {} has an empty name, not deleting", desired);
            return Ok(RecordAction::Decided(SyncDecision::Invalid));
        }

        let observed = self
            .timed(
                self.provider
                    .get_record(zone_id, &desired.record_type, &desired.name),
            )
            .await?;

        match observed {
            Some(existing) if self.dry_run => {
                info!("[DRY-RUN] Would delete {} ({})", desired, existing.id);
                Ok(RecordAction::Deleted)
            }
            Some(existing) => {
                self.timed(self.provider.delete_record(zone_id, &existing.id))
                    .await?;
                info!("Deleted {} ({})", desired, existing.id);
                Ok(RecordAction::Deleted)
            }
            None => {
                debug!("Record {} does not exist, nothing to delete", desired);
                Ok(RecordAction::AlreadyAbsent)
            }
        }
    }

    /// Bound a remote call by the request timeout
    async fn timed<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| Error::timeout(self.request_timeout))?
    }
}
