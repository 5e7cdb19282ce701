//! Record validation and the per-record sync decision
//!
//! Only `content` is compared. `ttl`, `proxied` and `priority` are never
//! diffed; they are re-sent with every update.

use crate::config::DesiredRecord;
use crate::error::{Error, Result};
use crate::traits::ObservedRecord;

/// Action selected for one desired record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDecision {
    /// No record exists yet
    Create,
    /// A record exists with different content
    Update,
    /// The record already has the desired content
    Skip,
    /// The desired record failed validation; nothing is sent
    Invalid,
}

impl SyncDecision {
    /// Whether this decision results in a provider mutation
    pub fn mutates(self) -> bool {
        matches!(self, SyncDecision::Create | SyncDecision::Update)
    }
}

impl std::fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncDecision::Create => "create",
            SyncDecision::Update => "update",
            SyncDecision::Skip => "skip",
            SyncDecision::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

/// A record is valid iff `name` and (resolved) `content` are non-empty
pub fn validate(record: &DesiredRecord) -> bool {
    !record.name.is_empty() && !record.content.is_empty()
}

/// Decide what to do with `desired` given what the provider holds
pub fn decide(desired: &DesiredRecord, observed: Option<&ObservedRecord>) -> SyncDecision {
    if !validate(desired) {
        return SyncDecision::Invalid;
    }

    match observed {
        None => SyncDecision::Create,
        Some(existing) if existing.content != desired.content => SyncDecision::Update,
        Some(_) => SyncDecision::Skip,
    }
}

/// Decision for a forced update: overwrite whatever exists, never create
pub fn decide_forced(
    desired: &DesiredRecord,
    observed: Option<&ObservedRecord>,
) -> Result<SyncDecision> {
    if !validate(desired) {
        return Ok(SyncDecision::Invalid);
    }

    match observed {
        Some(_) => Ok(SyncDecision::Update),
        None => Err(Error::record_not_found(&desired.record_type, &desired.name)),
    }
}
