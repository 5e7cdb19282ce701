// # recsync-core
//
// Core library for declarative DNS record reconciliation.
//
// ## Architecture Overview
//
// This library reconciles a declared list of DNS records against the live
// state of a DNS provider:
// - **DnsProviderClient**: Trait for zone lookup and record CRUD
// - **StackOutputLookup**: Trait for resolving `#{cf:KEY}` placeholders
// - **decision**: Pure validate / decide logic (create, update, skip, invalid)
// - **RecordSyncEngine**: Orchestrates one run and returns a per-record RunResult
//
// ## Design Principles
//
// 1. **Stateless**: Observed state is re-fetched every run; nothing persists
// 2. **Explicit data flow**: Each record is passed through resolve → validate
//    → fetch → decide → apply as a parameter, never via shared state
// 3. **Failure isolation**: Only a missing token or an unresolvable zone
//    stops a run; every other error is recorded against its record
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod outputs;
pub mod traits;

// Re-export core types for convenience
pub use config::{AuthConfig, DesiredRecord, EngineConfig, OutputsConfig, SyncConfig};
pub use engine::{
    RecordAction, RecordOutcome, RecordSyncEngine, RunResult, RunSummary, SyncDecision, SyncMode,
};
pub use error::{Error, Result};
pub use outputs::{FileOutputLookup, NoOutputs, StaticOutputLookup};
pub use traits::{DnsProviderClient, ObservedRecord, StackOutputLookup, ZoneId};
