//! Collaborator traits for record reconciliation
//!
//! This module defines the abstract interfaces the engine drives.
//!
//! - [`DnsProviderClient`]: Zone lookup and record CRUD against a DNS provider
//! - [`StackOutputLookup`]: Resolve a named output of a deployed stack

pub mod dns_provider;
pub mod output_lookup;

pub use dns_provider::{DnsProviderClient, ObservedRecord, ZoneId};
pub use output_lookup::StackOutputLookup;
