//! Stack output lookup implementations
//!
//! - [`StaticOutputLookup`]: Values given inline (tests, local runs)
//! - [`FileOutputLookup`]: Values read from a `describe-stacks` JSON document
//! - [`NoOutputs`]: Every lookup fails; used when no source is configured

pub mod file;
pub mod memory;

pub use file::FileOutputLookup;
pub use memory::{NoOutputs, StaticOutputLookup};

use crate::config::OutputsConfig;
use crate::traits::StackOutputLookup;

/// Build the lookup described by an [`OutputsConfig`]
pub fn from_config(config: &OutputsConfig) -> Box<dyn StackOutputLookup> {
    match config {
        OutputsConfig::None => Box::new(NoOutputs),
        OutputsConfig::File { path } => Box::new(FileOutputLookup::new(path)),
        OutputsConfig::Static { values } => Box::new(StaticOutputLookup::from(values.clone())),
    }
}
