// # Stack Output Lookup Trait
//
// Defines the interface for resolving a named output value produced by a
// previous deployment. Placeholders of the form `#{cf:KEY}` are resolved
// through it.
//
// ## Implementations
//
// - `StaticOutputLookup`: inline values from configuration
// - `FileOutputLookup`: a `describe-stacks` style JSON document

use async_trait::async_trait;

/// Trait for stack output lookups
///
/// Lookups are uncached and single-shot: the engine calls them at most once
/// per record per run.
#[async_trait]
pub trait StackOutputLookup: Send + Sync {
    /// Get the value of `output_key` in `stack_name`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The exact output value
    /// - `Err(Error::StackOutputNotFound)`: The key is not among the stack's outputs
    /// - `Err(Error)`: The lookup itself failed
    async fn get_output(&self, stack_name: &str, output_key: &str)
    -> Result<String, crate::Error>;
}
