// # In-Memory Output Lookups
//
// `StaticOutputLookup` holds outputs given inline in configuration or built
// in tests. `NoOutputs` is what a run gets when no output source is
// configured: literal records work, placeholders fail per record.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::Error;
use crate::traits::StackOutputLookup;

/// In-memory stack output lookup
///
/// An empty stack name matches the first stack in name order, so a single
/// inline stack works without repeating its name.
///
/// # Example
///
/// ```rust
/// use recsync_core::outputs::StaticOutputLookup;
/// use recsync_core::traits::StackOutputLookup;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let outputs = StaticOutputLookup::new().with_output("svc", "Ip", "1.2.3.4");
///     assert_eq!(outputs.get_output("svc", "Ip").await?, "1.2.3.4");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticOutputLookup {
    stacks: HashMap<String, HashMap<String, String>>,
}

impl StaticOutputLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one output value
    pub fn with_output(
        mut self,
        stack: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.stacks
            .entry(stack.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    fn stack(&self, stack_name: &str) -> Option<&HashMap<String, String>> {
        if stack_name.is_empty() {
            return self
                .stacks
                .iter()
                .min_by(|a, b| a.0.cmp(b.0))
                .map(|(_, outputs)| outputs);
        }
        self.stacks.get(stack_name)
    }
}

impl From<HashMap<String, HashMap<String, String>>> for StaticOutputLookup {
    fn from(stacks: HashMap<String, HashMap<String, String>>) -> Self {
        Self { stacks }
    }
}

#[async_trait]
impl StackOutputLookup for StaticOutputLookup {
    async fn get_output(&self, stack_name: &str, output_key: &str) -> Result<String, Error> {
        self.stack(stack_name)
            .and_then(|outputs| outputs.get(output_key))
            .cloned()
            .ok_or_else(|| Error::output_not_found(stack_name, output_key))
    }
}

/// Lookup with no outputs at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOutputs;

#[async_trait]
impl StackOutputLookup for NoOutputs {
    async fn get_output(&self, stack_name: &str, output_key: &str) -> Result<String, Error> {
        tracing::debug!(key = output_key, "No stack output source configured");
        Err(Error::output_not_found(stack_name, output_key))
    }
}
