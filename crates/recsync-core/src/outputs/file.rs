// # File Output Lookup
//
// Reads stack outputs from a JSON document shaped like the response of a
// `describe-stacks` call, e.g. produced by
// `aws cloudformation describe-stacks --stack-name svc-prod > outputs.json`.
//
// ## File Format
//
// ```json
// {
//   "Stacks": [
//     {
//       "StackName": "svc-prod",
//       "Outputs": [
//         { "OutputKey": "DistributionDomain", "OutputValue": "d111.cloudfront.net" }
//       ]
//     }
//   ]
// }
// ```
//
// The file is re-read on every lookup; nothing is cached between records.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Error;
use crate::traits::StackOutputLookup;

/// Stack output lookup backed by a JSON document
#[derive(Debug, Clone)]
pub struct FileOutputLookup {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeStacks {
    #[serde(default)]
    stacks: Vec<Stack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Stack {
    #[serde(default)]
    stack_name: String,
    #[serde(default)]
    outputs: Vec<StackOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackOutput {
    output_key: String,
    output_value: String,
}

impl FileOutputLookup {
    /// Create a lookup reading from `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn load(&self) -> Result<DescribeStacks, Error> {
        let raw = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl StackOutputLookup for FileOutputLookup {
    async fn get_output(&self, stack_name: &str, output_key: &str) -> Result<String, Error> {
        tracing::debug!(
            path = %self.path.display(),
            stack = stack_name,
            key = output_key,
            "Reading stack outputs"
        );

        let document = self.load().await?;

        // Empty stack name: first stack in the document
        let stack = if stack_name.is_empty() {
            document.stacks.first()
        } else {
            document.stacks.iter().find(|s| s.stack_name == stack_name)
        };

        stack
            .and_then(|s| s.outputs.iter().find(|o| o.output_key == output_key))
            .map(|o| o.output_value.clone())
            .ok_or_else(|| Error::output_not_found(stack_name, output_key))
    }
}
