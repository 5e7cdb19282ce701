//! Placeholder resolution for record content
//!
//! A record's content is either a literal or exactly one reference of the
//! form `#{cf:OUTPUT_KEY}`. References are replaced by the named output of
//! the configured stack.

use crate::error::{Error, Result};
use crate::traits::StackOutputLookup;

/// Every reference starts with this marker
pub const PLACEHOLDER_MARKER: &str = "#{";

const CF_PREFIX: &str = "#{cf:";
const CF_SUFFIX: &str = "}";

/// Extract the output key from `content`
///
/// - `Ok(None)`: literal content, nothing to resolve
/// - `Ok(Some(key))`: a well-formed `#{cf:KEY}` reference
/// - `Err(InvalidPlaceholderSyntax)`: starts with the marker but is malformed
pub fn parse_reference(content: &str) -> Result<Option<&str>> {
    if !content.starts_with(PLACEHOLDER_MARKER) {
        return Ok(None);
    }

    content
        .strip_prefix(CF_PREFIX)
        .and_then(|rest| rest.strip_suffix(CF_SUFFIX))
        .filter(|key| is_valid_key(key))
        .map(Some)
        .ok_or_else(|| Error::invalid_placeholder(content))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Resolve `content` against the outputs of `stack_name`
///
/// Literal content comes back unchanged. Lookup errors propagate as-is; no
/// retry, no caching, no trimming of the resolved value.
pub async fn resolve(
    content: &str,
    stack_name: &str,
    lookup: &dyn StackOutputLookup,
) -> Result<String> {
    let Some(key) = parse_reference(content)? else {
        return Ok(content.to_string());
    };

    tracing::debug!(stack = stack_name, key, "Resolving stack output placeholder");
    lookup.get_output(stack_name, key).await
}
