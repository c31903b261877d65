//! Signal K delta parsing
//!
//! Input is one delta message per line:
//!
//! ```text
//! {"context":"vessels.self","updates":[{"values":[{"path":"navigation.headingMagnetic","value":1.2}]}]}
//! ```
//!
//! Only the `context` and the `path`/`value` pairs matter here; update
//! timestamps and sources are ignored since arrival time drives staleness.

use anyhow::{Context, Result};
use serde::Deserialize;
use signalk_n2k::DataValue;

/// Context name Signal K uses for the local vessel
pub const SELF_CONTEXT: &str = "vessels.self";

/// One Signal K delta message
#[derive(Debug, Clone, Deserialize)]
pub struct Delta {
    pub context: Option<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub values: Vec<PathValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathValue {
    pub path: String,
    pub value: serde_json::Value,
}

impl Delta {
    /// All `(path, value)` pairs in update order
    ///
    /// Entries with an empty path (vessel-level objects) are skipped.
    pub fn into_values(self) -> impl Iterator<Item = (String, DataValue)> {
        self.updates
            .into_iter()
            .flat_map(|u| u.values)
            .filter(|pv| !pv.path.is_empty())
            .map(|pv| (pv.path, DataValue::from(pv.value)))
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Delta>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let delta = serde_json::from_str(line).context("Invalid delta JSON")?;
    Ok(Some(delta))
}

/// Decides which vessel's deltas are fed to the bridge
#[derive(Debug, Clone, Default)]
pub struct ContextFilter {
    self_context: Option<String>,
}

impl ContextFilter {
    /// Accept context-less and `vessels.self` deltas, plus `self_context`
    /// when the vessel's full context is known
    pub fn new(self_context: Option<String>) -> Self {
        Self { self_context }
    }

    pub fn accepts(&self, delta: &Delta) -> bool {
        match delta.context.as_deref() {
            None | Some(SELF_CONTEXT) => true,
            Some(context) => self.self_context.as_deref() == Some(context),
        }
    }
}
