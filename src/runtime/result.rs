//! Result types and formatting helpers for a debugger invocation.
//!
//! Engines answer with a JSON document. The invoker parses it for display
//! and reads the conventional `cycle` / `error` fields; nothing else in the
//! document is interpreted.

use crate::debugger::DebugMessage;
use crate::{DebuggerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The `{"cycle": ..., "error": ...}` shape every engine returns.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Default)]
pub struct ScriptResult {
    #[serde(default)]
    pub cycle: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Serialize into the compact wire form.
    pub fn to_json_string(&self) -> String {
        // Two optional scalars cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

impl From<std::result::Result<u64, String>> for ScriptResult {
    fn from(result: std::result::Result<u64, String>) -> ScriptResult {
        match result {
            Ok(cycle) => ScriptResult {
                cycle: Some(cycle),
                error: None,
            },
            Err(error) => ScriptResult {
                cycle: None,
                error: Some(error),
            },
        }
    }
}

/// Parse the text an engine returned.
///
/// Returns the full document alongside its typed view. Fails with
/// [`DebuggerError::ResultFormat`] when the text is not a JSON object or when
/// `cycle` / `error` carry the wrong types.
pub fn parse_result(raw: &str) -> Result<(JsonValue, ScriptResult)> {
    let document: JsonValue = serde_json::from_str(raw)
        .map_err(|e| DebuggerError::ResultFormat(format!("not valid JSON: {}", e)))?;
    if !document.is_object() {
        return Err(DebuggerError::ResultFormat(format!(
            "expected a JSON object, got {}",
            json_type_name(&document)
        ))
        .into());
    }
    let typed: ScriptResult = serde_path_to_error::deserialize(&document).map_err(|e| {
        DebuggerError::ResultFormat(format!("field `{}`: {}", e.path(), e.inner()))
    })?;
    Ok((document, typed))
}

/// Everything observed during one invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Text exactly as returned by the engine.
    pub raw: String,
    /// Parsed document, kept for display.
    pub document: JsonValue,
    pub result: ScriptResult,
    /// Messages delivered through the printer, in delivery order.
    pub messages: Vec<DebugMessage>,
}

impl RunReport {
    pub fn cycles(&self) -> Option<u64> {
        self.result.cycle
    }
}

/// Cycle counts with a binary-scaled suffix, e.g. `3527(3.4K)`.
pub struct HumanReadableCycles(pub u64);

impl fmt::Display for HumanReadableCycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        if self.0 >= 1024 * 1024 {
            write!(f, "({:.1}M)", self.0 as f64 / 1024. / 1024.)?;
        } else if self.0 >= 1024 {
            write!(f, "({:.1}K)", self.0 as f64 / 1024.)?;
        }
        Ok(())
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
