//! Invocation parameters as they cross the engine boundary.
//!
//! Every engine entry point takes four strings. [`Invocation`] carries them
//! verbatim; [`InvocationParams`] is the typed reading a backend performs
//! before it dispatches to the engine.

use crate::fixture::Fixture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a `0x`-prefixed 32-byte hex script hash.
const SCRIPT_HASH_HEX_LEN: usize = 66;

/// Role of a script inside a transaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScriptGroupType {
    Lock,
    Type,
}

impl ScriptGroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptGroupType::Lock => "lock",
            ScriptGroupType::Type => "type",
        }
    }
}

impl fmt::Display for ScriptGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptGroupType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lock" => Ok(ScriptGroupType::Lock),
            "type" => Ok(ScriptGroupType::Type),
            other => Err(format!(
                "unknown variant `{}`, expected `lock` or `type`",
                other
            )),
        }
    }
}

/// A 32-byte script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScriptHash(pub [u8; 32]);

impl ScriptHash {
    /// Parse the `0x`-prefixed, 64 hex digit form.
    pub fn from_hex(text: &str) -> std::result::Result<Self, String> {
        let invalid = || "Invalid script hash format!".to_string();
        if text.len() != SCRIPT_HASH_HEX_LEN {
            return Err(invalid());
        }
        let digits = text.strip_prefix("0x").ok_or_else(invalid)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(ScriptHash(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex digits without the `0x` prefix.
    pub fn to_plain_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ScriptHash {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ScriptHash::from_hex(s)
    }
}

/// The four string arguments shared by both engine entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub fixture_json: String,
    pub group_type: String,
    pub script_hash: String,
    pub cycle_limit: String,
}

impl Invocation {
    /// Serialize `fixture` and pair it with the request arguments.
    pub fn new(fixture: &Fixture, request: &InvokeRequest) -> Self {
        Self {
            fixture_json: fixture.to_json_string(),
            group_type: request.group_type.clone(),
            script_hash: request.script_hash.clone(),
            cycle_limit: request.cycle_limit.clone(),
        }
    }
}

/// Caller-side arguments for one invocation, kept as text so that malformed
/// values reach the engine and are reported by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub group_type: String,
    pub script_hash: String,
    pub cycle_limit: String,
}

impl InvokeRequest {
    pub fn new(
        group_type: impl Into<String>,
        script_hash: impl Into<String>,
        cycle_limit: impl Into<String>,
    ) -> Self {
        Self {
            group_type: group_type.into(),
            script_hash: script_hash.into(),
            cycle_limit: cycle_limit.into(),
        }
    }
}

/// Typed view of an [`Invocation`]'s scalar arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationParams {
    pub group_type: ScriptGroupType,
    pub script_hash: ScriptHash,
    pub max_cycles: u64,
}

impl InvocationParams {
    /// Validate the group type, hash and cycle budget, in that order.
    ///
    /// Error texts match what engines put in the `error` field of their
    /// result document.
    pub fn parse(invocation: &Invocation) -> std::result::Result<Self, String> {
        let group_type = invocation.group_type.parse::<ScriptGroupType>()?;
        let script_hash = ScriptHash::from_hex(&invocation.script_hash)?;
        let max_cycles = invocation
            .cycle_limit
            .parse::<u64>()
            .map_err(|_| "Invalid max cycle!".to_string())?;
        Ok(Self {
            group_type,
            script_hash,
            max_cycles,
        })
    }
}
