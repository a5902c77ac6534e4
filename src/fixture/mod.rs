//! Fixture documents: mock transactions handed to the engine.
//!
//! To the invoker a fixture is an opaque JSON document that is serialized to
//! text before crossing the engine boundary. The sub-modules add optional
//! tooling on top:
//! - [`embed`]       — `{{ data }}` / `{{ hash }}` / `{{ def_type }}` / `{{ ref_type }}` expansion.
//! - [`check`]       — Structural consistency check.
//! - [`script_hash`] — Script hashing and lookup by cell index.

pub mod check;
pub mod embed;
pub mod script_hash;

use crate::{DebuggerError, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use check::check;
pub use ckb_mock_tx_types::ReprMockTransaction;
pub use embed::Embed;
pub use script_hash::{script_hash_by_index, CellType};

/// A loaded fixture document.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    source: Option<PathBuf>,
    document: JsonValue,
}

impl Fixture {
    /// Read `path`, expand any template markers, and parse the result.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DebuggerError::FileError(format!("Failed to read fixture {}: {}", path.display(), e))
        })?;
        let text = if embed::has_templates(&text) {
            debug!("Expanding fixture templates");
            Embed::new(path, text).replace_all()?
        } else {
            text
        };
        let document = parse_document(&text)?;
        info!("Loaded fixture {}", path.display());
        Ok(Self {
            source: Some(path.to_path_buf()),
            document,
        })
    }

    /// Parse an already expanded fixture.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(Self {
            source: None,
            document: parse_document(text)?,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn document(&self) -> &JsonValue {
        &self.document
    }

    /// Compact text form passed across the engine boundary.
    pub fn to_json_string(&self) -> String {
        self.document.to_string()
    }

    /// Typed mock transaction view, for tooling that inspects the fixture.
    pub fn mock_transaction(&self) -> Result<ReprMockTransaction> {
        serde_path_to_error::deserialize(&self.document).map_err(|e| {
            DebuggerError::Fixture(format!(
                "not a mock transaction at `{}`: {}",
                e.path(),
                e.inner()
            ))
            .into()
        })
    }
}

fn parse_document(text: &str) -> Result<JsonValue> {
    serde_json::from_str(text).map_err(|e| DebuggerError::Fixture(format!("not valid JSON: {}", e)).into())
}
