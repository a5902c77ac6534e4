//! Optional TOML configuration.
//!
//! Looked up at `--config <file>` or, failing that, at
//! `<config dir>/ckb-debug-invoke/config.toml`. Values from the command line
//! (including their environment variable fallbacks) take precedence over the
//! file; the CLI applies that ordering.
//!
//! ```toml
//! module = "process:/usr/local/bin/ckb-debugger"
//! max_cycles = 70000000
//! pre_check = true
//! ```

use crate::runtime::ModuleRef;
use crate::{DebuggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cycle budget used when none is given anywhere.
pub const DEFAULT_MAX_CYCLES: u64 = 70_000_000;

const CONFIG_DIR_NAME: &str = "ckb-debug-invoke";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Debugger module reference, see [`ModuleRef`].
    pub module: Option<String>,
    pub max_cycles: Option<u64>,
    /// Run the fixture pre-check before invoking.
    pub pre_check: Option<bool>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DebuggerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&text).map_err(|e| {
            DebuggerError::Config(format!("Failed to parse {}: {}", path.display(), e)).into()
        })
    }

    /// Load `explicit` if given (it must exist), otherwise the default file if
    /// present, otherwise an empty configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("Using configuration {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Module to use: `cli` first, then the file, then the built-in default.
    pub fn module_ref(&self, cli: Option<&str>) -> Result<ModuleRef> {
        match cli.or(self.module.as_deref()) {
            Some(text) => Ok(text.parse::<ModuleRef>()?),
            None => Ok(ModuleRef::default()),
        }
    }

    pub fn max_cycles(&self) -> u64 {
        self.max_cycles.unwrap_or(DEFAULT_MAX_CYCLES)
    }

    pub fn pre_check(&self) -> bool {
        self.pre_check.unwrap_or(true)
    }
}
