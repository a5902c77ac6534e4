//! Debugger module resolution.
//!
//! A module reference names the engine to call: an executable driven as a
//! child process, or a shared library loaded in-process. Resolution either
//! produces a ready [`ScriptDebugger`] or fails with
//! [`DebuggerError::ModuleLoad`]; nothing is invoked here.

use crate::debugger::{LibraryDebugger, ProcessDebugger, ScriptDebugger};
use crate::{DebuggerError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Executable looked up on `PATH` when nothing else is configured.
pub const DEFAULT_DEBUGGER_PROGRAM: &str = "ckb-debugger";

const LIBRARY_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

/// Where to find the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef {
    Process(PathBuf),
    Library(PathBuf),
}

impl Default for ModuleRef {
    fn default() -> Self {
        ModuleRef::Process(PathBuf::from(DEFAULT_DEBUGGER_PROGRAM))
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRef::Process(path) => write!(f, "process:{}", path.display()),
            ModuleRef::Library(path) => write!(f, "library:{}", path.display()),
        }
    }
}

impl FromStr for ModuleRef {
    type Err = DebuggerError;

    /// Accepts `process:<path>`, `library:<path>`, or a bare path whose
    /// extension decides the kind.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DebuggerError::ModuleLoad(
                "empty debugger module reference".to_string(),
            ));
        }
        if let Some(path) = s.strip_prefix("process:") {
            return non_empty(path).map(ModuleRef::Process);
        }
        if let Some(path) = s.strip_prefix("library:") {
            return non_empty(path).map(ModuleRef::Library);
        }
        let path = PathBuf::from(s);
        let is_library = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| LIBRARY_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if is_library {
            Ok(ModuleRef::Library(path))
        } else {
            Ok(ModuleRef::Process(path))
        }
    }
}

fn non_empty(path: &str) -> std::result::Result<PathBuf, DebuggerError> {
    if path.is_empty() {
        Err(DebuggerError::ModuleLoad(
            "debugger module reference has no path".to_string(),
        ))
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Resolve `module` into a callable engine.
#[tracing::instrument(skip_all, fields(module = %module))]
pub fn resolve_module(module: &ModuleRef) -> Result<Box<dyn ScriptDebugger>> {
    match module {
        ModuleRef::Process(program) => {
            let resolved = find_executable(program).ok_or_else(|| {
                DebuggerError::ModuleLoad(format!(
                    "debugger executable {} not found",
                    program.display()
                ))
            })?;
            info!("Using debugger executable {}", resolved.display());
            Ok(Box::new(ProcessDebugger::new(resolved)))
        }
        ModuleRef::Library(path) => Ok(Box::new(LibraryDebugger::open(path)?)),
    }
}

/// Locate `program` the way a shell would: paths with a separator are taken
/// as given, bare names are searched on `PATH`.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if cfg!(windows) && program.extension().is_none() {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}
