//! Invoke an external CKB script debugger against mock transaction fixtures.
//!
//! The debugger engine itself lives outside this crate. It is reached through
//! the [`debugger::ScriptDebugger`] trait, which mirrors the two entry points
//! every engine exposes: `run_json` and `run_json_with_printer`.

pub mod cli;
pub mod config;
pub mod debugger;
pub mod fixture;
pub mod runtime;

use thiserror::Error;

pub use debugger::{DebugMessage, ScriptDebugger};
pub use fixture::Fixture;
pub use runtime::{Invocation, Invoker, RunReport, ScriptGroupType, ScriptResult};

/// Errors surfaced by the invoker and its tooling.
#[derive(Error, Debug)]
pub enum DebuggerError {
    #[error("Failed to load debugger module: {0}")]
    ModuleLoad(String),

    #[error("Script execution failed: {0}")]
    Invocation(String),

    #[error("Malformed debugger result: {0}")]
    ResultFormat(String),

    #[error("Invalid fixture: {0}")]
    Fixture(String),

    #[error("Potential format error found: {0}")]
    PreCheck(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File error: {0}")]
    FileError(String),
}

pub type Result<T> = anyhow::Result<T>;
