//! The engine call boundary and its concrete backends.
//!
//! - [`process`] — drives a `ckb-debugger` executable over stdin/stdout.
//! - [`library`] — calls a native shared library through its C ABI.

pub mod library;
pub mod process;

use crate::runtime::Invocation;
use crate::Result;
use serde::{Deserialize, Serialize};

pub use library::LibraryDebugger;
pub use process::ProcessDebugger;

/// A message printed by the script under debug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugMessage {
    pub script_hash: String,
    pub message: String,
}

/// An external script debugger engine.
///
/// Both methods return the engine's result document as text. A script that
/// fails verification is still an `Ok` return here, with the failure recorded
/// in the document's `error` field; `Err` is reserved for the engine itself
/// being unusable.
pub trait ScriptDebugger {
    /// Human-readable identity of the engine, used in logs.
    fn describe(&self) -> String;

    /// Entry point A: `run_json`.
    fn run(&self, invocation: &Invocation) -> Result<String>;

    /// Entry point B: `run_json_with_printer`.
    ///
    /// `printer` receives `(script_hash, message)` synchronously, before this
    /// method returns.
    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String>;
}

impl<T: ScriptDebugger + ?Sized> ScriptDebugger for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn run(&self, invocation: &Invocation) -> Result<String> {
        (**self).run(invocation)
    }

    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        (**self).run_with_printer(invocation, printer)
    }
}

impl<T: ScriptDebugger + ?Sized> ScriptDebugger for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn run(&self, invocation: &Invocation) -> Result<String> {
        (**self).run(invocation)
    }

    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        (**self).run_with_printer(invocation, printer)
    }
}
