//! Runtime sub-system: everything between a fixture and a parsed result.
//!
//! Sub-modules:
//! - [`params`]  — The four boundary strings and their typed reading.
//! - [`loader`]  — Debugger module resolution.
//! - [`invoker`] — One request/response round trip with the engine.
//! - [`result`]  — Result document parsing and formatting helpers.

pub mod invoker;
pub mod loader;
pub mod params;
pub mod result;

pub use invoker::Invoker;
pub use loader::{resolve_module, ModuleRef};
pub use params::{Invocation, InvocationParams, InvokeRequest, ScriptGroupType, ScriptHash};
pub use result::{parse_result, HumanReadableCycles, RunReport, ScriptResult};
