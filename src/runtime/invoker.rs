//! One request/response round trip with a debugger engine.
//!
//! The order is fixed: serialize the fixture, call the entry point (printer
//! events, if any, arrive during the call), then parse the returned text.
//! Nothing is parsed or reported before the engine call has returned.

use crate::debugger::{DebugMessage, ScriptDebugger};
use crate::fixture::Fixture;
use crate::runtime::params::{Invocation, InvokeRequest};
use crate::runtime::result::{parse_result, RunReport};
use crate::{DebuggerError, Result};
use tracing::{debug, info, warn};

/// Calls a resolved engine with fixtures.
pub struct Invoker<D> {
    debugger: D,
}

impl<D: ScriptDebugger> Invoker<D> {
    pub fn new(debugger: D) -> Self {
        Self { debugger }
    }

    pub fn debugger(&self) -> &D {
        &self.debugger
    }

    /// Call entry point A and parse its result.
    ///
    /// Fails with [`DebuggerError::Invocation`] when the engine reports an
    /// error and with [`DebuggerError::ResultFormat`] when its answer cannot
    /// be parsed.
    #[tracing::instrument(skip_all, fields(group_type = %request.group_type, script_hash = %request.script_hash))]
    pub fn invoke(&self, fixture: &Fixture, request: &InvokeRequest) -> Result<RunReport> {
        let invocation = Invocation::new(fixture, request);
        info!(
            "Invoking {} with max cycles {}",
            self.debugger.describe(),
            request.cycle_limit
        );
        let raw = self.debugger.run(&invocation)?;
        finish(raw, Vec::new())
    }

    /// Call entry point B, forwarding every printed message to `on_message`
    /// before this method returns.
    #[tracing::instrument(skip_all, fields(group_type = %request.group_type, script_hash = %request.script_hash))]
    pub fn invoke_with_printer<F>(
        &self,
        fixture: &Fixture,
        request: &InvokeRequest,
        mut on_message: F,
    ) -> Result<RunReport>
    where
        F: FnMut(&DebugMessage),
    {
        let invocation = Invocation::new(fixture, request);
        info!(
            "Invoking {} with printer, max cycles {}",
            self.debugger.describe(),
            request.cycle_limit
        );
        let mut messages = Vec::new();
        let raw = {
            let mut printer = |script_hash: &str, message: &str| {
                let event = DebugMessage {
                    script_hash: script_hash.to_string(),
                    message: message.to_string(),
                };
                debug!(script_hash, "Script log: {}", message.trim_end());
                on_message(&event);
                messages.push(event);
            };
            self.debugger.run_with_printer(&invocation, &mut printer)?
        };
        finish(raw, messages)
    }
}

fn finish(raw: String, messages: Vec<DebugMessage>) -> Result<RunReport> {
    let (document, result) = parse_result(&raw)?;
    info!("Result: {}", document);
    if let Some(error) = &result.error {
        warn!("Debugger reported an error: {}", error);
        return Err(DebuggerError::Invocation(error.clone()).into());
    }
    Ok(RunReport {
        raw,
        document,
        result,
        messages,
    })
}
