//! A scripted [`ScriptDebugger`] for tests.
//!
//! `MockDebugger` behaves like a deterministic engine: it validates the
//! invocation arguments the same way real engines do, looks the requested
//! script up in a table configured by the test, prints its messages through
//! the printer and answers with a `{"cycle", "error"}` document.
//!
//! ```
//! use ckb_debug_mock::MockDebugger;
//! use ckb_debug_invoker::{Fixture, Invoker};
//! use ckb_debug_invoker::runtime::InvokeRequest;
//!
//! let hash = "0xa9d7502d89f7d3beeb5b184831257efd842da388ecedb2996296adaeab86839c";
//! let engine = MockDebugger::new().script(hash, 500);
//! let invoker = Invoker::new(engine);
//! let fixture = Fixture::from_str("{}").unwrap();
//! let report = invoker
//!     .invoke(&fixture, &InvokeRequest::new("type", hash, "1000"))
//!     .unwrap();
//! assert_eq!(report.cycles(), Some(500));
//! ```

use ckb_debug_invoker::runtime::{InvocationParams, ScriptHash};
use ckb_debug_invoker::{Invocation, Result, ScriptDebugger, ScriptResult};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

/// Behaviour of one script known to the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockScript {
    pub cycles: u64,
    pub messages: Vec<String>,
    /// Verification failure to report instead of success.
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockDebugger {
    scripts: HashMap<ScriptHash, MockScript>,
    calls: RefCell<Vec<Invocation>>,
}

impl MockDebugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script that succeeds after `cycles` cycles.
    ///
    /// # Panics
    ///
    /// When `hash` is not a well-formed script hash.
    pub fn script(self, hash: &str, cycles: u64) -> Self {
        self.with(
            hash,
            MockScript {
                cycles,
                ..MockScript::default()
            },
        )
    }

    /// Register a script with full control over its behaviour.
    ///
    /// # Panics
    ///
    /// When `hash` is not a well-formed script hash.
    pub fn with(mut self, hash: &str, script: MockScript) -> Self {
        let key = match ScriptHash::from_hex(hash) {
            Ok(key) => key,
            Err(e) => panic!("mock script hash `{}`: {}", hash, e),
        };
        self.scripts.insert(key, script);
        self
    }

    /// Arguments of every call so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn execute(&self, invocation: &Invocation) -> std::result::Result<(u64, &MockScript), String> {
        self.calls.borrow_mut().push(invocation.clone());
        serde_json::from_str::<serde_json::Value>(&invocation.fixture_json)
            .map_err(|e| format!("Invalid mock transaction: {}", e))?;
        let params = InvocationParams::parse(invocation)?;
        let script = self
            .scripts
            .get(&params.script_hash)
            .ok_or_else(|| format!("Script group {} not found", params.script_hash))?;
        if script.cycles > params.max_cycles {
            return Err(format!(
                "ExceededMaximumCycles: expect cycles <= {}",
                params.max_cycles
            ));
        }
        Ok((script.cycles, script))
    }

    fn answer(result: std::result::Result<u64, String>) -> String {
        let document = ScriptResult::from(result).to_json_string();
        debug!("Mock engine answers {}", document);
        document
    }
}

impl ScriptDebugger for MockDebugger {
    fn describe(&self) -> String {
        format!("mock engine ({} scripts)", self.scripts.len())
    }

    fn run(&self, invocation: &Invocation) -> Result<String> {
        let result = self.execute(invocation).and_then(|(cycles, script)| match &script.error {
            Some(error) => Err(error.clone()),
            None => Ok(cycles),
        });
        Ok(Self::answer(result))
    }

    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        let result = self.execute(invocation).and_then(|(cycles, script)| {
            for message in &script.messages {
                printer(&invocation.script_hash, message);
            }
            match &script.error {
                Some(error) => Err(error.clone()),
                None => Ok(cycles),
            }
        });
        Ok(Self::answer(result))
    }
}
