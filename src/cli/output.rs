//! Rendering of run outcomes for the terminal.

use crate::debugger::DebugMessage;
use crate::runtime::{HumanReadableCycles, RunReport};
use crate::DebuggerError;
use colored::Colorize;
use serde::Serialize;

/// The `--output json` document.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub cycle: Option<u64>,
    pub error: Option<String>,
    pub messages: &'a [DebugMessage],
}

impl<'a> JsonReport<'a> {
    pub fn success(report: &'a RunReport) -> Self {
        Self {
            cycle: report.cycles(),
            error: None,
            messages: &report.messages,
        }
    }

    pub fn failure(err: &anyhow::Error, messages: &'a [DebugMessage]) -> Self {
        Self {
            cycle: None,
            error: Some(fault_message(err)),
            messages,
        }
    }
}

/// The engine's own words for invocation faults, the full message otherwise.
pub fn fault_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DebuggerError>() {
        Some(DebuggerError::Invocation(msg)) => msg.clone(),
        _ => format!("{:#}", err),
    }
}

pub fn script_log_line(message: &str) -> String {
    format!("Script log: {}", message.trim_end_matches(&['\r', '\n'][..]))
}

/// The closing line of a text run. An engine that answered without a
/// `cycle` field gets no number printed in its place.
pub fn cycles_line(cycles: Option<u64>) -> String {
    match cycles {
        Some(cycles) => format!(
            "{} {}",
            "Total cycles consumed:".green(),
            HumanReadableCycles(cycles)
        ),
        None => format!("{} unknown (not reported by the engine)", "Total cycles consumed:".yellow()),
    }
}
