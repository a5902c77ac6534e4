//! Engine backend that drives a `ckb-debugger` executable.
//!
//! The executable runs in `fast` mode with the fixture on stdin. Its stdout is
//! scanned line by line on the calling thread so that script logs reach the
//! printer while the engine is still running; stderr is drained on a helper
//! thread and becomes the error text when the process fails.
//!
//! Output is read as bytes and decoded lossily, since scripts may print
//! anything. A script log spans every following line up to the next line the
//! engine itself wrote.

use super::ScriptDebugger;
use crate::runtime::{Invocation, InvocationParams, ScriptResult};
use crate::{DebuggerError, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use tracing::{debug, info, warn};

const SCRIPT_LOG_PREFIX: &str = "Script log: ";
const TOTAL_CYCLES_PREFIX: &str = "Total cycles consumed: ";
const PRE_CHECK_PREFIX: &str = "Potential format error found: ";
const STATUS_PREFIXES: &[&str] = &["Run result: ", "The cell_index is not specified"];

/// One classified line of engine stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine<'a> {
    ScriptLog(&'a str),
    TotalCycles(u64),
    FormatWarning(&'a str),
    /// Other engine bookkeeping, e.g. `Run result: 0`.
    Status(&'a str),
    Other(&'a str),
}

/// Classify a single stdout line.
pub fn classify_line(line: &str) -> OutputLine<'_> {
    if let Some(message) = line.strip_prefix(SCRIPT_LOG_PREFIX) {
        return OutputLine::ScriptLog(message);
    }
    if let Some(rest) = line.strip_prefix(TOTAL_CYCLES_PREFIX) {
        // `3527(3.4K)` -> 3527
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(cycles) = digits.parse::<u64>() {
            return OutputLine::TotalCycles(cycles);
        }
    }
    if let Some(message) = line.strip_prefix(PRE_CHECK_PREFIX) {
        return OutputLine::FormatWarning(message);
    }
    if STATUS_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return OutputLine::Status(line);
    }
    OutputLine::Other(line)
}

/// Read engine stdout to the end, handing complete script logs to `printer`.
/// Returns the reported cycle count.
pub fn scan_output<R: BufRead>(
    mut reader: R,
    script_hash: &str,
    printer: &mut dyn FnMut(&str, &str),
) -> std::io::Result<Option<u64>> {
    let mut cycles = None;
    let mut pending: Option<String> = None;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end_matches(&['\r', '\n'][..]);
        let classified = classify_line(line);
        if let (OutputLine::Other(text), Some(message)) = (&classified, pending.as_mut()) {
            message.push('\n');
            message.push_str(text);
            continue;
        }
        if let Some(message) = pending.take() {
            printer(script_hash, &message);
        }
        match classified {
            OutputLine::ScriptLog(message) => pending = Some(message.to_string()),
            OutputLine::TotalCycles(n) => cycles = Some(n),
            OutputLine::FormatWarning(message) => warn!("Potential format error found: {}", message),
            OutputLine::Status(text) | OutputLine::Other(text) => debug!("debugger: {}", text),
        }
    }
    if let Some(message) = pending {
        printer(script_hash, &message);
    }
    Ok(cycles)
}

/// A `ckb-debugger` executable reachable on disk or via `PATH`.
#[derive(Debug, Clone)]
pub struct ProcessDebugger {
    program: PathBuf,
}

impl ProcessDebugger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, params: &InvocationParams) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--mode")
            .arg("fast")
            .arg("--tx-file")
            .arg("-")
            .arg("--script-group-type")
            .arg(params.group_type.as_str())
            .arg("--script-hash")
            .arg(params.script_hash.to_string())
            .arg("--max-cycles")
            .arg(params.max_cycles.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    fn execute(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        let params = match InvocationParams::parse(invocation) {
            Ok(params) => params,
            Err(msg) => {
                debug!("Rejected invocation before spawning: {}", msg);
                return Ok(ScriptResult::from(Err(msg)).to_json_string());
            }
        };
        let script_hash = params.script_hash.to_string();

        let mut child = self.command(&params).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DebuggerError::ModuleLoad(format!(
                    "debugger executable {} not found",
                    self.program.display()
                ))
            } else {
                DebuggerError::Invocation(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            }
        })?;
        info!(pid = child.id(), "Started {}", self.program.display());

        let stdin = child.stdin.take();
        let fixture = invocation.fixture_json.clone();
        let feeder = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(fixture.as_bytes())?;
            }
            Ok(())
        });

        let stderr = child.stderr.take();
        let drain = thread::spawn(move || {
            let mut bytes = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut bytes);
            }
            String::from_utf8_lossy(&bytes).into_owned()
        });

        let scanned = match child.stdout.take() {
            Some(stdout) => scan_output(BufReader::new(stdout), &script_hash, printer),
            None => Ok(None),
        };
        if scanned.is_err() {
            let _ = child.kill();
        }

        // Reap the child and join both helpers before any early return.
        let status = child.wait();
        if let Ok(Err(e)) = feeder.join() {
            // The engine may exit before consuming the whole fixture.
            debug!("Writing fixture to debugger stdin failed: {}", e);
        }
        let stderr_text = drain.join().unwrap_or_default();

        let cycles = scanned.map_err(|e| {
            DebuggerError::Invocation(format!("failed to read debugger output: {}", e))
        })?;
        let status = status
            .map_err(|e| DebuggerError::Invocation(format!("failed to wait for debugger: {}", e)))?;

        let outcome = interpret_exit(status, cycles, &stderr_text);
        Ok(ScriptResult::from(outcome).to_json_string())
    }
}

fn interpret_exit(
    status: ExitStatus,
    cycles: Option<u64>,
    stderr_text: &str,
) -> std::result::Result<u64, String> {
    if status.success() {
        return cycles.ok_or_else(|| "debugger did not report consumed cycles".to_string());
    }
    let trimmed = stderr_text.trim();
    let message = trimmed.strip_prefix("Error: ").unwrap_or(trimmed);
    if message.is_empty() {
        Err(format!("debugger exited with {}", status))
    } else {
        Err(message.to_string())
    }
}

impl ScriptDebugger for ProcessDebugger {
    fn describe(&self) -> String {
        format!("process:{}", self.program.display())
    }

    fn run(&self, invocation: &Invocation) -> Result<String> {
        self.execute(invocation, &mut |_, _| {})
    }

    fn run_with_printer(
        &self,
        invocation: &Invocation,
        printer: &mut dyn FnMut(&str, &str),
    ) -> Result<String> {
        self.execute(invocation, printer)
    }
}
