use crate::cli::output::{cycles_line, script_log_line, JsonReport};
use crate::cli::{
    CheckArgs, Cli, CompletionsArgs, ExpandArgs, OutputFormat, RunArgs, ScriptHashArgs, Verbosity,
};
use crate::config::Config;
use crate::debugger::DebugMessage;
use crate::fixture::script_hash::hash_hex;
use crate::fixture::{check as check_fixture, script_hash_by_index, CellType, Embed, Fixture};
use crate::runtime::{resolve_module, InvokeRequest, Invoker, RunReport, ScriptGroupType};
use crate::{DebuggerError, Result};
use clap::CommandFactory;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::path::Path;
use tracing::{debug, info, warn};

/// Execute one script group of a fixture.
pub fn run(args: RunArgs, verbosity: Verbosity, config_path: Option<&Path>) -> Result<()> {
    let config = Config::discover(config_path)?;
    let fixture = Fixture::from_file(&args.tx_file)?;

    if config.pre_check() && !args.no_pre_check {
        if let Err(err) = pre_check(&fixture) {
            debug!("Pre-check failed: {:?}", err);
            if !verbosity.is_quiet() {
                eprintln!("{}", format!("{:#}", err).yellow());
            }
        }
    }

    let script_hash = match args.script_hash.clone() {
        Some(hash) => hash,
        None => locate_script(&args, &fixture, verbosity)?,
    };
    let cycle_limit = args
        .max_cycles
        .clone()
        .unwrap_or_else(|| config.max_cycles().to_string());
    let request = InvokeRequest::new(args.script_group_type.as_str(), script_hash, cycle_limit);

    let module = config.module_ref(args.module.as_deref())?;
    info!("Using debugger module {}", module);
    let invoker = Invoker::new(resolve_module(&module)?);

    let mut printed: Vec<DebugMessage> = Vec::new();
    let outcome = if args.with_printer {
        let text = args.output == OutputFormat::Text;
        invoker.invoke_with_printer(&fixture, &request, |event: &DebugMessage| {
            if text {
                println!("{}", script_log_line(&event.message));
            }
            printed.push(event.clone());
        })
    } else {
        let _spinner = Spinner::start(verbosity, &request.script_hash);
        invoker.invoke(&fixture, &request)
    };

    report(outcome, &printed, args.output)
}

/// `printed` holds every message the engine delivered, which on failure is
/// the only record of them.
fn report(outcome: Result<RunReport>, printed: &[DebugMessage], format: OutputFormat) -> Result<()> {
    match (format, outcome) {
        (OutputFormat::Text, Ok(report)) => {
            if report.cycles().is_none() {
                warn!("Engine reported success without a cycle count");
            }
            println!("{}", cycles_line(report.cycles()));
            Ok(())
        }
        (OutputFormat::Text, Err(err)) => Err(err),
        (OutputFormat::Json, Ok(report)) => {
            println!("{}", render_json(&JsonReport::success(&report))?);
            Ok(())
        }
        (OutputFormat::Json, Err(err)) => {
            println!("{}", render_json(&JsonReport::failure(&err, printed))?);
            Err(err)
        }
    }
}

fn render_json(report: &JsonReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| {
        DebuggerError::ResultFormat(format!("cannot render report: {}", e)).into()
    })
}

fn pre_check(fixture: &Fixture) -> Result<()> {
    let tx = fixture.mock_transaction()?;
    check_fixture(&tx)
}

/// Resolve the script hash from `--cell-type`/`--cell-index`. For a lock
/// script the cell type defaults to `input` and the index to 0; a type script
/// needs both.
fn locate_script(args: &RunArgs, fixture: &Fixture, verbosity: Verbosity) -> Result<String> {
    let (cell_type, cell_index) = match (args.script_group_type, args.cell_type, args.cell_index) {
        (_, Some(cell_type), Some(cell_index)) => (cell_type, cell_index),
        (ScriptGroupType::Lock, cell_type, cell_index) => {
            if cell_index.is_none() && !verbosity.is_quiet() {
                eprintln!("The cell_index is not specified. Assume --cell-index = 0");
            }
            (cell_type.unwrap_or(CellType::Input), cell_index.unwrap_or(0))
        }
        (ScriptGroupType::Type, _, _) => {
            return Err(DebuggerError::InvalidArguments(
                "provide either --script-hash, or both --cell-type and --cell-index".into(),
            )
            .into())
        }
    };
    let tx = fixture.mock_transaction()?;
    let hash = hash_hex(&script_hash_by_index(&tx, args.script_group_type, cell_type, cell_index)?);
    info!("Script hash of {} cell {}: {}", cell_type, cell_index, hash);
    Ok(hash)
}

/// Spinner on stderr while the engine runs, cleared on drop.
struct Spinner(Option<ProgressBar>);

impl Spinner {
    fn start(verbosity: Verbosity, script_hash: &str) -> Self {
        if verbosity.is_quiet() || !std::io::stderr().is_terminal() {
            return Spinner(None);
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        bar.set_message(format!("Running script {}...", script_hash));
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Spinner(Some(bar))
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = self.0.take() {
            bar.finish_and_clear();
        }
    }
}

/// Run the consistency check on its own.
pub fn check(args: CheckArgs, _verbosity: Verbosity) -> Result<()> {
    let fixture = Fixture::from_file(&args.tx_file)?;
    pre_check(&fixture)?;
    println!("{} {}", "OK".green().bold(), args.tx_file.display());
    Ok(())
}

pub fn script_hash(args: ScriptHashArgs, _verbosity: Verbosity) -> Result<()> {
    let fixture = Fixture::from_file(&args.tx_file)?;
    let tx = fixture.mock_transaction()?;
    let hash = script_hash_by_index(&tx, args.script_group_type, args.cell_type, args.cell_index)?;
    println!("{}", hash_hex(&hash));
    Ok(())
}

/// Expand templates and pretty-print the result when it is valid JSON.
pub fn expand(args: ExpandArgs, _verbosity: Verbosity) -> Result<()> {
    let text = std::fs::read_to_string(&args.tx_file).map_err(|e| {
        DebuggerError::FileError(format!(
            "Failed to read fixture {}: {}",
            args.tx_file.display(),
            e
        ))
    })?;
    let expanded = Embed::new(&args.tx_file, text).replace_all()?;
    let rendered = match serde_json::from_str::<serde_json::Value>(&expanded) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(expanded),
        Err(e) => {
            warn!("Expanded fixture is not valid JSON: {}", e);
            expanded
        }
    };
    match args.output {
        Some(path) => std::fs::write(&path, rendered + "\n").map_err(|e| {
            DebuggerError::FileError(format!("Failed to write {}: {}", path.display(), e)).into()
        }),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

pub fn completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
